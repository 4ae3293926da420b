//! Handler for relational tables, written against the database driver
//! contract only.

use porter_cast::CastOptions;
use porter_core::{
    DataFormat, DatabaseStorage, FieldType, ObjectRef, Schema, SchemaField, Storage,
    StorageClass, StorageError,
};

use crate::error::CopyError;
use crate::handler::FormatHandler;
use crate::request::WriteDisposition;

pub struct TableHandler;

pub(super) fn database_of<'a>(
    object: ObjectRef<'a>,
    handler: &'static str,
) -> Result<&'a dyn DatabaseStorage, CopyError> {
    object.storage.as_database().ok_or_else(|| CopyError::Internal {
        detail: format!(
            "{handler} handler invoked on non-database storage '{}'",
            object.storage.label()
        ),
    })
}

impl FormatHandler for TableHandler {
    fn data_format(&self) -> DataFormat {
        DataFormat::Table
    }

    fn classes(&self) -> &[StorageClass] {
        &[StorageClass::Database]
    }

    fn infer_format(&self, object: ObjectRef<'_>) -> Result<Option<DataFormat>, CopyError> {
        let db = database_of(object, "table")?;
        Ok(db.table_exists(object.name)?.then_some(DataFormat::Table))
    }

    fn field_names(&self, object: ObjectRef<'_>) -> Result<Vec<String>, CopyError> {
        let db = database_of(object, "table")?;
        Ok(db
            .table_schema(object.name)?
            .field_names()
            .map(str::to_string)
            .collect())
    }

    fn infer_field_type(
        &self,
        object: ObjectRef<'_>,
        field: &str,
    ) -> Result<FieldType, CopyError> {
        let db = database_of(object, "table")?;
        let schema = db.table_schema(object.name)?;
        schema
            .field(field)
            .map(|f| f.field_type)
            .ok_or_else(|| {
                CopyError::Storage(StorageError::Backend(format!(
                    "table '{}' has no column '{field}'",
                    object.name
                )))
            })
    }

    // Declared column types are enforced by the database itself; casting
    // happened before the rows were inserted.
    fn cast_field(
        &self,
        _object: ObjectRef<'_>,
        _field: &SchemaField,
        _options: &CastOptions,
    ) -> Result<(), CopyError> {
        Ok(())
    }

    fn cast_schema(
        &self,
        _object: ObjectRef<'_>,
        schema: &Schema,
        _options: &CastOptions,
    ) -> Result<Schema, CopyError> {
        Ok(schema.clone())
    }

    fn create_empty(
        &self,
        object: ObjectRef<'_>,
        schema: &Schema,
        disposition: WriteDisposition,
    ) -> Result<(), CopyError> {
        let db = database_of(object, "table")?;
        if db.table_exists(object.name)? {
            match disposition {
                WriteDisposition::ErrorIfExists => {
                    return Err(CopyError::ObjectExists {
                        storage: object.storage.label().to_string(),
                        name: object.name.to_string(),
                    });
                }
                WriteDisposition::Append => return Ok(()),
                WriteDisposition::Overwrite => db.drop_table(object.name)?,
            }
        }
        Ok(db.create_table(object.name, schema)?)
    }

    fn record_count(&self, object: ObjectRef<'_>) -> Result<u64, CopyError> {
        let db = database_of(object, "table")?;
        Ok(db.row_count(object.name)?)
    }
}
