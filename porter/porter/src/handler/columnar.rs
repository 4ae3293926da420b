//! Handler for column-major tables held on memory storages.

use porter_cast::{CastOptions, InferenceOptions};
use porter_core::{
    ColumnarTable, DataFormat, FieldType, MemoryStorage as _, ObjectRef, Schema, SchemaField,
    Storage, StorageClass, StoredObject, Value,
};

use crate::error::CopyError;
use crate::handler::FormatHandler;
use crate::handler::records::memory_of;
use crate::request::WriteDisposition;

pub struct ColumnarHandler;

fn table_of(object: ObjectRef<'_>) -> Result<ColumnarTable, CopyError> {
    let store = memory_of(object, "columnar")?;
    match store.get(object.name) {
        Some(StoredObject::Columnar(table)) => Ok(table),
        Some(other) => Err(CopyError::UnexpectedShape {
            storage: object.storage.label().to_string(),
            name: object.name.to_string(),
            expected: "Columnar",
            actual: other.variant_name(),
        }),
        None => Err(CopyError::NoSuchObject {
            storage: object.storage.label().to_string(),
            name: object.name.to_string(),
        }),
    }
}

impl FormatHandler for ColumnarHandler {
    fn data_format(&self) -> DataFormat {
        DataFormat::Columnar
    }

    fn classes(&self) -> &[StorageClass] {
        &[StorageClass::Memory]
    }

    fn infer_format(&self, object: ObjectRef<'_>) -> Result<Option<DataFormat>, CopyError> {
        let store = memory_of(object, "columnar")?;
        Ok(match store.get(object.name) {
            Some(StoredObject::Columnar(_)) => Some(DataFormat::Columnar),
            _ => None,
        })
    }

    fn field_names(&self, object: ObjectRef<'_>) -> Result<Vec<String>, CopyError> {
        Ok(table_of(object)?.field_names().map(str::to_string).collect())
    }

    fn infer_field_type(
        &self,
        object: ObjectRef<'_>,
        field: &str,
    ) -> Result<FieldType, CopyError> {
        let table = table_of(object)?;
        let values: Vec<&Value> = table.column(field).map(|column| column.iter().collect()).unwrap_or_default();
        Ok(porter_cast::infer_field_type(
            &values,
            &InferenceOptions::default(),
        ))
    }

    fn cast_field(
        &self,
        object: ObjectRef<'_>,
        field: &SchemaField,
        options: &CastOptions,
    ) -> Result<(), CopyError> {
        self.cast_schema(object, &Schema::new(vec![field.clone()]), options)?;
        Ok(())
    }

    fn cast_schema(
        &self,
        object: ObjectRef<'_>,
        schema: &Schema,
        options: &CastOptions,
    ) -> Result<Schema, CopyError> {
        let table = table_of(object)?;
        if table.num_rows() == 0 {
            return Ok(schema.clone());
        }
        let mut rows = table.to_records();
        let effective = porter_cast::cast_records(&mut rows, schema, options)?;
        memory_of(object, "columnar")?.put(
            object.name,
            StoredObject::Columnar(ColumnarTable::from_records(&rows)),
        );
        Ok(effective)
    }

    fn create_empty(
        &self,
        object: ObjectRef<'_>,
        schema: &Schema,
        disposition: WriteDisposition,
    ) -> Result<(), CopyError> {
        let store = memory_of(object, "columnar")?;
        if store.exists(object.name) {
            match disposition {
                WriteDisposition::ErrorIfExists => {
                    return Err(CopyError::ObjectExists {
                        storage: object.storage.label().to_string(),
                        name: object.name.to_string(),
                    });
                }
                WriteDisposition::Append => return Ok(()),
                WriteDisposition::Overwrite => {}
            }
        }
        let names = schema.field_names().map(Into::into).collect();
        store.put(object.name, StoredObject::Columnar(ColumnarTable::new(names)));
        Ok(())
    }

    fn record_count(&self, object: ObjectRef<'_>) -> Result<u64, CopyError> {
        Ok(table_of(object)?.num_rows() as u64)
    }
}
