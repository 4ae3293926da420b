//! Handler for row records held on memory storages.

use porter_cast::{CastOptions, InferenceOptions};
use porter_core::{
    DataFormat, FieldType, MemoryStorage, ObjectRef, Record, Schema, SchemaField, Storage,
    StorageClass, StoredObject, Value,
};

use crate::error::CopyError;
use crate::handler::FormatHandler;
use crate::request::WriteDisposition;

pub struct RecordsHandler;

pub(super) fn memory_of<'a>(
    object: ObjectRef<'a>,
    handler: &'static str,
) -> Result<&'a dyn MemoryStorage, CopyError> {
    object.storage.as_memory().ok_or_else(|| CopyError::Internal {
        detail: format!(
            "{handler} handler invoked on non-memory storage '{}'",
            object.storage.label()
        ),
    })
}

fn rows_of(object: ObjectRef<'_>) -> Result<Vec<Record>, CopyError> {
    let store = memory_of(object, "records")?;
    match store.get(object.name) {
        Some(StoredObject::Records(rows)) => Ok(rows),
        Some(other) => Err(CopyError::UnexpectedShape {
            storage: object.storage.label().to_string(),
            name: object.name.to_string(),
            expected: "Records",
            actual: other.variant_name(),
        }),
        None => Err(CopyError::NoSuchObject {
            storage: object.storage.label().to_string(),
            name: object.name.to_string(),
        }),
    }
}

fn field_order(rows: &[Record]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for row in rows {
        for name in row.field_names() {
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
    }
    names
}

impl FormatHandler for RecordsHandler {
    fn data_format(&self) -> DataFormat {
        DataFormat::Records
    }

    fn classes(&self) -> &[StorageClass] {
        &[StorageClass::Memory]
    }

    fn infer_format(&self, object: ObjectRef<'_>) -> Result<Option<DataFormat>, CopyError> {
        let store = memory_of(object, "records")?;
        Ok(match store.get(object.name) {
            Some(StoredObject::Records(_)) => Some(DataFormat::Records),
            _ => None,
        })
    }

    fn field_names(&self, object: ObjectRef<'_>) -> Result<Vec<String>, CopyError> {
        Ok(field_order(&rows_of(object)?))
    }

    fn infer_field_type(
        &self,
        object: ObjectRef<'_>,
        field: &str,
    ) -> Result<FieldType, CopyError> {
        let rows = rows_of(object)?;
        let values: Vec<&Value> = rows.iter().filter_map(|row| row.get(field)).collect();
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
        let mut rows = rows_of(object)?;
        porter_cast::cast_field(&mut rows, field, options)?;
        memory_of(object, "records")?.put(object.name, StoredObject::Records(rows));
        Ok(())
    }

    fn cast_schema(
        &self,
        object: ObjectRef<'_>,
        schema: &Schema,
        options: &CastOptions,
    ) -> Result<Schema, CopyError> {
        let mut rows = rows_of(object)?;
        let effective = porter_cast::cast_records(&mut rows, schema, options)?;
        memory_of(object, "records")?.put(object.name, StoredObject::Records(rows));
        Ok(effective)
    }

    fn create_empty(
        &self,
        object: ObjectRef<'_>,
        _schema: &Schema,
        disposition: WriteDisposition,
    ) -> Result<(), CopyError> {
        let store = memory_of(object, "records")?;
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
        store.put(object.name, StoredObject::Records(Vec::new()));
        Ok(())
    }

    fn record_count(&self, object: ObjectRef<'_>) -> Result<u64, CopyError> {
        Ok(rows_of(object)?.len() as u64)
    }
}
