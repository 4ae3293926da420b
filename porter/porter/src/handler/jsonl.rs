//! Handler for JSON-lines files on filesystem storages.

use porter_cast::{CastOptions, InferenceOptions};
use porter_core::{
    DataFormat, FieldType, FilesystemStorage as _, ObjectRef, Record, Schema, SchemaField,
    Storage, StorageClass, Value,
};

use crate::codec;
use crate::error::CopyError;
use crate::handler::FormatHandler;
use crate::handler::delimited::filesystem_of;
use crate::request::WriteDisposition;

pub struct JsonlHandler;

fn read(object: ObjectRef<'_>) -> Result<Vec<Record>, CopyError> {
    let fs = filesystem_of(object, "jsonl")?;
    if !fs.exists(object.name)? {
        return Err(CopyError::NoSuchObject {
            storage: object.storage.label().to_string(),
            name: object.name.to_string(),
        });
    }
    Ok(codec::read_jsonl(fs.open_read(object.name)?)?)
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

fn write(object: ObjectRef<'_>, names: &[String], rows: &[Record]) -> Result<(), CopyError> {
    let fs = filesystem_of(object, "jsonl")?;
    Ok(codec::write_jsonl(fs.create(object.name, true)?, names, rows)?)
}

impl FormatHandler for JsonlHandler {
    fn data_format(&self) -> DataFormat {
        DataFormat::Jsonl
    }

    fn classes(&self) -> &[StorageClass] {
        &[StorageClass::Filesystem]
    }

    fn infer_format(&self, object: ObjectRef<'_>) -> Result<Option<DataFormat>, CopyError> {
        let fs = filesystem_of(object, "jsonl")?;
        let claimed = fs.exists(object.name)?
            && (object.name.ends_with(".jsonl") || object.name.ends_with(".ndjson"));
        Ok(claimed.then_some(DataFormat::Jsonl))
    }

    fn field_names(&self, object: ObjectRef<'_>) -> Result<Vec<String>, CopyError> {
        Ok(field_order(&read(object)?))
    }

    fn infer_field_type(
        &self,
        object: ObjectRef<'_>,
        field: &str,
    ) -> Result<FieldType, CopyError> {
        let rows = read(object)?;
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
        let mut rows = read(object)?;
        let names = field_order(&rows);
        porter_cast::cast_field(&mut rows, field, options)?;
        write(object, &names, &rows)
    }

    fn cast_schema(
        &self,
        object: ObjectRef<'_>,
        schema: &Schema,
        options: &CastOptions,
    ) -> Result<Schema, CopyError> {
        let mut rows = read(object)?;
        let names = field_order(&rows);
        let effective = porter_cast::cast_records(&mut rows, schema, options)?;
        write(object, &names, &rows)?;
        Ok(effective)
    }

    fn create_empty(
        &self,
        object: ObjectRef<'_>,
        schema: &Schema,
        disposition: WriteDisposition,
    ) -> Result<(), CopyError> {
        let fs = filesystem_of(object, "jsonl")?;
        if fs.exists(object.name)? {
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
        let names: Vec<String> = schema.field_names().map(str::to_string).collect();
        write(object, &names, &[])
    }

    fn record_count(&self, object: ObjectRef<'_>) -> Result<u64, CopyError> {
        Ok(read(object)?.len() as u64)
    }
}
