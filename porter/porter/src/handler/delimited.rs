//! Handler for delimited (CSV) files on filesystem storages.
//!
//! Delimited files carry no typing of their own, so casts normalize the
//! text in place: values are parsed, coerced, and serialized back.

use porter_cast::{CastOptions, InferenceOptions};
use porter_core::{
    DataFormat, FieldType, FilesystemStorage, ObjectRef, Record, Schema, SchemaField, Storage,
    StorageClass, Value,
};

use crate::codec;
use crate::error::CopyError;
use crate::handler::FormatHandler;
use crate::request::WriteDisposition;

pub struct DelimitedHandler;

pub(super) fn filesystem_of<'a>(
    object: ObjectRef<'a>,
    handler: &'static str,
) -> Result<&'a dyn FilesystemStorage, CopyError> {
    object
        .storage
        .as_filesystem()
        .ok_or_else(|| CopyError::Internal {
            detail: format!(
                "{handler} handler invoked on non-filesystem storage '{}'",
                object.storage.label()
            ),
        })
}

fn read(object: ObjectRef<'_>) -> Result<(Vec<String>, Vec<Record>), CopyError> {
    let fs = filesystem_of(object, "delimited")?;
    if !fs.exists(object.name)? {
        return Err(CopyError::NoSuchObject {
            storage: object.storage.label().to_string(),
            name: object.name.to_string(),
        });
    }
    Ok(codec::read_csv(fs.open_read(object.name)?)?)
}

fn write(
    object: ObjectRef<'_>,
    names: &[String],
    rows: &[Record],
) -> Result<(), CopyError> {
    let fs = filesystem_of(object, "delimited")?;
    Ok(codec::write_csv(fs.create(object.name, true)?, names, rows)?)
}

impl FormatHandler for DelimitedHandler {
    fn data_format(&self) -> DataFormat {
        DataFormat::Csv
    }

    fn classes(&self) -> &[StorageClass] {
        &[StorageClass::Filesystem]
    }

    fn infer_format(&self, object: ObjectRef<'_>) -> Result<Option<DataFormat>, CopyError> {
        let fs = filesystem_of(object, "delimited")?;
        let claimed = fs.exists(object.name)? && object.name.ends_with(".csv");
        Ok(claimed.then_some(DataFormat::Csv))
    }

    fn field_names(&self, object: ObjectRef<'_>) -> Result<Vec<String>, CopyError> {
        Ok(read(object)?.0)
    }

    fn infer_field_type(
        &self,
        object: ObjectRef<'_>,
        field: &str,
    ) -> Result<FieldType, CopyError> {
        let (_, rows) = read(object)?;
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
        let (names, mut rows) = read(object)?;
        porter_cast::cast_field(&mut rows, field, options)?;
        write(object, &names, &rows)
    }

    fn cast_schema(
        &self,
        object: ObjectRef<'_>,
        schema: &Schema,
        options: &CastOptions,
    ) -> Result<Schema, CopyError> {
        let (names, mut rows) = read(object)?;
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
        let fs = filesystem_of(object, "delimited")?;
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
        Ok(read(object)?.1.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use super::*;
    use crate::storage::LocalFs;

    fn seeded_fs(dir: &std::path::Path) -> LocalFs {
        let fs = LocalFs::new(dir);
        let mut writer = fs.create("people.csv", false).unwrap();
        writer.write_all(b"name,age\nada,36\nalan,41\n").unwrap();
        drop(writer);
        fs
    }

    #[test]
    fn sniffs_by_extension_and_existence() {
        let dir = tempfile::tempdir().unwrap();
        let fs = seeded_fs(dir.path());
        let handler = DelimitedHandler;
        assert_eq!(
            handler
                .infer_format(ObjectRef::new(&fs, "people.csv"))
                .unwrap(),
            Some(DataFormat::Csv)
        );
        assert_eq!(
            handler
                .infer_format(ObjectRef::new(&fs, "missing.csv"))
                .unwrap(),
            None
        );
    }

    #[test]
    fn reads_header_and_infers_types() {
        let dir = tempfile::tempdir().unwrap();
        let fs = seeded_fs(dir.path());
        let handler = DelimitedHandler;
        let object = ObjectRef::new(&fs, "people.csv");
        assert_eq!(handler.field_names(object).unwrap(), vec!["name", "age"]);
        assert_eq!(
            handler.infer_field_type(object, "age").unwrap(),
            FieldType::Int
        );
        assert_eq!(handler.record_count(object).unwrap(), 2);
    }

    #[test]
    fn cast_schema_normalizes_the_file_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let fs = LocalFs::new(dir.path());
        let mut writer = fs.create("amounts.csv", false).unwrap();
        writer.write_all(b"amount\n\"1,250\"\n3\n").unwrap();
        drop(writer);

        let handler = DelimitedHandler;
        let schema = Schema::new(vec![SchemaField::new("amount", FieldType::Int)]);
        handler
            .cast_schema(
                ObjectRef::new(&fs, "amounts.csv"),
                &schema,
                &CastOptions::default(),
            )
            .unwrap();

        let (_, rows) = read(ObjectRef::new(&fs, "amounts.csv")).unwrap();
        assert_eq!(rows[0].get("amount"), Some(&Value::text("1250")));
    }

    #[test]
    fn create_empty_writes_a_header_only_file() {
        let dir = tempfile::tempdir().unwrap();
        let fs = LocalFs::new(dir.path());
        let handler = DelimitedHandler;
        let schema = Schema::new(vec![
            SchemaField::new("a", FieldType::Int),
            SchemaField::new("b", FieldType::Text),
        ]);
        handler
            .create_empty(
                ObjectRef::new(&fs, "fresh.csv"),
                &schema,
                WriteDisposition::ErrorIfExists,
            )
            .unwrap();
        assert_eq!(
            handler
                .field_names(ObjectRef::new(&fs, "fresh.csv"))
                .unwrap(),
            vec!["a", "b"]
        );
        assert!(matches!(
            handler.create_empty(
                ObjectRef::new(&fs, "fresh.csv"),
                &schema,
                WriteDisposition::ErrorIfExists
            ),
            Err(CopyError::ObjectExists { .. })
        ));
    }
}
