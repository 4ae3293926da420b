//! Copiers bridging filesystem files and memory records.

use porter_core::{
    DataFormat, FilesystemStorage, ObjectRef, Record, Storage, StorageClass, StorageError,
};
use porter_plan::{Capability, CopierCaps, Cost};
use tracing::debug;

use crate::codec;
use crate::copier::{
    Copier, CopyContext, HopRequest, land_records, record_field_order, source_records,
};
use crate::error::CopyError;
use crate::handler::FormatHandler as _;
use crate::request::WriteDisposition;

fn filesystem_of(object: ObjectRef<'_>) -> Result<&dyn FilesystemStorage, CopyError> {
    object
        .storage
        .as_filesystem()
        .ok_or_else(|| CopyError::Internal {
            detail: format!(
                "copier expected filesystem storage, got '{}'",
                object.storage.label()
            ),
        })
}

fn read_source_file(
    object: ObjectRef<'_>,
) -> Result<Box<dyn std::io::Read + Send>, CopyError> {
    let fs = filesystem_of(object)?;
    if !fs.exists(object.name)? {
        return Err(CopyError::NoSuchObject {
            storage: object.storage.label().to_string(),
            name: object.name.to_string(),
        });
    }
    Ok(fs.open_read(object.name)?)
}

/// Open the destination file respecting the hop disposition. Appending
/// to flat files is not supported; route through records and rewrite.
fn create_dest_file(
    object: ObjectRef<'_>,
    disposition: WriteDisposition,
) -> Result<Box<dyn std::io::Write + Send>, CopyError> {
    let fs = filesystem_of(object)?;
    if fs.exists(object.name)? {
        match disposition {
            WriteDisposition::ErrorIfExists => {
                return Err(CopyError::ObjectExists {
                    storage: object.storage.label().to_string(),
                    name: object.name.to_string(),
                });
            }
            WriteDisposition::Append => {
                return Err(CopyError::Storage(StorageError::Unsupported {
                    storage: object.storage.label().to_string(),
                    operation: "appending to an existing file",
                }));
            }
            WriteDisposition::Overwrite => {}
        }
    }
    Ok(fs.create(object.name, true)?)
}

/// After landing untyped rows, enforce the request schema through the
/// destination records handler.
fn cast_landed_records(hop: &HopRequest<'_>, ctx: &CopyContext<'_>) -> Result<(), CopyError> {
    if let Some(schema) = hop.schema {
        let handler = ctx
            .handlers
            .resolve(DataFormat::Records, hop.dest.storage.engine())?;
        handler.cast_schema(hop.dest, schema, ctx.cast)?;
    }
    Ok(())
}

/// A delimited file into memory records. Cells land as text; the request
/// schema (when present) is enforced through the records handler because
/// the file format itself carries no types.
pub struct CsvToRecords {
    caps: CopierCaps,
}

impl CsvToRecords {
    pub fn new() -> Self {
        Self {
            caps: CopierCaps::new()
                .from_class(StorageClass::Filesystem)
                .from_format(DataFormat::Csv)
                .to_class(StorageClass::Memory)
                .to_format(DataFormat::Records),
        }
    }
}

impl Default for CsvToRecords {
    fn default() -> Self {
        Self::new()
    }
}

impl Capability for CsvToRecords {
    fn name(&self) -> &'static str {
        "csv-to-records"
    }

    fn cost(&self) -> Cost {
        Cost::disk_to_memory() + Cost::format_conversion()
    }

    fn caps(&self) -> &CopierCaps {
        &self.caps
    }
}

impl Copier for CsvToRecords {
    fn copy(&self, hop: &HopRequest<'_>, ctx: &CopyContext<'_>) -> Result<(), CopyError> {
        let (_, rows) = codec::read_csv(read_source_file(hop.source)?)?;
        debug!(file = hop.source.name, rows = rows.len(), "read delimited file");
        land_records(hop.dest, rows, hop.disposition)?;
        cast_landed_records(hop, ctx)
    }
}

/// Memory records into a delimited file.
pub struct RecordsToCsv {
    caps: CopierCaps,
}

impl RecordsToCsv {
    pub fn new() -> Self {
        Self {
            caps: CopierCaps::new()
                .from_class(StorageClass::Memory)
                .from_format(DataFormat::Records)
                .to_class(StorageClass::Filesystem)
                .to_format(DataFormat::Csv),
        }
    }
}

impl Default for RecordsToCsv {
    fn default() -> Self {
        Self::new()
    }
}

impl Capability for RecordsToCsv {
    fn name(&self) -> &'static str {
        "records-to-csv"
    }

    fn cost(&self) -> Cost {
        Cost::memory_to_disk() + Cost::format_conversion()
    }

    fn caps(&self) -> &CopierCaps {
        &self.caps
    }
}

impl Copier for RecordsToCsv {
    fn copy(&self, hop: &HopRequest<'_>, _ctx: &CopyContext<'_>) -> Result<(), CopyError> {
        let rows = source_records(hop.source)?;
        let names = output_field_names(hop, &rows);
        let writer = create_dest_file(hop.dest, hop.disposition)?;
        codec::write_csv(writer, &names, &rows)?;
        debug!(file = hop.dest.name, rows = rows.len(), "wrote delimited file");
        Ok(())
    }
}

/// A JSON-lines file into memory records. Lines carry scalar typing of
/// their own; the request schema still applies when present.
pub struct JsonlToRecords {
    caps: CopierCaps,
}

impl JsonlToRecords {
    pub fn new() -> Self {
        Self {
            caps: CopierCaps::new()
                .from_class(StorageClass::Filesystem)
                .from_format(DataFormat::Jsonl)
                .to_class(StorageClass::Memory)
                .to_format(DataFormat::Records),
        }
    }
}

impl Default for JsonlToRecords {
    fn default() -> Self {
        Self::new()
    }
}

impl Capability for JsonlToRecords {
    fn name(&self) -> &'static str {
        "jsonl-to-records"
    }

    fn cost(&self) -> Cost {
        Cost::disk_to_memory() + Cost::format_conversion()
    }

    fn caps(&self) -> &CopierCaps {
        &self.caps
    }
}

impl Copier for JsonlToRecords {
    fn copy(&self, hop: &HopRequest<'_>, ctx: &CopyContext<'_>) -> Result<(), CopyError> {
        let rows = codec::read_jsonl(read_source_file(hop.source)?)?;
        debug!(file = hop.source.name, rows = rows.len(), "read JSON lines");
        land_records(hop.dest, rows, hop.disposition)?;
        cast_landed_records(hop, ctx)
    }
}

/// Memory records into a JSON-lines file.
pub struct RecordsToJsonl {
    caps: CopierCaps,
}

impl RecordsToJsonl {
    pub fn new() -> Self {
        Self {
            caps: CopierCaps::new()
                .from_class(StorageClass::Memory)
                .from_format(DataFormat::Records)
                .to_class(StorageClass::Filesystem)
                .to_format(DataFormat::Jsonl),
        }
    }
}

impl Default for RecordsToJsonl {
    fn default() -> Self {
        Self::new()
    }
}

impl Capability for RecordsToJsonl {
    fn name(&self) -> &'static str {
        "records-to-jsonl"
    }

    fn cost(&self) -> Cost {
        Cost::memory_to_disk() + Cost::format_conversion()
    }

    fn caps(&self) -> &CopierCaps {
        &self.caps
    }
}

impl Copier for RecordsToJsonl {
    fn copy(&self, hop: &HopRequest<'_>, _ctx: &CopyContext<'_>) -> Result<(), CopyError> {
        let rows = source_records(hop.source)?;
        let names = output_field_names(hop, &rows);
        let writer = create_dest_file(hop.dest, hop.disposition)?;
        codec::write_jsonl(writer, &names, &rows)?;
        debug!(file = hop.dest.name, rows = rows.len(), "wrote JSON lines");
        Ok(())
    }
}

/// Column order for file output: the request schema when declared, the
/// records' own field order otherwise.
fn output_field_names(hop: &HopRequest<'_>, rows: &[Record]) -> Vec<String> {
    match hop.schema {
        Some(schema) => schema.field_names().map(str::to_string).collect(),
        None => record_field_order(rows),
    }
}
