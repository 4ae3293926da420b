//! Copiers bridging memory records and database tables.

use porter_cast::cast_records;
use porter_core::{DataFormat, DatabaseStorage, ObjectRef, Storage, StorageClass};
use porter_plan::{Capability, CopierCaps, Cost};
use tracing::debug;

use crate::copier::{Copier, CopyContext, HopRequest, land_records, source_records};
use crate::error::CopyError;
use crate::handler::FormatHandler as _;

fn database_of(object: ObjectRef<'_>) -> Result<&dyn DatabaseStorage, CopyError> {
    object.storage.as_database().ok_or_else(|| CopyError::Internal {
        detail: format!(
            "copier expected database storage, got '{}'",
            object.storage.label()
        ),
    })
}

/// Memory records into a database table: create (per disposition), cast
/// rows to the declared or inferred schema, bulk insert.
pub struct RecordsToTable {
    caps: CopierCaps,
}

impl RecordsToTable {
    pub fn new() -> Self {
        Self {
            caps: CopierCaps::new()
                .from_class(StorageClass::Memory)
                .from_format(DataFormat::Records)
                .to_class(StorageClass::Database)
                .to_format(DataFormat::Table),
        }
    }
}

impl Default for RecordsToTable {
    fn default() -> Self {
        Self::new()
    }
}

impl Capability for RecordsToTable {
    fn name(&self) -> &'static str {
        "records-to-table"
    }

    fn cost(&self) -> Cost {
        Cost::memory_to_network() + Cost::format_conversion()
    }

    fn caps(&self) -> &CopierCaps {
        &self.caps
    }
}

impl Copier for RecordsToTable {
    fn copy(&self, hop: &HopRequest<'_>, ctx: &CopyContext<'_>) -> Result<(), CopyError> {
        let mut rows = source_records(hop.source)?;
        let schema = match hop.schema {
            Some(schema) => schema.clone(),
            None => porter_cast::infer_schema(&rows, &ctx.cast.inference),
        };
        let effective = cast_records(&mut rows, &schema, ctx.cast)?;

        let db = database_of(hop.dest)?;
        let handler = ctx
            .handlers
            .resolve(DataFormat::Table, hop.dest.storage.engine())?;
        handler.create_empty(hop.dest, &effective, hop.disposition)?;
        db.bulk_insert(hop.dest.name, &rows, &effective)?;
        debug!(table = hop.dest.name, rows = rows.len(), "inserted records");
        Ok(())
    }
}

/// A database table into memory records via a full-table select.
pub struct TableToRecords {
    caps: CopierCaps,
}

impl TableToRecords {
    pub fn new() -> Self {
        Self {
            caps: CopierCaps::new()
                .from_class(StorageClass::Database)
                .from_format(DataFormat::Table)
                .to_class(StorageClass::Memory)
                .to_format(DataFormat::Records),
        }
    }
}

impl Default for TableToRecords {
    fn default() -> Self {
        Self::new()
    }
}

impl Capability for TableToRecords {
    fn name(&self) -> &'static str {
        "table-to-records"
    }

    fn cost(&self) -> Cost {
        Cost::network_to_memory()
    }

    fn caps(&self) -> &CopierCaps {
        &self.caps
    }
}

impl Copier for TableToRecords {
    fn copy(&self, hop: &HopRequest<'_>, _ctx: &CopyContext<'_>) -> Result<(), CopyError> {
        let db = database_of(hop.source)?;
        if !db.table_exists(hop.source.name)? {
            return Err(CopyError::NoSuchObject {
                storage: hop.source.storage.label().to_string(),
                name: hop.source.name.to_string(),
            });
        }
        let rows =
            db.execute_returning_rows(&format!("SELECT * FROM \"{}\"", hop.source.name))?;
        debug!(table = hop.source.name, rows = rows.len(), "fetched table");
        land_records(hop.dest, rows, hop.disposition)
    }
}
