//! Executable copiers: the capability trait extended with a transfer
//! function, plus the built-in set.

mod database;
mod file;
mod memory;

use std::sync::Arc;

use porter_cast::CastOptions;
use porter_core::{DataFormat, MemoryStorage, ObjectRef, Record, Schema, Storage, StoredObject};
use porter_plan::Capability;

pub use database::{RecordsToTable, TableToRecords};
pub use file::{CsvToRecords, JsonlToRecords, RecordsToCsv, RecordsToJsonl};
pub use memory::{ColumnarToRecords, RecordsToColumnar};

use crate::error::CopyError;
use crate::handler::HandlerRegistry;
use crate::request::WriteDisposition;

/// One hop of an executing copy: read the source object, materialize the
/// destination object in the target format.
pub struct HopRequest<'a> {
    pub source: ObjectRef<'a>,
    pub dest: ObjectRef<'a>,
    pub target_format: DataFormat,
    pub schema: Option<&'a Schema>,
    pub disposition: WriteDisposition,
}

/// Shared collaborators a copier may call into.
pub struct CopyContext<'a> {
    pub handlers: &'a HandlerRegistry,
    pub cast: &'a CastOptions,
}

/// A registered conversion capability that can also perform the
/// transfer. The planner sees only the [`Capability`] surface.
pub trait Copier: Capability {
    fn copy(&self, hop: &HopRequest<'_>, ctx: &CopyContext<'_>) -> Result<(), CopyError>;
}

/// The built-in copiers, in registration (and therefore tie-break)
/// order.
pub fn default_copiers() -> Vec<Arc<dyn Copier>> {
    vec![
        Arc::new(RecordsToTable::new()),
        Arc::new(TableToRecords::new()),
        Arc::new(CsvToRecords::new()),
        Arc::new(RecordsToCsv::new()),
        Arc::new(JsonlToRecords::new()),
        Arc::new(RecordsToJsonl::new()),
        Arc::new(RecordsToColumnar::new()),
        Arc::new(ColumnarToRecords::new()),
    ]
}

// -- helpers shared by the built-in copiers --------------------------------

pub(crate) fn source_records(source: ObjectRef<'_>) -> Result<Vec<Record>, CopyError> {
    let store = source_memory(source)?;
    match store.get(source.name) {
        Some(StoredObject::Records(rows)) => Ok(rows),
        Some(other) => Err(CopyError::UnexpectedShape {
            storage: source.storage.label().to_string(),
            name: source.name.to_string(),
            expected: "Records",
            actual: other.variant_name(),
        }),
        None => Err(CopyError::NoSuchObject {
            storage: source.storage.label().to_string(),
            name: source.name.to_string(),
        }),
    }
}

pub(crate) fn source_memory(
    object: ObjectRef<'_>,
) -> Result<&dyn MemoryStorage, CopyError> {
    object.storage.as_memory().ok_or_else(|| CopyError::Internal {
        detail: format!(
            "copier expected memory storage, got '{}'",
            object.storage.label()
        ),
    })
}

/// Land records on a memory destination, honoring the hop disposition.
pub(crate) fn land_records(
    dest: ObjectRef<'_>,
    mut rows: Vec<Record>,
    disposition: WriteDisposition,
) -> Result<(), CopyError> {
    let store = source_memory(dest)?;
    if store.exists(dest.name) {
        match disposition {
            WriteDisposition::ErrorIfExists => {
                return Err(CopyError::ObjectExists {
                    storage: dest.storage.label().to_string(),
                    name: dest.name.to_string(),
                });
            }
            WriteDisposition::Append => {
                if let Some(StoredObject::Records(mut existing)) = store.get(dest.name) {
                    existing.append(&mut rows);
                    rows = existing;
                }
            }
            WriteDisposition::Overwrite => {}
        }
    }
    store.put(dest.name, StoredObject::Records(rows));
    Ok(())
}

pub(crate) fn record_field_order(rows: &[Record]) -> Vec<String> {
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
