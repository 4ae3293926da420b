//! In-memory representation changes: row records ↔ columnar tables.

use porter_core::{ColumnarTable, DataFormat, MemoryStorage, Storage, StorageClass, StoredObject};
use porter_plan::{Capability, CopierCaps, Cost};

use crate::copier::{Copier, CopyContext, HopRequest, land_records, source_memory};
use crate::error::CopyError;
use crate::request::WriteDisposition;

/// Pivot row records into a columnar table on the same (or another)
/// memory storage.
pub struct RecordsToColumnar {
    caps: CopierCaps,
}

impl RecordsToColumnar {
    pub fn new() -> Self {
        Self {
            caps: CopierCaps::new()
                .from_class(StorageClass::Memory)
                .from_format(DataFormat::Records)
                .to_class(StorageClass::Memory)
                .to_format(DataFormat::Columnar),
        }
    }
}

impl Default for RecordsToColumnar {
    fn default() -> Self {
        Self::new()
    }
}

impl Capability for RecordsToColumnar {
    fn name(&self) -> &'static str {
        "records-to-columnar"
    }

    fn cost(&self) -> Cost {
        Cost::buffer_to_buffer() + Cost::format_conversion()
    }

    fn caps(&self) -> &CopierCaps {
        &self.caps
    }
}

impl Copier for RecordsToColumnar {
    fn copy(&self, hop: &HopRequest<'_>, ctx: &CopyContext<'_>) -> Result<(), CopyError> {
        let mut rows = crate::copier::source_records(hop.source)?;
        if let Some(schema) = hop.schema {
            porter_cast::cast_records(&mut rows, schema, ctx.cast)?;
        }

        let store = source_memory(hop.dest)?;
        if store.exists(hop.dest.name) {
            match hop.disposition {
                WriteDisposition::ErrorIfExists => {
                    return Err(CopyError::ObjectExists {
                        storage: hop.dest.storage.label().to_string(),
                        name: hop.dest.name.to_string(),
                    });
                }
                WriteDisposition::Append => {
                    if let Some(StoredObject::Columnar(existing)) = store.get(hop.dest.name) {
                        let mut combined = existing.to_records();
                        combined.append(&mut rows);
                        rows = combined;
                    }
                }
                WriteDisposition::Overwrite => {}
            }
        }
        store.put(
            hop.dest.name,
            StoredObject::Columnar(ColumnarTable::from_records(&rows)),
        );
        Ok(())
    }
}

/// Pivot a columnar table back into row records.
pub struct ColumnarToRecords {
    caps: CopierCaps,
}

impl ColumnarToRecords {
    pub fn new() -> Self {
        Self {
            caps: CopierCaps::new()
                .from_class(StorageClass::Memory)
                .from_format(DataFormat::Columnar)
                .to_class(StorageClass::Memory)
                .to_format(DataFormat::Records),
        }
    }
}

impl Default for ColumnarToRecords {
    fn default() -> Self {
        Self::new()
    }
}

impl Capability for ColumnarToRecords {
    fn name(&self) -> &'static str {
        "columnar-to-records"
    }

    fn cost(&self) -> Cost {
        Cost::buffer_to_buffer() + Cost::format_conversion()
    }

    fn caps(&self) -> &CopierCaps {
        &self.caps
    }
}

impl Copier for ColumnarToRecords {
    fn copy(&self, hop: &HopRequest<'_>, _ctx: &CopyContext<'_>) -> Result<(), CopyError> {
        let store = source_memory(hop.source)?;
        let rows = match store.get(hop.source.name) {
            Some(StoredObject::Columnar(table)) => table.to_records(),
            Some(other) => {
                return Err(CopyError::UnexpectedShape {
                    storage: hop.source.storage.label().to_string(),
                    name: hop.source.name.to_string(),
                    expected: "Columnar",
                    actual: other.variant_name(),
                });
            }
            None => {
                return Err(CopyError::NoSuchObject {
                    storage: hop.source.storage.label().to_string(),
                    name: hop.source.name.to_string(),
                });
            }
        };
        land_records(hop.dest, rows, hop.disposition)
    }
}
