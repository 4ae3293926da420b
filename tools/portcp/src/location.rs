//! Location-string parsing: `scheme://path` into storage + object name.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use porter::{
    DataFormat, FieldType, LocalFs, MemoryStore, ObjectLocation, Schema, SchemaField, Storage,
    StorageClass, StorageEngine,
};

/// Resolves location strings, sharing one in-process memory storage
/// across every `mem://` location in the invocation.
pub struct LocationParser {
    memory: Arc<MemoryStore>,
}

impl LocationParser {
    pub fn new() -> Self {
        Self {
            memory: Arc::new(MemoryStore::new("mem")),
        }
    }

    pub fn memory(&self) -> Arc<MemoryStore> {
        Arc::clone(&self.memory)
    }

    pub fn parse(&self, raw: &str) -> Result<ObjectLocation> {
        let (scheme, rest) = raw
            .split_once("://")
            .with_context(|| format!("'{raw}' is not a scheme://path location"))?;
        let engine = StorageEngine::from_scheme(scheme)
            .with_context(|| format!("unknown storage scheme '{scheme}'"))?;
        match engine.class() {
            StorageClass::Memory => Ok(ObjectLocation::new(self.memory(), rest)),
            StorageClass::Filesystem => {
                let path = Path::new(rest);
                let name = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .with_context(|| format!("'{rest}' has no file name"))?
                    .to_string();
                let root = path
                    .parent()
                    .filter(|p| !p.as_os_str().is_empty())
                    .unwrap_or_else(|| Path::new("."));
                let storage: Arc<dyn Storage> = Arc::new(LocalFs::new(root));
                Ok(ObjectLocation::new(storage, name))
            }
            StorageClass::Database => bail!("no {engine} driver is wired into portcp"),
        }
    }
}

pub fn parse_format(raw: &str) -> Result<DataFormat> {
    DataFormat::parse(raw).with_context(|| format!("unknown data format '{raw}'"))
}

/// Parse `name:type` pairs, e.g. `id:int,name:text,joined:date`.
pub fn parse_schema(raw: &str) -> Result<Schema> {
    let mut fields = Vec::new();
    for part in raw.split(',') {
        let (name, ty) = part
            .split_once(':')
            .with_context(|| format!("'{part}' is not a name:type pair"))?;
        let field_type = FieldType::parse(ty.trim())
            .with_context(|| format!("unknown field type '{ty}'"))?;
        fields.push(SchemaField::new(name.trim(), field_type));
    }
    Ok(Schema::new(fields))
}
