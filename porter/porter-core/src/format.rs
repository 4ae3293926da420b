use std::fmt;

use crate::storage::{StorageClass, StorageEngine};

/// Logical data shapes an object can take. Identity is by name, not by
/// structural shape; adding a variant extends the planning space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataFormat {
    /// Row records held in memory (`records`)
    Records,
    /// Column-major table held in memory (`columnar`)
    Columnar,
    /// Delimited text file (`csv`)
    Csv,
    /// JSON-lines text file (`jsonl`)
    Jsonl,
    /// Relational database table (`table`)
    Table,
    /// Open database cursor (`cursor`); ephemeral, cannot be re-read
    Cursor,
}

impl DataFormat {
    /// The storage class this format is native to.
    pub fn natural_class(&self) -> StorageClass {
        match self {
            Self::Records | Self::Columnar => StorageClass::Memory,
            Self::Csv | Self::Jsonl => StorageClass::Filesystem,
            Self::Table | Self::Cursor => StorageClass::Database,
        }
    }

    /// Some formats are tied to one specific engine; none of the built-in
    /// formats are.
    pub fn natural_engine(&self) -> Option<StorageEngine> {
        None
    }

    /// Whether an object in this format is durable and re-readable.
    /// Non-storable formats (open cursors) are consumed by a single read.
    pub fn is_storable(&self) -> bool {
        !matches!(self, Self::Cursor)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Records => "records",
            Self::Columnar => "columnar",
            Self::Csv => "csv",
            Self::Jsonl => "jsonl",
            Self::Table => "table",
            Self::Cursor => "cursor",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "records" => Some(Self::Records),
            "columnar" => Some(Self::Columnar),
            "csv" => Some(Self::Csv),
            "jsonl" => Some(Self::Jsonl),
            "table" => Some(Self::Table),
            "cursor" => Some(Self::Cursor),
            _ => None,
        }
    }
}

impl fmt::Display for DataFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A (storage engine, data format) pair; the node identity in the
/// planning graph. Two storage-formats are equal iff both parts are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StorageFormat {
    pub engine: StorageEngine,
    pub format: DataFormat,
}

impl StorageFormat {
    pub fn new(engine: StorageEngine, format: DataFormat) -> Self {
        Self { engine, format }
    }
}

impl fmt::Display for StorageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.engine, self.format)
    }
}

/// An ordered pair of storage-formats; the edge category in the planning
/// graph. Many copiers may serve the same conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Conversion {
    pub from: StorageFormat,
    pub to: StorageFormat,
}

impl Conversion {
    pub fn new(from: StorageFormat, to: StorageFormat) -> Self {
        Self { from, to }
    }

    /// A conversion whose endpoints coincide needs no work at all.
    pub fn is_identity(&self) -> bool {
        self.from == self.to
    }
}

impl fmt::Display for Conversion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}
