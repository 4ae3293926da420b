use std::fmt;

use crate::format::DataFormat;

/// Categories of storage media. Each class fixes the driver trait its
/// engines implement (see [`crate::driver`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageClass {
    /// Relational databases ([`DatabaseStorage`](crate::DatabaseStorage)).
    Database,
    /// File trees, local or remote ([`FilesystemStorage`](crate::FilesystemStorage)).
    Filesystem,
    /// The in-process object arena ([`MemoryStorage`](crate::MemoryStorage)).
    Memory,
}

impl StorageClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Database => "database",
            Self::Filesystem => "filesystem",
            Self::Memory => "memory",
        }
    }
}

impl fmt::Display for StorageClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Concrete storage backends. Every engine belongs to exactly one
/// [`StorageClass`] and declares the URL schemes it answers to plus its
/// natural (zero-conversion) data format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageEngine {
    /// SQLite database file (`sqlite`)
    Sqlite,
    /// PostgreSQL server (`postgres`, `postgresql`)
    Postgres,
    /// MySQL server (`mysql`)
    Mysql,
    /// Local filesystem (`file`)
    LocalFs,
    /// In-process memory arena (`mem`, `memory`)
    Memory,
}

impl StorageEngine {
    pub fn class(&self) -> StorageClass {
        match self {
            Self::Sqlite | Self::Postgres | Self::Mysql => StorageClass::Database,
            Self::LocalFs => StorageClass::Filesystem,
            Self::Memory => StorageClass::Memory,
        }
    }

    /// URL schemes this engine answers to; the first entry is canonical.
    pub fn schemes(&self) -> &'static [&'static str] {
        match self {
            Self::Sqlite => &["sqlite"],
            Self::Postgres => &["postgres", "postgresql"],
            Self::Mysql => &["mysql"],
            Self::LocalFs => &["file"],
            Self::Memory => &["mem", "memory"],
        }
    }

    /// The format objects on this engine take with zero conversion work.
    pub fn natural_format(&self) -> DataFormat {
        match self {
            Self::Sqlite | Self::Postgres | Self::Mysql => DataFormat::Table,
            Self::LocalFs => DataFormat::Csv,
            Self::Memory => DataFormat::Records,
        }
    }

    /// Resolve an engine from a location scheme (e.g. `"postgres"`).
    pub fn from_scheme(scheme: &str) -> Option<Self> {
        const ALL: [StorageEngine; 5] = [
            StorageEngine::Sqlite,
            StorageEngine::Postgres,
            StorageEngine::Mysql,
            StorageEngine::LocalFs,
            StorageEngine::Memory,
        ];
        ALL.into_iter()
            .find(|engine| engine.schemes().contains(&scheme))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sqlite => "sqlite",
            Self::Postgres => "postgres",
            Self::Mysql => "mysql",
            Self::LocalFs => "local-fs",
            Self::Memory => "memory",
        }
    }
}

impl fmt::Display for StorageEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
