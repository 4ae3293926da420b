//! Narrow per-class driver contracts the planning/execution core depends
//! on. Concrete backends implement exactly one class trait; the core
//! never names a specific backend.

use std::io::{Read, Write};

use crate::{
    error::StorageError,
    record::{Record, StoredObject},
    schema::Schema,
    storage::StorageEngine,
};

/// Object-safe base implemented by every storage instance.
pub trait Storage: Send + Sync {
    /// Human-readable instance label used in error messages.
    fn label(&self) -> &str;

    fn engine(&self) -> StorageEngine;

    fn as_database(&self) -> Option<&dyn DatabaseStorage> {
        None
    }

    fn as_filesystem(&self) -> Option<&dyn FilesystemStorage> {
        None
    }

    fn as_memory(&self) -> Option<&dyn MemoryStorage> {
        None
    }
}

/// Driver contract for [`StorageClass::Database`](crate::StorageClass::Database) engines.
pub trait DatabaseStorage: Storage {
    fn execute(&self, sql: &str) -> Result<(), StorageError>;

    fn execute_returning_rows(&self, sql: &str) -> Result<Vec<Record>, StorageError>;

    fn bulk_insert(
        &self,
        table: &str,
        rows: &[Record],
        schema: &Schema,
    ) -> Result<(), StorageError>;

    fn table_exists(&self, table: &str) -> Result<bool, StorageError>;

    fn create_table(&self, table: &str, schema: &Schema) -> Result<(), StorageError>;

    fn drop_table(&self, table: &str) -> Result<(), StorageError>;

    /// Declared column schema of an existing table.
    fn table_schema(&self, table: &str) -> Result<Schema, StorageError>;

    fn row_count(&self, table: &str) -> Result<u64, StorageError>;
}

/// Driver contract for [`StorageClass::Filesystem`](crate::StorageClass::Filesystem) engines.
pub trait FilesystemStorage: Storage {
    fn open_read(&self, name: &str) -> Result<Box<dyn Read + Send>, StorageError>;

    /// Create `name` for writing. Refuses an existing object unless
    /// `overwrite` is set.
    fn create(&self, name: &str, overwrite: bool) -> Result<Box<dyn Write + Send>, StorageError>;

    fn exists(&self, name: &str) -> Result<bool, StorageError>;

    fn remove(&self, name: &str) -> Result<(), StorageError>;
}

/// Driver contract for [`StorageClass::Memory`](crate::StorageClass::Memory) engines.
pub trait MemoryStorage: Storage {
    fn get(&self, name: &str) -> Option<StoredObject>;

    fn put(&self, name: &str, object: StoredObject);

    fn exists(&self, name: &str) -> bool;

    fn remove(&self, name: &str) -> bool;
}

/// A named object on a concrete storage, as handed to format handlers.
#[derive(Clone, Copy)]
pub struct ObjectRef<'a> {
    pub storage: &'a dyn Storage,
    pub name: &'a str,
}

impl<'a> ObjectRef<'a> {
    pub fn new(storage: &'a dyn Storage, name: &'a str) -> Self {
        Self { storage, name }
    }
}
