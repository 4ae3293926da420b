//! Test doubles shared by the integration suites.

use std::collections::HashMap;
use std::sync::RwLock;

use porter::{
    DatabaseStorage, Record, Schema, Storage, StorageEngine, StorageError,
};

/// In-memory stand-in for a SQL backend, implementing the narrow driver
/// contract the copy core is written against. Understands exactly the
/// statements the built-in copiers emit.
pub struct FakeDatabase {
    label: String,
    engine: StorageEngine,
    tables: RwLock<HashMap<String, (Schema, Vec<Record>)>>,
}

impl FakeDatabase {
    pub fn new(label: impl Into<String>, engine: StorageEngine) -> Self {
        Self {
            label: label.into(),
            engine,
            tables: RwLock::new(HashMap::new()),
        }
    }

    pub fn insert_table(&self, name: &str, schema: Schema, rows: Vec<Record>) {
        self.tables
            .write()
            .expect("fake database lock poisoned")
            .insert(name.to_string(), (schema, rows));
    }

    pub fn rows(&self, name: &str) -> Option<Vec<Record>> {
        self.tables
            .read()
            .expect("fake database lock poisoned")
            .get(name)
            .map(|(_, rows)| rows.clone())
    }
}

impl Storage for FakeDatabase {
    fn label(&self) -> &str {
        &self.label
    }

    fn engine(&self) -> StorageEngine {
        self.engine
    }

    fn as_database(&self) -> Option<&dyn DatabaseStorage> {
        Some(self)
    }
}

impl DatabaseStorage for FakeDatabase {
    fn execute(&self, _sql: &str) -> Result<(), StorageError> {
        Ok(())
    }

    fn execute_returning_rows(&self, sql: &str) -> Result<Vec<Record>, StorageError> {
        let table = sql
            .strip_prefix("SELECT * FROM \"")
            .and_then(|rest| rest.strip_suffix('"'))
            .ok_or_else(|| StorageError::Backend(format!("unsupported statement: {sql}")))?;
        self.rows(table)
            .ok_or_else(|| StorageError::Backend(format!("no such table: {table}")))
    }

    fn bulk_insert(
        &self,
        table: &str,
        rows: &[Record],
        _schema: &Schema,
    ) -> Result<(), StorageError> {
        let mut tables = self.tables.write().expect("fake database lock poisoned");
        let entry = tables
            .get_mut(table)
            .ok_or_else(|| StorageError::Backend(format!("no such table: {table}")))?;
        entry.1.extend(rows.iter().cloned());
        Ok(())
    }

    fn table_exists(&self, table: &str) -> Result<bool, StorageError> {
        Ok(self
            .tables
            .read()
            .expect("fake database lock poisoned")
            .contains_key(table))
    }

    fn create_table(&self, table: &str, schema: &Schema) -> Result<(), StorageError> {
        let mut tables = self.tables.write().expect("fake database lock poisoned");
        if tables.contains_key(table) {
            return Err(StorageError::AlreadyExists {
                storage: self.label.clone(),
                name: table.to_string(),
            });
        }
        tables.insert(table.to_string(), (schema.clone(), Vec::new()));
        Ok(())
    }

    fn drop_table(&self, table: &str) -> Result<(), StorageError> {
        self.tables
            .write()
            .expect("fake database lock poisoned")
            .remove(table)
            .map(|_| ())
            .ok_or_else(|| StorageError::NotFound {
                storage: self.label.clone(),
                name: table.to_string(),
            })
    }

    fn table_schema(&self, table: &str) -> Result<Schema, StorageError> {
        self.tables
            .read()
            .expect("fake database lock poisoned")
            .get(table)
            .map(|(schema, _)| schema.clone())
            .ok_or_else(|| StorageError::NotFound {
                storage: self.label.clone(),
                name: table.to_string(),
            })
    }

    fn row_count(&self, table: &str) -> Result<u64, StorageError> {
        self.tables
            .read()
            .expect("fake database lock poisoned")
            .get(table)
            .map(|(_, rows)| rows.len() as u64)
            .ok_or_else(|| StorageError::NotFound {
                storage: self.label.clone(),
                name: table.to_string(),
            })
    }
}
