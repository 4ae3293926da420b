//! Backend-agnostic core types and driver contracts for `porter`.
//!
//! This crate provides the storage/format identity model
//! ([`StorageFormat`] / [`Conversion`]), the intermediate value
//! representation ([`Value`] / [`Record`]), and the narrow per-class
//! storage driver traits everything else is written against.

mod driver;
mod error;
mod field_type;
mod format;
mod record;
mod schema;
mod storage;
mod value;

pub use driver::{DatabaseStorage, FilesystemStorage, MemoryStorage, ObjectRef, Storage};
pub use error::{StorageError, ValueTypeError};
pub use field_type::FieldType;
pub use format::{Conversion, DataFormat, StorageFormat};
pub use record::{ColumnarTable, Record, StoredObject};
pub use schema::{Schema, SchemaField};
pub use storage::{StorageClass, StorageEngine};
pub use value::Value;
