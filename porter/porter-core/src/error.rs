//! Error types shared across the workspace.

/// A value accessor was called on the wrong [`Value`](crate::Value) variant.
#[derive(Debug, thiserror::Error)]
#[error("expected {expected} value, got {actual}")]
pub struct ValueTypeError {
    expected: String,
    actual: &'static str,
}

impl ValueTypeError {
    pub fn new(expected: impl Into<String>, actual: &'static str) -> Self {
        Self {
            expected: expected.into(),
            actual,
        }
    }
}

/// Error surfaced by a storage driver.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// I/O error while reading or writing backing media.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The named object does not exist on the storage.
    #[error("object '{name}' not found on storage '{storage}'")]
    NotFound { storage: String, name: String },

    /// The named object already exists and creation was required.
    #[error("object '{name}' already exists on storage '{storage}'")]
    AlreadyExists { storage: String, name: String },

    /// The storage does not implement the requested operation.
    #[error("storage '{storage}' does not support {operation}")]
    Unsupported {
        storage: String,
        operation: &'static str,
    },

    /// Backend-specific failure reported by the driver.
    #[error("{0}")]
    Backend(String),
}
