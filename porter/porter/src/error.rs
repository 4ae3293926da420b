//! Error types for copy planning and execution.

use porter_cast::CastFieldError;
use porter_core::{DataFormat, StorageEngine, StorageError};
use porter_plan::PlanError;

/// No format handler is registered for a (format, engine) pair. A
/// configuration defect: the operation aborts immediately.
#[derive(Debug, thiserror::Error)]
#[error("no format handler registered for format '{format}' on engine '{engine}'")]
pub struct HandlerError {
    pub format: DataFormat,
    pub engine: StorageEngine,
}

/// Errors produced by [`Porter::copy`](crate::Porter::copy).
#[derive(Debug, thiserror::Error)]
pub enum CopyError {
    /// No route between the requested storage-formats.
    #[error(transparent)]
    Plan(#[from] PlanError),

    /// Handler resolution failed; see [`HandlerError`].
    #[error(transparent)]
    Handler(#[from] HandlerError),

    /// Driver-level storage failure.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// A field value could not be coerced to its target type.
    #[error(transparent)]
    Cast(#[from] CastFieldError),

    /// The source object to read does not exist.
    #[error("source object '{name}' does not exist on storage '{storage}'")]
    NoSuchObject { storage: String, name: String },

    /// The destination object exists and the request forbids overwriting.
    #[error("destination object '{name}' already exists on storage '{storage}'")]
    ObjectExists { storage: String, name: String },

    /// The stored object is not shaped the way the handler expects.
    #[error("object '{name}' on storage '{storage}' is {actual}, expected {expected}")]
    UnexpectedShape {
        storage: String,
        name: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// The copy was cancelled between hops.
    #[error("copy cancelled before hop {hop}")]
    Cancelled { hop: usize },

    /// The planner produced a path the executor cannot realize. Always a
    /// defect, never a recoverable condition.
    #[error("planning inconsistency: {detail}")]
    Internal { detail: String },
}
