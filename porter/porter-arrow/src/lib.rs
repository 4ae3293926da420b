//! Arrow conversion utilities for `porter` schemas and records.
//!
//! Converts the crate-internal IR (flat rows of scalar [`Value`]s) into
//! Arrow [`RecordBatch`]es for pretty-printed previews and columnar
//! export. Every column is nullable; cells that are not already the
//! column's native representation fail loudly rather than coerce —
//! coercion is the cast engine's job, before data gets here.

mod convert;
mod schema;

pub use convert::{columnar_to_record_batch, records_to_record_batch};
pub use schema::{field_type_to_arrow, schema_to_arrow};

use porter_core::FieldType;

/// A cell did not match its column's declared type.
#[derive(Debug, thiserror::Error)]
#[error("field '{field}': expected {expected} value, got {actual}")]
pub struct ArrowBridgeError {
    pub field: String,
    pub expected: FieldType,
    pub actual: &'static str,
}
