//! Error types for the cast engine.

use porter_core::{FieldType, Value};

/// A value could not be coerced into its target type.
#[derive(Debug, Clone, thiserror::Error)]
#[error("cannot cast {value:?} to {target}{detail}")]
pub struct CastError {
    pub value: String,
    pub target: FieldType,
    detail: &'static str,
}

impl CastError {
    pub(crate) fn strict(value: &Value, target: FieldType) -> Self {
        Self {
            value: value.to_string(),
            target,
            detail: " (strict mode: value is not the native representation)",
        }
    }

    pub(crate) fn lenient(value: &Value, target: FieldType) -> Self {
        Self {
            value: value.to_string(),
            target,
            detail: "",
        }
    }
}

/// A [`CastError`] annotated with the schema field it occurred in.
#[derive(Debug, Clone, thiserror::Error)]
#[error("field '{field}': {source}")]
pub struct CastFieldError {
    pub field: String,
    #[source]
    pub source: CastError,
}

impl CastFieldError {
    pub fn new(field: impl Into<String>, source: CastError) -> Self {
        Self {
            field: field.into(),
            source,
        }
    }
}
