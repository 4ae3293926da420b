//! Schema-wide casting over record sets, governed by [`ErrorBehavior`].

use std::sync::Arc;

use porter_core::{Record, Schema, SchemaField, Value};

use crate::cast::{CastMode, cast_value};
use crate::error::CastFieldError;
use crate::infer::{InferenceOptions, infer_field_type};

/// Policy applied when a value cannot be cast to its declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorBehavior {
    /// Abort the whole cast and propagate the failure.
    #[default]
    Fail,
    /// Widen the field's declared type to one inferred from the actual
    /// values, then recast the field.
    RelaxType,
    /// Replace the offending value with null and continue.
    SetNull,
}

/// Observer invoked with every cast failure before the error behavior is
/// applied. An extension point for diagnostics; it cannot alter the
/// outcome.
pub type CastErrorHook = Arc<dyn Fn(&CastFieldError) + Send + Sync>;

/// Options threaded through every schema-cast operation.
#[derive(Clone, Default)]
pub struct CastOptions {
    pub mode: CastMode,
    pub behavior: ErrorBehavior,
    pub inference: InferenceOptions,
    pub on_error: Option<CastErrorHook>,
}

impl CastOptions {
    pub fn with_mode(mut self, mode: CastMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_behavior(mut self, behavior: ErrorBehavior) -> Self {
        self.behavior = behavior;
        self
    }

    pub fn with_error_hook(mut self, hook: CastErrorHook) -> Self {
        self.on_error = Some(hook);
        self
    }

    fn report(&self, error: &CastFieldError) {
        if let Some(hook) = &self.on_error {
            hook(error);
        }
    }
}

impl std::fmt::Debug for CastOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CastOptions")
            .field("mode", &self.mode)
            .field("behavior", &self.behavior)
            .field("inference", &self.inference)
            .field("on_error", &self.on_error.as_ref().map(|_| ".."))
            .finish()
    }
}

/// Cast one field across all records, in place.
pub fn cast_field(
    records: &mut [Record],
    field: &SchemaField,
    options: &CastOptions,
) -> Result<(), CastFieldError> {
    for record in records.iter_mut() {
        let current = record.get(&field.name).cloned().unwrap_or(Value::Null);
        match cast_value(&current, field.field_type, options.mode, &options.inference) {
            Ok(value) => record.set(&field.name, value),
            Err(error) => {
                let error = CastFieldError::new(field.name.as_ref(), error);
                options.report(&error);
                match options.behavior {
                    ErrorBehavior::Fail | ErrorBehavior::RelaxType => return Err(error),
                    ErrorBehavior::SetNull => record.set(&field.name, Value::Null),
                }
            }
        }
    }
    Ok(())
}

/// Apply a schema cast over every field of every record, honoring the
/// configured [`ErrorBehavior`]. Returns the effective schema, which
/// differs from the requested one only when `RelaxType` widened a field.
///
/// `Fail` short-circuits on the first unrecoverable failure.
pub fn cast_records(
    records: &mut [Record],
    schema: &Schema,
    options: &CastOptions,
) -> Result<Schema, CastFieldError> {
    let mut effective = Vec::with_capacity(schema.len());
    for field in schema.iter() {
        match cast_field(records, field, options) {
            Ok(()) => effective.push(field.clone()),
            Err(error) => {
                if options.behavior != ErrorBehavior::RelaxType {
                    return Err(error);
                }
                let relaxed = relax_field(records, field, options)?;
                effective.push(relaxed);
            }
        }
    }
    Ok(Schema::new(effective))
}

/// Re-infer the field's type from the values actually present, then
/// recast. The inferred type covers every observed value, so the recast
/// only fails for strict-mode casts; that failure propagates.
fn relax_field(
    records: &mut [Record],
    field: &SchemaField,
    options: &CastOptions,
) -> Result<SchemaField, CastFieldError> {
    let values: Vec<&Value> = records.iter().filter_map(|r| r.get(&field.name)).collect();
    let widened = infer_field_type(&values, &options.inference);
    let relaxed = SchemaField::new(field.name.as_ref(), widened);
    let inner = CastOptions {
        behavior: ErrorBehavior::Fail,
        on_error: None,
        ..options.clone()
    };
    cast_field(records, &relaxed, &inner)?;
    Ok(relaxed)
}
