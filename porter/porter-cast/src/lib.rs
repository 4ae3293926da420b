//! Field-level type inference and casting for `porter`.
//!
//! Detection walks [`FieldType::ALL`](porter_core::FieldType::ALL) in
//! ascending cardinality-rank order; inference widens a sample to the
//! least common denominator that covers all observed values; casting
//! coerces values under a [`CastMode`] and an [`ErrorBehavior`].

mod apply;
mod cast;
mod detect;
mod error;
mod infer;

pub use apply::{CastErrorHook, CastOptions, ErrorBehavior, cast_field, cast_records};
pub use cast::{CastMode, cast_value};
pub use detect::{detect, is_definitely, is_maybe};
pub use error::{CastError, CastFieldError};
pub use infer::{InferenceOptions, infer_field_type, infer_schema};
