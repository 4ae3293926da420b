//! Copy request and outcome types.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use porter_cast::CastOptions;
use porter_core::{Conversion, DataFormat, Schema, Storage};

/// A named object on one concrete storage, optionally pinned to a format.
/// Without a declared format the source is sniffed and the destination
/// defaults to its engine's natural format.
#[derive(Clone)]
pub struct ObjectLocation {
    pub storage: Arc<dyn Storage>,
    pub name: String,
    pub format: Option<DataFormat>,
}

impl ObjectLocation {
    pub fn new(storage: Arc<dyn Storage>, name: impl Into<String>) -> Self {
        Self {
            storage,
            name: name.into(),
            format: None,
        }
    }

    pub fn with_format(mut self, format: DataFormat) -> Self {
        self.format = Some(format);
        self
    }
}

/// What to do when the destination object already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteDisposition {
    #[default]
    ErrorIfExists,
    Overwrite,
    Append,
}

/// One copy: a source object, a destination object, and the policies
/// applied on arrival. Constructed once, consumed once; immutable.
#[derive(Clone)]
pub struct CopyRequest {
    pub source: ObjectLocation,
    pub dest: ObjectLocation,
    pub schema: Option<Schema>,
    pub disposition: WriteDisposition,
    pub cast: CastOptions,
    pub cancel: CancelToken,
}

impl CopyRequest {
    pub fn new(source: ObjectLocation, dest: ObjectLocation) -> Self {
        Self {
            source,
            dest,
            schema: None,
            disposition: WriteDisposition::default(),
            cast: CastOptions::default(),
            cancel: CancelToken::new(),
        }
    }

    /// Schema to enforce on arrival.
    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn with_disposition(mut self, disposition: WriteDisposition) -> Self {
        self.disposition = disposition;
        self
    }

    pub fn with_cast_options(mut self, cast: CastOptions) -> Self {
        self.cast = cast;
        self
    }

    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }
}

/// Shared flag checked between hops; cancelling aborts an in-flight
/// multi-hop copy at the next hop boundary.
#[derive(Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Outcome of a completed copy: the conversions executed and what the
/// plan was priced at.
#[derive(Debug, Clone)]
pub struct CopyReport {
    pub conversions: Vec<Conversion>,
    pub total_cost: f64,
    pub expected_records: u64,
}
