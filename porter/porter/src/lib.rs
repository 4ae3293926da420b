//! Cost-planned data copying between heterogeneous storages.
//!
//! Callers state *what* to copy — a named object on a source storage, a
//! destination storage, optionally a target format — and [`Porter`]
//! determines *how*: it builds the space of storage-formats reachable
//! from the available storages, picks the minimum-cost chain of
//! registered copiers, and executes it hop by hop.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use porter::{CopyRequest, MemoryStore, ObjectLocation, Porter};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let memory = Arc::new(MemoryStore::new("scratch"));
//! let porter = Porter::builder()
//!     .with_storage(memory.clone())
//!     .with_default_copiers()
//!     .with_default_handlers()
//!     .build()?;
//!
//! let request = CopyRequest::new(
//!     ObjectLocation::new(memory.clone(), "people"),
//!     ObjectLocation::new(memory, "people-columnar")
//!         .with_format(porter::DataFormat::Columnar),
//! );
//! let report = porter.copy(&request)?;
//! println!("copied in {} hops", report.conversions.len());
//! # Ok(())
//! # }
//! ```

mod codec;
mod copier;
mod error;
mod executor;
mod handler;
mod request;
mod storage;

use std::sync::Arc;

use porter_plan::{CopierRegistry, CopyPath, DEFAULT_EXPECTED_RECORDS, Planner};
use tracing::debug;

pub use porter_cast::{
    CastError, CastFieldError, CastMode, CastOptions, ErrorBehavior, InferenceOptions,
};
pub use porter_core::{
    ColumnarTable, Conversion, DataFormat, DatabaseStorage, FieldType, FilesystemStorage,
    MemoryStorage, ObjectRef, Record, Schema, SchemaField, Storage, StorageClass, StorageEngine,
    StorageError, StorageFormat, StoredObject, Value,
};
pub use porter_plan::{Capability, CopierCaps, Cost, CostComponent, PlanError, RegistryError};

pub use crate::copier::{
    ColumnarToRecords, Copier, CopyContext, CsvToRecords, HopRequest, JsonlToRecords,
    RecordsToColumnar, RecordsToCsv, RecordsToJsonl, RecordsToTable, TableToRecords,
    default_copiers,
};
pub use crate::error::{CopyError, HandlerError};
pub use crate::handler::{
    ColumnarHandler, DelimitedHandler, FormatHandler, HandlerRegistry, HandlerRegistryBuilder,
    JsonlHandler, RecordsHandler, TableHandler, default_handlers,
};
pub use crate::request::{
    CancelToken, CopyReport, CopyRequest, ObjectLocation, WriteDisposition,
};
pub use crate::storage::{LocalFs, MemoryStore};

/// A planned copy: the concrete copier chain the executor will walk.
pub type Plan = CopyPath<dyn Copier>;

/// The copy engine: frozen copier and handler registries plus the
/// storages every request may stage intermediates on.
pub struct Porter {
    copiers: CopierRegistry<dyn Copier>,
    handlers: HandlerRegistry,
    storages: Vec<Arc<dyn Storage>>,
    formats: Vec<DataFormat>,
}

/// Builder for [`Porter`]. Registration happens here, once; the built
/// engine is immutable and shareable across threads.
pub struct PorterBuilder {
    storages: Vec<Arc<dyn Storage>>,
    copiers: Vec<Arc<dyn Copier>>,
    handlers: Vec<Arc<dyn FormatHandler>>,
    formats: Vec<DataFormat>,
}

impl PorterBuilder {
    /// Make a storage available for staging intermediate objects.
    pub fn with_storage(mut self, storage: Arc<dyn Storage>) -> Self {
        self.storages.push(storage);
        self
    }

    pub fn with_copier(mut self, copier: Arc<dyn Copier>) -> Self {
        self.copiers.push(copier);
        self
    }

    pub fn with_handler(mut self, handler: Arc<dyn FormatHandler>) -> Self {
        self.handlers.push(handler);
        self
    }

    /// Register all built-in copiers.
    pub fn with_default_copiers(mut self) -> Self {
        self.copiers.extend(copier::default_copiers());
        self
    }

    /// Register all built-in format handlers.
    pub fn with_default_handlers(mut self) -> Self {
        self.handlers.extend(handler::default_handlers());
        self
    }

    /// Restrict the data formats the planner may route through.
    pub fn with_formats(mut self, formats: Vec<DataFormat>) -> Self {
        self.formats = formats;
        self
    }

    pub fn build(self) -> Result<Porter, RegistryError> {
        let mut copiers = CopierRegistry::builder();
        for copier in self.copiers {
            copiers = copiers.register(copier)?;
        }
        let mut handlers = HandlerRegistry::builder();
        for handler in self.handlers {
            handlers = handlers.register(handler);
        }
        Ok(Porter {
            copiers: copiers.build(),
            handlers: handlers.build(),
            storages: self.storages,
            formats: self.formats,
        })
    }
}

impl Porter {
    pub fn builder() -> PorterBuilder {
        PorterBuilder {
            storages: Vec::new(),
            copiers: Vec::new(),
            handlers: Vec::new(),
            formats: vec![
                DataFormat::Records,
                DataFormat::Columnar,
                DataFormat::Csv,
                DataFormat::Jsonl,
                DataFormat::Table,
                DataFormat::Cursor,
            ],
        }
    }

    pub fn handlers(&self) -> &HandlerRegistry {
        &self.handlers
    }

    /// Plan the request without executing it.
    pub fn plan(&self, request: &CopyRequest) -> Result<Plan, CopyError> {
        let source_format = self.resolve_source_format(request)?;
        let dest_format = request
            .dest
            .format
            .unwrap_or_else(|| request.dest.storage.engine().natural_format());
        let conversion = Conversion::new(
            StorageFormat::new(request.source.storage.engine(), source_format),
            StorageFormat::new(request.dest.storage.engine(), dest_format),
        );

        let available = self.available_storages(request);
        let engines = dedup_engines(&available);
        let expected = self.expected_records(request, source_format);
        debug!(%conversion, expected, "planning copy");

        let planner = Planner::new(&self.copiers);
        Ok(planner.plan(conversion, &engines, &self.formats, expected)?)
    }

    /// Plan and execute the request.
    pub fn copy(&self, request: &CopyRequest) -> Result<CopyReport, CopyError> {
        let path = self.plan(request)?;
        let available = self.available_storages(request);
        executor::execute(request, &path, &available, &self.handlers)?;
        Ok(CopyReport {
            conversions: path.conversions().copied().collect(),
            total_cost: path.total_cost(),
            expected_records: path.expected_records,
        })
    }

    /// Declared format, else sniffed through the handlers, else the
    /// source engine's natural format.
    fn resolve_source_format(&self, request: &CopyRequest) -> Result<DataFormat, CopyError> {
        if let Some(format) = request.source.format {
            return Ok(format);
        }
        let object = ObjectRef::new(request.source.storage.as_ref(), &request.source.name);
        Ok(self
            .handlers
            .sniff(object)?
            .unwrap_or_else(|| request.source.storage.engine().natural_format()))
    }

    /// Price the plan with the source's actual record count when a
    /// handler can provide one cheaply.
    fn expected_records(&self, request: &CopyRequest, source_format: DataFormat) -> u64 {
        let object = ObjectRef::new(request.source.storage.as_ref(), &request.source.name);
        self.handlers
            .resolve(source_format, request.source.storage.engine())
            .ok()
            .and_then(|handler| handler.record_count(object).ok())
            .unwrap_or(DEFAULT_EXPECTED_RECORDS)
    }

    /// The engine's staging storages plus the request's own endpoints.
    fn available_storages(&self, request: &CopyRequest) -> Vec<Arc<dyn Storage>> {
        let mut available = self.storages.clone();
        for endpoint in [&request.source.storage, &request.dest.storage] {
            if !available.iter().any(|s| Arc::ptr_eq(s, endpoint)) {
                available.push(Arc::clone(endpoint));
            }
        }
        available
    }
}

fn dedup_engines(storages: &[Arc<dyn Storage>]) -> Vec<StorageEngine> {
    let mut engines = Vec::new();
    for storage in storages {
        if !engines.contains(&storage.engine()) {
            engines.push(storage.engine());
        }
    }
    engines
}
