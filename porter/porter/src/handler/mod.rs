//! Per-(format, engine) handlers for format inference, schema casting,
//! and empty-object creation, plus the frozen registry that resolves
//! them.

mod columnar;
mod delimited;
mod jsonl;
mod records;
mod table;

use std::collections::HashMap;
use std::sync::Arc;

use porter_cast::CastOptions;
use porter_core::{
    DataFormat, FieldType, ObjectRef, Schema, SchemaField, Storage, StorageClass, StorageEngine,
};

pub use columnar::ColumnarHandler;
pub use delimited::DelimitedHandler;
pub use jsonl::JsonlHandler;
pub use records::RecordsHandler;
pub use table::TableHandler;

use crate::error::{CopyError, HandlerError};
use crate::request::WriteDisposition;

/// Format-specific operations over stored objects.
///
/// A handler declares the one format it understands and the engines (or
/// whole classes) it can reach that format on. Engine-specific handlers
/// win resolution over class-generic ones.
pub trait FormatHandler: Send + Sync {
    fn data_format(&self) -> DataFormat;

    /// Engines this handler explicitly supports; `None` means it covers
    /// every engine of its supported classes.
    fn engines(&self) -> Option<&[StorageEngine]> {
        None
    }

    fn classes(&self) -> &[StorageClass];

    /// Sniff whether the stored object is plausibly this format. Used
    /// when the caller declares no source format.
    fn infer_format(&self, object: ObjectRef<'_>) -> Result<Option<DataFormat>, CopyError>;

    fn field_names(&self, object: ObjectRef<'_>) -> Result<Vec<String>, CopyError>;

    fn infer_field_type(&self, object: ObjectRef<'_>, field: &str)
    -> Result<FieldType, CopyError>;

    /// Coerce one field of the object, in place.
    fn cast_field(
        &self,
        object: ObjectRef<'_>,
        field: &SchemaField,
        options: &CastOptions,
    ) -> Result<(), CopyError>;

    /// Apply `cast_field` over every schema field, short-circuiting on
    /// the first unrecoverable failure. Returns the effective schema
    /// (differs from the requested one only under type relaxation).
    fn cast_schema(
        &self,
        object: ObjectRef<'_>,
        schema: &Schema,
        options: &CastOptions,
    ) -> Result<Schema, CopyError>;

    /// Materialize a zero-record object conforming to `schema`. Fails
    /// with [`CopyError::ObjectExists`] when the object exists and the
    /// disposition is `ErrorIfExists`.
    fn create_empty(
        &self,
        object: ObjectRef<'_>,
        schema: &Schema,
        disposition: WriteDisposition,
    ) -> Result<(), CopyError>;

    fn record_count(&self, object: ObjectRef<'_>) -> Result<u64, CopyError>;
}

/// Builder for [`HandlerRegistry`]. Later registrations supersede
/// earlier ones, so user handlers can override built-ins.
pub struct HandlerRegistryBuilder {
    handlers: Vec<Arc<dyn FormatHandler>>,
}

impl HandlerRegistryBuilder {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    pub fn register(mut self, handler: Arc<dyn FormatHandler>) -> Self {
        self.handlers.push(handler);
        self
    }

    /// Freeze into the two-level lookup the resolver uses.
    pub fn build(self) -> HandlerRegistry {
        let mut by_engine = HashMap::new();
        let mut by_class = HashMap::new();
        for handler in &self.handlers {
            let format = handler.data_format();
            match handler.engines() {
                Some(engines) => {
                    for engine in engines {
                        by_engine.insert((format, *engine), Arc::clone(handler));
                    }
                }
                None => {
                    for class in handler.classes() {
                        by_class.insert((format, *class), Arc::clone(handler));
                    }
                }
            }
        }
        HandlerRegistry {
            ordered: self.handlers,
            by_engine,
            by_class,
        }
    }
}

impl Default for HandlerRegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Frozen handler lookup: engine-specific beats class-generic; among
/// equally specific candidates the most recently registered wins.
pub struct HandlerRegistry {
    ordered: Vec<Arc<dyn FormatHandler>>,
    by_engine: HashMap<(DataFormat, StorageEngine), Arc<dyn FormatHandler>>,
    by_class: HashMap<(DataFormat, StorageClass), Arc<dyn FormatHandler>>,
}

impl HandlerRegistry {
    pub fn builder() -> HandlerRegistryBuilder {
        HandlerRegistryBuilder::new()
    }

    pub fn resolve(
        &self,
        format: DataFormat,
        engine: StorageEngine,
    ) -> Result<Arc<dyn FormatHandler>, HandlerError> {
        self.by_engine
            .get(&(format, engine))
            .or_else(|| self.by_class.get(&(format, engine.class())))
            .cloned()
            .ok_or(HandlerError { format, engine })
    }

    /// Ask each registered handler, in registration order, whether the
    /// object is plausibly its format.
    pub fn sniff(&self, object: ObjectRef<'_>) -> Result<Option<DataFormat>, CopyError> {
        let engine = object.storage.engine();
        for handler in &self.ordered {
            let covers = match handler.engines() {
                Some(engines) => engines.contains(&engine),
                None => handler.classes().contains(&engine.class()),
            };
            if !covers {
                continue;
            }
            if let Some(format) = handler.infer_format(object)? {
                return Ok(Some(format));
            }
        }
        Ok(None)
    }
}

/// All built-in handlers, in default precedence order.
pub fn default_handlers() -> Vec<Arc<dyn FormatHandler>> {
    vec![
        Arc::new(RecordsHandler),
        Arc::new(ColumnarHandler),
        Arc::new(DelimitedHandler),
        Arc::new(JsonlHandler),
        Arc::new(TableHandler),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Probe {
        format: DataFormat,
        engines: Option<Vec<StorageEngine>>,
        classes: Vec<StorageClass>,
        tag: &'static str,
    }

    impl FormatHandler for Probe {
        fn data_format(&self) -> DataFormat {
            self.format
        }

        fn engines(&self) -> Option<&[StorageEngine]> {
            self.engines.as_deref()
        }

        fn classes(&self) -> &[StorageClass] {
            &self.classes
        }

        fn infer_format(&self, _: ObjectRef<'_>) -> Result<Option<DataFormat>, CopyError> {
            Ok(None)
        }

        fn field_names(&self, _: ObjectRef<'_>) -> Result<Vec<String>, CopyError> {
            Ok(vec![self.tag.to_string()])
        }

        fn infer_field_type(
            &self,
            _: ObjectRef<'_>,
            _: &str,
        ) -> Result<FieldType, CopyError> {
            Ok(FieldType::Text)
        }

        fn cast_field(
            &self,
            _: ObjectRef<'_>,
            _: &SchemaField,
            _: &CastOptions,
        ) -> Result<(), CopyError> {
            Ok(())
        }

        fn cast_schema(
            &self,
            _: ObjectRef<'_>,
            schema: &Schema,
            _: &CastOptions,
        ) -> Result<Schema, CopyError> {
            Ok(schema.clone())
        }

        fn create_empty(
            &self,
            _: ObjectRef<'_>,
            _: &Schema,
            _: WriteDisposition,
        ) -> Result<(), CopyError> {
            Ok(())
        }

        fn record_count(&self, _: ObjectRef<'_>) -> Result<u64, CopyError> {
            Ok(0)
        }
    }

    fn probe(
        engines: Option<Vec<StorageEngine>>,
        classes: Vec<StorageClass>,
        tag: &'static str,
    ) -> Arc<dyn FormatHandler> {
        Arc::new(Probe {
            format: DataFormat::Table,
            engines,
            classes,
            tag,
        })
    }

    fn tag_of(handler: &Arc<dyn FormatHandler>) -> String {
        let store = crate::storage::MemoryStore::new("probe");
        handler
            .field_names(ObjectRef::new(&store, "x"))
            .unwrap()
            .remove(0)
    }

    #[test]
    fn engine_specific_beats_class_generic() {
        let registry = HandlerRegistry::builder()
            .register(probe(
                Some(vec![StorageEngine::Sqlite]),
                vec![],
                "engine-specific",
            ))
            .register(probe(None, vec![StorageClass::Database], "class-generic"))
            .build();

        let resolved = registry
            .resolve(DataFormat::Table, StorageEngine::Sqlite)
            .unwrap();
        assert_eq!(tag_of(&resolved), "engine-specific");

        let fallback = registry
            .resolve(DataFormat::Table, StorageEngine::Postgres)
            .unwrap();
        assert_eq!(tag_of(&fallback), "class-generic");
    }

    #[test]
    fn later_registration_supersedes_earlier() {
        let registry = HandlerRegistry::builder()
            .register(probe(None, vec![StorageClass::Database], "builtin"))
            .register(probe(None, vec![StorageClass::Database], "override"))
            .build();
        let resolved = registry
            .resolve(DataFormat::Table, StorageEngine::Mysql)
            .unwrap();
        assert_eq!(tag_of(&resolved), "override");
    }

    #[test]
    fn missing_handler_is_a_fatal_config_error() {
        let registry = HandlerRegistry::builder().build();
        let err = registry
            .resolve(DataFormat::Csv, StorageEngine::LocalFs)
            .err()
            .expect("empty registry cannot resolve anything");
        assert_eq!(err.format, DataFormat::Csv);
        assert_eq!(err.engine, StorageEngine::LocalFs);
        assert!(err.to_string().contains("csv"));
        assert!(err.to_string().contains("local-fs"));
    }
}
