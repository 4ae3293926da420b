//! Copier capability declarations and the frozen registry the planner
//! matches against.

use std::sync::Arc;

use porter_core::{Conversion, DataFormat, StorageClass, StorageEngine, StorageFormat};

use crate::cost::Cost;

/// Allow-lists constraining the storage-format pairs a copier bridges.
/// An absent list matches anything on that attribute; a present list
/// matches only its members.
#[derive(Debug, Clone, Default)]
pub struct CopierCaps {
    pub from_classes: Option<Vec<StorageClass>>,
    pub from_engines: Option<Vec<StorageEngine>>,
    pub from_formats: Option<Vec<DataFormat>>,
    pub to_classes: Option<Vec<StorageClass>>,
    pub to_engines: Option<Vec<StorageEngine>>,
    pub to_formats: Option<Vec<DataFormat>>,
}

fn push<T>(list: &mut Option<Vec<T>>, value: T) {
    list.get_or_insert_with(Vec::new).push(value);
}

fn allows<T: PartialEq>(list: &Option<Vec<T>>, value: &T) -> bool {
    list.as_ref().is_none_or(|items| items.contains(value))
}

impl CopierCaps {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_class(mut self, class: StorageClass) -> Self {
        push(&mut self.from_classes, class);
        self
    }

    pub fn from_engine(mut self, engine: StorageEngine) -> Self {
        push(&mut self.from_engines, engine);
        self
    }

    pub fn from_format(mut self, format: DataFormat) -> Self {
        push(&mut self.from_formats, format);
        self
    }

    pub fn to_class(mut self, class: StorageClass) -> Self {
        push(&mut self.to_classes, class);
        self
    }

    pub fn to_engine(mut self, engine: StorageEngine) -> Self {
        push(&mut self.to_engines, engine);
        self
    }

    pub fn to_format(mut self, format: DataFormat) -> Self {
        push(&mut self.to_formats, format);
        self
    }

    /// A side matches iff every present list contains the candidate's
    /// corresponding attribute.
    pub fn accepts_from(&self, sf: StorageFormat) -> bool {
        allows(&self.from_classes, &sf.engine.class())
            && allows(&self.from_engines, &sf.engine)
            && allows(&self.from_formats, &sf.format)
    }

    pub fn accepts_to(&self, sf: StorageFormat) -> bool {
        allows(&self.to_classes, &sf.engine.class())
            && allows(&self.to_engines, &sf.engine)
            && allows(&self.to_formats, &sf.format)
    }

    pub fn accepts(&self, conversion: &Conversion) -> bool {
        self.accepts_from(conversion.from) && self.accepts_to(conversion.to)
    }

    /// True when neither side constrains storage class or engine at all —
    /// such a copier would match every storage pair in the graph.
    fn storage_unconstrained(&self) -> bool {
        self.from_classes.is_none()
            && self.from_engines.is_none()
            && self.to_classes.is_none()
            && self.to_engines.is_none()
    }
}

/// Declarative surface of a copier: what it bridges and what that costs.
/// The executable side lives with the implementations; the planner only
/// needs this.
pub trait Capability: Send + Sync {
    fn name(&self) -> &'static str;

    fn cost(&self) -> Cost;

    fn caps(&self) -> &CopierCaps;
}

/// A capability plus its registration sequence number. The sequence is
/// the deterministic tie-break between equal-cost copiers.
pub struct RegisteredCopier<C: ?Sized> {
    pub seq: usize,
    pub copier: Arc<C>,
}

impl<C: ?Sized> Clone for RegisteredCopier<C> {
    fn clone(&self) -> Self {
        Self {
            seq: self.seq,
            copier: Arc::clone(&self.copier),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// The copier constrains neither side's storage class or engine and
    /// would match every pair of storages.
    #[error("copier '{name}' declares no storage constraints on either side")]
    Unconstrained { name: String },
}

/// Builder for [`CopierRegistry`]. Capabilities are declared once at
/// startup; `build` freezes the set before any planning happens.
pub struct CopierRegistryBuilder<C: ?Sized> {
    entries: Vec<Arc<C>>,
}

impl<C: ?Sized + Capability> CopierRegistryBuilder<C> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn register(mut self, copier: Arc<C>) -> Result<Self, RegistryError> {
        if copier.caps().storage_unconstrained() {
            return Err(RegistryError::Unconstrained {
                name: copier.name().to_string(),
            });
        }
        self.entries.push(copier);
        Ok(self)
    }

    pub fn build(self) -> CopierRegistry<C> {
        CopierRegistry {
            entries: self
                .entries
                .into_iter()
                .enumerate()
                .map(|(seq, copier)| RegisteredCopier { seq, copier })
                .collect(),
        }
    }
}

impl<C: ?Sized + Capability> Default for CopierRegistryBuilder<C> {
    fn default() -> Self {
        Self::new()
    }
}

/// Immutable set of registered copiers. Lookups are read-only and
/// shareable across concurrent copy requests.
pub struct CopierRegistry<C: ?Sized> {
    entries: Vec<RegisteredCopier<C>>,
}

impl<C: ?Sized + Capability> CopierRegistry<C> {
    pub fn builder() -> CopierRegistryBuilder<C> {
        CopierRegistryBuilder::new()
    }

    /// Every registered copier whose predicates accept both sides of the
    /// conversion, in registration order.
    pub fn matching(&self, conversion: &Conversion) -> Vec<RegisteredCopier<C>> {
        self.entries
            .iter()
            .filter(|entry| entry.copier.caps().accepts(conversion))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegisteredCopier<C>> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Stub {
        name: &'static str,
        caps: CopierCaps,
    }

    impl Capability for Stub {
        fn name(&self) -> &'static str {
            self.name
        }

        fn cost(&self) -> Cost {
            Cost::buffer_to_buffer()
        }

        fn caps(&self) -> &CopierCaps {
            &self.caps
        }
    }

    fn sf(engine: StorageEngine, format: DataFormat) -> StorageFormat {
        StorageFormat::new(engine, format)
    }

    #[test]
    fn absent_lists_match_anything() {
        let caps = CopierCaps::new().from_class(StorageClass::Memory);
        assert!(caps.accepts_to(sf(StorageEngine::Postgres, DataFormat::Table)));
        assert!(caps.accepts_to(sf(StorageEngine::LocalFs, DataFormat::Csv)));
    }

    #[test]
    fn engine_list_rejects_other_engines_regardless_of_format() {
        let caps = CopierCaps::new()
            .from_class(StorageClass::Memory)
            .to_engine(StorageEngine::Sqlite);
        for format in [DataFormat::Table, DataFormat::Cursor] {
            assert!(caps.accepts_to(sf(StorageEngine::Sqlite, format)));
            assert!(!caps.accepts_to(sf(StorageEngine::Postgres, format)));
        }
    }

    #[test]
    fn format_list_narrows_an_engine_match() {
        let caps = CopierCaps::new()
            .from_class(StorageClass::Memory)
            .to_engine(StorageEngine::Sqlite)
            .to_format(DataFormat::Table);
        assert!(caps.accepts_to(sf(StorageEngine::Sqlite, DataFormat::Table)));
        assert!(!caps.accepts_to(sf(StorageEngine::Sqlite, DataFormat::Cursor)));
    }

    #[test]
    fn unconstrained_copier_is_rejected_at_registration() {
        let copier = Arc::new(Stub {
            name: "match-everything",
            caps: CopierCaps::new().from_format(DataFormat::Records),
        });
        let err = CopierRegistry::builder()
            .register(copier)
            .err()
            .expect("unconstrained copier must be rejected");
        assert!(err.to_string().contains("match-everything"));
    }

    #[test]
    fn matching_returns_registration_order() {
        let caps = || {
            CopierCaps::new()
                .from_class(StorageClass::Memory)
                .to_class(StorageClass::Memory)
        };
        let registry = CopierRegistry::builder()
            .register(Arc::new(Stub {
                name: "first",
                caps: caps(),
            }))
            .unwrap()
            .register(Arc::new(Stub {
                name: "second",
                caps: caps(),
            }))
            .unwrap()
            .build();
        let conversion = Conversion::new(
            sf(StorageEngine::Memory, DataFormat::Records),
            sf(StorageEngine::Memory, DataFormat::Columnar),
        );
        let matches = registry.matching(&conversion);
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].copier.name(), "first");
        assert_eq!(matches[0].seq, 0);
        assert_eq!(matches[1].seq, 1);
    }
}
