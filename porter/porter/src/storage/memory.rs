//! In-process memory storage: an explicit arena keyed by object name.

use std::collections::HashMap;
use std::sync::RwLock;

use porter_core::{MemoryStorage, Storage, StorageEngine, StoredObject};

/// Object arena owned by one storage instance and passed by reference to
/// every memory-backed operation; there is no ambient global. The lock
/// makes concurrent copy requests to distinct names safe.
pub struct MemoryStore {
    label: String,
    objects: RwLock<HashMap<String, StoredObject>>,
}

impl MemoryStore {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            objects: RwLock::new(HashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.objects.read().expect("memory store lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Storage for MemoryStore {
    fn label(&self) -> &str {
        &self.label
    }

    fn engine(&self) -> StorageEngine {
        StorageEngine::Memory
    }

    fn as_memory(&self) -> Option<&dyn MemoryStorage> {
        Some(self)
    }
}

impl MemoryStorage for MemoryStore {
    fn get(&self, name: &str) -> Option<StoredObject> {
        self.objects
            .read()
            .expect("memory store lock poisoned")
            .get(name)
            .cloned()
    }

    fn put(&self, name: &str, object: StoredObject) {
        self.objects
            .write()
            .expect("memory store lock poisoned")
            .insert(name.to_string(), object);
    }

    fn exists(&self, name: &str) -> bool {
        self.objects
            .read()
            .expect("memory store lock poisoned")
            .contains_key(name)
    }

    fn remove(&self, name: &str) -> bool {
        self.objects
            .write()
            .expect("memory store lock poisoned")
            .remove(name)
            .is_some()
    }
}

#[cfg(test)]
mod tests {
    use porter_core::{Record, Value};

    use super::*;

    #[test]
    fn put_get_remove_roundtrip() {
        let store = MemoryStore::new("scratch");
        let rows = vec![Record::new().with_field("a", Value::Int(1))];
        store.put("obj", StoredObject::Records(rows.clone()));
        assert!(store.exists("obj"));
        assert_eq!(store.get("obj"), Some(StoredObject::Records(rows)));
        assert!(store.remove("obj"));
        assert!(!store.exists("obj"));
        assert!(!store.remove("obj"));
    }
}
