//! Keyed record stores.
//!
//! Every service owns exactly one `KeyedStore` mapping a string key to the
//! latest record. `upsert` reports whether the key is new so the caller can
//! fan out Add versus Update.

use std::collections::HashMap;

use crate::error::PipelineError;

/// Outcome of storing a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    /// The key was not present before.
    Added,
    /// An existing record was replaced.
    Updated,
}

/// String-keyed store of owned records.
#[derive(Debug)]
pub struct KeyedStore<V> {
    /// Service name used in `KeyNotFound` errors.
    service: &'static str,
    map: HashMap<String, V>,
}

impl<V: Clone> KeyedStore<V> {
    pub fn new(service: &'static str) -> Self {
        Self { service, map: HashMap::new() }
    }

    /// Replace or insert, reporting which happened.
    pub fn upsert(&mut self, key: &str, value: V) -> Mutation {
        match self.map.insert(key.to_string(), value) {
            None => Mutation::Added,
            Some(_) => Mutation::Updated,
        }
    }

    /// Read-only copy of the latest record for a key.
    pub fn get(&self, key: &str) -> Result<V, PipelineError> {
        self.map.get(key).cloned().ok_or(PipelineError::KeyNotFound {
            service: self.service,
            key: key.to_string(),
        })
    }

    pub fn peek(&self, key: &str) -> Option<&V> {
        self.map.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<V> {
        self.map.remove(key)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsert_reports_added_then_updated() {
        let mut store = KeyedStore::new("test");
        assert_eq!(store.upsert("T2Y", 1), Mutation::Added);
        assert_eq!(store.upsert("T2Y", 2), Mutation::Updated);
        assert_eq!(store.get("T2Y").unwrap(), 2);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn missing_key_is_an_error() {
        let store: KeyedStore<i32> = KeyedStore::new("test");
        let err = store.get("T2Y").unwrap_err();
        assert!(err.to_string().contains("T2Y"));
        assert!(err.to_string().contains("test"));
    }

    #[test]
    fn remove_drops_the_record() {
        let mut store = KeyedStore::new("test");
        store.upsert("T2Y", 1);
        assert_eq!(store.remove("T2Y"), Some(1));
        assert!(store.get("T2Y").is_err());
        assert_eq!(store.remove("T2Y"), None);
    }
}
