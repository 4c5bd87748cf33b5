use crate::{Store, StoreResult, validate_key};
use std::{
    collections::HashMap,
    sync::{Arc, PoisonError, RwLock},
};

/// In-memory store; clones share the same map.
#[derive(Clone, Default)]
pub struct MemStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl std::fmt::Debug for MemStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemStore")
            .field("entries", &self.len())
            .finish()
    }
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a store from `(key, raw value)` pairs without validating the values.
    pub fn with_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let map = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            entries: Arc::new(RwLock::new(map)),
        }
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        keys.sort();
        keys
    }
}

impl Store for MemStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        validate_key(key)?;
        let guard = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        Ok(guard.get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> StoreResult<()> {
        validate_key(key)?;
        let mut guard = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        guard.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        validate_key(key)?;
        let mut guard = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        guard.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_get_remove() {
        let store = MemStore::new();
        assert_eq!(store.get("orders").expect("get"), None);
        store.put("orders", "[]").expect("put");
        assert_eq!(store.get("orders").expect("get").as_deref(), Some("[]"));
        store.put("orders", "[1]").expect("overwrite");
        assert_eq!(store.get("orders").expect("get").as_deref(), Some("[1]"));
        store.remove("orders").expect("remove");
        store.remove("orders").expect("remove missing");
        assert!(store.is_empty());
    }

    #[test]
    fn clones_share_entries() {
        let store = MemStore::with_entries([("a", "1")]);
        let other = store.clone();
        other.put("b", "2").expect("put");
        assert_eq!(store.keys(), vec!["a".to_string(), "b".to_string()]);
    }
}
