//! Key-value storage for tracker collections plus filesystem and in-memory backends.
//!
//! Values are JSON text stored under short string keys. Backends only move
//! strings around; typed access goes through [`load_json`], [`load_elements`]
//! and [`save_json`].

mod fs_store;
mod json;
mod mem_store;

pub use fs_store::FsStore;
pub use json::{decode_elements, load_elements, load_json, save_json};
pub use mem_store::MemStore;

use std::{io, path::PathBuf, sync::Arc};

pub type StoreResult<T> = Result<T, StoreError>;
pub type DynStore = Arc<dyn Store>;

/// Trait implemented by all key-value stores.
pub trait Store: Send + Sync {
    /// Returns the raw value stored under `key`, or `None` when absent.
    fn get(&self, key: &str) -> StoreResult<Option<String>>;
    fn put(&self, key: &str, value: &str) -> StoreResult<()>;
    /// Removing a missing key is not an error.
    fn remove(&self, key: &str) -> StoreResult<()>;

    fn contains(&self, key: &str) -> StoreResult<bool> {
        Ok(self.get(key)?.is_some())
    }
}

impl<S: Store + ?Sized> Store for Arc<S> {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        (**self).get(key)
    }

    fn put(&self, key: &str, value: &str) -> StoreResult<()> {
        (**self).put(key, value)
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        (**self).remove(key)
    }

    fn contains(&self, key: &str) -> StoreResult<bool> {
        (**self).contains(key)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("JSON encoding error for '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("malformed JSON under '{key}': {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid store key '{0}'")]
    InvalidKey(String),
}

impl StoreError {
    /// True when the stored bytes were readable but not valid for the requested type.
    pub fn is_decode(&self) -> bool {
        matches!(self, StoreError::Decode { .. })
    }
}

pub(crate) fn io_error(path: impl Into<PathBuf>, err: io::Error) -> StoreError {
    StoreError::Io {
        path: path.into(),
        source: err,
    }
}

/// Keys double as file names, so keep them to a conservative alphabet.
pub(crate) fn validate_key(key: &str) -> StoreResult<()> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_alphabet() {
        assert!(validate_key("psi_orders_v2").is_ok());
        assert!(validate_key("waitlist").is_ok());
        assert!(validate_key("a-b.c").is_ok());
        assert!(matches!(validate_key(""), Err(StoreError::InvalidKey(_))));
        assert!(matches!(validate_key("../etc"), Err(StoreError::InvalidKey(_))));
        assert!(matches!(validate_key("a/b"), Err(StoreError::InvalidKey(_))));
        assert!(matches!(validate_key(".hidden"), Err(StoreError::InvalidKey(_))));
    }

    #[test]
    fn arc_store_delegates() {
        let store: DynStore = Arc::new(MemStore::new());
        store.put("k", "1").expect("put");
        assert!(store.contains("k").expect("contains"));
        store.remove("k").expect("remove");
        assert_eq!(store.get("k").expect("get"), None);
    }
}
