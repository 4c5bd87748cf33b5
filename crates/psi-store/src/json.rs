use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::{Store, StoreError, StoreResult};

/// Reads and decodes the value under `key`.
///
/// A missing key and a stored JSON `null` both yield `Ok(None)`. Text that does
/// not decode as `T` yields [`StoreError::Decode`].
pub fn load_json<T, S>(store: &S, key: &str) -> StoreResult<Option<T>>
where
    T: DeserializeOwned,
    S: Store + ?Sized,
{
    let Some(text) = store.get(key)? else {
        return Ok(None);
    };
    let value: Option<T> = serde_json::from_str(&text).map_err(|source| StoreError::Decode {
        key: key.to_string(),
        source,
    })?;
    Ok(value)
}

/// Loads the JSON array under `key` element by element.
///
/// Elements that do not decode as `T` are dropped and the rest are kept. A
/// missing key or `null` yields an empty list, as does text that is not a JSON
/// array. Whenever anything is dropped, the raw text is copied to
/// `<key>.corrupt`. I/O failures still propagate.
pub fn load_elements<T, S>(store: &S, key: &str) -> StoreResult<Vec<T>>
where
    T: DeserializeOwned,
    S: Store + ?Sized,
{
    let Some(text) = store.get(key)? else {
        return Ok(Vec::new());
    };
    let elements = match serde_json::from_str::<Value>(&text) {
        Ok(Value::Null) => return Ok(Vec::new()),
        Ok(Value::Array(elements)) => elements,
        Ok(_) => {
            tracing::warn!(key, "stored value is not an array; discarding it");
            keep_corrupt(store, key, &text);
            return Ok(Vec::new());
        }
        Err(err) => {
            tracing::warn!(key, error = %err, "discarding malformed stored value");
            keep_corrupt(store, key, &text);
            return Ok(Vec::new());
        }
    };

    let mut skipped = 0;
    let decoded = decode_elements(&elements, &mut skipped);
    if skipped > 0 {
        tracing::warn!(key, skipped, kept = decoded.len(), "dropped undecodable elements");
        keep_corrupt(store, key, &text);
    }
    Ok(decoded)
}

/// Decodes each element independently, counting the ones that fail in `skipped`.
pub fn decode_elements<T: DeserializeOwned>(raw: &[Value], skipped: &mut usize) -> Vec<T> {
    raw.iter()
        .filter_map(|value| match serde_json::from_value::<T>(value.clone()) {
            Ok(decoded) => Some(decoded),
            Err(err) => {
                tracing::warn!(error = %err, "skipping undecodable element");
                *skipped += 1;
                None
            }
        })
        .collect()
}

fn keep_corrupt<S: Store + ?Sized>(store: &S, key: &str, raw: &str) {
    let backup = format!("{key}.corrupt");
    if let Err(err) = store.put(&backup, raw) {
        tracing::warn!(key = %backup, error = %err, "failed to keep corrupt value");
    }
}

pub fn save_json<T, S>(store: &S, key: &str, value: &T) -> StoreResult<()>
where
    T: Serialize + ?Sized,
    S: Store + ?Sized,
{
    let text = serde_json::to_string(value).map_err(|source| StoreError::Encode {
        key: key.to_string(),
        source,
    })?;
    store.put(key, &text)
}
