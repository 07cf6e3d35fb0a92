//! Key-value persistence used by the grid catalog, saved locations and the
//! override service.
//!
//! Values are stored as JSON. The trait is async because real backends
//! (extension storage, files, remote stores) are.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::StoreError;

pub trait KeyValueStore: Send + Sync + 'static {
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<Value>, StoreError>> + Send;

    fn set(&self, key: &str, value: Value) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Read and deserialize a stored value. A missing key is `Ok(None)`.
pub async fn load<T, S>(store: &S, key: &str) -> Result<Option<T>, StoreError>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    match store.get(key).await? {
        Some(value) => Ok(Some(serde_json::from_value(value)?)),
        None => Ok(None),
    }
}

pub async fn save<T, S>(store: &S, key: &str, value: &T) -> Result<(), StoreError>
where
    T: Serialize + ?Sized,
    S: KeyValueStore + ?Sized,
{
    let value = serde_json::to_value(value)?;
    store.set(key, value).await
}

/// In-process store. It can be made read-only to act like a backend that
/// rejects writes.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, Value>>,
    read_only: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(key: &str, value: Value) -> Self {
        let store = Self::default();
        if let Ok(mut values) = store.values.lock() {
            values.insert(key.to_string(), value);
        }
        store
    }

    /// While set, every write fails with `StoreError::Backend`.
    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::SeqCst);
    }

    /// Synchronous peek, mainly for assertions.
    pub fn snapshot(&self, key: &str) -> Option<Value> {
        self.values.lock().ok().and_then(|values| values.get(key).cloned())
    }
}

impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let values = self
            .values
            .lock()
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(values.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        if self.read_only.load(Ordering::SeqCst) {
            return Err(StoreError::Backend(format!("store is read-only, cannot write {key}")));
        }
        let mut values = self
            .values
            .lock()
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        values.insert(key.to_string(), value);
        Ok(())
    }
}
