//! Local key-value store
//!
//! A string key-value store used as the offline fallback, and as the only
//! store for features that never talk to the backend. Each component gets a
//! store handed to it explicitly; nothing reaches for a global.
//!
//! - [`FileStore`]: one JSON file per key under a data directory
//! - [`MemoryStore`]: process-local map, for tests
//!
//! Collections are JSON arrays under fixed keys (`blotters`, `documents`),
//! read and written through [`LocalCollection`].

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::error::RecordsResult;

/// A string key-value store
pub trait KeyValueStore: Send + Sync {
    /// Read a value; `Ok(None)` when the key was never written
    fn get(&self, key: &str) -> RecordsResult<Option<String>>;

    /// Write a value, replacing any previous one
    fn set(&self, key: &str, value: &str) -> RecordsResult<()>;

    /// Remove a key; removing a missing key is not an error
    fn remove(&self, key: &str) -> RecordsResult<()>;
}

/// Read a JSON value stored under `key`
pub fn load_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> RecordsResult<Option<T>> {
    match store.get(key)? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// Write a value as JSON under `key`
pub fn save_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> RecordsResult<()> {
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw)
}

/// A JSON array of `T` under a fixed key
pub struct LocalCollection<T> {
    store: Arc<dyn KeyValueStore>,
    key: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for LocalCollection<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            key: self.key,
            _marker: PhantomData,
        }
    }
}

impl<T: Serialize + DeserializeOwned> LocalCollection<T> {
    pub fn new(store: Arc<dyn KeyValueStore>, key: &'static str) -> Self {
        Self {
            store,
            key,
            _marker: PhantomData,
        }
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    /// All items; a missing key is an empty collection
    pub fn load(&self) -> RecordsResult<Vec<T>> {
        Ok(load_json(self.store.as_ref(), self.key)?.unwrap_or_default())
    }

    /// Replace the whole collection
    pub fn save(&self, items: &[T]) -> RecordsResult<()> {
        save_json(self.store.as_ref(), self.key, items)
    }

    /// Append one item
    pub fn push(&self, item: T) -> RecordsResult<()> {
        let mut items = self.load()?;
        items.push(item);
        self.save(&items)
    }
}
