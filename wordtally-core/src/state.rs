//! Keyed state backing the running word counts.
//!
//! The counter only needs get-or-zero and put on a single value per key,
//! but the backend is kept behind a trait so a durable store can slot in
//! without touching the counter. State handles use the descriptor
//! pattern: a handle is lightweight metadata that does not borrow the
//! backend.

use std::collections::HashMap;
use std::marker::PhantomData;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use crate::types::StreamData;

/// Default logical name for the word-count store.
pub const DEFAULT_STORE_NAME: &str = "WordCounts-1";

/// Keyed state backend: manages per-key values scoped to a current
/// processing key.
///
/// The backend maintains a "current key" context; all value operations
/// are scoped to it. Exactly one task owns a backend instance, so no
/// locking is needed (single-writer-per-key discipline).
pub trait KeyedStateBackend: Send {
    /// Set the current processing key. Subsequent operations are scoped
    /// to this key.
    fn set_current_key(&mut self, key: Vec<u8>);

    /// Get the value stored under `name` for the current key.
    fn get_value<V: StreamData>(&self, name: &str) -> Result<Option<V>>;

    /// Put a value under `name` for the current key.
    fn put_value<V: StreamData>(&mut self, name: &str, value: V) -> Result<()>;

    /// Snapshot all state into bytes.
    fn snapshot(&self) -> Result<Vec<u8>>;

    /// Restore all state from snapshot bytes.
    fn restore(&mut self, data: &[u8]) -> Result<()>;
}

/// Typed handle to a named value state.
///
/// Handles don't borrow the backend, so an operator can hold its handles
/// and the backend side by side without borrow-checker conflicts.
pub struct ValueStateHandle<V> {
    name: &'static str,
    _phantom: PhantomData<V>,
}

impl<V: StreamData> ValueStateHandle<V> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            _phantom: PhantomData,
        }
    }

    pub fn get<B: KeyedStateBackend>(&self, backend: &B) -> Result<Option<V>> {
        backend.get_value(self.name)
    }

    pub fn put<B: KeyedStateBackend>(&self, backend: &mut B, value: V) -> Result<()> {
        backend.put_value(self.name, value)
    }
}

/// In-memory state backend using a HashMap.
///
/// Values are stored bincode-serialized under `(key, state_name)` so a
/// snapshot is a plain serialization of the map. Store unavailability
/// does not exist for this backend; a durable implementation would
/// surface it as errors from the trait methods, which the pipeline
/// treats as fatal.
#[derive(Debug)]
pub struct InMemoryStateBackend {
    store_name: String,
    /// (key, state_name) -> value_bytes
    values: HashMap<(Vec<u8>, String), Vec<u8>>,
    current_key: Option<Vec<u8>>,
}

impl InMemoryStateBackend {
    /// Create an empty backend with the default store name.
    pub fn new() -> Self {
        Self::named(DEFAULT_STORE_NAME)
    }

    /// Create an empty backend with an explicit logical store name.
    pub fn named(store_name: impl Into<String>) -> Self {
        Self {
            store_name: store_name.into(),
            values: HashMap::new(),
            current_key: None,
        }
    }

    /// The logical store name, e.g. `"WordCounts-1"`.
    pub fn store_name(&self) -> &str {
        &self.store_name
    }

    /// Number of distinct (key, state_name) entries.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn state_key(&self, name: &str) -> Result<(Vec<u8>, String)> {
        let key = self
            .current_key
            .as_ref()
            .ok_or_else(|| anyhow!("no current key set on store {}", self.store_name))?;
        Ok((key.clone(), name.to_string()))
    }
}

impl Default for InMemoryStateBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize, Deserialize)]
struct SnapshotData {
    values: HashMap<(Vec<u8>, String), Vec<u8>>,
}

impl KeyedStateBackend for InMemoryStateBackend {
    fn set_current_key(&mut self, key: Vec<u8>) {
        self.current_key = Some(key);
    }

    fn get_value<V: StreamData>(&self, name: &str) -> Result<Option<V>> {
        let state_key = self.state_key(name)?;
        match self.values.get(&state_key) {
            Some(bytes) => Ok(Some(bincode::deserialize(bytes)?)),
            None => Ok(None),
        }
    }

    fn put_value<V: StreamData>(&mut self, name: &str, value: V) -> Result<()> {
        let state_key = self.state_key(name)?;
        let bytes = bincode::serialize(&value)?;
        self.values.insert(state_key, bytes);
        Ok(())
    }

    fn snapshot(&self) -> Result<Vec<u8>> {
        let data = SnapshotData {
            values: self.values.clone(),
        };
        bincode::serialize(&data).map_err(|e| anyhow!("snapshot of {} failed: {e}", self.store_name))
    }

    fn restore(&mut self, data: &[u8]) -> Result<()> {
        let snap: SnapshotData = bincode::deserialize(data)
            .map_err(|e| anyhow!("restore of {} failed: {e}", self.store_name))?;
        self.values = snap.values;
        Ok(())
    }
}
