use super::{KeyValueStore, ReadError, WriteError};
use parking_lot::RwLock;
use std::collections::HashMap;

/// An in-process key-value store.
///
/// Used for tests and for sessions that should leave nothing on disk.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, ReadError> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<(), WriteError> {
        self.entries.write().insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), WriteError> {
        self.entries.write().remove(key);
        Ok(())
    }
}
