//! Persistence port.
//!
//! Every tracker persists its own slice of state as a JSON blob under a
//! fixed key. The [`KeyValueStore`] trait is the only thing the trackers
//! know about storage; [`FileStore`] keeps one file per key on disk and
//! [`MemoryStore`] keeps everything in a map.

mod common;
mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Fixed keys for the persisted slices.
pub mod keys {
    pub const USER_PROGRESS: &str = "user_progress";
    pub const FAVORITES: &str = "favorites";
    pub const JOURNEY_STATE: &str = "journey_state";
    pub const ACHIEVEMENTS: &str = "achievements";
    pub const TRACKED_BELIEFS: &str = "tracked_beliefs";
    pub const SETTINGS: &str = "settings";
}

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid key: {0:?}")]
    InvalidKey(String),

    #[error("File is already locked by another process")]
    AlreadyLocked,

    #[error("Failed to acquire lock within {0:?}")]
    LockTimeout(Duration),
}

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Deserialization failed: {0}")]
    Deserialization(#[from] serde_json::Error),

    #[error("Invalid key: {0:?}")]
    InvalidKey(String),

    #[error("File is already locked by another process")]
    AlreadyLocked,

    #[error("Failed to acquire lock within {0:?}")]
    LockTimeout(Duration),
}

/// A byte-oriented key-value store holding JSON blobs.
pub trait KeyValueStore: Send + Sync {
    /// Read the blob stored under `key`, or `None` if nothing was stored.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, ReadError>;

    /// Replace the blob stored under `key`.
    fn put(&self, key: &str, value: &[u8]) -> Result<(), WriteError>;

    /// Remove the blob stored under `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), WriteError>;
}

/// Decode the JSON value stored under `key`.
pub fn load_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, ReadError> {
    match store.get(key)? {
        Some(bytes) => Ok(Some(common::decode(&bytes)?)),
        None => Ok(None),
    }
}

/// Encode `value` as JSON and store it under `key`.
pub fn save_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), WriteError> {
    let bytes = common::encode(value)?;
    store.put(key, &bytes)
}

/// Load `key`, falling back to `T::default()` when it is missing or unreadable.
///
/// Trackers treat local storage as best effort: a corrupt blob is logged and
/// replaced by fresh state rather than surfaced.
pub(crate) fn load_or_default<T: DeserializeOwned + Default>(
    store: &dyn KeyValueStore,
    key: &str,
) -> T {
    match load_json(store, key) {
        Ok(Some(value)) => value,
        Ok(None) => T::default(),
        Err(e) => {
            tracing::warn!(key, error = %e, "Failed to load persisted state, using defaults");
            T::default()
        }
    }
}

/// Save `value` under `key`, logging and swallowing any failure.
pub(crate) fn persist<T: Serialize + ?Sized>(store: &dyn KeyValueStore, key: &str, value: &T) {
    if let Err(e) = save_json(store, key, value) {
        tracing::warn!(key, error = %e, "Failed to persist state");
    }
}
