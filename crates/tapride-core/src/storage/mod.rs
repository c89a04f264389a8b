//! Key-value storage capability.
//!
//! Every persisted entity lives under its own key as a JSON document. Keys
//! are loaded and saved independently: no invariant spans two keys, so a
//! corrupt value under one key never affects the others.

mod memory;

pub use memory::MemoryKeyValueStore;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::Result;

/// Storage keys used by the reservation store.
pub mod keys {
    pub const HOME: &str = "home";
    pub const FAVORITES: &str = "favorites";
    pub const PAYMENT: &str = "payment";
    pub const OUTING_MODE: &str = "outingMode";
    pub const ASKED_OUTING_MODAL: &str = "askedOutingModal";
    pub const HISTORY: &str = "history";

    /// All keys, in load order.
    pub const ALL: [&str; 6] = [HOME, FAVORITES, PAYMENT, OUTING_MODE, ASKED_OUTING_MODAL, HISTORY];
}

/// Durable string storage addressed by key.
///
/// Implementations decide where values live (files, memory, an embedded
/// database). Writes are last-writer-wins.
pub trait KeyValueStore: Send + Sync {
    /// Returns the raw value for `key`, or `None` if nothing is stored.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes `key`. Removing a missing key is not an error.
    fn delete(&self, key: &str) -> Result<()>;
}

/// Loads and parses the JSON value under `key`.
///
/// Missing values, read failures and unparsable values all yield `default`.
/// Failures are logged, never returned.
pub fn load_or_default<T>(store: &dyn KeyValueStore, key: &str, default: T) -> T
where
    T: DeserializeOwned,
{
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return default,
        Err(e) => {
            tracing::warn!(key, error = %e, "Failed to read stored value, using default");
            return default;
        }
    };

    if raw.trim().is_empty() {
        return default;
    }

    match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(key, error = %e, "Stored value is corrupt, using default");
            default
        }
    }
}

/// Serializes `value` as JSON and stores it under `key`.
pub fn save_json<T>(store: &dyn KeyValueStore, key: &str, value: &T) -> Result<()>
where
    T: Serialize + ?Sized,
{
    let json = serde_json::to_string(value)?;
    store.set(key, &json)
}
