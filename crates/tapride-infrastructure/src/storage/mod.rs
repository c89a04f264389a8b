//! Durable key-value storage.

mod json_file_store;

pub use json_file_store::JsonFileKeyValueStore;

use std::sync::Arc;

use tapride_core::config::StorageConfig;
use tapride_core::storage::{KeyValueStore, MemoryKeyValueStore};

use crate::paths::TapridePaths;

/// Opens the key-value store described by `config`.
///
/// Uses `config.dir` when set, the platform data directory otherwise. When
/// no directory can be resolved or created, falls back to an in-memory
/// store: the app runs with defaults and persists nothing.
pub fn open_key_value_store(config: &StorageConfig) -> Arc<dyn KeyValueStore> {
    let dir = match config.dir.clone() {
        Some(dir) => dir,
        None => match TapridePaths::store_dir() {
            Ok(dir) => dir,
            Err(e) => {
                tracing::warn!(error = %e, "No storage directory, running without persistence");
                return Arc::new(MemoryKeyValueStore::new());
            }
        },
    };

    match JsonFileKeyValueStore::open(dir.clone()) {
        Ok(store) => {
            tracing::info!(dir = %dir.display(), "Opened key-value store");
            Arc::new(store)
        }
        Err(e) => {
            tracing::warn!(
                dir = %dir.display(),
                error = %e,
                "Storage unavailable, running without persistence"
            );
            Arc::new(MemoryKeyValueStore::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_uses_configured_dir() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("store");
        let config = StorageConfig {
            dir: Some(dir.clone()),
        };

        let store = open_key_value_store(&config);
        store.set("payment", "\"Cashless\"").unwrap();

        assert!(dir.join("payment.json").exists());
    }

    #[test]
    fn test_open_falls_back_to_memory_when_dir_unusable() {
        let temp_dir = TempDir::new().unwrap();
        // A regular file where the directory should be
        let blocker = temp_dir.path().join("blocker");
        std::fs::write(&blocker, "x").unwrap();
        let config = StorageConfig {
            dir: Some(blocker.join("store")),
        };

        let store = open_key_value_store(&config);
        store.set("outingMode", "true").unwrap();
        assert_eq!(store.get("outingMode").unwrap().as_deref(), Some("true"));
        assert!(!blocker.join("store").exists());
    }
}
