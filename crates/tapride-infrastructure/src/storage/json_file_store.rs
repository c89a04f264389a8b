//! File-backed key-value store: one JSON document per key.
//!
//! Writes are atomic (tmp file + fsync + rename) and serialized per key with
//! an exclusive file lock, so a crash never leaves a half-written value.

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write as IoWrite};
use std::path::{Path, PathBuf};

use tapride_core::error::{Result, TaprideError};
use tapride_core::storage::KeyValueStore;

/// A [`KeyValueStore`] that keeps each key in `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct JsonFileKeyValueStore {
    dir: PathBuf,
}

impl JsonFileKeyValueStore {
    /// Opens (and creates if needed) a store rooted at `dir`.
    ///
    /// Fails if the directory cannot be created, which callers treat as
    /// "storage unavailable".
    pub fn open(dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the file path for `key`, rejecting keys that could escape
    /// the store directory.
    fn value_path(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(TaprideError::storage(format!("Invalid storage key: {:?}", key)));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }

    fn temp_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!(".{}.json.tmp", key))
    }
}

impl KeyValueStore for JsonFileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.value_path(key)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.value_path(key)?;
        let _lock = FileLock::acquire(&path)?;

        // Write to temporary file in the same directory
        let tmp_path = self.temp_path(key);
        let mut tmp_file = File::create(&tmp_path)?;
        tmp_file.write_all(value.as_bytes())?;

        // Ensure data is written to disk
        tmp_file.sync_all()?;
        drop(tmp_file);

        // Atomic rename
        fs::rename(&tmp_path, &path)?;

        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        let path = self.value_path(key)?;
        let _lock = FileLock::acquire(&path)?;

        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// An exclusive lock on `<key>.lock`, released when dropped.
///
/// The lock file stays on disk. Removing it would let a waiter holding the
/// old inode and a newcomer creating a fresh file both own the lock.
struct FileLock {
    file: File,
}

impl FileLock {
    /// Acquires an exclusive lock next to `path`, blocking until available.
    fn acquire(path: &Path) -> Result<Self> {
        use fs2::FileExt;

        let lock_path = path.with_extension("lock");

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;

        file.lock_exclusive()
            .map_err(|e| TaprideError::storage(format!("Failed to acquire lock: {}", e)))?;

        Ok(FileLock { file })
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        use fs2::FileExt;

        if let Err(e) = self.file.unlock() {
            tracing::debug!(error = %e, "Failed to release storage lock");
        }
    }
}
