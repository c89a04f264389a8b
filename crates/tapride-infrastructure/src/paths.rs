//! Unified path management for tapride files.
//!
//! ```text
//! ~/.config/tapride/           # Config directory
//! └── config.toml              # Application configuration
//!
//! ~/.local/share/tapride/      # Data directory
//! └── store/                   # Key-value store, one JSON file per key
//!     ├── home.json
//!     ├── favorites.json
//!     └── ...
//! ```

use std::path::PathBuf;

const APP_DIR_NAME: &str = "tapride";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Config directory could not be determined.
    ConfigDirNotFound,
    /// Data directory could not be determined.
    DataDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::ConfigDirNotFound => write!(f, "Cannot find config directory"),
            PathError::DataDirNotFound => write!(f, "Cannot find data directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Platform paths for tapride (XDG on Linux, the native locations elsewhere).
pub struct TapridePaths;

impl TapridePaths {
    /// Returns the tapride configuration directory.
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR_NAME))
            .ok_or(PathError::ConfigDirNotFound)
    }

    /// Returns the tapride data directory.
    pub fn data_dir() -> Result<PathBuf, PathError> {
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR_NAME))
            .ok_or(PathError::DataDirNotFound)
    }

    /// Returns the path to the main configuration file.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the default key-value store directory.
    pub fn store_dir() -> Result<PathBuf, PathError> {
        Ok(Self::data_dir()?.join("store"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_file() {
        if let Ok(config_file) = TapridePaths::config_file() {
            assert!(config_file.ends_with("tapride/config.toml"));
            assert!(config_file.starts_with(TapridePaths::config_dir().unwrap()));
        }
    }

    #[test]
    fn test_store_dir() {
        if let Ok(store_dir) = TapridePaths::store_dir() {
            assert!(store_dir.ends_with("store"));
            assert!(store_dir.starts_with(TapridePaths::data_dir().unwrap()));
        }
    }
}
