//! Configuration service implementation.
//!
//! This module provides a ConfigService that loads the application
//! configuration from the configuration file (~/.config/tapride/config.toml).

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use tapride_core::config::AppConfig;
use tapride_core::error::{Result, TaprideError};

use crate::paths::TapridePaths;

/// Configuration service that loads and caches the application configuration.
///
/// A missing file is created with the defaults; an unreadable or invalid
/// file is logged and the defaults are used instead.
#[derive(Debug, Clone)]
pub struct ConfigService {
    /// Explicit config path; `None` resolves the platform default.
    path: Option<PathBuf>,
    /// Cached configuration loaded from file.
    config: Arc<RwLock<Option<AppConfig>>>,
}

impl ConfigService {
    /// Creates a ConfigService reading the platform default config file.
    pub fn new() -> Self {
        Self {
            path: None,
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Creates a ConfigService reading `path` instead of the default location.
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            path: Some(path),
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Gets the configuration, loading from file if not cached.
    pub fn get_config(&self) -> AppConfig {
        {
            let read_lock = self.config.read().unwrap_or_else(|e| e.into_inner());
            if let Some(ref cached) = *read_lock {
                return cached.clone();
            }
        }

        let loaded = match self.load_config() {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load config, using defaults");
                AppConfig::default()
            }
        };

        {
            let mut write_lock = self.config.write().unwrap_or_else(|e| e.into_inner());
            *write_lock = Some(loaded.clone());
        }

        loaded
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        let mut write_lock = self.config.write().unwrap_or_else(|e| e.into_inner());
        *write_lock = None;
    }

    fn config_path(&self) -> Result<PathBuf> {
        match &self.path {
            Some(path) => Ok(path.clone()),
            None => TapridePaths::config_file().map_err(|e| TaprideError::config(e.to_string())),
        }
    }

    fn load_config(&self) -> Result<AppConfig> {
        let path = self.config_path()?;

        match Self::read_config(&path)? {
            Some(config) => Ok(config),
            None => {
                let config = AppConfig::default();
                if let Err(e) = Self::write_config(&path, &config) {
                    tracing::warn!(path = %path.display(), error = %e, "Failed to write default config");
                }
                Ok(config)
            }
        }
    }

    /// Reads and parses `path`. Missing or empty files yield `None`.
    pub fn read_config(path: &Path) -> Result<Option<AppConfig>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(None);
        }

        let config: AppConfig = toml::from_str(&content)?;
        Ok(Some(config))
    }

    /// Writes `config` to `path` as TOML, creating parent directories.
    pub fn write_config(path: &Path, config: &AppConfig) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let toml_string = toml::to_string_pretty(config)?;
        fs::write(path, toml_string)?;
        Ok(())
    }
}

impl Default for ConfigService {
    fn default() -> Self {
        Self::new()
    }
}
