//! Configuration loading.
//!
//! Reads `~/.config/concepter/config.toml` (missing file means defaults) and
//! applies environment overrides on top.

use std::fs;
use std::path::{Path, PathBuf};

use concepter_core::config::ClientConfig;
use concepter_core::error::{ConcepterError, Result};

use crate::paths::ConcepterPaths;

pub const ENV_API_URL: &str = "CONCEPTER_API_URL";
pub const ENV_STORAGE_FILE: &str = "CONCEPTER_STORAGE_FILE";
pub const ENV_LOG: &str = "CONCEPTER_LOG";

pub struct ConfigService;

impl ConfigService {
    /// Loads the configuration from the default location plus environment.
    pub fn load() -> Result<ClientConfig> {
        let path = ConcepterPaths::config_file().map_err(|e| ConcepterError::config(e.to_string()))?;
        let config = Self::load_from(&path)?;
        Self::apply_overrides(config, |name| std::env::var(name).ok()).normalized()
    }

    /// Loads the configuration file at `path` without environment overrides.
    pub fn load_from(path: &Path) -> Result<ClientConfig> {
        if !path.exists() {
            tracing::debug!("[Config] No config file at {}, using defaults", path.display());
            return Ok(ClientConfig::default());
        }

        let content = fs::read_to_string(path)?;
        let config: ClientConfig = toml::from_str(&content)?;
        tracing::debug!("[Config] Loaded {}", path.display());
        Ok(config)
    }

    /// Applies overrides looked up through `lookup` (the environment in production).
    pub fn apply_overrides<F>(mut config: ClientConfig, lookup: F) -> ClientConfig
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
            config.api_url = url;
        }
        if let Some(file) = lookup(ENV_STORAGE_FILE).filter(|v| !v.trim().is_empty()) {
            config.storage_file = Some(PathBuf::from(file));
        }
        if let Some(filter) = lookup(ENV_LOG).filter(|v| !v.trim().is_empty()) {
            config.log_filter = filter;
        }
        config
    }

    /// Resolves the local storage file, honouring the configured override.
    pub fn storage_file(config: &ClientConfig) -> Result<PathBuf> {
        match &config.storage_file {
            Some(path) => Ok(path.clone()),
            None => ConcepterPaths::local_storage_file()
                .map_err(|e| ConcepterError::config(e.to_string())),
        }
    }
}
