//! Unified path management for concepter files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/concepter/
//! ├── config.toml              # Client configuration
//! └── local_storage.json       # Persisted session keys
//! ```

use std::path::PathBuf;

const APP_DIR: &str = "concepter";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Config directory could not be determined.
    ConfigDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::ConfigDirNotFound => write!(f, "Cannot find config directory"),
        }
    }
}

impl std::error::Error for PathError {}

pub struct ConcepterPaths;

impl ConcepterPaths {
    /// Returns the concepter configuration directory (e.g. `~/.config/concepter/`).
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(PathError::ConfigDirNotFound)
    }

    /// Returns the path to `config.toml`.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the default local storage file.
    pub fn local_storage_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("local_storage.json"))
    }
}
