use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{ConcepterError, Result};

pub const DEFAULT_API_URL: &str = "http://localhost:8080";

/// Client configuration, read from `config.toml`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL every resource path is appended to.
    pub api_url: String,
    pub request_timeout_secs: u64,
    /// Upper bound on the best-effort logout notification.
    pub logout_timeout_secs: u64,
    /// Overrides the default local storage file location.
    pub storage_file: Option<PathBuf>,
    pub log_filter: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout_secs: 30,
            logout_timeout_secs: 5,
            storage_file: None,
            log_filter: "info".to_string(),
        }
    }
}

impl ClientConfig {
    /// Validates and normalises the configuration in place.
    pub fn normalized(mut self) -> Result<Self> {
        self.api_url = normalize_base_url(&self.api_url)?;
        Ok(self)
    }
}

/// Trims whitespace and trailing slashes from a base URL.
pub fn normalize_base_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(ConcepterError::config("api_url must not be empty"));
    }
    Ok(trimmed.to_string())
}
