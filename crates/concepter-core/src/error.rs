//! Error types for the Concepter client.

use thiserror::Error;

use crate::http::HttpError;
use crate::storage::StorageError;

/// A shared error type for the entire Concepter client.
///
/// This provides typed, structured error variants with automatic conversion
/// from common error types via the `From` trait.
#[derive(Error, Debug, Clone)]
pub enum ConcepterError {
    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A request failed on the wire or came back with a failure status
    #[error(transparent)]
    Http(#[from] HttpError),

    /// Persistent storage error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ConcepterError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Accessors
    // ============================================================================

    /// Returns the HTTP status code when this error came from a failed response.
    pub fn http_status(&self) -> Option<reqwest::StatusCode> {
        match self {
            Self::Http(err) => err.status(),
            _ => None,
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for ConcepterError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for ConcepterError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for ConcepterError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<StorageError> for ConcepterError {
    fn from(err: StorageError) -> Self {
        Self::Storage(err.to_string())
    }
}

/// A type alias for `Result<T, ConcepterError>`.
pub type Result<T> = std::result::Result<T, ConcepterError>;
