//! Key/value persistence medium abstraction.
//!
//! A `StorageMedium` is the raw, fallible backing store (a JSON file on disk,
//! an in-memory map, ...). Callers normally go through the infrastructure
//! `PersistentStore`, which never lets these errors escape.

use thiserror::Error;

/// Errors raised by a storage medium.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// The medium cannot be used at all (disabled, missing directory, locked).
    #[error("Storage medium unavailable: {0}")]
    Unavailable(String),

    /// The write would exceed the medium's capacity.
    #[error("Storage quota exceeded while writing '{key}'")]
    QuotaExceeded { key: String },

    /// Reading or writing the underlying medium failed.
    #[error("Storage I/O error: {0}")]
    Io(String),

    /// The medium's own container format could not be read or written.
    #[error("Storage serialization error: {0}")]
    Serialization(String),
}

/// Raw string key/value medium, the equivalent of browser local storage.
///
/// Every operation is independently atomic from the caller's perspective.
pub trait StorageMedium: Send + Sync {
    /// Stores `value` under `key`, replacing any previous value.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Returns the raw text stored under `key`.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Removes `key`. Removing a missing key is not an error.
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;

    /// Removes every key.
    fn clear(&self) -> Result<(), StorageError>;
}
