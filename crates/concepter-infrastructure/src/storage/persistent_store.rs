//! Fault-tolerant typed key/value store.
//!
//! `PersistentStore` wraps a `StorageMedium` and never returns an error:
//! writes degrade to no-ops and reads to `None` whenever the medium is
//! unavailable or a value cannot be (de)serialized. Failures are logged.

use std::sync::Arc;

use concepter_core::storage::StorageMedium;
use serde::Serialize;
use serde::de::DeserializeOwned;

const SELF_TEST_KEY: &str = "__storage_test__";

#[derive(Clone)]
pub struct PersistentStore {
    medium: Arc<dyn StorageMedium>,
}

impl PersistentStore {
    pub fn new(medium: Arc<dyn StorageMedium>) -> Self {
        Self { medium }
    }

    /// Probes the medium with a write/delete cycle.
    ///
    /// Not cached: storage can be disabled while the process runs.
    pub fn is_available(&self) -> bool {
        let probe = self
            .medium
            .set_item(SELF_TEST_KEY, SELF_TEST_KEY)
            .and_then(|_| self.medium.remove_item(SELF_TEST_KEY));

        match probe {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("[Storage] Storage unavailable: {}", e);
                false
            }
        }
    }

    /// Serializes `value` as JSON and stores it under `key`.
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        if !self.is_available() {
            return;
        }

        let text = match serde_json::to_string(value) {
            Ok(text) => text,
            Err(e) => {
                tracing::error!("[Storage] Error serializing '{}': {}", key, e);
                return;
            }
        };

        if let Err(e) = self.medium.set_item(key, &text) {
            tracing::error!("[Storage] Error saving '{}': {}", key, e);
        }
    }

    /// Reads and deserializes the value under `key`.
    ///
    /// Missing keys, empty text, malformed JSON and an unavailable medium all
    /// yield `None`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        if !self.is_available() {
            return None;
        }

        let text = match self.medium.get_item(key) {
            Ok(Some(text)) if !text.is_empty() => text,
            Ok(_) => return None,
            Err(e) => {
                tracing::error!("[Storage] Error reading '{}': {}", key, e);
                return None;
            }
        };

        match serde_json::from_str(&text) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::error!("[Storage] Error parsing '{}': {}", key, e);
                None
            }
        }
    }

    pub fn remove(&self, key: &str) {
        if !self.is_available() {
            return;
        }
        if let Err(e) = self.medium.remove_item(key) {
            tracing::error!("[Storage] Error removing '{}': {}", key, e);
        }
    }

    pub fn clear(&self) {
        if !self.is_available() {
            return;
        }
        if let Err(e) = self.medium.clear() {
            tracing::error!("[Storage] Error clearing storage: {}", e);
        }
    }
}
