//! In-memory storage medium.
//!
//! Used for ephemeral sessions and in tests. Availability can be switched off
//! at runtime and a byte quota can be imposed, mimicking a browser that
//! disables storage mid-session or runs out of space.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use concepter_core::storage::{StorageError, StorageMedium};

pub struct MemoryMedium {
    entries: Mutex<HashMap<String, String>>,
    available: AtomicBool,
    quota_bytes: Option<usize>,
}

impl MemoryMedium {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            available: AtomicBool::new(true),
            quota_bytes: None,
        }
    }

    /// Limits the total size of keys plus values.
    pub fn with_quota(mut self, quota_bytes: usize) -> Self {
        self.quota_bytes = Some(quota_bytes);
        self
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_available(&self) -> Result<(), StorageError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StorageError::Unavailable("memory medium disabled".to_string()))
        }
    }
}

impl Default for MemoryMedium {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageMedium for MemoryMedium {
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check_available()?;
        let mut entries = self.entries();

        if let Some(quota) = self.quota_bytes {
            let used: usize = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            if used + key.len() + value.len() > quota {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                });
            }
        }

        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.check_available()?;
        Ok(self.entries().get(key).cloned())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.check_available()?;
        self.entries().remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.check_available()?;
        self.entries().clear();
        Ok(())
    }
}
