//! JSON file storage medium with atomic writes.
//!
//! The whole key/value map lives in one JSON object on disk. Every write goes
//! through a temporary file + fsync + rename, so a crash never leaves a
//! half-written map behind.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write as IoWrite;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use concepter_core::storage::{StorageError, StorageMedium};

type Entries = BTreeMap<String, String>;

/// Local storage backed by a single JSON file.
pub struct JsonFileMedium {
    path: PathBuf,
    /// Serializes read-modify-write cycles within this process.
    guard: Mutex<()>,
}

impl JsonFileMedium {
    /// Creates a medium backed by `path`. Nothing is touched on disk until the
    /// first operation.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            guard: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.guard.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Loads the map. A missing or blank file is an empty map.
    fn load(&self) -> Result<Entries, StorageError> {
        if !self.path.exists() {
            return Ok(Entries::new());
        }

        let content = fs::read_to_string(&self.path).map_err(io_error)?;
        if content.trim().is_empty() {
            return Ok(Entries::new());
        }

        serde_json::from_str(&content).map_err(|e| {
            StorageError::Serialization(format!("{}: {}", self.path.display(), e))
        })
    }

    /// Loads the map for a read-modify-write cycle.
    ///
    /// A file that does not parse is moved aside to `<name>.corrupt` and the
    /// cycle continues from an empty map, so the medium stays writable.
    fn load_for_write(&self) -> Result<Entries, StorageError> {
        match self.load() {
            Err(StorageError::Serialization(reason)) => {
                let quarantine = self.corrupt_path()?;
                tracing::warn!(
                    "[Storage] Unreadable storage file ({}), moving it to {}",
                    reason,
                    quarantine.display()
                );
                fs::rename(&self.path, &quarantine).map_err(io_error)?;
                Ok(Entries::new())
            }
            other => other,
        }
    }

    /// Writes the map atomically.
    fn save(&self, entries: &Entries) -> Result<(), StorageError> {
        let parent = self
            .path
            .parent()
            .ok_or_else(|| StorageError::Unavailable("path has no parent directory".to_string()))?;
        if !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| {
                StorageError::Unavailable(format!("{}: {}", parent.display(), e))
            })?;
        }

        let json = serde_json::to_string_pretty(entries)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        let tmp_path = self.temp_path()?;
        let mut tmp_file = File::create(&tmp_path).map_err(io_error)?;
        tmp_file.write_all(json.as_bytes()).map_err(io_error)?;
        tmp_file.sync_all().map_err(io_error)?;
        drop(tmp_file);

        fs::rename(&tmp_path, &self.path).map_err(io_error)?;
        Ok(())
    }

    fn temp_path(&self) -> Result<PathBuf, StorageError> {
        let file_name = self
            .path
            .file_name()
            .ok_or_else(|| StorageError::Unavailable("path has no file name".to_string()))?;
        let tmp_name = format!(".{}.tmp", file_name.to_string_lossy());
        Ok(self.path.with_file_name(tmp_name))
    }

    fn corrupt_path(&self) -> Result<PathBuf, StorageError> {
        let file_name = self
            .path
            .file_name()
            .ok_or_else(|| StorageError::Unavailable("path has no file name".to_string()))?;
        Ok(self
            .path
            .with_file_name(format!("{}.corrupt", file_name.to_string_lossy())))
    }

    fn update<F>(&self, f: F) -> Result<(), StorageError>
    where
        F: FnOnce(&mut Entries),
    {
        let _guard = self.lock();
        let mut entries = self.load_for_write()?;
        f(&mut entries);
        self.save(&entries)
    }
}

fn io_error(e: std::io::Error) -> StorageError {
    StorageError::Io(format!("{} (kind: {:?})", e, e.kind()))
}

impl StorageMedium for JsonFileMedium {
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.lock();
        Ok(self.load()?.remove(key))
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.update(|entries| {
            entries.remove(key);
        })
    }

    fn clear(&self) -> Result<(), StorageError> {
        let _guard = self.lock();
        self.save(&Entries::new())
    }
}
