//! Entry collection persistence
//!
//! Saving uses an atomic write (temp file, fsync, rename) so a crash
//! never leaves a half-written collection behind. Loading treats a
//! missing or malformed file as an empty collection.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::warn;

use super::error::StorageError;
use crate::config::Config;
use crate::models::Entry;

/// File-backed store for the mirrored entry collection
pub struct LocalStore {
    path: PathBuf,
}

impl LocalStore {
    /// Create a store backed by the configured data directory
    pub fn new(config: &Config) -> Self {
        Self {
            path: config.entries_path(),
        }
    }

    /// Create a store backed by a specific file
    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    /// Path of the underlying file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a collection has been saved before
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load the persisted collection
    ///
    /// A missing file is an empty collection. So is a file that no
    /// longer parses: the mirror is replaceable state, and the next
    /// successful save overwrites it.
    pub fn load(&self) -> Vec<Entry> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(_) => return Vec::new(),
        };

        match serde_json::from_str(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "stored entries are malformed, starting empty"
                );
                Vec::new()
            }
        }
    }

    /// Overwrite the persisted collection atomically
    pub fn save(&self, entries: &[Entry]) -> Result<(), StorageError> {
        let data = serde_json::to_vec_pretty(entries)?;
        atomic_write(&self.path, &data)
    }
}

/// Write data to a file atomically
///
/// 1. Write to a temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
fn atomic_write(path: &Path, data: &[u8]) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| StorageError::CreateDirectory {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let temp_path = path.with_extension("tmp");

    let mut file = File::create(&temp_path).map_err(|source| StorageError::WriteError {
        path: temp_path.clone(),
        source,
    })?;

    file.write_all(data)
        .map_err(|source| StorageError::WriteError {
            path: temp_path.clone(),
            source,
        })?;

    file.sync_all().map_err(|source| StorageError::WriteError {
        path: temp_path.clone(),
        source,
    })?;

    fs::rename(&temp_path, path).map_err(|source| StorageError::AtomicWriteFailed {
        from: temp_path,
        to: path.to_path_buf(),
        source,
    })
}
