//! Per-project file index.
//!
//! The read-back view offered to the dispatcher's context retrieval.
//! Every artifact written under a project appears here exactly once,
//! before the next step begins.

use crate::StorageError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One indexed file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub bytes: u64,
    /// Declared role in the project ("entrypoint", "paper", …), if any.
    /// Files with a role are exempt from the finalizer's stub sweep.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// Ordered map of relative path → record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileIndex {
    files: IndexMap<String, FileRecord>,
}

impl FileIndex {
    /// Load the index, or start empty when the file does not exist.
    pub fn load(path: &Path) -> Result<Self, StorageError> {
        match std::fs::read_to_string(path) {
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Persist with write-temp-then-rename.
    pub fn save(&self, path: &Path) -> Result<(), StorageError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_vec_pretty(self)?)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }

    /// Record a path. Idempotent: re-recording updates the byte count
    /// without creating a second entry.
    ///
    /// Returns true when the path was newly added.
    pub fn record(&mut self, rel_path: &str, bytes: u64) -> bool {
        match self.files.get_mut(rel_path) {
            Some(record) => {
                record.bytes = bytes;
                false
            }
            None => {
                self.files
                    .insert(rel_path.to_string(), FileRecord { bytes, role: None });
                true
            }
        }
    }

    pub fn set_role(&mut self, rel_path: &str, role: impl Into<String>) {
        if let Some(record) = self.files.get_mut(rel_path) {
            record.role = Some(role.into());
        }
    }

    pub fn has_role(&self, rel_path: &str) -> bool {
        self.files
            .get(rel_path)
            .map(|r| r.role.is_some())
            .unwrap_or(false)
    }

    pub fn contains(&self, rel_path: &str) -> bool {
        self.files.contains_key(rel_path)
    }

    /// How many times a path appears (0 or 1; the map makes >1 impossible).
    pub fn count(&self, rel_path: &str) -> usize {
        usize::from(self.files.contains_key(rel_path))
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    pub fn get(&self, rel_path: &str) -> Option<&FileRecord> {
        self.files.get(rel_path)
    }

    pub fn remove(&mut self, rel_path: &str) -> bool {
        self.files.shift_remove(rel_path).is_some()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[cfg(test)]
#[path = "file_index_tests.rs"]
mod tests;
