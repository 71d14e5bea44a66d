//! Durable execution checkpoints.
//!
//! A checkpoint is never partially visible: records are written to a
//! temp file and atomically renamed into place. The loader skips
//! records it cannot parse or whose schema version it does not speak.

use crate::StorageError;
use mar_core::clock::compact_timestamp;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Schema version written into and required from every record.
pub const SCHEMA_VERSION: u32 = 1;

const FILE_PREFIX: &str = "checkpoint_";
const FILE_SUFFIX: &str = ".json";

/// Serialised execution snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Sortable id (`YYYYMMDD_HHMMSS`).
    pub id: String,
    /// ISO-8601 wall-clock time of the save.
    pub timestamp: String,
    pub objective: String,
    pub iteration: u32,
    pub completed_steps: Vec<String>,
    pub pending_steps: Vec<String>,
    pub project_path: Option<PathBuf>,
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
    pub schema_version: u32,
}

impl Checkpoint {
    pub fn new(
        objective: impl Into<String>,
        iteration: u32,
        completed_steps: Vec<String>,
        pending_steps: Vec<String>,
        project_path: Option<PathBuf>,
        epoch_ms: u64,
        timestamp_iso: String,
    ) -> Self {
        Self {
            id: compact_timestamp(epoch_ms),
            timestamp: timestamp_iso,
            objective: objective.into(),
            iteration,
            completed_steps,
            pending_steps,
            project_path,
            metadata: serde_json::Map::new(),
            schema_version: SCHEMA_VERSION,
        }
    }
}

/// Lightweight listing row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckpointSummary {
    pub id: String,
    pub timestamp: String,
    pub objective: String,
    pub iteration: u32,
    pub completed: usize,
    pub pending: usize,
}

/// Checkpoint directory manager. Retains the newest `keep` records.
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    dir: PathBuf,
    keep: usize,
}

impl CheckpointStore {
    pub fn new(dir: impl Into<PathBuf>, keep: usize) -> Self {
        Self { dir: dir.into(), keep: keep.max(1) }
    }

    /// Write a record atomically, then trim old records.
    pub fn save(&self, checkpoint: &Checkpoint) -> Result<String, StorageError> {
        std::fs::create_dir_all(&self.dir)?;
        let name = format!("{FILE_PREFIX}{}{FILE_SUFFIX}", checkpoint.id);
        let tmp = self.dir.join(format!("{name}.tmp"));
        std::fs::write(&tmp, serde_json::to_vec_pretty(checkpoint)?)?;
        std::fs::rename(&tmp, self.dir.join(&name))?;
        self.trim()?;
        Ok(checkpoint.id.clone())
    }

    /// The newest readable checkpoint, if any.
    pub fn latest(&self) -> Option<Checkpoint> {
        let mut names = self.file_names();
        names.sort();
        names.into_iter().rev().find_map(|n| self.load_file(&n))
    }

    /// Load a specific checkpoint by id.
    pub fn by_id(&self, id: &str) -> Option<Checkpoint> {
        self.load_file(&format!("{FILE_PREFIX}{id}{FILE_SUFFIX}"))
    }

    /// Summaries of all readable checkpoints, newest first.
    pub fn list(&self) -> Vec<CheckpointSummary> {
        let mut names = self.file_names();
        names.sort();
        names
            .into_iter()
            .rev()
            .filter_map(|n| self.load_file(&n))
            .map(|cp| {
                let mut objective = cp.objective;
                if objective.len() > 50 {
                    let mut end = 50;
                    while end > 0 && !objective.is_char_boundary(end) {
                        end -= 1;
                    }
                    objective.truncate(end);
                    objective.push_str("...");
                }
                CheckpointSummary {
                    id: cp.id,
                    timestamp: cp.timestamp,
                    objective,
                    iteration: cp.iteration,
                    completed: cp.completed_steps.len(),
                    pending: cp.pending_steps.len(),
                }
            })
            .collect()
    }

    /// Delete one checkpoint. Returns true when a file was removed.
    pub fn delete(&self, id: &str) -> bool {
        std::fs::remove_file(self.dir.join(format!("{FILE_PREFIX}{id}{FILE_SUFFIX}"))).is_ok()
    }

    /// Delete all checkpoints. Returns the number removed.
    pub fn clear(&self) -> usize {
        let mut count = 0;
        for name in self.file_names() {
            if std::fs::remove_file(self.dir.join(name)).is_ok() {
                count += 1;
            }
        }
        count
    }

    fn file_names(&self) -> Vec<String> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(_) => return Vec::new(),
        };
        entries
            .filter_map(|e| e.ok())
            .filter_map(|e| e.file_name().into_string().ok())
            .filter(|n| n.starts_with(FILE_PREFIX) && n.ends_with(FILE_SUFFIX))
            .collect()
    }

    fn load_file(&self, name: &str) -> Option<Checkpoint> {
        let raw = std::fs::read_to_string(self.dir.join(name)).ok()?;
        let checkpoint: Checkpoint = match serde_json::from_str(&raw) {
            Ok(cp) => cp,
            Err(e) => {
                tracing::warn!(file = name, error = %e, "skipping unreadable checkpoint");
                return None;
            }
        };
        if checkpoint.schema_version != SCHEMA_VERSION {
            tracing::warn!(
                file = name,
                version = checkpoint.schema_version,
                "skipping checkpoint with unknown schema version"
            );
            return None;
        }
        Some(checkpoint)
    }

    fn trim(&self) -> Result<(), StorageError> {
        let mut names = self.file_names();
        if names.len() <= self.keep {
            return Ok(());
        }
        names.sort();
        let excess = names.len() - self.keep;
        for name in names.into_iter().take(excess) {
            if let Err(e) = std::fs::remove_file(self.dir.join(&name)) {
                tracing::warn!(file = name, error = %e, "failed to trim checkpoint");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "checkpoint_tests.rs"]
mod tests;
