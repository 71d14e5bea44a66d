//! Persistence of the finalizer's code-review report under `.state/`.

use crate::StorageError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Findings for one reviewed file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileReview {
    pub file: String,
    #[serde(default)]
    pub errors: Vec<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
}

/// Project-wide review written at finalize time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewReport {
    pub timestamp: String,
    pub files_reviewed: Vec<FileReview>,
    pub total_errors: usize,
    pub total_warnings: usize,
    pub summary: String,
}

impl ReviewReport {
    pub fn new(timestamp: String, files: Vec<FileReview>) -> Self {
        let total_errors = files.iter().map(|f| f.errors.len()).sum();
        let total_warnings = files.iter().map(|f| f.warnings.len()).sum();
        let summary = format!(
            "{} files reviewed, {} errors, {} warnings",
            files.len(),
            total_errors,
            total_warnings
        );
        Self {
            timestamp,
            files_reviewed: files,
            total_errors,
            total_warnings,
            summary,
        }
    }

    /// Write `code_review.json` and `CODE_DOCUMENTATION.md` under the
    /// project's state dir.
    pub fn save(&self, state_dir: &Path) -> Result<(), StorageError> {
        std::fs::create_dir_all(state_dir)?;
        std::fs::write(
            state_dir.join("code_review.json"),
            serde_json::to_vec_pretty(self)?,
        )?;

        let mut doc = String::from("# Code Documentation\n\n");
        doc.push_str(&format!("*Generated: {}*\n\n{}\n", self.timestamp, self.summary));
        for file in &self.files_reviewed {
            doc.push_str(&format!("\n## {}\n", file.file));
            for error in &file.errors {
                doc.push_str(&format!("- error: {error}\n"));
            }
            for warning in &file.warnings {
                doc.push_str(&format!("- warning: {warning}\n"));
            }
            if file.errors.is_empty() && file.warnings.is_empty() {
                doc.push_str("- clean\n");
            }
        }
        std::fs::write(state_dir.join("CODE_DOCUMENTATION.md"), doc)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "review_tests.rs"]
mod tests;
