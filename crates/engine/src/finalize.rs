//! Project consolidation at the end of a run.
//!
//! Removes stdlib-shadowing files and zero-content stubs, syntax-checks
//! what remains, and persists the review report under `.state/`.

use mar_extract::filters::is_shadow_or_junk;
use mar_extract::{check_file, has_placeholder_markers};
use mar_storage::{FileIndex, FileReview, ReviewReport, StorageError};
use std::path::Path;

/// Stubs below this size with no declared role are dropped.
const STUB_BYTES: u64 = 100;

const SOURCE_OR_MARKDOWN: &[&str] = &[
    "py", "js", "jsx", "ts", "tsx", "css", "html", "md", "markdown", "sh",
];

/// What consolidation did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FinalizeSummary {
    pub removed: Vec<String>,
    pub clean_files: Vec<String>,
    pub files_with_issues: Vec<String>,
    pub placeholder_files: Vec<String>,
}

/// Sweep the project: delete shadow/junk files and role-less stubs,
/// then syntax-check the survivors into a review report.
pub fn consolidate(
    project_dir: &Path,
    index: &mut FileIndex,
    timestamp_iso: String,
) -> Result<(FinalizeSummary, ReviewReport), StorageError> {
    let mut summary = FinalizeSummary::default();
    let mut reviews = Vec::new();

    let paths: Vec<String> = index.paths().map(str::to_string).collect();
    for rel in paths {
        let full = project_dir.join(&rel);
        let file_name = rel.rsplit('/').next().unwrap_or(&rel);
        let ext = rel
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
            .unwrap_or_default();

        if is_shadow_or_junk(file_name) {
            remove_file(&full);
            index.remove(&rel);
            summary.removed.push(rel);
            continue;
        }

        let size = std::fs::metadata(&full).map(|m| m.len()).unwrap_or(0);
        let is_stub = size < STUB_BYTES
            && SOURCE_OR_MARKDOWN.contains(&ext.as_str())
            && !index.has_role(&rel);
        if is_stub {
            remove_file(&full);
            index.remove(&rel);
            summary.removed.push(rel);
            continue;
        }

        let content = std::fs::read_to_string(&full).unwrap_or_default();
        if has_placeholder_markers(&content) {
            summary.placeholder_files.push(rel.clone());
        }
        let issues = check_file(&rel, &content);
        if issues.is_empty() {
            summary.clean_files.push(rel.clone());
        } else {
            summary.files_with_issues.push(rel.clone());
        }
        reviews.push(FileReview {
            file: rel,
            errors: issues
                .iter()
                .map(|i| format!("line {}: {}", i.line, i.message))
                .collect(),
            warnings: Vec::new(),
        });
    }

    let report = ReviewReport::new(timestamp_iso, reviews);
    Ok((summary, report))
}

fn remove_file(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        tracing::warn!(path = %path.display(), error = %e, "failed to remove file");
    }
}

#[cfg(test)]
#[path = "finalize_tests.rs"]
mod tests;
