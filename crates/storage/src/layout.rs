//! On-disk workspace layout.
//!
//! ```text
//! <workspace>/
//!   projects/<objective-slug>/          user-visible artifacts
//!     .state/                           engine-private per-project state
//!   context/                            domain notes (+ archive/)
//!   checkpoints/
//! ```

use std::path::{Path, PathBuf};

/// Resolves every engine path from a single workspace root.
#[derive(Debug, Clone)]
pub struct WorkspaceLayout {
    root: PathBuf,
}

impl WorkspaceLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn projects_dir(&self) -> PathBuf {
        self.root.join("projects")
    }

    pub fn project_dir(&self, slug: &str) -> PathBuf {
        self.projects_dir().join(slug)
    }

    /// Engine-private subtree inside a project.
    pub fn state_dir(&self, slug: &str) -> PathBuf {
        self.project_dir(slug).join(".state")
    }

    pub fn file_index_path(&self, slug: &str) -> PathBuf {
        self.state_dir(slug).join("file_index.json")
    }

    pub fn context_dir(&self) -> PathBuf {
        self.root.join("context")
    }

    pub fn archive_dir(&self) -> PathBuf {
        self.context_dir().join("archive")
    }

    pub fn checkpoints_dir(&self) -> PathBuf {
        self.root.join("checkpoints")
    }

    /// Create the base directories.
    pub fn ensure_base(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.projects_dir())?;
        std::fs::create_dir_all(self.archive_dir())?;
        std::fs::create_dir_all(self.checkpoints_dir())
    }
}

#[cfg(test)]
#[path = "layout_tests.rs"]
mod tests;
