// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! mar-storage: durable state for a run.
//!
//! The domain notes, the plan inside checkpoints, and the checkpoints
//! themselves are jointly sufficient to resume after a crash. Everything
//! here is single-writer (the executor task).

pub mod checkpoint;
pub mod file_index;
pub mod layout;
pub mod notes;
pub mod review;

pub use checkpoint::{Checkpoint, CheckpointStore, CheckpointSummary, SCHEMA_VERSION};
pub use file_index::FileIndex;
pub use layout::WorkspaceLayout;
pub use notes::{Domain, DomainNotes};
pub use review::{FileReview, ReviewReport};

use thiserror::Error;

/// Errors from the storage layer.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
