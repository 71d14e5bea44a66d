// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! mar-extract: artifact recovery from model output, plus the advisory
//! validator.
//!
//! A response is parsed into file artifacts and `[COMMAND]:` lines.
//! Artifact paths pass the shadow/junk/escape filters, bodies get
//! trailing prose stripped, and writes go through the overwrite policy.
//! The validator's syntax pass and dependency audit emit findings that
//! feed repair prompts but never abort a run.

pub mod deps;
pub mod filters;
pub mod overwrite;
pub mod persist;
pub mod prose;
pub mod recover;
pub mod routing;
pub mod validate;

pub use deps::{DependencyAuditor, MissingModule};
pub use filters::check_path;
pub use overwrite::{decide, has_placeholder_markers, OverwriteDecision, PROTECTED_NAMES};
pub use persist::{persist_artifacts, PersistReport};
pub use recover::{extract, Artifact, Extraction};
pub use validate::{check_file, SyntaxIssue};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why an artifact or write was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    ShadowName,
    JunkFile,
    PathEscape,
    NoTarget,
    ForbiddenExtension,
    SmallerRewrite,
    ProtectedFile,
    PlaceholderContent,
}

mar_core::simple_display! {
    SkipReason {
        ShadowName => "stdlib-shadowing name",
        JunkFile => "junk file",
        PathEscape => "path escapes project root",
        NoTarget => "no filename and no routing target",
        ForbiddenExtension => "extension not allowed for project type",
        SmallerRewrite => "won't overwrite: much smaller than existing",
        ProtectedFile => "won't overwrite: protected file",
        PlaceholderContent => "won't overwrite: placeholder content",
    }
}

/// A refused artifact with its reason, surfaced on the progress stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skip {
    pub path: String,
    pub reason: SkipReason,
}

/// Errors from persisting artifacts.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage error: {0}")]
    Storage(#[from] mar_storage::StorageError),
}
