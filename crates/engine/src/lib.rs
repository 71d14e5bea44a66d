// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! mar-engine: the autonomous execution engine.
//!
//! One executor task per run drives planner → router → LLM → extractor
//! → sandbox → validator → critic → recycler → checkpoints. Pause and
//! stop are observed only at step boundaries; inner components never
//! raise past the executor.

pub mod critic;
pub mod executor;
pub mod finalize;
pub mod intake;
pub mod planner;
pub mod recycler;
pub mod router;
pub mod state;

pub use critic::{ContentType, Critic, Critique};
pub use executor::{Executor, ExecutorDeps, ExecutorHandle};
pub use planner::{PlanKind, Planner};
pub use recycler::Recycler;
pub use router::{assemble_prompt, route_step};
pub use state::{ExecutorState, PauseSnapshot, PlanModification};

use thiserror::Error;

/// Engine-level errors. Most failures inside a run are recovered and
/// logged; these surface only from setup paths or as the fatal cause in
/// an error report.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("planner produced no usable steps")]
    PlannerEmpty,
    #[error("llm error: {0}")]
    Llm(#[from] mar_adapters::LlmError),
    #[error("storage error: {0}")]
    Storage(#[from] mar_storage::StorageError),
    #[error("extract error: {0}")]
    Extract(#[from] mar_extract::ExtractError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("unknown checkpoint: {0}")]
    UnknownCheckpoint(String),
}
