// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! mar-core: Core library for the Marathon (mar) autonomous executor

pub mod macros;

pub mod clock;
pub mod config;
pub mod event;
pub mod issue;
pub mod objective;
pub mod plan;
pub mod project;
pub mod slug;
pub mod step;

pub use clock::{compact_date, compact_timestamp, Clock, FakeClock, SystemClock};
pub use config::{
    ConfigError, CriticConfig, LlmConfig, MarathonConfig, PlannerConfig, RecycleConfig,
    RetrievalConfig, SandboxConfig,
};
pub use event::{ProgressEvent, ProgressKind, RunReport, RunStatus};
pub use issue::{Issue, Risk, Verdict};
pub use objective::{Objective, ObjectiveId};
pub use plan::Plan;
pub use project::ProjectType;
pub use step::{Step, StepCategory, StepError, StepState};
