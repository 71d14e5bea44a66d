// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! mar-sandbox: allow-listed subprocess runner for generated commands.
//!
//! Commands pass a four-layer deny check before any process is spawned:
//! blocked commands, blocked patterns, blocked keywords, then a strict
//! allow-list on the leading token. Denials, timeouts, and non-zero
//! exits are all reported as results, never raised; the engine never
//! aborts a run because of a sandbox failure.

pub mod audit;
pub mod policy;
pub mod result;
pub mod run;

pub use audit::CommandAudit;
pub use policy::{check_command, sanitize_env};
pub use result::{ExecResult, OutputSignals, EXIT_BLOCKED, EXIT_SPAWN_FAILED, EXIT_TIMED_OUT};
pub use run::{RealSpawner, Sandbox, SpawnOutcome, Spawner};
