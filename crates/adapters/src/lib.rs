// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! mar-adapters: the engine's external collaborators behind narrow
//! traits.
//!
//! The engine consumes `LlmClient`, `RoleProvider`, `ContextRetriever`
//! and `PostOps` and never learns what sits behind them. Default
//! implementations live here; tests use the `test-support` fakes.

pub mod llm;
pub mod post;
pub mod retrieval;
pub mod roles;

#[cfg(any(test, feature = "test-support"))]
pub mod fake;

pub use llm::{HttpLlm, LlmClient, LlmError};
pub use post::{GitCli, NoopPostOps, PostOps, PostOpsError};
pub use retrieval::{ContextRetriever, IndexRetriever, RetrievalError};
pub use roles::{RoleProvider, SpecialistRole, StaticRoles};

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FailingLlm, FakeLlm, FakeRetriever};
