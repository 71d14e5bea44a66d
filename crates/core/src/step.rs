//! Plan step and its lifecycle state machine.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Specialist category tag assigned by the planner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepCategory {
    Frontend,
    Backend,
    Research,
    Academic,
    Qa,
    Ops,
    Content,
    Business,
    Presentation,
    Core,
    Architecture,
}

impl StepCategory {
    /// Categories whose steps count against the coding-iteration cap.
    pub fn is_coding(&self) -> bool {
        matches!(
            self,
            StepCategory::Frontend | StepCategory::Backend | StepCategory::Core
        )
    }
}

crate::simple_display! {
    StepCategory {
        Frontend => "frontend",
        Backend => "backend",
        Research => "research",
        Academic => "academic",
        Qa => "qa",
        Ops => "ops",
        Content => "content",
        Business => "business",
        Presentation => "presentation",
        Core => "core",
        Architecture => "architecture",
    }
}

/// Lifecycle state of a step. A step transitions
/// pending → in-progress → (done | abandoned) exactly once per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepState {
    Pending,
    InProgress,
    Done,
    Abandoned,
}

crate::simple_display! {
    StepState {
        Pending => "pending",
        InProgress => "in-progress",
        Done => "done",
        Abandoned => "abandoned",
    }
}

/// Step transition errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StepError {
    #[error("invalid step transition {from} → {to}")]
    InvalidTransition { from: StepState, to: StepState },
}

/// One directive dispatched to one specialist role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub text: String,
    pub category: StepCategory,
    state: StepState,
}

impl Step {
    pub fn new(text: impl Into<String>, category: StepCategory) -> Self {
        Self {
            text: text.into(),
            category,
            state: StepState::Pending,
        }
    }

    /// Rebuild a step in a known state (checkpoint resume).
    pub fn in_state(text: impl Into<String>, category: StepCategory, state: StepState) -> Self {
        Self { text: text.into(), category, state }
    }

    pub fn state(&self) -> StepState {
        self.state
    }

    pub fn is_pending(&self) -> bool {
        self.state == StepState::Pending
    }

    pub fn is_done(&self) -> bool {
        self.state == StepState::Done
    }

    /// Move pending → in-progress.
    pub fn start(&mut self) -> Result<(), StepError> {
        self.transition(StepState::Pending, StepState::InProgress)
    }

    /// Move in-progress → done.
    pub fn finish(&mut self) -> Result<(), StepError> {
        self.transition(StepState::InProgress, StepState::Done)
    }

    /// Move pending or in-progress → abandoned.
    pub fn abandon(&mut self) -> Result<(), StepError> {
        match self.state {
            StepState::Pending | StepState::InProgress => {
                self.state = StepState::Abandoned;
                Ok(())
            }
            from => Err(StepError::InvalidTransition {
                from,
                to: StepState::Abandoned,
            }),
        }
    }

    fn transition(&mut self, from: StepState, to: StepState) -> Result<(), StepError> {
        if self.state != from {
            return Err(StepError::InvalidTransition { from: self.state, to });
        }
        self.state = to;
        Ok(())
    }
}

#[cfg(test)]
#[path = "step_tests.rs"]
mod tests;
