//! The single authoritative executor state for a run.

use mar_core::{ProjectType, StepCategory};
use std::collections::VecDeque;

const LOG_RING_CAPACITY: usize = 200;

/// A queued plan mutation, applied by the executor at a step boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanModification {
    Add {
        index: Option<usize>,
        text: String,
        category: StepCategory,
    },
    Replace {
        index: usize,
        text: String,
        category: StepCategory,
    },
    Remove {
        index: usize,
    },
}

/// Snapshot taken when a pause is observed at a step boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PauseSnapshot {
    pub iteration: u32,
    pub pending_steps: Vec<String>,
}

/// Mutable run state. One instance per run, owned behind a mutex shared
/// with the control handle.
#[derive(Debug, Default)]
pub struct ExecutorState {
    pub running: bool,
    pub paused: bool,
    pub pause_reason: Option<String>,
    pub stop_requested: bool,
    pub iteration: u32,
    /// Separate counter so endless coding loops cannot starve the
    /// later phases.
    pub coding_iterations: u32,
    pub validation_retries: u32,
    pub project_type: Option<ProjectType>,
    pub pending_modifications: Vec<PlanModification>,
    pub pause_snapshot: Option<PauseSnapshot>,
    log: VecDeque<String>,
}

impl ExecutorState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a line to the bounded log ring.
    pub fn push_log(&mut self, line: impl Into<String>) {
        if self.log.len() == LOG_RING_CAPACITY {
            self.log.pop_front();
        }
        self.log.push_back(line.into());
    }

    pub fn log_lines(&self) -> Vec<String> {
        self.log.iter().cloned().collect()
    }

    /// Queue a plan modification for the executor to apply at the next
    /// step boundary.
    pub fn queue_modification(&mut self, modification: PlanModification) {
        self.pending_modifications.push(modification);
    }

    pub fn take_modifications(&mut self) -> Vec<PlanModification> {
        std::mem::take(&mut self.pending_modifications)
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
