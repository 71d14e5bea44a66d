//! Ordered plan of steps owned by the executor.
//!
//! The plan is mutable during execution (steps may be added, replaced,
//! removed); all mutation goes through the single executor task, so no
//! internal locking is needed here.

use crate::objective::Objective;
use crate::step::{Step, StepCategory, StepState};
use serde::{Deserialize, Serialize};

/// Ordered sequence of steps plus the owning objective.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    objective: Objective,
    steps: Vec<Step>,
}

impl Plan {
    pub fn new(objective: Objective, steps: Vec<Step>) -> Self {
        Self { objective, steps }
    }

    /// Rebuild a plan from checkpoint descriptors: completed step texts
    /// become done steps, pending texts become pending steps.
    pub fn from_descriptors(
        objective: Objective,
        completed: &[String],
        pending: &[String],
        categorize: impl Fn(&str) -> StepCategory,
    ) -> Self {
        let mut steps = Vec::with_capacity(completed.len() + pending.len());
        for text in completed {
            steps.push(Step::in_state(text, categorize(text), StepState::Done));
        }
        for text in pending {
            steps.push(Step::new(text, categorize(text)));
        }
        Self { objective, steps }
    }

    pub fn objective(&self) -> &Objective {
        &self.objective
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Index of the first pending step, if any.
    pub fn next_pending(&self) -> Option<usize> {
        self.steps.iter().position(Step::is_pending)
    }

    pub fn step(&self, index: usize) -> Option<&Step> {
        self.steps.get(index)
    }

    pub fn step_mut(&mut self, index: usize) -> Option<&mut Step> {
        self.steps.get_mut(index)
    }

    pub fn push(&mut self, step: Step) {
        self.steps.push(step);
    }

    pub fn insert(&mut self, index: usize, step: Step) {
        let index = index.min(self.steps.len());
        self.steps.insert(index, step);
    }

    /// Replace the step at `index`, returning the old step.
    pub fn replace(&mut self, index: usize, step: Step) -> Option<Step> {
        let slot = self.steps.get_mut(index)?;
        Some(std::mem::replace(slot, step))
    }

    pub fn remove(&mut self, index: usize) -> Option<Step> {
        if index < self.steps.len() {
            Some(self.steps.remove(index))
        } else {
            None
        }
    }

    pub fn pending_count(&self) -> usize {
        self.steps.iter().filter(|s| s.is_pending()).count()
    }

    pub fn done_count(&self) -> usize {
        self.steps.iter().filter(|s| s.is_done()).count()
    }

    /// Texts of all completed steps, in completion order.
    pub fn completed_texts(&self) -> Vec<String> {
        self.steps
            .iter()
            .filter(|s| s.is_done())
            .map(|s| s.text.clone())
            .collect()
    }

    /// Texts of all pending steps, in plan order.
    pub fn pending_texts(&self) -> Vec<String> {
        self.steps
            .iter()
            .filter(|s| s.is_pending())
            .map(|s| s.text.clone())
            .collect()
    }

    /// Abandon every pending coding step. Used when the coding-iteration
    /// cap is hit so later phases (git, deploy) still run.
    ///
    /// Returns the number of steps abandoned.
    pub fn abandon_pending_coding(&mut self) -> usize {
        let mut count = 0;
        for step in &mut self.steps {
            if step.is_pending() && step.category.is_coding() && step.abandon().is_ok() {
                count += 1;
            }
        }
        count
    }
}

#[cfg(test)]
#[path = "plan_tests.rs"]
mod tests;
