//! User objective and its derived project identifier.

use crate::clock::{compact_date, Clock};
use crate::slug::slugify;
use serde::{Deserialize, Serialize};

/// Phrases that signal the user wants a fresh design rather than a
/// continuation of previously recorded research.
const FRESH_DESIGN_PHRASES: &[&str] = &[
    "novel",
    "invent",
    "propose a new",
    "propose new",
    "from scratch",
];

/// Filesystem-safe identifier derived from an objective: the first few
/// content words plus a date stamp (e.g. `analyze-business-industrial-20251221`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectiveId(String);

impl ObjectiveId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Rebuild an id from a previously derived string (checkpoint resume).
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for ObjectiveId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The user-supplied top-level goal. Immutable for the life of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Objective {
    text: String,
    id: ObjectiveId,
}

impl Objective {
    /// Create an objective, deriving its id from the text and the clock.
    pub fn new(text: impl Into<String>, clock: &impl Clock) -> Self {
        let text = text.into();
        let id = ObjectiveId(format!(
            "{}-{}",
            slugify(&text, 3),
            compact_date(clock.epoch_ms())
        ));
        Self { text, id }
    }

    /// Rebuild an objective with a known id (checkpoint resume).
    pub fn with_id(text: impl Into<String>, id: ObjectiveId) -> Self {
        Self { text: text.into(), id }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn id(&self) -> &ObjectiveId {
        &self.id
    }

    /// True when the phrasing asks for a novel design. The intake phase
    /// clears the research and decisions notes in that case so stale
    /// designs are not recycled into the new task.
    pub fn wants_fresh_design(&self) -> bool {
        let lower = self.text.to_lowercase();
        FRESH_DESIGN_PHRASES.iter().any(|p| lower.contains(p))
    }
}

#[cfg(test)]
#[path = "objective_tests.rs"]
mod tests;
