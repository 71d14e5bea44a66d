//! Critic findings: risk-ranked issues and the aggregate verdict.

use serde::{Deserialize, Serialize};

/// Risk categorization. Only `Critical` blocks the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Risk {
    Critical,
    Major,
    Minor,
    Info,
}

crate::simple_display! {
    Risk {
        Critical => "critical",
        Major => "major",
        Minor => "minor",
        Info => "info",
    }
}

impl Risk {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "critical" => Some(Risk::Critical),
            "major" => Some(Risk::Major),
            "minor" => Some(Risk::Minor),
            "info" => Some(Risk::Info),
            _ => None,
        }
    }
}

/// A single critic finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub risk: Risk,
    pub title: String,
    pub description: String,
    pub suggested_fix: String,
}

/// Aggregate recommendation for a critiqued piece of content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Pass,
    ReviewRequired,
    FixRequired,
}

crate::simple_display! {
    Verdict {
        Pass => "PASS",
        ReviewRequired => "REVIEW_REQUIRED",
        FixRequired => "FIX_REQUIRED",
    }
}

impl Verdict {
    /// ≥1 critical → FixRequired; ≥1 major → ReviewRequired; else Pass.
    pub fn for_issues(issues: &[Issue]) -> Self {
        if issues.iter().any(|i| i.risk == Risk::Critical) {
            Verdict::FixRequired
        } else if issues.iter().any(|i| i.risk == Risk::Major) {
            Verdict::ReviewRequired
        } else {
            Verdict::Pass
        }
    }

    /// Only FixRequired blocks; ReviewRequired produces warnings.
    pub fn blocks(&self) -> bool {
        *self == Verdict::FixRequired
    }
}

#[cfg(test)]
#[path = "issue_tests.rs"]
mod tests;
