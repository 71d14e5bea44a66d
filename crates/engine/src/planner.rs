//! Objective planning: classification, prompt shaping, and permissive
//! step parsing.

use crate::EngineError;
use mar_adapters::LlmClient;
use mar_core::{Objective, PlannerConfig, Step, StepCategory};

/// Coarse classification of an objective, driving plan granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanKind {
    /// Deep-work plans: each step names one file to produce, COMPLETE.
    ComplexBusiness,
    /// Fixed research output set.
    Research,
    /// Granular general plans.
    General,
}

const COMPLEX_KEYWORDS: &[&str] = &[
    "business", "startup", "market", "saas", "platform", "product", "company", "fullstack",
    "full-stack", "web app",
];

const RESEARCH_KEYWORDS: &[&str] = &[
    "research", "paper", "study", "hypothesis", "benchmark", "novel", "analyze",
];

/// Keyword table mapping step text to a category. First hit wins.
const CATEGORY_TABLE: &[(&[&str], StepCategory)] = &[
    (
        &["test", "lint", "qa", "verify", "validate"],
        StepCategory::Qa,
    ),
    (
        &["deploy", "docker", "ci/cd", "pipeline", "git", "release"],
        StepCategory::Ops,
    ),
    (
        &["ui", "component", "css", "react", "frontend", "landing", "page", "style"],
        StepCategory::Frontend,
    ),
    (
        &["api", "endpoint", "database", "auth", "server", "backend", "schema", "migration"],
        StepCategory::Backend,
    ),
    (
        &["paper", "citation", "literature", "glossary", "abstract"],
        StepCategory::Academic,
    ),
    (
        &["research", "investigate", "sources", "trends", "survey"],
        StepCategory::Research,
    ),
    (
        &["market", "strategy", "pricing", "competitor", "revenue"],
        StepCategory::Business,
    ),
    (
        &["slide", "pitch", "deck", "presentation"],
        StepCategory::Presentation,
    ),
    (
        &["architecture", "design the", "structure", "diagram"],
        StepCategory::Architecture,
    ),
    (
        &["write", "copy", "blog", "readme", "document"],
        StepCategory::Content,
    ),
];

/// Classify an objective into a plan kind.
pub fn classify_objective(text: &str) -> PlanKind {
    let lower = text.to_lowercase();
    if RESEARCH_KEYWORDS.iter().any(|k| lower.contains(k)) {
        PlanKind::Research
    } else if COMPLEX_KEYWORDS.iter().any(|k| lower.contains(k)) {
        PlanKind::ComplexBusiness
    } else {
        PlanKind::General
    }
}

/// Categorize a step by keyword. Defaults to `Core`.
pub fn categorize_step(text: &str) -> StepCategory {
    let lower = text.to_lowercase();
    for (keywords, category) in CATEGORY_TABLE {
        if keywords.iter().any(|k| lower.contains(k)) {
            return *category;
        }
    }
    StepCategory::Core
}

/// Turns an objective into an ordered list of steps.
pub struct Planner {
    config: PlannerConfig,
}

impl Planner {
    pub fn new(config: PlannerConfig) -> Self {
        Self { config }
    }

    /// Ask the model for a plan. Retries once with an explicit minimum
    /// when the parse comes back short.
    pub async fn plan(
        &self,
        llm: &dyn LlmClient,
        objective: &Objective,
    ) -> Result<Vec<Step>, EngineError> {
        let kind = classify_objective(objective.text());
        let minimum = match kind {
            PlanKind::ComplexBusiness => self.config.complex_min_steps,
            _ => self.config.default_min_steps,
        };

        let prompt = self.plan_prompt(objective, kind, None);
        let response = llm
            .call(&prompt, self.config.max_tokens, self.config.temperature)
            .await
            .unwrap_or_default();
        let mut texts = parse_steps(&response);

        if texts.len() < minimum {
            tracing::info!(
                parsed = texts.len(),
                minimum,
                "plan came back short, retrying with explicit minimum"
            );
            let retry_prompt = self.plan_prompt(objective, kind, Some(minimum));
            let retry = llm
                .call(&retry_prompt, self.config.max_tokens, self.config.temperature)
                .await
                .unwrap_or_default();
            let retry_texts = parse_steps(&retry);
            if retry_texts.len() > texts.len() {
                texts = retry_texts;
            }
        }

        if texts.is_empty() {
            return Err(EngineError::PlannerEmpty);
        }

        Ok(texts
            .into_iter()
            .map(|text| {
                let category = categorize_step(&text);
                Step::new(text, category)
            })
            .collect())
    }

    /// Re-parse a revised plan response (used after a plan critique).
    pub fn steps_from_response(&self, response: &str) -> Vec<Step> {
        parse_steps(response)
            .into_iter()
            .map(|text| {
                let category = categorize_step(&text);
                Step::new(text, category)
            })
            .collect()
    }

    fn plan_prompt(&self, objective: &Objective, kind: PlanKind, minimum: Option<usize>) -> String {
        let shape = match kind {
            PlanKind::ComplexBusiness => {
                "Produce 10-20 deep-work steps. Each step names exactly ONE file to \
                 produce and the word COMPLETE, e.g. \"Create backend/api.py COMPLETE \
                 with all endpoints\"."
            }
            PlanKind::Research => {
                "Produce 10-15 steps covering, as complete files: a glossary, the \
                 algorithm, the data, a simulation or benchmark, the analysis, and the \
                 paper. Each step produces one COMPLETE file."
            }
            PlanKind::General => {
                "Produce 20-50 small, concrete steps. One action per step, in \
                 execution order."
            }
        };
        let floor = minimum
            .map(|n| format!("\nYou MUST produce a minimum of {n} steps."))
            .unwrap_or_default();
        format!(
            "Plan the execution of this objective.\n\nOBJECTIVE: {}\n\n{shape}{floor}\n\n\
             Output the steps as a numbered list, one step per line. No prose before \
             or after the list.",
            objective.text()
        )
    }
}

/// Parse steps out of a planning response.
///
/// Deliberately permissive: numbered lines, bullets, bold headers and
/// bracket-prefixed lines all count. Pure section headers (short lines
/// ending in ':') are rejected.
pub fn parse_steps(response: &str) -> Vec<String> {
    let mut steps = Vec::new();
    for line in response.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with("```") {
            continue;
        }

        let stripped = strip_markers(trimmed);
        if stripped.is_empty() {
            continue;
        }
        // a pure section header: short, ends with ':', no sentence body
        if stripped.ends_with(':') && stripped.split_whitespace().count() <= 4 {
            continue;
        }
        // require either a list marker or a bracket tag; bare prose lines
        // between list items are narration
        if stripped == trimmed && !trimmed.starts_with('[') {
            continue;
        }
        steps.push(stripped.to_string());
    }
    steps
}

/// Strip leading list markers: `1.`, `1)`, `-`, `*`, `**bold**`.
fn strip_markers(line: &str) -> &str {
    let mut s = line;
    // bold wrapper
    if s.starts_with("**") && s.ends_with("**") && s.len() > 4 {
        s = &s[2..s.len() - 2];
    }
    // numbered markers
    let digits = s.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        let rest = &s[digits..];
        if let Some(rest) = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')')) {
            return rest.trim();
        }
    }
    // bullets
    if let Some(rest) = s.strip_prefix("- ").or_else(|| s.strip_prefix("* ")) {
        return rest.trim();
    }
    s.trim()
}

#[cfg(test)]
#[path = "planner_tests.rs"]
mod tests;
