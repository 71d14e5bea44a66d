//! Pessimistic critique of generated content.
//!
//! The critic hashes what it reviews and refuses to critique the same
//! content more than a fixed number of rounds per run. Without that cap
//! two imperfect revisions can ping-pong forever.

use mar_adapters::LlmClient;
use mar_core::{CriticConfig, Issue, Risk, Verdict};
use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use std::collections::HashMap;

/// What kind of content is under review; selects the critique prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Code,
    Plan,
    Business,
    Research,
    General,
}

/// Outcome of one critique round.
#[derive(Debug, Clone)]
pub struct Critique {
    pub issues: Vec<Issue>,
    pub verdict: Verdict,
    /// Minor/info issues parked for later.
    pub deferred: Vec<Issue>,
    pub note: Option<String>,
    pub round: u32,
}

impl Critique {
    fn pass(note: impl Into<String>, round: u32) -> Self {
        Self {
            issues: Vec::new(),
            verdict: Verdict::Pass,
            deferred: Vec::new(),
            note: Some(note.into()),
            round,
        }
    }
}

/// The pessimistic reviewer.
pub struct Critic {
    config: CriticConfig,
    rounds: Mutex<HashMap<String, u32>>,
    deferred: Mutex<Vec<Issue>>,
}

impl Critic {
    pub fn new(config: CriticConfig) -> Self {
        Self {
            config,
            rounds: Mutex::new(HashMap::new()),
            deferred: Mutex::new(Vec::new()),
        }
    }

    /// All minor/info issues parked during this run.
    pub fn deferred_issues(&self) -> Vec<Issue> {
        self.deferred.lock().clone()
    }

    /// Critique content. Over the per-hash round cap the critic returns
    /// a pass with a "max critique rounds reached" note instead of
    /// re-reviewing.
    pub async fn critique(
        &self,
        llm: &dyn LlmClient,
        content: &str,
        content_type: ContentType,
    ) -> Critique {
        let key = content_hash(content);
        let round = {
            let mut rounds = self.rounds.lock();
            let entry = rounds.entry(key).or_insert(0);
            *entry += 1;
            *entry
        };
        if round > self.config.max_rounds {
            return Critique::pass("max critique rounds reached - proceeding", round);
        }

        let prompt = critique_prompt(content, content_type);
        let response = match llm
            .call(&prompt, self.config.max_tokens, self.config.temperature)
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "critic llm call failed; passing");
                return Critique::pass(format!("critic unavailable: {e}"), round);
            }
        };

        let issues = parse_issues(&response);
        let verdict = Verdict::for_issues(&issues);
        let deferred: Vec<Issue> = issues
            .iter()
            .filter(|i| matches!(i.risk, Risk::Minor | Risk::Info))
            .cloned()
            .collect();
        self.deferred.lock().extend(deferred.iter().cloned());

        Critique {
            issues,
            verdict,
            deferred,
            note: None,
            round,
        }
    }
}

/// Short hash over the leading content, matching the loop-prevention
/// granularity: trailing drift does not defeat the cap.
fn content_hash(content: &str) -> String {
    let mut end = content.len().min(500);
    while end > 0 && !content.is_char_boundary(end) {
        end -= 1;
    }
    let digest = Sha256::digest(content[..end].as_bytes());
    let mut hex = String::with_capacity(16);
    for byte in digest.iter().take(8) {
        hex.push_str(&format!("{byte:02x}"));
    }
    hex
}

fn critique_prompt(content: &str, content_type: ContentType) -> String {
    let mut excerpt = content.to_string();
    if excerpt.len() > 4000 {
        let mut end = 4000;
        while end > 0 && !excerpt.is_char_boundary(end) {
            end -= 1;
        }
        excerpt.truncate(end);
    }

    let (opener, categories) = match content_type {
        ContentType::Code => (
            "You are a pessimistic code reviewer. Find REAL problems, not nitpicks.",
            "1. CRITICAL (must fix): bugs, security holes, data loss risks\n\
             2. MAJOR (should fix): performance issues, bad patterns\n\
             3. MINOR (nice to have): style, naming\n\
             4. INFO (just FYI): observations",
        ),
        ContentType::Plan => (
            "You are a pessimistic project critic. Challenge this plan.",
            "1. CRITICAL: impossible tasks, missing critical steps, circular dependencies\n\
             2. MAJOR: underestimated complexity, missing requirements\n\
             3. MINOR: organisation, redundancy\n\
             4. INFO: observations",
        ),
        ContentType::Business => (
            "You are a skeptical business advisor. Poke holes in this.",
            "1. CRITICAL: fatal flaws, unrealistic assumptions, legal risks\n\
             2. MAJOR: weak market fit, competition, scalability\n\
             3. MINOR: messaging, minor gaps\n\
             4. INFO: market observations",
        ),
        ContentType::Research => (
            "You are a skeptical researcher. Challenge these conclusions.",
            "1. CRITICAL: wrong conclusions, misinterpreted data, missing key sources\n\
             2. MAJOR: weak evidence, biased sampling, outdated sources\n\
             3. MINOR: depth, gaps\n\
             4. INFO: additional angles",
        ),
        ContentType::General => (
            "You are a pessimistic reviewer. Find problems with this.",
            "1. CRITICAL: must fix before proceeding\n\
             2. MAJOR: should address soon\n\
             3. MINOR: nice to have\n\
             4. INFO: observations",
        ),
    };

    format!(
        "{opener}\n\nCONTENT:\n{excerpt}\n\nFind issues in these categories:\n{categories}\n\n\
         For each issue, output:\nRISK: [critical/major/minor/info]\nTITLE: [short title]\n\
         DESCRIPTION: [what's wrong]\nFIX: [how to fix]\n---\n\n\
         Only flag real issues. If the content is actually good, report nothing."
    )
}

/// Parse `RISK:/TITLE:/DESCRIPTION:/FIX:` blocks separated by `---`.
fn parse_issues(response: &str) -> Vec<Issue> {
    let mut issues = Vec::new();
    for block in response.split("---") {
        let mut risk = None;
        let mut title = String::new();
        let mut description = String::new();
        let mut fix = String::new();
        for line in block.lines() {
            let line = line.trim();
            if let Some(rest) = line.strip_prefix("RISK:") {
                risk = Risk::parse(rest.trim_matches(|c| c == '[' || c == ']' || c == ' '));
            } else if let Some(rest) = line.strip_prefix("TITLE:") {
                title = rest.trim().to_string();
            } else if let Some(rest) = line.strip_prefix("DESCRIPTION:") {
                description = rest.trim().to_string();
            } else if let Some(rest) = line.strip_prefix("FIX:") {
                fix = rest.trim().to_string();
            }
        }
        if !title.is_empty() {
            issues.push(Issue {
                risk: risk.unwrap_or(Risk::Info),
                title,
                description,
                suggested_fix: fix,
            });
        }
    }
    issues
}

#[cfg(test)]
#[path = "critic_tests.rs"]
mod tests;
