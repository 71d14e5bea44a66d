//! Context-window recycling.
//!
//! The recycler tracks cumulative conversation tokens and, at the
//! threshold, compresses progress into a ≤500-word summary, files it
//! into the domain notes, and hands back a continuation prompt that
//! reseeds a fresh conversation.

use mar_adapters::LlmClient;
use mar_core::{Objective, RecycleConfig};
use mar_storage::{Domain, DomainNotes, StorageError};

/// Rough token estimate: four characters per token.
pub fn count_tokens(text: &str) -> usize {
    text.len() / 4
}

/// Keyword routing of a recycle summary into area domains.
const SUMMARY_ROUTES: &[(&[&str], Domain)] = &[
    (&["frontend", "react", "ui"], Domain::Frontend),
    (&["backend", "api", "server"], Domain::Backend),
    (&["database", "schema", "table"], Domain::Database),
];

/// Token accountant plus note-keeper for one run.
pub struct Recycler {
    notes: DomainNotes,
    config: RecycleConfig,
    tokens: usize,
}

impl Recycler {
    pub fn new(notes: DomainNotes, config: RecycleConfig) -> Self {
        Self { notes, config, tokens: 0 }
    }

    pub fn notes(&self) -> &DomainNotes {
        &self.notes
    }

    /// Bump the running token count.
    pub fn observe(&mut self, tokens: usize) {
        self.tokens += tokens;
    }

    pub fn current_tokens(&self) -> usize {
        self.tokens
    }

    /// True at or past `threshold × max` (boundary inclusive).
    pub fn needs_recycle(&self) -> bool {
        self.tokens >= self.threshold_tokens()
    }

    fn threshold_tokens(&self) -> usize {
        (self.config.max_tokens as f64 * self.config.threshold) as usize
    }

    /// Append to a domain note file.
    pub fn save_to_domain(
        &self,
        domain: Domain,
        text: &str,
        epoch_ms: u64,
    ) -> Result<(), StorageError> {
        self.notes.append(domain, text, epoch_ms)
    }

    /// Start a new task: archive the previous one, reseed the notes,
    /// zero the token count.
    pub fn set_task(
        &mut self,
        objective: &Objective,
        steps: &[String],
        epoch_ms: u64,
    ) -> Result<(), StorageError> {
        self.tokens = 0;
        self.notes.set_task(objective.text(), steps, epoch_ms)
    }

    /// Record a completed step into the task state.
    pub fn mark_step_complete(
        &self,
        step: &str,
        result: &str,
        epoch_ms: u64,
    ) -> Result<(), StorageError> {
        self.notes.record_step_done(step, result, epoch_ms)
    }

    /// The compression step. Returns the continuation prompt.
    pub async fn recycle(
        &mut self,
        llm: &dyn LlmClient,
        objective: &Objective,
        completed: &[String],
        pending: &[String],
        epoch_ms: u64,
    ) -> Result<String, StorageError> {
        tracing::info!(
            tokens = self.tokens,
            threshold = self.threshold_tokens(),
            "context threshold reached, recycling"
        );

        let summary_prompt = summary_prompt(objective, completed, pending);
        let summary = match llm.call(&summary_prompt, 1_024, 0.3).await {
            Ok(summary) => summary,
            // a failed summary must not wedge the run at the threshold
            Err(e) => {
                tracing::warn!(error = %e, "summary call failed, recycling without it");
                format!("(summary unavailable: {e})")
            }
        };

        self.notes.append(
            Domain::Decisions,
            &format!("### RECYCLE SUMMARY\n{summary}"),
            epoch_ms,
        )?;

        let lower = summary.to_lowercase();
        for (keywords, domain) in SUMMARY_ROUTES {
            if keywords.iter().any(|k| lower.contains(k)) {
                let mut excerpt = summary.clone();
                if excerpt.len() > 1_000 {
                    let mut end = 1_000;
                    while end > 0 && !excerpt.is_char_boundary(end) {
                        end -= 1;
                    }
                    excerpt.truncate(end);
                }
                self.notes.append(*domain, &excerpt, epoch_ms)?;
            }
        }

        // fresh conversation
        self.tokens = 0;

        let continuation = self.continuation_prompt(objective, &summary, pending);
        self.observe(count_tokens(&continuation));
        Ok(continuation)
    }

    fn continuation_prompt(
        &self,
        objective: &Objective,
        summary: &str,
        pending: &[String],
    ) -> String {
        let pending_list: String = pending.iter().map(|s| format!("- {s}\n")).collect();
        let domain_context = self.notes.combined_tail(self.config.note_tail_bytes);
        format!(
            "Continue this task from where it left off.\n\n## OBJECTIVE\n{}\n\n\
             ## PROGRESS SUMMARY\n{summary}\n\n## REMAINING STEPS\n{pending_list}\n\
             ## SAVED CONTEXT\n{domain_context}\n\n\
             Continue working on the next step. Do not repeat completed work.",
            objective.text()
        )
    }
}

fn summary_prompt(objective: &Objective, completed: &[String], pending: &[String]) -> String {
    let total = completed.len() + pending.len();
    let completed_list: String = completed.iter().map(|s| format!("- {s}\n")).collect();
    let pending_list: String = pending.iter().map(|s| format!("- {s}\n")).collect();
    format!(
        "Summarize the work done so far on this task.\n\nOBJECTIVE: {}\n\n\
         COMPLETED STEPS ({}/{total}):\n{completed_list}\nREMAINING STEPS:\n{pending_list}\n\
         Create a brief summary (under 500 words) that captures:\n\
         1. What was accomplished\n2. Key decisions made\n3. Any blockers or issues\n\
         4. Current state of each component (frontend/backend/database)\n\n\
         Output the summary directly, no formatting.",
        objective.text(),
        completed.len()
    )
}

#[cfg(test)]
#[path = "recycler_tests.rs"]
mod tests;
