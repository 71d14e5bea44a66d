//! Just-in-time context retrieval.
//!
//! The dispatcher asks for the subset of project files relevant to the
//! current step, capped at a token budget. It never loads the whole
//! project.

use crate::roles::SpecialistRole;
use async_trait::async_trait;
use mar_storage::FileIndex;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Retrieval seam. The engine does not prescribe the algorithm.
#[async_trait]
pub trait ContextRetriever: Send + Sync {
    async fn retrieve(
        &self,
        step_text: &str,
        role: SpecialistRole,
        project_dir: &Path,
        index: &FileIndex,
        budget_tokens: usize,
    ) -> Result<String, RetrievalError>;
}

/// Default retriever: score indexed files by keyword overlap with the
/// step text, then concatenate excerpts until the budget is spent.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndexRetriever;

const EXCERPT_LINES: usize = 40;

#[async_trait]
impl ContextRetriever for IndexRetriever {
    async fn retrieve(
        &self,
        step_text: &str,
        role: SpecialistRole,
        project_dir: &Path,
        index: &FileIndex,
        budget_tokens: usize,
    ) -> Result<String, RetrievalError> {
        let keywords: Vec<String> = step_text
            .to_lowercase()
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|w| w.len() > 2)
            .map(str::to_string)
            .collect();

        let mut scored: Vec<(usize, &str)> = index
            .paths()
            .map(|path| (score(path, &keywords, role), path))
            .filter(|(score, _)| *score > 0)
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(b.1)));

        let budget_chars = budget_tokens.saturating_mul(4);
        let mut out = String::new();
        for (_, path) in scored {
            if out.len() >= budget_chars {
                break;
            }
            let full = project_dir.join(path);
            let content = match std::fs::read_to_string(&full) {
                Ok(content) => content,
                // indexed but missing on disk: stale entry, skip
                Err(_) => continue,
            };
            let excerpt: String = content
                .lines()
                .take(EXCERPT_LINES)
                .collect::<Vec<_>>()
                .join("\n");
            let remaining = budget_chars - out.len();
            let mut section = format!("### {path}\n```\n{excerpt}\n```\n\n");
            if section.len() > remaining {
                section.truncate(floor_char_boundary(&section, remaining));
            }
            out.push_str(&section);
        }
        Ok(out)
    }
}

fn score(path: &str, keywords: &[String], role: SpecialistRole) -> usize {
    let lower = path.to_lowercase();
    let mut score = keywords.iter().filter(|k| lower.contains(k.as_str())).count() * 2;
    // role affinity keeps backend steps from pulling component files
    let role_hit = match role {
        SpecialistRole::Frontend => lower.starts_with("src/") || lower.ends_with(".css"),
        SpecialistRole::Backend => lower.starts_with("backend/"),
        SpecialistRole::Qa => lower.contains("test"),
        SpecialistRole::Research | SpecialistRole::Academic => {
            lower.ends_with(".md") || lower.starts_with("results/")
        }
        _ => false,
    };
    if role_hit {
        score += 1;
    }
    score
}

fn floor_char_boundary(s: &str, mut at: usize) -> usize {
    at = at.min(s.len());
    while at > 0 && !s.is_char_boundary(at) {
        at -= 1;
    }
    at
}

#[cfg(test)]
#[path = "retrieval_tests.rs"]
mod tests;
