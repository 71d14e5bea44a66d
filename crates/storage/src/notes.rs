//! Per-domain markdown note accumulators maintained by the recycler.
//!
//! Append-only during a run; reset only when a new task starts. The
//! notes survive crashes and feed continuation prompts after a recycle.

use crate::StorageError;
use chrono::{DateTime, Utc};
use mar_core::clock::compact_timestamp;
use std::path::{Path, PathBuf};

/// Note domains. `TaskState` mirrors the plan; the rest accumulate
/// knowledge per engineering area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    Frontend,
    Backend,
    Database,
    Research,
    Decisions,
    TaskState,
}

mar_core::simple_display! {
    Domain {
        Frontend => "frontend",
        Backend => "backend",
        Database => "database",
        Research => "research",
        Decisions => "decisions",
        TaskState => "task_state",
    }
}

impl Domain {
    pub const ALL: [Domain; 6] = [
        Domain::Frontend,
        Domain::Backend,
        Domain::Database,
        Domain::Research,
        Domain::Decisions,
        Domain::TaskState,
    ];

    pub fn file_name(&self) -> &'static str {
        match self {
            Domain::Frontend => "frontend_context.md",
            Domain::Backend => "backend_context.md",
            Domain::Database => "database_context.md",
            Domain::Research => "research_context.md",
            Domain::Decisions => "decisions_context.md",
            Domain::TaskState => "task_state.md",
        }
    }

    fn header(&self) -> String {
        format!("# {} Context\n\n", self.to_string().to_uppercase())
    }
}

/// Markdown accumulators under `<workspace>/context/`.
#[derive(Debug, Clone)]
pub struct DomainNotes {
    context_dir: PathBuf,
}

impl DomainNotes {
    pub fn new(context_dir: impl Into<PathBuf>) -> Self {
        Self { context_dir: context_dir.into() }
    }

    pub fn context_dir(&self) -> &Path {
        &self.context_dir
    }

    fn path(&self, domain: Domain) -> PathBuf {
        self.context_dir.join(domain.file_name())
    }

    fn archive_dir(&self) -> PathBuf {
        self.context_dir.join("archive")
    }

    /// Create any missing note files with a fresh header.
    pub fn ensure(&self) -> Result<(), StorageError> {
        std::fs::create_dir_all(&self.context_dir)?;
        for domain in Domain::ALL {
            let path = self.path(domain);
            if !path.exists() {
                std::fs::write(&path, domain.header())?;
            }
        }
        Ok(())
    }

    /// Append timestamped content to a domain file.
    pub fn append(&self, domain: Domain, content: &str, epoch_ms: u64) -> Result<(), StorageError> {
        self.ensure()?;
        let stamp = DateTime::<Utc>::from_timestamp_millis(epoch_ms as i64)
            .map(|dt| dt.format("%H:%M:%S").to_string())
            .unwrap_or_default();
        let mut existing = std::fs::read_to_string(self.path(domain)).unwrap_or_default();
        existing.push_str(&format!("\n## [{stamp}]\n{content}\n"));
        std::fs::write(self.path(domain), existing)?;
        Ok(())
    }

    /// Full contents of a domain file; empty when missing.
    pub fn read(&self, domain: Domain) -> String {
        std::fs::read_to_string(self.path(domain)).unwrap_or_default()
    }

    /// Last `max_bytes` of a domain file, on a char boundary.
    pub fn tail(&self, domain: Domain, max_bytes: usize) -> String {
        let content = self.read(domain);
        if content.len() <= max_bytes {
            return content;
        }
        let mut start = content.len() - max_bytes;
        while start < content.len() && !content.is_char_boundary(start) {
            start += 1;
        }
        content[start..].to_string()
    }

    /// Reset a domain file to its fresh header.
    pub fn clear(&self, domain: Domain) -> Result<(), StorageError> {
        std::fs::create_dir_all(&self.context_dir)?;
        std::fs::write(self.path(domain), domain.header())?;
        Ok(())
    }

    /// Combined tail view across all domains with substantive content.
    pub fn combined_tail(&self, max_bytes_each: usize) -> String {
        let mut sections = Vec::new();
        for domain in Domain::ALL {
            let content = self.read(domain);
            if content.len() > 100 {
                sections.push(format!(
                    "### {}\n{}",
                    domain.to_string().to_uppercase(),
                    self.tail(domain, max_bytes_each)
                ));
            }
        }
        sections.join("\n\n")
    }

    /// Archive the current notes and reseed every domain for a new task.
    pub fn set_task(
        &self,
        objective: &str,
        steps: &[String],
        epoch_ms: u64,
    ) -> Result<(), StorageError> {
        self.ensure()?;
        self.archive_current(epoch_ms)?;
        for domain in Domain::ALL {
            self.clear(domain)?;
        }
        let task_id = compact_timestamp(epoch_ms);
        let mut state = format!("# Task: {task_id}\n\n**Objective:** {objective}\n\n**Steps:**\n");
        for step in steps {
            state.push_str(&format!("- [ ] {step}\n"));
        }
        std::fs::write(self.path(Domain::TaskState), state)?;
        Ok(())
    }

    /// Append a completion line to the task state.
    pub fn record_step_done(
        &self,
        step: &str,
        result: &str,
        epoch_ms: u64,
    ) -> Result<(), StorageError> {
        let mut summary = result.to_string();
        if summary.len() > 200 {
            let mut end = 200;
            while end > 0 && !summary.is_char_boundary(end) {
                end -= 1;
            }
            summary.truncate(end);
        }
        self.append(
            Domain::TaskState,
            &format!("Completed: {step}\nResult: {summary}"),
            epoch_ms,
        )
    }

    fn archive_current(&self, epoch_ms: u64) -> Result<(), StorageError> {
        let mut combined = String::new();
        for domain in Domain::ALL {
            let content = self.read(domain);
            if content.len() > 100 {
                combined.push_str(&content);
                combined.push('\n');
            }
        }
        if combined.is_empty() {
            return Ok(());
        }
        let archive_dir = self.archive_dir();
        std::fs::create_dir_all(&archive_dir)?;
        let path = archive_dir.join(format!("task_{}.md", compact_timestamp(epoch_ms)));
        std::fs::write(path, combined)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "notes_tests.rs"]
mod tests;
