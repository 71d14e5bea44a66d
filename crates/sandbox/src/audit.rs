//! Ring buffer of recently executed commands for audit and prompt context.

use crate::result::ExecResult;
use parking_lot::Mutex;
use std::collections::VecDeque;

/// One audit entry. Output is dropped; the result line is enough for
/// audit and context purposes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEntry {
    pub command: String,
    pub ok: bool,
    pub exit_code: i32,
    pub duration_ms: u64,
    pub error_line: Option<String>,
}

/// Fixed-capacity command history.
pub struct CommandAudit {
    entries: Mutex<VecDeque<AuditEntry>>,
    capacity: usize,
}

impl CommandAudit {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity.min(64))),
            capacity: capacity.max(1),
        }
    }

    pub fn record(&self, result: &ExecResult) {
        let error_line = if result.ok {
            None
        } else {
            result.stderr.lines().next().map(|l| {
                let mut line = l.to_string();
                line.truncate(100);
                line
            })
        };
        let mut entries = self.entries.lock();
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(AuditEntry {
            command: result.command.clone(),
            ok: result.ok,
            exit_code: result.exit_code,
            duration_ms: result.duration_ms,
            error_line,
        });
    }

    /// The most recent `limit` entries, oldest first.
    pub fn recent(&self, limit: usize) -> Vec<AuditEntry> {
        let entries = self.entries.lock();
        let skip = entries.len().saturating_sub(limit);
        entries.iter().skip(skip).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Markdown view of the last five commands for prompt injection.
    pub fn history_context(&self) -> String {
        let recent = self.recent(5);
        if recent.is_empty() {
            return "No commands executed yet.".to_string();
        }
        let mut out = String::from("## Recent Commands\n");
        for entry in recent {
            let mark = if entry.ok { "ok" } else { "failed" };
            out.push_str(&format!(
                "- [{mark}] `{}` ({}ms)\n",
                entry.command, entry.duration_ms
            ));
            if let Some(err) = &entry.error_line {
                out.push_str(&format!("  error: {err}\n"));
            }
        }
        out
    }
}

#[cfg(test)]
#[path = "audit_tests.rs"]
mod tests;
