//! Sandbox execution results and the markdown feedback view fed back to
//! the model.

use serde::{Deserialize, Serialize};

/// Exit code reported when the policy denied the command.
pub const EXIT_BLOCKED: i32 = -1;
/// Exit code reported when the command hit its timeout.
pub const EXIT_TIMED_OUT: i32 = -2;
/// Exit code reported when the process could not be spawned.
pub const EXIT_SPAWN_FAILED: i32 = -3;

/// Outcome of one sandboxed command. Always returned, never raised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecResult {
    pub ok: bool,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub command: String,
    pub duration_ms: u64,
}

impl ExecResult {
    /// Result for a command the policy refused. The stderr carries the
    /// "blocked: <reason>" line surfaced on the progress stream.
    pub fn blocked(command: impl Into<String>, reason: &str) -> Self {
        Self {
            ok: false,
            exit_code: EXIT_BLOCKED,
            stdout: String::new(),
            stderr: format!("blocked: {reason}"),
            command: command.into(),
            duration_ms: 0,
        }
    }

    pub fn was_blocked(&self) -> bool {
        self.exit_code == EXIT_BLOCKED && self.stderr.starts_with("blocked: ")
    }

    pub fn timed_out(&self) -> bool {
        self.exit_code == EXIT_TIMED_OUT
    }

    /// Markdown command report for injection into the next prompt.
    pub fn feedback(&self) -> String {
        let status = if self.ok { "SUCCESS" } else { "FAILED" };
        let mut out = format!(
            "## Command: `{}`\n**Status**: {status}\n**Exit Code**: {}\n**Duration**: {}ms\n",
            self.command, self.exit_code, self.duration_ms
        );
        if !self.stdout.is_empty() {
            out.push_str("\n### Output:\n```\n");
            out.push_str(truncate(&self.stdout, 3_000));
            out.push_str("\n```\n");
        }
        if !self.stderr.is_empty() && !self.ok {
            out.push_str("\n### Errors:\n```\n");
            out.push_str(truncate(&self.stderr, 1_500));
            out.push_str("\n```\n");
        }
        out
    }

    /// Pattern scan over the combined output.
    pub fn signals(&self) -> OutputSignals {
        let combined = format!("{}\n{}", self.stdout, self.stderr).to_lowercase();
        let any = |needles: &[&str]| needles.iter().any(|n| combined.contains(n));
        OutputSignals {
            success_indicated: any(&["success", "completed", "done", "built", "passed"]),
            error_indicated: any(&["error", "failed", "exception", "traceback"]),
            warning_indicated: any(&["warning", "warn", "deprecated"]),
            tests_ran: any(&["passed", "failed", "tests", "assertions"]),
            server_started: any(&["listening", "running on", "started", "ready"]),
        }
    }
}

/// Common patterns detected in command output, used by the executor's
/// validation gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OutputSignals {
    pub success_indicated: bool,
    pub error_indicated: bool,
    pub warning_indicated: bool,
    pub tests_ran: bool,
    pub server_started: bool,
}

/// Truncate on a char boundary at most `max` bytes in.
pub(crate) fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

#[cfg(test)]
#[path = "result_tests.rs"]
mod tests;
