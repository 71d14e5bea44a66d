//! Progress stream events and the structured run result.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Kind tag on a progress stream event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressKind {
    Progress,
    Log,
    Response,
    Error,
    Status,
}

crate::simple_display! {
    ProgressKind {
        Progress => "progress",
        Log => "log",
        Response => "response",
        Error => "error",
        Status => "status",
    }
}

/// One event on the broadcast stream. Events emitted from inside a step
/// are delivered in order relative to that step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub kind: ProgressKind,
    pub content: String,
}

impl ProgressEvent {
    pub fn progress(content: impl Into<String>) -> Self {
        Self { kind: ProgressKind::Progress, content: content.into() }
    }

    pub fn log(content: impl Into<String>) -> Self {
        Self { kind: ProgressKind::Log, content: content.into() }
    }

    pub fn response(content: impl Into<String>) -> Self {
        Self { kind: ProgressKind::Response, content: content.into() }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self { kind: ProgressKind::Error, content: content.into() }
    }

    pub fn status(content: impl Into<String>) -> Self {
        Self { kind: ProgressKind::Status, content: content.into() }
    }
}

/// Terminal status of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Complete,
    Error,
    Stopped,
}

crate::simple_display! {
    RunStatus {
        Complete => "complete",
        Error => "error",
        Stopped => "stopped",
    }
}

/// Structured result returned by the executor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub status: RunStatus,
    pub iterations: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment: Option<String>,
    #[serde(default)]
    pub log: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RunReport {
    pub fn new(status: RunStatus, iterations: u32) -> Self {
        Self {
            status,
            iterations,
            project_path: None,
            github_url: None,
            deployment: None,
            log: Vec::new(),
            error: None,
        }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
