//! Run configuration.
//!
//! Every tunable the engine reads (token budgets, retry caps, recycle
//! threshold, sandbox limits) lives here and is passed into the
//! executor explicitly. Nothing reads process-global state.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Context recycling budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecycleConfig {
    /// Maximum conversation tokens before compression is forced.
    pub max_tokens: usize,
    /// Fraction of `max_tokens` at which recycling triggers (inclusive).
    pub threshold: f64,
    /// Bytes of each domain note included in a continuation prompt.
    pub note_tail_bytes: usize,
}

impl Default for RecycleConfig {
    fn default() -> Self {
        Self {
            max_tokens: 32_768,
            threshold: 0.75,
            note_tail_bytes: 3_000,
        }
    }
}

/// Sandbox execution limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    pub timeout_secs: u64,
    pub max_stdout_bytes: usize,
    pub max_stderr_bytes: usize,
    /// Commands retained in the audit ring buffer.
    pub history: usize,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 120,
            max_stdout_bytes: 10_000,
            max_stderr_bytes: 5_000,
            history: 50,
        }
    }
}

/// Planner behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Minimum parsed steps before the one-shot "minimum N steps" retry,
    /// for complex/business objectives.
    pub complex_min_steps: usize,
    /// Minimum parsed steps for all other objectives.
    pub default_min_steps: usize,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            complex_min_steps: 40,
            default_min_steps: 10,
            max_tokens: 3_000,
            temperature: 0.5,
        }
    }
}

/// Critic behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CriticConfig {
    /// Critique rounds allowed per content hash before auto-pass.
    pub max_rounds: u32,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for CriticConfig {
    fn default() -> Self {
        Self {
            max_rounds: 2,
            max_tokens: 2_000,
            temperature: 0.4,
        }
    }
}

/// Just-in-time context retrieval budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub budget_tokens: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { budget_tokens: 1_500 }
    }
}

/// LLM endpoint settings consumed by the default HTTP client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub endpoint: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:1234/v1/chat/completions".to_string(),
            model: "local-model".to_string(),
            max_tokens: 4_096,
            temperature: 0.7,
            timeout_secs: 300,
        }
    }
}

/// Top-level configuration for one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarathonConfig {
    /// Hard cap on loop iterations.
    pub max_iterations: u32,
    /// Separate cap on coding iterations; hitting it abandons remaining
    /// coding steps but lets later phases run.
    pub max_coding_iterations: u32,
    /// Repair prompts allowed per step for validator findings.
    pub validation_retry_cap: u32,
    /// Failed LLM call retries per step.
    pub llm_retry_cap: u32,
    /// Iterations between checkpoint writes.
    pub checkpoint_interval: u32,
    /// Checkpoints retained on disk.
    pub checkpoint_keep: usize,
    pub recycle: RecycleConfig,
    pub sandbox: SandboxConfig,
    pub planner: PlannerConfig,
    pub critic: CriticConfig,
    pub retrieval: RetrievalConfig,
    pub llm: LlmConfig,
}

impl Default for MarathonConfig {
    fn default() -> Self {
        Self {
            max_iterations: 60,
            max_coding_iterations: 30,
            validation_retry_cap: 2,
            llm_retry_cap: 2,
            checkpoint_interval: 5,
            checkpoint_keep: 10,
            recycle: RecycleConfig::default(),
            sandbox: SandboxConfig::default(),
            planner: PlannerConfig::default(),
            critic: CriticConfig::default(),
            retrieval: RetrievalConfig::default(),
            llm: LlmConfig::default(),
        }
    }
}

impl MarathonConfig {
    /// Load from a TOML file. Missing keys fall back to defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
