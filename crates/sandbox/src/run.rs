//! Sandboxed command execution.
//!
//! The policy check happens before the spawner is touched, so a denied
//! command provably never reaches the OS process API (the `Spawner`
//! seam lets tests assert this with a counting double).

use crate::audit::CommandAudit;
use crate::policy::{check_command, sanitize_env};
use crate::result::{truncate, ExecResult, EXIT_SPAWN_FAILED, EXIT_TIMED_OUT};
use async_trait::async_trait;
use mar_core::SandboxConfig;
use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};

/// Raw outcome from a spawner implementation.
#[derive(Debug)]
pub enum SpawnOutcome {
    Exited {
        code: i32,
        stdout: Vec<u8>,
        stderr: Vec<u8>,
    },
    TimedOut,
    SpawnFailed(String),
}

/// Seam between the sandbox and the OS process API.
#[async_trait]
pub trait Spawner: Send + Sync {
    async fn spawn(
        &self,
        command: &str,
        cwd: &Path,
        env: &[(String, String)],
        timeout: Duration,
    ) -> SpawnOutcome;
}

/// Spawner backed by `tokio::process` running `sh -c`.
#[derive(Debug, Clone, Default)]
pub struct RealSpawner;

#[async_trait]
impl Spawner for RealSpawner {
    async fn spawn(
        &self,
        command: &str,
        cwd: &Path,
        env: &[(String, String)],
        timeout: Duration,
    ) -> SpawnOutcome {
        let mut cmd = tokio::process::Command::new("sh");
        cmd.arg("-c")
            .arg(command)
            .current_dir(cwd)
            .env_clear()
            .envs(env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => return SpawnOutcome::SpawnFailed(e.to_string()),
        };

        match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => SpawnOutcome::Exited {
                code: output.status.code().unwrap_or(-1),
                stdout: output.stdout,
                stderr: output.stderr,
            },
            Ok(Err(e)) => SpawnOutcome::SpawnFailed(e.to_string()),
            // kill_on_drop reaps the child when the future is dropped here
            Err(_) => SpawnOutcome::TimedOut,
        }
    }
}

/// The allow-listed subprocess runner.
pub struct Sandbox<S: Spawner = RealSpawner> {
    spawner: S,
    config: SandboxConfig,
    audit: CommandAudit,
}

impl Sandbox<RealSpawner> {
    pub fn new(config: SandboxConfig) -> Self {
        Self::with_spawner(RealSpawner, config)
    }
}

impl<S: Spawner> Sandbox<S> {
    pub fn with_spawner(spawner: S, config: SandboxConfig) -> Self {
        let history = config.history;
        Self {
            spawner,
            config,
            audit: CommandAudit::new(history),
        }
    }

    pub fn audit(&self) -> &CommandAudit {
        &self.audit
    }

    /// Run a command in `project_dir` with the configured timeout.
    pub async fn run(&self, command: &str, project_dir: &Path) -> ExecResult {
        self.run_with_timeout(
            command,
            project_dir,
            Duration::from_secs(self.config.timeout_secs),
        )
        .await
    }

    /// Run a command with an explicit per-call timeout.
    pub async fn run_with_timeout(
        &self,
        command: &str,
        project_dir: &Path,
        timeout: Duration,
    ) -> ExecResult {
        let result = self.run_inner(command, project_dir, timeout).await;
        if result.was_blocked() {
            tracing::warn!(command, stderr = %result.stderr, "command denied");
        } else {
            tracing::info!(
                command,
                exit_code = result.exit_code,
                duration_ms = result.duration_ms,
                "command finished"
            );
        }
        self.audit.record(&result);
        result
    }

    async fn run_inner(&self, command: &str, project_dir: &Path, timeout: Duration) -> ExecResult {
        if let Err(reason) = check_command(command) {
            return ExecResult::blocked(command, &reason);
        }

        if !project_dir.is_dir() {
            return ExecResult {
                ok: false,
                exit_code: EXIT_SPAWN_FAILED,
                stdout: String::new(),
                stderr: format!("directory does not exist: {}", project_dir.display()),
                command: command.to_string(),
                duration_ms: 0,
            };
        }

        let env = sanitize_env(std::env::vars());
        let start = Instant::now();
        let outcome = self.spawner.spawn(command, project_dir, &env, timeout).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        match outcome {
            SpawnOutcome::Exited { code, stdout, stderr } => {
                let stdout = String::from_utf8_lossy(&stdout);
                let stderr = String::from_utf8_lossy(&stderr);
                ExecResult {
                    ok: code == 0,
                    exit_code: code,
                    stdout: truncate(&stdout, self.config.max_stdout_bytes).to_string(),
                    stderr: truncate(&stderr, self.config.max_stderr_bytes).to_string(),
                    command: command.to_string(),
                    duration_ms,
                }
            }
            SpawnOutcome::TimedOut => ExecResult {
                ok: false,
                exit_code: EXIT_TIMED_OUT,
                stdout: String::new(),
                stderr: format!("command timed out after {}s", timeout.as_secs()),
                command: command.to_string(),
                duration_ms,
            },
            SpawnOutcome::SpawnFailed(e) => ExecResult {
                ok: false,
                exit_code: EXIT_SPAWN_FAILED,
                stdout: String::new(),
                stderr: e,
                command: command.to_string(),
                duration_ms,
            },
        }
    }
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
