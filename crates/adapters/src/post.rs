//! Post-execution collaborators: version control, remote repos,
//! deployment. Invoked only from the executor's post phases; every
//! failure is logged by the caller and never fatal.

use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PostOpsError {
    #[error("{command} failed: {detail}")]
    Command { command: String, detail: String },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Best-effort post-phase verbs.
#[async_trait]
pub trait PostOps: Send + Sync {
    /// Initialise a repository in the project (if needed) and commit
    /// everything.
    async fn git_init_and_commit(&self, project_dir: &Path, message: &str)
        -> Result<(), PostOpsError>;

    /// Create a remote repository and push. Returns the remote URL when
    /// one was created.
    async fn create_remote_repo(
        &self,
        project_dir: &Path,
        name: &str,
    ) -> Result<Option<String>, PostOpsError>;

    /// Deploy a frontend build. Returns the deployment URL when one
    /// was made.
    async fn deploy_frontend(&self, project_dir: &Path) -> Result<Option<String>, PostOpsError>;
}

const GIT_TIMEOUT: Duration = Duration::from_secs(30);

/// PostOps backed by the local `git` binary. Remote creation and
/// deployment need host credentials and stay unimplemented here; a
/// deployment-specific adapter supplies them.
#[derive(Debug, Clone, Copy, Default)]
pub struct GitCli;

impl GitCli {
    async fn git(&self, project_dir: &Path, args: &[&str]) -> Result<(), PostOpsError> {
        let mut cmd = tokio::process::Command::new("git");
        cmd.args(args)
            .current_dir(project_dir)
            .env_remove("GIT_DIR")
            .env_remove("GIT_WORK_TREE")
            .stdin(std::process::Stdio::null())
            .kill_on_drop(true);

        let command = format!("git {}", args.join(" "));
        let output = tokio::time::timeout(GIT_TIMEOUT, cmd.output())
            .await
            .map_err(|_| PostOpsError::Command {
                command: command.clone(),
                detail: "timed out".to_string(),
            })?
            .map_err(|e| PostOpsError::Command {
                command: command.clone(),
                detail: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PostOpsError::Command {
                command,
                detail: stderr.trim().to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl PostOps for GitCli {
    async fn git_init_and_commit(
        &self,
        project_dir: &Path,
        message: &str,
    ) -> Result<(), PostOpsError> {
        if !project_dir.join(".git").exists() {
            self.git(project_dir, &["init"]).await?;
        }
        self.git(project_dir, &["add", "-A"]).await?;
        // an empty tree makes commit fail; that's fine, report it upward
        self.git(project_dir, &["commit", "-m", message]).await
    }

    async fn create_remote_repo(
        &self,
        _project_dir: &Path,
        name: &str,
    ) -> Result<Option<String>, PostOpsError> {
        tracing::debug!(name, "no remote host configured; skipping repo creation");
        Ok(None)
    }

    async fn deploy_frontend(&self, _project_dir: &Path) -> Result<Option<String>, PostOpsError> {
        tracing::debug!("no deployment provider configured; skipping deploy");
        Ok(None)
    }
}

/// PostOps that does nothing. Used in tests and headless runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPostOps;

#[async_trait]
impl PostOps for NoopPostOps {
    async fn git_init_and_commit(
        &self,
        _project_dir: &Path,
        _message: &str,
    ) -> Result<(), PostOpsError> {
        Ok(())
    }

    async fn create_remote_repo(
        &self,
        _project_dir: &Path,
        _name: &str,
    ) -> Result<Option<String>, PostOpsError> {
        Ok(None)
    }

    async fn deploy_frontend(&self, _project_dir: &Path) -> Result<Option<String>, PostOpsError> {
        Ok(None)
    }
}
