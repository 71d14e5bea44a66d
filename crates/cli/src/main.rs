//! mar: drive an autonomous run from the command line.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use mar_adapters::{GitCli, HttpLlm, IndexRetriever, StaticRoles};
use mar_core::{MarathonConfig, ProgressKind, RunStatus, SystemClock};
use mar_engine::{Executor, ExecutorDeps};
use mar_storage::{CheckpointStore, WorkspaceLayout};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "mar", about = "Autonomous long-horizon task executor", version)]
struct Cli {
    /// Workspace root (defaults to ~/.marathon)
    #[arg(long, global = true)]
    workspace: Option<PathBuf>,

    /// Path to a marathon.toml config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run an objective (or resume a checkpointed run)
    Run {
        /// The natural-language objective
        objective: Option<String>,
        /// Resume from this checkpoint id instead of planning fresh
        #[arg(long)]
        resume: Option<String>,
        /// Override the iteration cap
        #[arg(long)]
        max_iterations: Option<u32>,
    },
    /// Inspect or manage checkpoints
    Checkpoints {
        #[command(subcommand)]
        action: CheckpointAction,
    },
}

#[derive(Subcommand)]
enum CheckpointAction {
    /// List checkpoints, newest first
    List,
    /// Delete one checkpoint by id
    Delete { id: String },
    /// Delete all checkpoints
    Clear,
}

fn workspace_root(cli: &Cli) -> PathBuf {
    cli.workspace.clone().unwrap_or_else(|| {
        dirs::home_dir()
            .map(|home| home.join(".marathon"))
            .unwrap_or_else(|| PathBuf::from("marathon-workspace"))
    })
}

fn load_config(cli: &Cli) -> Result<MarathonConfig> {
    match &cli.config {
        Some(path) => MarathonConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display())),
        None => Ok(MarathonConfig::default()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let layout = WorkspaceLayout::new(workspace_root(&cli));
    let mut config = load_config(&cli)?;

    match cli.command {
        Command::Run { objective, resume, max_iterations } => {
            if let Some(cap) = max_iterations {
                config.max_iterations = cap;
            }
            run(objective, resume, config, layout).await
        }
        Command::Checkpoints { action } => {
            let store = CheckpointStore::new(layout.checkpoints_dir(), config.checkpoint_keep);
            checkpoints(action, &store)
        }
    }
}

async fn run(
    objective: Option<String>,
    resume: Option<String>,
    config: MarathonConfig,
    layout: WorkspaceLayout,
) -> Result<()> {
    let llm = HttpLlm::new(config.llm.clone()).context("building llm client")?;
    let deps = ExecutorDeps {
        llm: Arc::new(llm),
        roles: Arc::new(StaticRoles),
        retriever: Arc::new(IndexRetriever),
        post: Arc::new(GitCli),
    };
    let (mut executor, mut progress) = Executor::new(deps, config, layout, SystemClock);

    // stream progress lines while the run is in flight
    let printer = tokio::spawn(async move {
        while let Some(event) = progress.recv().await {
            match event.kind {
                ProgressKind::Error => eprintln!("[{}] {}", event.kind, event.content),
                _ => println!("[{}] {}", event.kind, event.content),
            }
        }
    });

    let report = match (&resume, &objective) {
        (Some(id), _) => executor.resume_from(id).await,
        (None, Some(objective)) => executor.run(objective).await,
        (None, None) => bail!("an objective is required unless --resume is given"),
    };
    drop(executor);
    let _ = printer.await;

    println!(
        "run finished: status={} iterations={}",
        report.status, report.iterations
    );
    if let Some(path) = &report.project_path {
        println!("project: {}", path.display());
    }
    if let Some(url) = &report.github_url {
        println!("repository: {url}");
    }
    if let Some(url) = &report.deployment {
        println!("deployment: {url}");
    }

    match report.status {
        RunStatus::Complete | RunStatus::Stopped => Ok(()),
        RunStatus::Error => {
            bail!(
                "run failed: {}",
                report.error.unwrap_or_else(|| "unknown error".to_string())
            )
        }
    }
}

fn checkpoints(action: CheckpointAction, store: &CheckpointStore) -> Result<()> {
    match action {
        CheckpointAction::List => {
            let summaries = store.list();
            if summaries.is_empty() {
                println!("no checkpoints");
                return Ok(());
            }
            for summary in summaries {
                println!(
                    "{}  iter={:<4} done={:<3} pending={:<3} {}",
                    summary.id,
                    summary.iteration,
                    summary.completed,
                    summary.pending,
                    summary.objective
                );
            }
            Ok(())
        }
        CheckpointAction::Delete { id } => {
            if store.delete(&id) {
                println!("deleted {id}");
                Ok(())
            } else {
                bail!("no checkpoint with id {id}")
            }
        }
        CheckpointAction::Clear => {
            let removed = store.clear();
            println!("removed {removed} checkpoint(s)");
            Ok(())
        }
    }
}
