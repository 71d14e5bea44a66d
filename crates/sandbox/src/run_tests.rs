use super::*;
use parking_lot::Mutex;
use std::sync::Arc;

/// Spawner double that counts invocations and returns a scripted outcome.
struct CountingSpawner {
    calls: Arc<Mutex<u32>>,
    outcome: fn() -> SpawnOutcome,
}

#[async_trait]
impl Spawner for CountingSpawner {
    async fn spawn(
        &self,
        _command: &str,
        _cwd: &Path,
        _env: &[(String, String)],
        _timeout: Duration,
    ) -> SpawnOutcome {
        *self.calls.lock() += 1;
        (self.outcome)()
    }
}

fn counting_sandbox(outcome: fn() -> SpawnOutcome) -> (Sandbox<CountingSpawner>, Arc<Mutex<u32>>) {
    let calls = Arc::new(Mutex::new(0));
    let spawner = CountingSpawner { calls: Arc::clone(&calls), outcome };
    (
        Sandbox::with_spawner(spawner, SandboxConfig::default()),
        calls,
    )
}

fn ok_outcome() -> SpawnOutcome {
    SpawnOutcome::Exited {
        code: 0,
        stdout: b"hello".to_vec(),
        stderr: Vec::new(),
    }
}

#[tokio::test]
async fn blocked_command_never_reaches_the_spawner() {
    let (sandbox, calls) = counting_sandbox(ok_outcome);
    let dir = tempfile::tempdir().unwrap();

    for command in ["rm -rf /", "echo a && echo b", "sudo ls", "terraform apply"] {
        let result = sandbox.run(command, dir.path()).await;
        assert!(!result.ok, "{command} must fail");
        assert!(result.was_blocked(), "{command} must be blocked");
        assert!(result.stderr.starts_with("blocked: "));
    }
    assert_eq!(*calls.lock(), 0, "no process may be spawned for denied commands");
}

#[tokio::test]
async fn allowed_command_is_spawned_and_captured() {
    let (sandbox, calls) = counting_sandbox(ok_outcome);
    let dir = tempfile::tempdir().unwrap();
    let result = sandbox.run("echo hello", dir.path()).await;
    assert!(result.ok);
    assert_eq!(result.exit_code, 0);
    assert_eq!(result.stdout, "hello");
    assert_eq!(*calls.lock(), 1);
}

#[tokio::test]
async fn missing_directory_fails_without_spawning() {
    let (sandbox, calls) = counting_sandbox(ok_outcome);
    let result = sandbox
        .run("echo hello", Path::new("/nonexistent/path/here"))
        .await;
    assert!(!result.ok);
    assert_eq!(result.exit_code, EXIT_SPAWN_FAILED);
    assert!(result.stderr.contains("directory does not exist"));
    assert_eq!(*calls.lock(), 0);
}

#[tokio::test]
async fn timeout_maps_to_distinguished_exit_code() {
    let (sandbox, _) = counting_sandbox(|| SpawnOutcome::TimedOut);
    let dir = tempfile::tempdir().unwrap();
    let result = sandbox
        .run_with_timeout("echo slow", dir.path(), Duration::from_millis(5))
        .await;
    assert!(!result.ok);
    assert_eq!(result.exit_code, EXIT_TIMED_OUT);
    assert!(result.timed_out());
    assert!(result.stderr.contains("timed out"));
}

#[tokio::test]
async fn nonzero_exit_is_reported_not_raised() {
    let (sandbox, _) = counting_sandbox(|| SpawnOutcome::Exited {
        code: 2,
        stdout: Vec::new(),
        stderr: b"no such file".to_vec(),
    });
    let dir = tempfile::tempdir().unwrap();
    let result = sandbox.run("cat missing.txt", dir.path()).await;
    assert!(!result.ok);
    assert_eq!(result.exit_code, 2);
    assert_eq!(result.stderr, "no such file");
}

#[tokio::test]
async fn output_is_truncated_to_configured_caps() {
    fn big_outcome() -> SpawnOutcome {
        SpawnOutcome::Exited {
            code: 0,
            stdout: vec![b'a'; 50_000],
            stderr: Vec::new(),
        }
    }
    let (sandbox, _) = counting_sandbox(big_outcome);
    let dir = tempfile::tempdir().unwrap();
    let result = sandbox.run("echo big", dir.path()).await;
    assert_eq!(result.stdout.len(), SandboxConfig::default().max_stdout_bytes);
}

#[tokio::test]
async fn every_run_lands_in_the_audit_ring() {
    let (sandbox, _) = counting_sandbox(ok_outcome);
    let dir = tempfile::tempdir().unwrap();
    sandbox.run("echo one", dir.path()).await;
    sandbox.run("rm -rf /", dir.path()).await;
    let recent = sandbox.audit().recent(10);
    assert_eq!(recent.len(), 2);
    assert!(recent[0].ok);
    assert!(!recent[1].ok);
}

#[tokio::test]
async fn real_spawner_runs_echo() {
    let sandbox = Sandbox::new(SandboxConfig::default());
    let dir = tempfile::tempdir().unwrap();
    let result = sandbox.run("echo marathon", dir.path()).await;
    assert!(result.ok, "stderr: {}", result.stderr);
    assert_eq!(result.stdout.trim(), "marathon");
}
