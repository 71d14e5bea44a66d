//! Workspace-level end-to-end scenarios, driven through the public API
//! with a scripted model.

use async_trait::async_trait;
use mar_adapters::{FakeRetriever, LlmClient, LlmError, NoopPostOps, StaticRoles};
use mar_core::{FakeClock, MarathonConfig, ProgressEvent, RunStatus};
use mar_engine::{Executor, ExecutorDeps};
use mar_storage::{Checkpoint, CheckpointStore, FileIndex, WorkspaceLayout};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

const OBJECTIVE: &str = "create a Python function that adds two numbers and a test for it";

const PLAN: &str = "\
1. Create add_numbers.py COMPLETE with the function
2. Create tests/test_add_numbers.py COMPLETE with tests";

const ADD_RESPONSE: &str = "\
```python filename=\"add_numbers.py\"
def add(a, b):
    return a + b
```";

const TEST_RESPONSE: &str = "\
```python filename=\"tests/test_add_numbers.py\"
from add_numbers import add

def test_add():
    assert add(1, 2) == 3
```";

/// Answers by prompt shape so interleaved planner/critic/step calls
/// stay deterministic.
struct ScriptedLlm {
    plan: String,
    step_responses: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedLlm {
    fn new(plan: &str, steps: Vec<&str>) -> Arc<Self> {
        Arc::new(Self {
            plan: plan.to_string(),
            step_responses: Mutex::new(steps.into_iter().map(str::to_string).collect()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    fn step_prompts(&self) -> Vec<String> {
        self.prompts()
            .into_iter()
            .filter(|p| p.contains("CURRENT STEP:"))
            .collect()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn call(
        &self,
        prompt: &str,
        _max_tokens: u32,
        _temperature: f32,
    ) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if prompt.contains("Plan the execution") {
            return Ok(self.plan.clone());
        }
        if prompt.contains("Summarize the work") {
            return Ok("Wrote the arithmetic module; backend work remains.".to_string());
        }
        if prompt.contains("CURRENT STEP:") {
            return Ok(self
                .step_responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| ADD_RESPONSE.to_string()));
        }
        Ok("No real issues found.".to_string())
    }
}

struct Workspace {
    dir: tempfile::TempDir,
    clock: FakeClock,
}

impl Workspace {
    fn new() -> Self {
        let clock = FakeClock::new();
        clock.set_epoch_ms(1_700_000_000_000);
        Self {
            dir: tempfile::tempdir().expect("tempdir"),
            clock,
        }
    }

    fn layout(&self) -> WorkspaceLayout {
        WorkspaceLayout::new(self.dir.path())
    }

    fn executor(
        &self,
        llm: Arc<ScriptedLlm>,
        config: MarathonConfig,
    ) -> (Executor<FakeClock>, mpsc::Receiver<ProgressEvent>) {
        let deps = ExecutorDeps {
            llm,
            roles: Arc::new(StaticRoles),
            retriever: Arc::new(FakeRetriever::default()),
            post: Arc::new(NoopPostOps),
        };
        Executor::new(deps, config, self.layout(), self.clock.clone())
    }

    fn project_dir(&self) -> PathBuf {
        self.layout()
            .project_dir("create-python-function-20231114")
    }
}

fn config() -> MarathonConfig {
    let mut config = MarathonConfig::default();
    config.max_iterations = 20;
    config.recycle.max_tokens = 1_000_000;
    config
}

// --- Scenario 1: hello-file ------------------------------------------------

#[tokio::test]
async fn hello_file() {
    let workspace = Workspace::new();
    let llm = ScriptedLlm::new(PLAN, vec![ADD_RESPONSE, TEST_RESPONSE]);
    let (mut executor, _rx) = workspace.executor(Arc::clone(&llm), config());

    let report = executor.run(OBJECTIVE).await;

    assert_eq!(report.status, RunStatus::Complete);
    // a plan of at least two complete-file steps was dispatched
    assert!(llm.step_prompts().len() >= 2);

    let project = workspace.project_dir();
    let add = std::fs::read_to_string(project.join("add_numbers.py")).expect("add_numbers.py");
    let test = std::fs::read_to_string(project.join("tests/test_add_numbers.py"))
        .expect("test_add_numbers.py");
    assert!(add.contains("def add(a, b):"));
    assert!(test.contains("def test_add():"));

    // syntax-clean, no placeholder markers
    assert!(mar_extract::check_file("add_numbers.py", &add).is_empty());
    assert!(!mar_extract::has_placeholder_markers(&add));
    assert!(!mar_extract::has_placeholder_markers(&test));
}

// --- Scenario 2: blocked command -------------------------------------------

#[tokio::test]
async fn blocked_command() {
    let workspace = Workspace::new();
    let with_command = format!("{ADD_RESPONSE}\n[COMMAND]: rm -rf /\n");
    let llm = ScriptedLlm::new(PLAN, vec![&with_command, TEST_RESPONSE]);
    let (mut executor, _rx) = workspace.executor(llm, config());

    let report = executor.run(OBJECTIVE).await;

    // the command was denied, the run continued to completion
    assert_eq!(report.status, RunStatus::Complete);
    assert!(
        report.log.iter().any(|l| l.contains("blocked: ")),
        "log: {:?}",
        report.log
    );
    assert!(workspace.project_dir().join("add_numbers.py").is_file());

    // the step that carried the command was still marked done
    let latest = executor.checkpoints().latest().expect("checkpoint");
    assert!(latest
        .completed_steps
        .iter()
        .any(|s| s.contains("add_numbers.py")));
}

// --- Scenario 3: shadow filename --------------------------------------------

#[tokio::test]
async fn shadow_filename() {
    let workspace = Workspace::new();
    let shadow = "```python filename=\"asyncio.py\"\nimport selectors\n```";
    let llm = ScriptedLlm::new(PLAN, vec![shadow, TEST_RESPONSE]);
    let (mut executor, _rx) = workspace.executor(llm, config());

    let report = executor.run(OBJECTIVE).await;

    assert!(!workspace.project_dir().join("asyncio.py").exists());
    assert!(report
        .log
        .iter()
        .any(|l| l.contains("asyncio.py") && l.contains("stdlib-shadowing")));
    assert_eq!(report.status, RunStatus::Complete);
}

// --- Scenario 4: oversize existing ------------------------------------------

#[tokio::test]
async fn oversize_existing() {
    let workspace = Workspace::new();
    let rewrite = format!(
        "```markdown filename=\"paper.md\"\n{}\n```",
        "thin rewrite ".repeat(20)
    );
    let plan = "\
1. Write the research paper COMPLETE
2. Create tests/test_add_numbers.py COMPLETE with tests";
    let llm = ScriptedLlm::new(plan, vec![&rewrite, TEST_RESPONSE]);
    let (mut executor, _rx) = workspace.executor(llm, config());

    // 8000 bytes of finished paper, no placeholders
    let project = workspace.project_dir();
    std::fs::create_dir_all(&project).unwrap();
    let original = "finished paper prose. ".repeat(364);
    std::fs::write(project.join("paper.md"), &original).unwrap();

    let report = executor.run(OBJECTIVE).await;

    assert_eq!(
        std::fs::read_to_string(project.join("paper.md")).unwrap(),
        original,
        "the existing paper must be preserved"
    );
    assert!(report
        .log
        .iter()
        .any(|l| l.contains("paper.md") && l.contains("won't overwrite")));
}

// --- Scenario 5: recycle mid-run --------------------------------------------

#[tokio::test]
async fn recycle_mid_run() {
    let workspace = Workspace::new();
    let filler = "# padding line to inflate the conversation\n".repeat(700);
    let big_add = format!(
        "```python filename=\"add_numbers.py\"\ndef add(a, b):\n    return a + b\n{filler}```"
    );
    let llm = ScriptedLlm::new(PLAN, vec![&big_add, TEST_RESPONSE]);
    let mut config = config();
    config.recycle.max_tokens = 6_000; // threshold crossed after step 1
    let (mut executor, _rx) = workspace.executor(Arc::clone(&llm), config);

    let report = executor.run(OBJECTIVE).await;
    assert_eq!(report.status, RunStatus::Complete);

    // a summary landed in the decisions domain file
    let decisions = std::fs::read_to_string(
        workspace.dir.path().join("context/decisions_context.md"),
    )
    .unwrap();
    assert!(decisions.contains("RECYCLE SUMMARY"));

    // after the recycle the next prompt restates the objective and the
    // remaining pending steps, and no step ran twice
    let steps = llm.step_prompts();
    assert_eq!(steps.len(), 2);
    assert!(steps[1].contains(OBJECTIVE));
    assert!(steps[1].contains("Create tests/test_add_numbers.py"));
    assert!(steps[1].contains("Continue this task from where it left off"));
}

// --- Scenario 6: crash and resume -------------------------------------------

#[tokio::test]
async fn crash_and_resume() {
    // reference: the crash-free run's file set
    let reference = {
        let workspace = Workspace::new();
        let llm = ScriptedLlm::new(PLAN, vec![ADD_RESPONSE, TEST_RESPONSE]);
        let (mut executor, _rx) = workspace.executor(llm, config());
        let report = executor.run(OBJECTIVE).await;
        assert_eq!(report.status, RunStatus::Complete);
        let index =
            FileIndex::load(&workspace.project_dir().join(".state/file_index.json")).unwrap();
        index.paths().map(str::to_string).collect::<Vec<_>>()
    };

    // crashed workspace: step 1 completed and checkpointed, then the
    // process died before step 2
    let workspace = Workspace::new();
    let layout = workspace.layout();
    layout.ensure_base().unwrap();
    let project = workspace.project_dir();
    std::fs::create_dir_all(&project).unwrap();
    std::fs::write(
        project.join("add_numbers.py"),
        "def add(a, b):\n    return a + b",
    )
    .unwrap();
    let mut index = FileIndex::default();
    index.record("add_numbers.py", 31);
    index.set_role("add_numbers.py", "declared");
    index.save(&project.join(".state/file_index.json")).unwrap();

    let checkpoint = Checkpoint::new(
        OBJECTIVE,
        1,
        vec!["Create add_numbers.py COMPLETE with the function".to_string()],
        vec!["Create tests/test_add_numbers.py COMPLETE with tests".to_string()],
        Some(project.clone()),
        1_700_000_000_000,
        "2023-11-14T22:13:20+00:00".to_string(),
    );
    let store = CheckpointStore::new(layout.checkpoints_dir(), 10);
    let id = store.save(&checkpoint).unwrap();

    let llm = ScriptedLlm::new(PLAN, vec![TEST_RESPONSE]);
    let (mut executor, _rx) = workspace.executor(Arc::clone(&llm), config());
    let report = executor.resume_from(&id).await;

    assert_eq!(report.status, RunStatus::Complete);
    // intake and planning were skipped
    assert!(llm
        .prompts()
        .iter()
        .all(|p| !p.contains("Plan the execution")));
    // only the pending step ran
    assert_eq!(llm.step_prompts().len(), 1);

    // the resumed file set covers the crash-free run's file set
    let resumed =
        FileIndex::load(&project.join(".state/file_index.json")).unwrap();
    for path in &reference {
        assert!(
            resumed.contains(path),
            "resumed run is missing {path}; has {:?}",
            resumed.paths().collect::<Vec<_>>()
        );
    }
}
