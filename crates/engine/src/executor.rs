//! The core execution loop.
//!
//! One executor task per run drives intake → plan → step loop →
//! finalize → post phases. Pause and stop are observed only at step
//! boundaries; an in-flight LLM call is never interrupted. Inner
//! component failures are recovered here and surfaced on the progress
//! stream; only executor-level faults end the run with status=error.

use crate::critic::{ContentType, Critic};
use crate::finalize::consolidate;
use crate::intake;
use crate::planner::{categorize_step, Planner};
use crate::recycler::{count_tokens, Recycler};
use crate::router::{assemble_prompt, route_step};
use crate::state::{ExecutorState, PauseSnapshot, PlanModification};
use crate::EngineError;
use mar_adapters::{ContextRetriever, LlmClient, PostOps, RoleProvider};
use mar_core::{
    Clock, MarathonConfig, Objective, ObjectiveId, Plan, ProgressEvent, ProjectType, RunReport,
    RunStatus, Step, StepCategory, Verdict,
};
use mar_extract::{check_file, extract, persist_artifacts, DependencyAuditor, SyntaxIssue};
use mar_sandbox::Sandbox;
use mar_storage::{Checkpoint, CheckpointStore, Domain, DomainNotes, FileIndex, WorkspaceLayout};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{mpsc, Notify};
use tokio_util::sync::CancellationToken;

/// A step's output may declare the whole task finished.
const COMPLETION_SIGNAL: &str = "[TASK_COMPLETE]";

const PROGRESS_CHANNEL_CAPACITY: usize = 1024;

/// The collaborators injected into an executor. No globals; tests
/// construct their own.
pub struct ExecutorDeps {
    pub llm: Arc<dyn LlmClient>,
    pub roles: Arc<dyn RoleProvider>,
    pub retriever: Arc<dyn ContextRetriever>,
    pub post: Arc<dyn PostOps>,
}

/// Control surface shared with the outside: pause, resume, stop.
#[derive(Clone)]
pub struct ExecutorHandle {
    state: Arc<Mutex<ExecutorState>>,
    cancel: CancellationToken,
    resume_notify: Arc<Notify>,
}

impl ExecutorHandle {
    /// Request a pause. Takes effect at the next step boundary.
    pub fn pause(&self, reason: impl Into<String>) {
        let mut state = self.state.lock();
        state.paused = true;
        state.pause_reason = Some(reason.into());
    }

    /// Resume a paused run. Idempotent.
    pub fn resume(&self) {
        {
            let mut state = self.state.lock();
            state.paused = false;
            state.pause_reason = None;
        }
        self.resume_notify.notify_waiters();
    }

    /// Request a stop. The in-progress step finishes first.
    pub fn stop(&self) {
        {
            let mut state = self.state.lock();
            state.stop_requested = true;
            state.paused = false;
        }
        self.cancel.cancel();
        self.resume_notify.notify_waiters();
    }

    pub fn is_paused(&self) -> bool {
        self.state.lock().paused
    }

    pub fn is_running(&self) -> bool {
        self.state.lock().running
    }

    pub fn iteration(&self) -> u32 {
        self.state.lock().iteration
    }

    /// Queue a plan mutation for the executor to apply at the next
    /// step boundary.
    pub fn modify_plan(&self, modification: PlanModification) {
        self.state.lock().queue_modification(modification);
    }
}

/// What one executed step produced.
struct StepResult {
    summary: String,
    completion_signalled: bool,
}

/// The autonomous executor. One instance, one run at a time.
pub struct Executor<C: Clock> {
    deps: ExecutorDeps,
    config: MarathonConfig,
    layout: WorkspaceLayout,
    clock: C,
    sandbox: Sandbox,
    critic: Critic,
    recycler: Recycler,
    checkpoints: CheckpointStore,
    state: Arc<Mutex<ExecutorState>>,
    cancel: CancellationToken,
    resume_notify: Arc<Notify>,
    progress: mpsc::Sender<ProgressEvent>,
}

impl<C: Clock> Executor<C> {
    /// Build an executor and the receiving end of its progress stream.
    pub fn new(
        deps: ExecutorDeps,
        config: MarathonConfig,
        layout: WorkspaceLayout,
        clock: C,
    ) -> (Self, mpsc::Receiver<ProgressEvent>) {
        let (tx, rx) = mpsc::channel(PROGRESS_CHANNEL_CAPACITY);
        let notes = DomainNotes::new(layout.context_dir());
        let recycler = Recycler::new(notes, config.recycle.clone());
        let critic = Critic::new(config.critic.clone());
        let sandbox = Sandbox::new(config.sandbox.clone());
        let checkpoints = CheckpointStore::new(layout.checkpoints_dir(), config.checkpoint_keep);
        let executor = Self {
            deps,
            config,
            layout,
            clock,
            sandbox,
            critic,
            recycler,
            checkpoints,
            state: Arc::new(Mutex::new(ExecutorState::new())),
            cancel: CancellationToken::new(),
            resume_notify: Arc::new(Notify::new()),
            progress: tx,
        };
        (executor, rx)
    }

    pub fn handle(&self) -> ExecutorHandle {
        ExecutorHandle {
            state: Arc::clone(&self.state),
            cancel: self.cancel.clone(),
            resume_notify: Arc::clone(&self.resume_notify),
        }
    }

    pub fn checkpoints(&self) -> &CheckpointStore {
        &self.checkpoints
    }

    /// Run an objective end to end. Never panics; fatal faults come
    /// back as a report with status=error and an intact last checkpoint.
    pub async fn run(&mut self, objective_text: &str) -> RunReport {
        self.state.lock().running = true;
        let result = self.run_inner(objective_text).await;
        self.finish(result)
    }

    /// Resume from a checkpoint: intake and planning are skipped, the
    /// loop continues from the checkpoint's pending steps.
    pub async fn resume_from(&mut self, checkpoint_id: &str) -> RunReport {
        self.state.lock().running = true;
        let result = self.resume_inner(checkpoint_id).await;
        self.finish(result)
    }

    fn finish(&self, result: Result<RunReport, EngineError>) -> RunReport {
        let mut report = match result {
            Ok(report) => report,
            Err(e) => {
                tracing::error!(error = %e, "run failed");
                self.emit(ProgressEvent::error(format!("fatal: {e}")));
                let iterations = self.state.lock().iteration;
                let mut report = RunReport::new(RunStatus::Error, iterations);
                report.error = Some(e.to_string());
                report
            }
        };
        {
            let mut state = self.state.lock();
            state.running = false;
            report.log = state.log_lines();
        }
        self.emit(ProgressEvent::status(format!("status={}", report.status)));
        report
    }

    async fn run_inner(&mut self, objective_text: &str) -> Result<RunReport, EngineError> {
        self.layout.ensure_base()?;
        self.emit(ProgressEvent::status("intake"));

        // Intake: refine, lock the project type, clean stale notes.
        let refined = intake::refine_objective(self.deps.llm.as_ref(), objective_text).await;
        let objective = Objective::new(refined, &self.clock);
        let project_type = ProjectType::detect(objective.text());
        self.state.lock().project_type = Some(project_type);
        self.emit(ProgressEvent::progress(format!(
            "objective {} type={project_type}",
            objective.id()
        )));

        self.recycler.notes().ensure()?;
        if intake::clear_stale_design_notes(self.recycler.notes(), &objective)? {
            self.emit(ProgressEvent::log(
                "novel objective: cleared research and decisions notes",
            ));
        }

        // Plan.
        self.emit(ProgressEvent::status("planning"));
        let planner = Planner::new(self.config.planner.clone());
        let mut steps = planner.plan(self.deps.llm.as_ref(), &objective).await?;

        // Plan critique: one intent-preserving revision on FIX_REQUIRED.
        let plan_text: String = steps
            .iter()
            .enumerate()
            .map(|(i, s)| format!("{}. {}\n", i + 1, s.text))
            .collect();
        let critique = self
            .critic
            .critique(self.deps.llm.as_ref(), &plan_text, ContentType::Plan)
            .await;
        if critique.verdict.blocks() {
            self.emit(ProgressEvent::log("plan critique: FIX_REQUIRED, revising"));
            let issues: String = critique
                .issues
                .iter()
                .map(|i| format!("- [{}] {}: {}\n", i.risk, i.title, i.description))
                .collect();
            let revision_prompt = format!(
                "Revise this plan to address the issues below. Keep the original \
                 intent and scope. Output only the revised numbered step list.\n\n\
                 PLAN:\n{plan_text}\nISSUES:\n{issues}"
            );
            match self
                .deps
                .llm
                .call(&revision_prompt, self.config.planner.max_tokens, 0.2)
                .await
            {
                Ok(response) => {
                    let revised = planner.steps_from_response(&response);
                    if !revised.is_empty() {
                        steps = revised;
                    }
                }
                Err(e) => self.emit(ProgressEvent::error(format!("plan revision failed: {e}"))),
            }
        }

        let mut plan = Plan::new(objective.clone(), steps);
        self.recycler
            .set_task(&objective, &plan.pending_texts(), self.clock.epoch_ms())?;
        self.emit(ProgressEvent::progress(format!(
            "plan ready with {} steps",
            plan.len()
        )));

        // Project directory.
        let slug = objective.id().as_str().to_string();
        let project_dir = self.layout.project_dir(&slug);
        intake::scaffold_project(&project_dir, project_type)?;
        let index_path = self.layout.file_index_path(&slug);
        let mut index = FileIndex::load(&index_path)?;

        self.execute_plan(&mut plan, project_type, &project_dir, &index_path, &mut index)
            .await
    }

    async fn resume_inner(&mut self, checkpoint_id: &str) -> Result<RunReport, EngineError> {
        self.layout.ensure_base()?;
        let checkpoint = self
            .checkpoints
            .by_id(checkpoint_id)
            .ok_or_else(|| EngineError::UnknownCheckpoint(checkpoint_id.to_string()))?;
        self.emit(ProgressEvent::status(format!(
            "resuming from checkpoint {checkpoint_id} at iteration {}",
            checkpoint.iteration
        )));

        let project_dir = match &checkpoint.project_path {
            Some(path) => path.clone(),
            None => {
                let objective = Objective::new(&checkpoint.objective, &self.clock);
                self.layout.project_dir(objective.id().as_str())
            }
        };
        let slug = project_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "resumed".to_string());

        let objective = Objective::with_id(
            checkpoint.objective.clone(),
            ObjectiveId::from_string(slug.clone()),
        );
        let project_type = ProjectType::detect(objective.text());
        {
            let mut state = self.state.lock();
            state.project_type = Some(project_type);
            state.iteration = checkpoint.iteration;
        }

        self.recycler.notes().ensure()?;
        let mut plan = Plan::from_descriptors(
            objective,
            &checkpoint.completed_steps,
            &checkpoint.pending_steps,
            categorize_step,
        );

        intake::scaffold_project(&project_dir, project_type)?;
        let index_path = project_dir.join(".state").join("file_index.json");
        let mut index = FileIndex::load(&index_path)?;

        self.execute_plan(&mut plan, project_type, &project_dir, &index_path, &mut index)
            .await
    }

    /// The step loop plus finalize and post phases.
    async fn execute_plan(
        &mut self,
        plan: &mut Plan,
        project_type: ProjectType,
        project_dir: &Path,
        index_path: &Path,
        index: &mut FileIndex,
    ) -> Result<RunReport, EngineError> {
        self.emit(ProgressEvent::status("executing"));
        let mut auditor = DependencyAuditor::new();
        let mut carry: Option<String> = None;
        let mut status = RunStatus::Complete;
        let mut verification_retried = false;

        loop {
            if self.cancel.is_cancelled() {
                status = RunStatus::Stopped;
                break;
            }
            self.wait_while_paused(plan).await;
            if self.cancel.is_cancelled() {
                status = RunStatus::Stopped;
                break;
            }

            self.apply_plan_modifications(plan);

            if self.recycler.needs_recycle() {
                let continuation = self
                    .recycler
                    .recycle(
                        self.deps.llm.as_ref(),
                        plan.objective(),
                        &plan.completed_texts(),
                        &plan.pending_texts(),
                        self.clock.epoch_ms(),
                    )
                    .await?;
                carry = Some(continuation);
                self.emit(ProgressEvent::progress("context recycled"));
                continue;
            }

            let step_index = match plan.next_pending() {
                Some(index) => index,
                None => {
                    if verification_retried
                        || self.verify_completion(project_type, project_dir, index)
                    {
                        break;
                    }
                    verification_retried = true;
                    self.emit(ProgressEvent::log(
                        "completion gate failed: queueing remediation step",
                    ));
                    plan.push(Step::new(
                        "Produce every required output file, COMPLETE, with no \
                         placeholders",
                        StepCategory::Core,
                    ));
                    continue;
                }
            };

            let iteration = {
                let mut state = self.state.lock();
                state.iteration += 1;
                state.iteration
            };
            if iteration > self.config.max_iterations {
                self.emit(ProgressEvent::log("iteration cap reached"));
                break;
            }

            let (step_text, category) = match plan.step(step_index) {
                Some(step) => (step.text.clone(), step.category),
                None => continue,
            };

            if category.is_coding() {
                let coding = {
                    let mut state = self.state.lock();
                    state.coding_iterations += 1;
                    state.coding_iterations
                };
                if coding > self.config.max_coding_iterations {
                    self.emit(ProgressEvent::log(
                        "coding-iteration cap reached: abandoning remaining coding steps",
                    ));
                    if let Some(step) = plan.step_mut(step_index) {
                        let _ = step.abandon();
                    }
                    plan.abandon_pending_coding();
                    continue;
                }
            }

            if let Some(step) = plan.step_mut(step_index) {
                if step.start().is_err() {
                    continue;
                }
            }
            self.emit(ProgressEvent::progress(format!(
                "step {iteration}: {step_text}"
            )));

            let outcome = self
                .execute_step(
                    &step_text,
                    category,
                    project_type,
                    project_dir,
                    index_path,
                    index,
                    &mut auditor,
                    carry.take(),
                )
                .await?;

            match outcome {
                Some(result) => {
                    if let Some(step) = plan.step_mut(step_index) {
                        let _ = step.finish();
                    }
                    let epoch_ms = self.clock.epoch_ms();
                    if let Err(e) =
                        self.recycler
                            .mark_step_complete(&step_text, &result.summary, epoch_ms)
                    {
                        self.emit(ProgressEvent::error(format!("task_state write failed: {e}")));
                    }
                    let domain = domain_for(category);
                    if let Err(e) = self.recycler.save_to_domain(
                        domain,
                        &format!("Step: {step_text}\n{}", result.summary),
                        epoch_ms,
                    ) {
                        self.emit(ProgressEvent::error(format!("domain note failed: {e}")));
                    }
                    if result.completion_signalled {
                        self.emit(ProgressEvent::progress("completion signal received"));
                        break;
                    }
                }
                None => {
                    self.emit(ProgressEvent::error(format!(
                        "step abandoned after llm failures: {step_text}"
                    )));
                    if let Some(step) = plan.step_mut(step_index) {
                        let _ = step.abandon();
                    }
                }
            }

            if iteration % self.config.checkpoint_interval.max(1) == 0 {
                self.save_checkpoint(plan, iteration, project_dir);
            }
        }

        let iterations = self.state.lock().iteration;
        let mut report = RunReport::new(status, iterations);
        report.project_path = Some(project_dir.to_path_buf());

        if status != RunStatus::Stopped {
            self.emit(ProgressEvent::status("finalizing"));
            self.finalize_project(plan, project_dir, index, index_path)
                .await?;
            self.post_phases(plan, project_type, project_dir, index, &mut report)
                .await;
        }

        // the last checkpoint reflects the final plan state
        self.save_checkpoint(plan, iterations, project_dir);
        Ok(report)
    }

    /// Dispatch one step through LLM → extractor → sandbox → validator
    /// → critic, with the bounded repair loop. `Ok(None)` means the
    /// step was abandoned (all LLM attempts failed).
    #[allow(clippy::too_many_arguments)]
    async fn execute_step(
        &mut self,
        step_text: &str,
        category: StepCategory,
        project_type: ProjectType,
        project_dir: &Path,
        index_path: &Path,
        index: &mut FileIndex,
        auditor: &mut DependencyAuditor,
        carry: Option<String>,
    ) -> Result<Option<StepResult>, EngineError> {
        let step = Step::new(step_text, category);
        let role = route_step(&step);
        let persona = self.deps.roles.system_prompt(role);
        let context = match self
            .deps
            .retriever
            .retrieve(
                step_text,
                role,
                project_dir,
                index,
                self.config.retrieval.budget_tokens,
            )
            .await
        {
            Ok(context) => context,
            Err(e) => {
                self.emit(ProgressEvent::error(format!("retrieval failed: {e}")));
                String::new()
            }
        };

        let prompt = assemble_prompt(
            &persona,
            project_type.prompt_fragment(),
            step_text,
            &context,
            carry.as_deref(),
        );

        let response = match self.call_llm_with_retries(&prompt).await {
            Some(response) => response,
            None => return Ok(None),
        };
        self.recycler
            .observe(count_tokens(&prompt) + count_tokens(&response));
        self.emit(ProgressEvent::response(head(&response, 400)));
        let completion_signalled = response.contains(COMPLETION_SIGNAL);

        let mut written =
            self.apply_response(&response, project_dir, project_type, index, index_path)?;

        // sandbox any extracted commands
        let extraction = extract(&response);
        let mut command_feedback = String::new();
        for command in &extraction.commands {
            let result = self.sandbox.run(command, project_dir).await;
            if result.was_blocked() {
                self.emit(ProgressEvent::progress(result.stderr.clone()));
            } else {
                self.emit(ProgressEvent::progress(format!(
                    "ran `{command}` exit={} ({}ms)",
                    result.exit_code, result.duration_ms
                )));
                let signals = result.signals();
                if !result.ok && signals.error_indicated {
                    self.emit(ProgressEvent::log(format!(
                        "command output reports errors: `{command}`"
                    )));
                }
            }
            command_feedback.push_str(&result.feedback());
        }

        // validator passes
        let (mut syntax_issues, mut missing) =
            self.validate_files(&written, project_dir, auditor);

        // critique, then the bounded repair loop
        let content_type = content_type_for(category);
        let critique = self
            .critic
            .critique(self.deps.llm.as_ref(), &response, content_type)
            .await;
        if let Some(note) = &critique.note {
            self.emit(ProgressEvent::log(format!("critic: {note}")));
        }
        let mut critic_blocks = critique.verdict.blocks();
        if critique.verdict == Verdict::ReviewRequired {
            self.emit(ProgressEvent::log(format!(
                "critic: REVIEW_REQUIRED with {} issue(s), deferring",
                critique.issues.len()
            )));
        }

        let mut retries = 0;
        while (!syntax_issues.is_empty() || !missing.is_empty() || critic_blocks)
            && retries < self.config.validation_retry_cap
        {
            retries += 1;
            self.state.lock().validation_retries += 1;
            self.emit(ProgressEvent::progress(format!(
                "repair attempt {retries}: {} syntax issue(s), {} missing module(s)",
                syntax_issues.len(),
                missing.len()
            )));

            let repair_prompt = repair_prompt(
                step_text,
                &syntax_issues,
                &missing,
                &critique.issues,
                &command_feedback,
            );
            let repair_response = match self.call_llm_with_retries(&repair_prompt).await {
                Some(response) => response,
                None => break,
            };
            self.recycler
                .observe(count_tokens(&repair_prompt) + count_tokens(&repair_response));

            let repaired = self.apply_response(
                &repair_response,
                project_dir,
                project_type,
                index,
                index_path,
            )?;
            for path in &repaired {
                if !written.contains(path) {
                    written.push(path.clone());
                }
            }

            let revalidated = self.validate_files(&written, project_dir, auditor);
            syntax_issues = revalidated.0;
            missing = revalidated.1;
            // the critic's per-hash cap handles oscillation; one repair
            // round per critique is enough here
            critic_blocks = false;
        }

        for issue in &syntax_issues {
            self.emit(ProgressEvent::error(format!(
                "validator: {} line {}: {}",
                issue.file, issue.line, issue.message
            )));
        }
        for module in &missing {
            self.emit(ProgressEvent::error(format!(
                "validator: {} imports missing module '{}'",
                module.file, module.module
            )));
        }

        let summary = format!(
            "wrote {} file(s); {} syntax issue(s) open; {} module(s) unresolved",
            written.len(),
            syntax_issues.len(),
            missing.len()
        );
        Ok(Some(StepResult { summary, completion_signalled }))
    }

    /// Extract artifacts from a response and persist them, emitting
    /// skip lines. Returns the relative paths written.
    fn apply_response(
        &self,
        response: &str,
        project_dir: &Path,
        project_type: ProjectType,
        index: &mut FileIndex,
        index_path: &Path,
    ) -> Result<Vec<String>, EngineError> {
        let extraction = extract(response);
        for skip in &extraction.skips {
            self.emit(ProgressEvent::progress(format!(
                "skipped {}: {}",
                skip.path, skip.reason
            )));
        }
        let report =
            persist_artifacts(&extraction.artifacts, project_dir, project_type, index)?;
        for skip in &report.skips {
            self.emit(ProgressEvent::progress(format!(
                "skipped {}: {}",
                skip.path, skip.reason
            )));
        }
        for path in &report.written {
            self.emit(ProgressEvent::progress(format!("wrote {path}")));
        }
        index.save(index_path)?;
        Ok(report.written)
    }

    fn validate_files(
        &self,
        written: &[String],
        project_dir: &Path,
        auditor: &mut DependencyAuditor,
    ) -> (Vec<SyntaxIssue>, Vec<mar_extract::MissingModule>) {
        let mut syntax_issues = Vec::new();
        let mut missing = Vec::new();
        for rel in written {
            let content = match std::fs::read_to_string(project_dir.join(rel)) {
                Ok(content) => content,
                Err(_) => continue,
            };
            syntax_issues.extend(check_file(rel, &content));
            missing.extend(auditor.audit_file(rel, &content, project_dir));
        }
        (syntax_issues, missing)
    }

    async fn call_llm_with_retries(&self, prompt: &str) -> Option<String> {
        let attempts = self.config.llm_retry_cap.max(1);
        for attempt in 1..=attempts {
            match self
                .deps
                .llm
                .call(
                    prompt,
                    self.config.llm.max_tokens,
                    self.config.llm.temperature,
                )
                .await
            {
                Ok(response) if !response.trim().is_empty() => return Some(response),
                Ok(_) => self.emit(ProgressEvent::error(format!(
                    "llm returned empty response (attempt {attempt}/{attempts})"
                ))),
                Err(e) => self.emit(ProgressEvent::error(format!(
                    "llm call failed (attempt {attempt}/{attempts}): {e}"
                ))),
            }
        }
        None
    }

    /// Completion gate for an empty pending set.
    fn verify_completion(
        &self,
        project_type: ProjectType,
        project_dir: &Path,
        index: &FileIndex,
    ) -> bool {
        if index.is_empty() {
            return false;
        }
        if project_type == ProjectType::Research {
            let has = |name: &str| {
                index
                    .paths()
                    .any(|p| p == name || p.ends_with(&format!("/{name}")))
            };
            if !has("paper.md") || !has("glossary.md") {
                return false;
            }
        }
        // required sources parse and carry no placeholders
        for rel in index.paths() {
            if !rel.ends_with(".py") {
                continue;
            }
            let content = match std::fs::read_to_string(project_dir.join(rel)) {
                Ok(content) => content,
                Err(_) => continue,
            };
            if !check_file(rel, &content).is_empty() {
                return false;
            }
            if mar_extract::has_placeholder_markers(&content) {
                return false;
            }
        }
        true
    }

    async fn finalize_project(
        &mut self,
        plan: &Plan,
        project_dir: &Path,
        index: &mut FileIndex,
        index_path: &Path,
    ) -> Result<(), EngineError> {
        let (summary, report) = consolidate(project_dir, index, self.clock.iso8601())?;
        index.save(index_path)?;
        for removed in &summary.removed {
            self.emit(ProgressEvent::progress(format!("consolidate: removed {removed}")));
        }
        self.emit(ProgressEvent::progress(format!(
            "consolidate: {} clean file(s), {} with issues, {} placeholder file(s)",
            summary.clean_files.len(),
            summary.files_with_issues.len(),
            summary.placeholder_files.len()
        )));

        if let Some(state_dir) = index_path.parent() {
            if let Err(e) = report.save(state_dir) {
                self.emit(ProgressEvent::error(format!("review report not saved: {e}")));
            }
        }

        // final QA pass over the project shape
        let file_list: String = index.paths().map(|p| format!("- {p}\n")).collect();
        let qa_content = format!(
            "Objective: {}\nFiles produced:\n{file_list}",
            plan.objective().text()
        );
        let critique = self
            .critic
            .critique(self.deps.llm.as_ref(), &qa_content, ContentType::General)
            .await;
        if critique.verdict != Verdict::Pass {
            self.emit(ProgressEvent::log(format!(
                "final qa: {} with {} issue(s)",
                critique.verdict,
                critique.issues.len()
            )));
        }
        Ok(())
    }

    /// Best-effort post phases. Each failure is logged, never fatal.
    async fn post_phases(
        &mut self,
        plan: &Plan,
        project_type: ProjectType,
        project_dir: &Path,
        index: &FileIndex,
        report: &mut RunReport,
    ) {
        // visual QA needs a browser collaborator; none is wired here
        self.emit(ProgressEvent::log("visual qa skipped: no browser collaborator"));

        match self
            .deps
            .post
            .git_init_and_commit(project_dir, "Add generated project artifacts")
            .await
        {
            Ok(()) => self.emit(ProgressEvent::progress("git: committed artifacts")),
            Err(e) => self.emit(ProgressEvent::log(format!("git commit skipped: {e}"))),
        }

        // cross-run memory entry
        let memory = format!(
            "MEMORY: completed '{}' with {} file(s) at {}",
            plan.objective().text(),
            index.len(),
            project_dir.display()
        );
        if let Err(e) =
            self.recycler
                .save_to_domain(Domain::Decisions, &memory, self.clock.epoch_ms())
        {
            self.emit(ProgressEvent::log(format!("memory entry skipped: {e}")));
        }

        let repo_name = plan.objective().id().as_str().to_string();
        match self
            .deps
            .post
            .create_remote_repo(project_dir, &repo_name)
            .await
        {
            Ok(Some(url)) => {
                self.emit(ProgressEvent::progress(format!("remote repo: {url}")));
                report.github_url = Some(url);
            }
            Ok(None) => {}
            Err(e) => self.emit(ProgressEvent::log(format!("remote repo skipped: {e}"))),
        }

        let deployable = matches!(
            project_type,
            ProjectType::React | ProjectType::Landing | ProjectType::Fullstack
        );
        if deployable {
            match self.deps.post.deploy_frontend(project_dir).await {
                Ok(Some(url)) => {
                    self.emit(ProgressEvent::progress(format!("deployed: {url}")));
                    report.deployment = Some(url);
                }
                Ok(None) => {}
                Err(e) => self.emit(ProgressEvent::log(format!("deploy skipped: {e}"))),
            }
        }
    }

    fn save_checkpoint(&self, plan: &Plan, iteration: u32, project_dir: &Path) {
        let checkpoint = Checkpoint::new(
            plan.objective().text(),
            iteration,
            plan.completed_texts(),
            plan.pending_texts(),
            Some(PathBuf::from(project_dir)),
            self.clock.epoch_ms(),
            self.clock.iso8601(),
        );
        match self.checkpoints.save(&checkpoint) {
            Ok(id) => self.emit(ProgressEvent::log(format!("checkpoint {id} saved"))),
            // durability loss only; the run continues
            Err(e) => self.emit(ProgressEvent::error(format!("checkpoint save failed: {e}"))),
        }
    }

    fn apply_plan_modifications(&self, plan: &mut Plan) {
        let modifications = self.state.lock().take_modifications();
        for modification in modifications {
            match modification {
                PlanModification::Add { index, text, category } => {
                    let step = Step::new(text, category);
                    match index {
                        Some(index) => plan.insert(index, step),
                        None => plan.push(step),
                    }
                }
                PlanModification::Replace { index, text, category } => {
                    plan.replace(index, Step::new(text, category));
                }
                PlanModification::Remove { index } => {
                    plan.remove(index);
                }
            }
        }
    }

    /// Block at the step boundary while paused. A snapshot is taken
    /// once per pause; resume is race-free and idempotent.
    async fn wait_while_paused(&self, plan: &Plan) {
        let mut snapshotted = false;
        loop {
            let notified = self.resume_notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            {
                let mut state = self.state.lock();
                if !state.paused || state.stop_requested {
                    return;
                }
                if !snapshotted {
                    state.pause_snapshot = Some(PauseSnapshot {
                        iteration: state.iteration,
                        pending_steps: plan.pending_texts(),
                    });
                    snapshotted = true;
                }
            }
            self.emit(ProgressEvent::status("paused"));
            notified.await;
        }
    }

    fn emit(&self, event: ProgressEvent) {
        self.state
            .lock()
            .push_log(format!("[{}] {}", event.kind, event.content));
        if let Err(e) = self.progress.try_send(event) {
            tracing::debug!(error = %e, "progress event dropped");
        }
    }
}

fn domain_for(category: StepCategory) -> Domain {
    match category {
        StepCategory::Frontend => Domain::Frontend,
        StepCategory::Backend => Domain::Backend,
        StepCategory::Research | StepCategory::Academic => Domain::Research,
        _ => Domain::Decisions,
    }
}

fn content_type_for(category: StepCategory) -> ContentType {
    match category {
        StepCategory::Frontend | StepCategory::Backend | StepCategory::Core => ContentType::Code,
        StepCategory::Research | StepCategory::Academic => ContentType::Research,
        StepCategory::Business => ContentType::Business,
        _ => ContentType::General,
    }
}

fn head(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &s[..end])
}

fn repair_prompt(
    step_text: &str,
    syntax_issues: &[SyntaxIssue],
    missing: &[mar_extract::MissingModule],
    critic_issues: &[mar_core::Issue],
    command_feedback: &str,
) -> String {
    let mut prompt = format!(
        "The previous output for this step has problems. Fix them and re-emit \
         ONLY the affected files, complete.\n\nSTEP: {step_text}\n"
    );
    if !syntax_issues.is_empty() {
        prompt.push_str("\nSYNTAX ERRORS:\n");
        for issue in syntax_issues {
            prompt.push_str(&format!(
                "- {} line {}: {}\n",
                issue.file, issue.line, issue.message
            ));
        }
    }
    if !missing.is_empty() {
        prompt.push_str("\nMISSING MODULES (generate them):\n");
        for module in missing {
            prompt.push_str(&format!("- {} imported by {}\n", module.module, module.file));
        }
    }
    if !critic_issues.is_empty() {
        prompt.push_str("\nREVIEW FINDINGS:\n");
        for issue in critic_issues {
            prompt.push_str(&format!(
                "- [{}] {}: {}\n",
                issue.risk, issue.title, issue.suggested_fix
            ));
        }
    }
    if !command_feedback.is_empty() {
        prompt.push_str("\nCOMMAND RESULTS:\n");
        prompt.push_str(command_feedback);
    }
    prompt.push_str(
        "\nEmit fenced code blocks with filename=\"...\" only. No prose.",
    );
    prompt
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
