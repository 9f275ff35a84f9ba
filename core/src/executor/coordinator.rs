use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::error::ExecutorError;
use crate::memory::{HistoryStore, ProductionOutcome};

use super::progress::ProgressMonitor;
use super::scheduler::execute_group_parallel;
use super::traits::{TaskContext, TaskRunnerPlugin};
use super::types::{
    AgentTask, ExecutionOpts, ExecutionPlan, OutputResult, RenderResult, TaskOutcome,
    DEFAULT_LANGUAGE,
};

/// Lifecycle of one plan execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanState {
    NotStarted,
    RunningForeground,
    RunningBackground,
    Completed,
    Failed,
}

/// Drives an [`ExecutionPlan`]: foreground tasks one at a time, then each
/// background group as a concurrent batch.
///
/// A foreground failure halts the run before any background work starts.
/// Background failures are reported per output and never abort siblings.
pub struct Coordinator {
    runner: Arc<dyn TaskRunnerPlugin>,
    history: Option<Arc<dyn HistoryStore>>,
    opts: ExecutionOpts,
    state: Mutex<PlanState>,
}

impl Coordinator {
    pub fn new(runner: Arc<dyn TaskRunnerPlugin>, opts: ExecutionOpts) -> Self {
        Self {
            runner,
            history: None,
            opts,
            state: Mutex::new(PlanState::NotStarted),
        }
    }

    pub fn with_history(mut self, history: Arc<dyn HistoryStore>) -> Self {
        self.history = Some(history);
        self
    }

    pub fn state(&self) -> PlanState {
        match self.state.lock() {
            Ok(s) => *s,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    fn transition(&self, next: PlanState) {
        let mut guard = match self.state.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        tracing::debug!(from = ?*guard, to = ?next, "plan state");
        *guard = next;
    }

    /// Execute the plan to completion.
    ///
    /// Returns `Err` only when the plan itself is malformed; task failures are
    /// reported through [`RenderResult`].
    #[tracing::instrument(name = "coordinator.execute", skip_all, fields(project = %plan.project_name()))]
    pub async fn execute(&self, plan: &ExecutionPlan) -> Result<RenderResult, ExecutorError> {
        plan.validate()?;

        let version = self.opts.version.clone().unwrap_or_else(default_version);
        let ctx = TaskContext {
            project_name: plan.project_name().to_string(),
            version: version.clone(),
        };
        let total_tasks = plan.tasks().count();
        let progress = Mutex::new(ProgressMonitor::new(total_tasks, self.opts.progress_bar));
        let started = Instant::now();

        tracing::info!(
            version = %version,
            tasks = total_tasks,
            groups = plan.background_groups().len(),
            estimated_secs = plan.estimated_total_duration(),
            "render started"
        );

        self.transition(PlanState::RunningForeground);
        with_progress(&progress, |p| p.set_phase("foreground"));

        for task in plan.foreground_tasks() {
            let outcome = self.run_task(task, &ctx, &progress).await;
            if !outcome.success {
                tracing::error!(
                    task_id = %task.id,
                    error = outcome.error.as_deref().unwrap_or("task reported failure"),
                    "foreground task failed; skipping background work"
                );
                self.transition(PlanState::Failed);
                with_progress(&progress, |p| p.finish(false));
                return Ok(RenderResult {
                    success: false,
                    outputs: Vec::new(),
                    version,
                    failed_stage: Some(task.id.clone()),
                });
            }
        }

        self.transition(PlanState::RunningBackground);
        let mut outputs = Vec::new();

        for group in plan.background_groups() {
            tracing::info!(group_id = %group.id, tasks = group.tasks.len(), "group started");
            with_progress(&progress, |p| p.set_phase(&group.id));

            let limit = self.opts.max_parallel.map(|n| n.max(1));
            let ctx_ref = &ctx;
            let progress_ref = &progress;
            let settled = execute_group_parallel(&group.tasks, limit, |task| async move {
                let outcome = self.run_task(&task, ctx_ref, progress_ref).await;
                (task, outcome)
            })
            .await;

            let mut by_id: HashMap<String, (AgentTask, TaskOutcome)> = settled.into_iter().collect();
            let mut failed = 0usize;
            // Report in plan order, not completion order.
            for planned in &group.tasks {
                let Some((task, outcome)) = by_id.remove(&planned.id) else {
                    continue;
                };
                if !outcome.success {
                    failed += 1;
                    tracing::warn!(
                        task_id = %task.id,
                        error = outcome.error.as_deref().unwrap_or("task reported failure"),
                        "background task failed"
                    );
                }
                if task.produces_output() {
                    outputs.push(output_result(&task, outcome));
                }
            }
            tracing::info!(group_id = %group.id, failed, "group finished");
        }

        self.transition(PlanState::Completed);
        with_progress(&progress, |p| p.finish(true));

        let result = RenderResult {
            success: true,
            outputs,
            version,
            failed_stage: None,
        };

        tracing::info!(
            outputs = result.outputs.len(),
            failed = result.failed_outputs().count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "render finished"
        );

        self.record(plan.project_name(), &result).await;
        Ok(result)
    }

    /// Run one task; runner errors and timeouts become failed outcomes.
    async fn run_task(
        &self,
        task: &AgentTask,
        ctx: &TaskContext,
        progress: &Mutex<ProgressMonitor>,
    ) -> TaskOutcome {
        with_progress(progress, |p| p.start_task(&task.id));
        tracing::debug!(task_id = %task.id, kind = %task.kind, runner = self.runner.name(), "task started");
        let started = Instant::now();

        let fut = self.runner.execute(task, ctx);
        let result = match self.opts.task_timeout_secs {
            Some(secs) => match tokio::time::timeout(Duration::from_secs(secs), fut).await {
                Ok(r) => r,
                Err(_) => Err(anyhow::anyhow!("timed out after {secs}s")),
            },
            None => fut.await,
        };

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::debug!(task_id = %task.id, error = %e, "runner returned error");
                TaskOutcome::failed(e.to_string())
            }
        };

        let elapsed = started.elapsed().as_millis() as u64;
        with_progress(progress, |p| p.finish_task(&task.id, outcome.success, elapsed));
        tracing::debug!(task_id = %task.id, success = outcome.success, elapsed_ms = elapsed, "task finished");
        outcome
    }

    async fn record(&self, project_name: &str, result: &RenderResult) {
        let Some(history) = &self.history else {
            return;
        };
        let outcome = ProductionOutcome {
            success: result.success,
            outputs: result.outputs.clone(),
            version: result.version.clone(),
        };
        if let Err(e) = history.record_production(project_name, outcome).await {
            tracing::warn!(store = history.name(), error = %e, "failed to record production");
        }
    }
}

fn output_result(task: &AgentTask, outcome: TaskOutcome) -> OutputResult {
    let id = task.output_id.clone().unwrap_or_else(|| task.id.clone());
    let path = outcome
        .output_path
        .unwrap_or_else(|| format!("output/{id}.mp4"));
    OutputResult {
        platform: task.platform.clone().unwrap_or_default(),
        language: task
            .language
            .clone()
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
        id,
        path,
        success: outcome.success,
        error: outcome.error,
    }
}

fn with_progress(progress: &Mutex<ProgressMonitor>, f: impl FnOnce(&mut ProgressMonitor)) {
    if let Ok(mut monitor) = progress.lock() {
        f(&mut monitor);
    }
}

/// `v<unix-millis>`.
pub fn default_version() -> String {
    format!("v{}", chrono::Utc::now().timestamp_millis())
}
