use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

use vidplan_core::api::{AgentTask, TaskContext, TaskOutcome, TaskRunnerPlugin};

use super::ArtifactLayout;

/// Pretends every task succeeded; used by `--dry-run` to exercise a plan
/// without the external tool.
pub struct DryRunRunner {
    layout: ArtifactLayout,
    delay: Duration,
}

impl DryRunRunner {
    pub fn new(layout: ArtifactLayout) -> Self {
        Self {
            layout,
            delay: Duration::ZERO,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl TaskRunnerPlugin for DryRunRunner {
    fn name(&self) -> &str {
        "dry-run"
    }

    async fn execute(&self, task: &AgentTask, ctx: &TaskContext) -> Result<TaskOutcome> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let path = self.layout.artifact_path(task, ctx);
        tracing::info!(
            task_id = %task.id,
            kind = %task.kind,
            artifact = ?path,
            "[dry-run] would execute task"
        );
        Ok(TaskOutcome::succeeded(
            path.map(|p| p.to_string_lossy().to_string()),
        ))
    }
}
