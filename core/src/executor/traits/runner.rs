use async_trait::async_trait;

use crate::executor::types::{AgentTask, TaskOutcome};

/// Task executor plugin: performs the actual production work for one task.
///
/// The coordinator never looks inside; it only consumes the outcome. An `Err`
/// is treated like a failed outcome at the task boundary.
#[async_trait]
pub trait TaskRunnerPlugin: Send + Sync {
    /// Plugin name (unique identifier)
    fn name(&self) -> &str;

    async fn execute(&self, task: &AgentTask, context: &TaskContext)
        -> anyhow::Result<TaskOutcome>;
}

/// Plan-level context handed to every task execution.
#[derive(Debug, Clone)]
pub struct TaskContext {
    pub project_name: String,
    pub version: String,
}
