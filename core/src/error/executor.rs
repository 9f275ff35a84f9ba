use thiserror::Error;

/// Errors raised while validating or driving an execution plan
#[derive(Error, Debug)]
pub enum ExecutorError {
    #[error("Duplicate task ID: {0}")]
    DuplicateTaskId(String),

    #[error("Dependency not found: task '{task_id}' depends on '{missing_dep}'")]
    DependencyNotFound {
        task_id: String,
        missing_dep: String,
    },

    #[error("Forward reference: '{task_id}' depends on '{dep}' which appears later in the plan")]
    ForwardReference { task_id: String, dep: String },

    #[error("Circular dependency detected: {0}")]
    CircularDependency(String),

    #[error("Task '{task_id}' depends on '{dep}' inside the same group '{group_id}'")]
    IntraGroupDependency {
        group_id: String,
        task_id: String,
        dep: String,
    },

    #[error("Runner error: {0}")]
    Runner(String),
}
