/// Options for a single coordinator run.
#[derive(Debug, Clone, Default)]
pub struct ExecutionOpts {
    /// Fixed version tag for the produced outputs; `v<unix-millis>` when unset.
    pub version: Option<String>,

    /// Upper bound on concurrently running tasks inside one group.
    /// `None` launches the whole group at once.
    pub max_parallel: Option<usize>,

    /// Per-task timeout in seconds, enforced at the task-execution boundary.
    pub task_timeout_secs: Option<u64>,

    /// Enable visual progress bars.
    pub progress_bar: bool,
}

impl ExecutionOpts {
    pub fn from_config(cfg: &crate::config::ExecutorConfig) -> Self {
        Self {
            version: None,
            max_parallel: cfg.max_parallel,
            task_timeout_secs: cfg.timeout_secs,
            progress_bar: cfg.progress,
        }
    }

    pub fn with_version(mut self, version: Option<String>) -> Self {
        self.version = version;
        self
    }
}
