use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub executor: ExecutorConfig,

    #[serde(default)]
    pub memory: MemoryConfig,

    #[serde(default)]
    pub defaults: DefaultsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_enabled")]
    pub enabled: bool,

    /// If true, log to stderr.
    #[serde(default = "default_logging_console")]
    pub console: bool,

    /// If true, log to a file under `directory` (or OS temp dir if unset).
    #[serde(default)]
    pub file: bool,

    /// EnvFilter string, e.g. "info" or "vidplan_core=debug".
    #[serde(default = "default_logging_level")]
    pub level: String,

    /// Optional directory for log files. If empty or unset, uses `<data_dir>/logs`.
    #[serde(default)]
    pub directory: Option<String>,
}

fn default_logging_enabled() -> bool {
    true
}

fn default_logging_console() -> bool {
    true
}

fn default_logging_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_logging_enabled(),
            console: default_logging_console(),
            file: false,
            level: default_logging_level(),
            directory: None,
        }
    }
}

/// Directories used by the tool. Relative entries are resolved against the
/// data directory at load time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Root for everything else (`~/.vidplan` by default).
    #[serde(default)]
    pub data_dir: Option<String>,

    /// Platform / brand / style definitions.
    #[serde(default = "default_config_dir")]
    pub config_dir: String,

    #[serde(default = "default_projects_dir")]
    pub projects_dir: String,

    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

fn default_config_dir() -> String {
    "catalog".to_string()
}

fn default_projects_dir() -> String {
    "projects".to_string()
}

fn default_output_dir() -> String {
    "output".to_string()
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            config_dir: default_config_dir(),
            projects_dir: default_projects_dir(),
            output_dir: default_output_dir(),
        }
    }
}

impl PathsConfig {
    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(self.data_dir.as_deref().unwrap_or("."))
    }

    pub fn memory_dir(&self) -> PathBuf {
        self.data_dir().join("memory")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutorConfig {
    /// External video-production tool invoked once per task.
    #[serde(default = "default_video_tool")]
    pub video_tool: String,

    /// Extra arguments placed before the per-task arguments.
    #[serde(default)]
    pub video_tool_args: Vec<String>,

    /// Simulate every task instead of invoking the tool.
    #[serde(default)]
    pub dry_run: bool,

    /// Bound on concurrently running tasks inside one group.
    #[serde(default = "default_max_parallel")]
    pub max_parallel: Option<usize>,

    /// Per-task timeout in seconds.
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    #[serde(default = "default_progress")]
    pub progress: bool,
}

fn default_video_tool() -> String {
    "video-explainer".to_string()
}

fn default_max_parallel() -> Option<usize> {
    Some(num_cpus::get().max(1))
}

fn default_progress() -> bool {
    true
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            video_tool: default_video_tool(),
            video_tool_args: Vec::new(),
            dry_run: false,
            max_parallel: default_max_parallel(),
            timeout_secs: None,
            progress: default_progress(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    #[serde(default = "default_memory_enabled")]
    pub enabled: bool,

    /// Recompute aggregated patterns every N productions.
    #[serde(default = "default_aggregate_every")]
    pub aggregate_every: usize,

    /// Occurrences needed before a preference counts as recurring.
    #[serde(default = "default_min_preference_count")]
    pub min_preference_count: u32,
}

fn default_memory_enabled() -> bool {
    true
}

fn default_aggregate_every() -> usize {
    5
}

fn default_min_preference_count() -> u32 {
    2
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            enabled: default_memory_enabled(),
            aggregate_every: default_aggregate_every(),
            min_preference_count: default_min_preference_count(),
        }
    }
}

/// Global defaults applied to new projects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default = "default_brand")]
    pub brand: String,
    #[serde(default = "default_style")]
    pub style: String,
    #[serde(default)]
    pub voice_provider: Option<String>,
}

fn default_brand() -> String {
    "minimal".to_string()
}

fn default_style() -> String {
    "minimal".to_string()
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            brand: default_brand(),
            style: default_style(),
            voice_provider: None,
        }
    }
}
