//! Stable re-exports for consumers (`cli`, `plugins`, and external crates).
//!
//! Prefer importing from `vidplan_core::api` instead of reaching into internal modules.

pub use crate::catalog::{
    BrandConfig, Catalog, FixedPlatforms, PlatformConfig, PlatformInfo, PlatformResolver,
    StyleConfig, DEFAULT_ASPECT_RATIO,
};
pub use crate::config::{
    get_data_dir, load_default, load_from_path, AppConfig, DefaultsConfig, ExecutorConfig,
    LoggingConfig, MemoryConfig, PathsConfig,
};
pub use crate::context::{AppContext, Services, ServicesFactory};
pub use crate::error::{CliError, ConfigError, ExecutorError, ProjectError};
pub use crate::executor::{
    default_version, duration_breakdown, estimate_total_duration, filter_outputs, AgentTask,
    Coordinator, DurationBreakdown, ExecutionOpts, ExecutionPlan, OutputRequest, OutputResult,
    PlanState, RenderFilter, RenderResult, TaskContext, TaskGroup, TaskKind, TaskOutcome,
    TaskPlanner, TaskRunnerPlugin,
};
pub use crate::memory::{
    classify_feedback, AggregatedPatterns, HistoryBook, HistoryStore, InMemoryHistory,
    LearningInstruction, LearningSource, LearningSummary, PreferenceTag, ProductionOutcome,
    ProductionRecord,
};
pub use crate::project::{
    create_project, Chunking, NewProjectOptions, OutputConfig, ProjectConfig, ProjectStore,
};
