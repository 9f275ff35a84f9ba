//! Execution planning and coordination for explainer-video productions
//!
//! A render request is turned into an [`ExecutionPlan`]: a short sequential
//! foreground chain followed by background groups whose members run
//! concurrently. The [`Coordinator`] drives the plan against a
//! [`TaskRunnerPlugin`] and reports per-output results.
//!
//! # Architecture
//!
//! ```text
//! Vec<OutputRequest> + RenderFilter
//!   ↓
//! TaskPlanner::plan_render() → ExecutionPlan { foreground, groups, estimate }
//!   ↓
//! ExecutionPlan::validate() → TaskGraph::validate() (cycles, missing deps)
//!   ↓
//! Coordinator::execute()
//!   ├─ foreground: one task at a time, halt on first failure
//!   └─ groups: execute_group_parallel() per group, in order
//!   ↓
//! RenderResult → HistoryStore::record_production()
//! ```

mod coordinator;
mod estimate;
mod graph;
pub mod planner;
mod progress;
mod scheduler;
pub mod traits;
pub mod types;

pub use coordinator::{default_version, Coordinator, PlanState};
pub use estimate::{duration_breakdown, estimate_total_duration, group_duration, DurationBreakdown};
pub use graph::TaskGraph;
pub use planner::{filter_outputs, TaskPlanner};
pub use progress::ProgressMonitor;
pub use scheduler::execute_group_parallel;
pub use traits::{TaskContext, TaskRunnerPlugin};
pub use types::*;
