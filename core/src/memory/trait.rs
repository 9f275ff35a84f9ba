use async_trait::async_trait;

use super::models::{AggregatedPatterns, LearningSummary, ProductionOutcome};
use super::preferences::PreferenceTag;

#[async_trait]
pub trait HistoryStore: Send + Sync {
    fn name(&self) -> &str;

    /// Append the outcome of one completed plan execution.
    async fn record_production(
        &self,
        project_name: &str,
        outcome: ProductionOutcome,
    ) -> anyhow::Result<()>;

    /// Classify free-text feedback and attach the tags to the project's most
    /// recent production. Returns the detected tags.
    async fn record_feedback(
        &self,
        project_name: &str,
        feedback: &str,
    ) -> anyhow::Result<Vec<PreferenceTag>>;

    async fn add_learning(&self, instruction: &str) -> anyhow::Result<()>;

    /// Drop learnings and preferences mentioning `item`.
    async fn forget(&self, item: &str) -> anyhow::Result<()>;

    async fn summary(&self) -> anyhow::Result<LearningSummary>;

    async fn patterns(&self) -> anyhow::Result<AggregatedPatterns>;
}
