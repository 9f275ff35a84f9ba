use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::config::MemoryConfig;

use super::book::HistoryBook;
use super::models::{AggregatedPatterns, LearningSummary, ProductionOutcome, ProductionRecord};
use super::preferences::PreferenceTag;
use super::r#trait::HistoryStore;

/// Non-persistent history store, used when memory is disabled and in tests.
pub struct InMemoryHistory {
    book: Mutex<HistoryBook>,
}

impl InMemoryHistory {
    pub fn new(cfg: &MemoryConfig) -> Self {
        Self {
            book: Mutex::new(HistoryBook::new(cfg)),
        }
    }

    pub async fn records(&self) -> Vec<ProductionRecord> {
        self.book.lock().await.history().to_vec()
    }
}

impl Default for InMemoryHistory {
    fn default() -> Self {
        Self::new(&MemoryConfig::default())
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistory {
    fn name(&self) -> &str {
        "in-memory"
    }

    async fn record_production(
        &self,
        project_name: &str,
        outcome: ProductionOutcome,
    ) -> anyhow::Result<()> {
        self.book.lock().await.record_production(project_name, &outcome);
        Ok(())
    }

    async fn record_feedback(
        &self,
        project_name: &str,
        feedback: &str,
    ) -> anyhow::Result<Vec<PreferenceTag>> {
        let mut book = self.book.lock().await;
        let (tags, _) = book.record_feedback(project_name, feedback);
        Ok(tags)
    }

    async fn add_learning(&self, instruction: &str) -> anyhow::Result<()> {
        self.book.lock().await.add_learning(instruction);
        Ok(())
    }

    async fn forget(&self, item: &str) -> anyhow::Result<()> {
        self.book.lock().await.forget(item);
        Ok(())
    }

    async fn summary(&self) -> anyhow::Result<LearningSummary> {
        Ok(self.book.lock().await.summary())
    }

    async fn patterns(&self) -> anyhow::Result<AggregatedPatterns> {
        Ok(self.book.lock().await.patterns().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feedback_round_trip_through_trait() {
        let store = InMemoryHistory::default();
        tokio_test::block_on(async {
            store
                .record_production(
                    "demo",
                    ProductionOutcome {
                        success: true,
                        outputs: vec![],
                        version: "v1".into(),
                    },
                )
                .await
                .unwrap();
            let tags = store.record_feedback("demo", "more detail").await.unwrap();
            assert_eq!(tags, vec![PreferenceTag::PrefersDetailedExplanations]);

            let summary = store.summary().await.unwrap();
            assert_eq!(summary.total_productions, 1);
            assert_eq!(summary.total_feedback_rounds, 1);
        });
    }
}
