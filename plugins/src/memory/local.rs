//! File-backed history store.
//!
//! Layout under the memory directory:
//!
//! ```text
//! production_history/<date>-<project>-<version>.json
//! aggregated/patterns.json
//! aggregated/learnings.json
//! ```
//!
//! Unreadable or malformed files are skipped with a warning; they never make
//! the store unusable.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::Mutex;

use vidplan_core::api::{
    AggregatedPatterns, HistoryBook, HistoryStore, LearningInstruction, LearningSummary,
    MemoryConfig, PreferenceTag, ProductionOutcome, ProductionRecord,
};

const HISTORY_DIR: &str = "production_history";
const AGGREGATED_DIR: &str = "aggregated";
const PATTERNS_FILE: &str = "patterns.json";
const LEARNINGS_FILE: &str = "learnings.json";

pub struct FileHistoryStore {
    root: PathBuf,
    book: Mutex<HistoryBook>,
}

impl FileHistoryStore {
    /// Open (creating if needed) the store rooted at `root` and load its state.
    pub async fn open(root: impl Into<PathBuf>, cfg: &MemoryConfig) -> Result<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(root.join(HISTORY_DIR))
            .await
            .with_context(|| format!("create {}", root.join(HISTORY_DIR).display()))?;
        tokio::fs::create_dir_all(root.join(AGGREGATED_DIR))
            .await
            .with_context(|| format!("create {}", root.join(AGGREGATED_DIR).display()))?;

        let history = load_history(&root.join(HISTORY_DIR)).await;
        let patterns: AggregatedPatterns =
            read_json_or_default(&root.join(AGGREGATED_DIR).join(PATTERNS_FILE)).await;
        let learnings: Vec<LearningInstruction> =
            read_json_or_default(&root.join(AGGREGATED_DIR).join(LEARNINGS_FILE)).await;

        tracing::debug!(
            target: "vidplan.memory",
            stage = "memory.open",
            root = %root.display(),
            productions = history.len(),
            learnings = learnings.len()
        );

        let book = HistoryBook::new(cfg).restore(history, patterns, learnings);
        Ok(Self {
            root,
            book: Mutex::new(book),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn record_path(&self, record: &ProductionRecord) -> PathBuf {
        self.root.join(HISTORY_DIR).join(record_file_name(record))
    }

    fn patterns_path(&self) -> PathBuf {
        self.root.join(AGGREGATED_DIR).join(PATTERNS_FILE)
    }

    fn learnings_path(&self) -> PathBuf {
        self.root.join(AGGREGATED_DIR).join(LEARNINGS_FILE)
    }
}

#[async_trait]
impl HistoryStore for FileHistoryStore {
    fn name(&self) -> &str {
        "file-history"
    }

    async fn record_production(
        &self,
        project_name: &str,
        outcome: ProductionOutcome,
    ) -> Result<()> {
        let mut book = self.book.lock().await;
        let (record, reaggregated) = book.record_production(project_name, &outcome);
        let path = self.record_path(record);
        write_json(&path, record).await?;

        tracing::debug!(
            target: "vidplan.memory",
            stage = "memory.record_production",
            project = %project_name,
            path = %path.display(),
            reaggregated
        );

        if reaggregated {
            write_json(&self.patterns_path(), book.patterns()).await?;
        }
        Ok(())
    }

    async fn record_feedback(&self, project_name: &str, feedback: &str) -> Result<Vec<PreferenceTag>> {
        let mut book = self.book.lock().await;
        let (tags, record) = book.record_feedback(project_name, feedback);
        match record {
            Some(record) => {
                write_json(&self.record_path(record), record).await?;
            }
            None => {
                tracing::debug!(
                    target: "vidplan.memory",
                    stage = "memory.record_feedback",
                    project = %project_name,
                    "no production history for project; feedback not persisted"
                );
            }
        }
        Ok(tags)
    }

    async fn add_learning(&self, instruction: &str) -> Result<()> {
        let mut book = self.book.lock().await;
        book.add_learning(instruction);
        write_json(&self.learnings_path(), book.learnings()).await
    }

    async fn forget(&self, item: &str) -> Result<()> {
        let mut book = self.book.lock().await;
        let dropped = book.forget(item);
        tracing::debug!(target: "vidplan.memory", stage = "memory.forget", item = %item, dropped);
        write_json(&self.learnings_path(), book.learnings()).await?;
        write_json(&self.patterns_path(), book.patterns()).await
    }

    async fn summary(&self) -> Result<LearningSummary> {
        Ok(self.book.lock().await.summary())
    }

    async fn patterns(&self) -> Result<AggregatedPatterns> {
        Ok(self.book.lock().await.patterns().clone())
    }
}

/// `<date>-<project>-<version>.json`, with unsafe characters replaced.
fn record_file_name(record: &ProductionRecord) -> String {
    let date = record.timestamp.get(..10).unwrap_or(&record.timestamp);
    let mut name = format!("{}-{}", date, record.project);
    if !record.version.is_empty() {
        name.push('-');
        name.push_str(&record.version);
    }
    let safe: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{safe}.json")
}

async fn load_history(dir: &Path) -> Vec<ProductionRecord> {
    let pattern = dir.join("*.json");
    let Some(pattern) = pattern.to_str() else {
        tracing::warn!(dir = %dir.display(), "history directory is not valid UTF-8");
        return Vec::new();
    };
    let paths: Vec<PathBuf> = match glob::glob(pattern) {
        Ok(paths) => paths.filter_map(|p| p.ok()).collect(),
        Err(e) => {
            tracing::warn!(error = %e, "invalid history glob");
            return Vec::new();
        }
    };

    let mut records = Vec::with_capacity(paths.len());
    for path in paths {
        match read_json::<ProductionRecord>(&path).await {
            Ok(record) => records.push(record),
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "skipping unreadable production record"),
        }
    }
    records
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))
}

async fn read_json_or_default<T: DeserializeOwned + Default>(path: &Path) -> T {
    if !path.exists() {
        return T::default();
    }
    match read_json(path).await {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "falling back to empty state");
            T::default()
        }
    }
}

async fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let body = serde_json::to_string_pretty(value)?;
    tokio::fs::write(path, body)
        .await
        .with_context(|| format!("write {}", path.display()))
}
