use std::sync::Arc;

use anyhow::Result;

use vidplan_core::api::{AppConfig, HistoryStore, TaskRunnerPlugin};

use crate::memory::FileHistoryStore;
use crate::runner::{ArtifactLayout, DryRunRunner, VideoToolRunner};

pub fn build_layout(cfg: &AppConfig) -> ArtifactLayout {
    ArtifactLayout::new(&cfg.paths.projects_dir, &cfg.paths.output_dir)
}

pub fn build_runner(cfg: &AppConfig) -> Arc<dyn TaskRunnerPlugin> {
    let layout = build_layout(cfg);
    if cfg.executor.dry_run {
        Arc::new(DryRunRunner::new(layout))
    } else {
        Arc::new(VideoToolRunner::new(
            &cfg.executor.video_tool,
            cfg.executor.video_tool_args.clone(),
            layout,
        ))
    }
}

pub async fn build_history(cfg: &AppConfig) -> Result<Option<Arc<dyn HistoryStore>>> {
    if !cfg.memory.enabled {
        return Ok(None);
    }
    let store = FileHistoryStore::open(cfg.paths.memory_dir(), &cfg.memory).await?;
    Ok(Some(Arc::new(store)))
}
