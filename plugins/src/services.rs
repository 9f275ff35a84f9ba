//! ServicesFactory implementation: builds the task runner and history store
//! from configuration for the CLI.
use async_trait::async_trait;
use vidplan_core::api::{AppConfig, Services, ServicesFactory};

use crate::factory;

#[derive(Default)]
pub struct PluginServicesFactory;

#[async_trait]
impl ServicesFactory for PluginServicesFactory {
    async fn build_services(&self, cfg: &AppConfig) -> anyhow::Result<Services> {
        let history = factory::build_history(cfg).await?;
        let runner = factory::build_runner(cfg);
        tracing::debug!(
            runner = runner.name(),
            history = history.as_ref().map(|h| h.name()).unwrap_or("none"),
            "services built"
        );
        Ok(Services { runner, history })
    }
}
