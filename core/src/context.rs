use std::path::Path;
use std::sync::Arc;

use crate::catalog::Catalog;
use crate::config::AppConfig;
use crate::executor::{Coordinator, ExecutionOpts, TaskPlanner, TaskRunnerPlugin};
use crate::memory::HistoryStore;
use crate::project::ProjectStore;

/// Collaborators a coordinator run needs.
#[derive(Clone)]
pub struct Services {
    pub runner: Arc<dyn TaskRunnerPlugin>,
    pub history: Option<Arc<dyn HistoryStore>>,
}

impl Services {
    pub fn coordinator(&self, opts: ExecutionOpts) -> Coordinator {
        let coordinator = Coordinator::new(self.runner.clone(), opts);
        match &self.history {
            Some(history) => coordinator.with_history(history.clone()),
            None => coordinator,
        }
    }
}

#[async_trait::async_trait]
pub trait ServicesFactory: Send + Sync {
    async fn build_services(&self, cfg: &AppConfig) -> anyhow::Result<Services>;
}

#[derive(Clone)]
pub struct AppContext {
    cfg: AppConfig,
    catalog: Arc<Catalog>,
    services_factory: Option<Arc<dyn ServicesFactory>>,
}

impl AppContext {
    /// Build a context, loading the platform/brand/style catalog from the
    /// configured directory.
    pub fn new(cfg: AppConfig, services_factory: Option<Arc<dyn ServicesFactory>>) -> Self {
        let catalog = Catalog::load(Path::new(&cfg.paths.config_dir));
        Self::with_catalog(cfg, catalog, services_factory)
    }

    pub fn with_catalog(
        cfg: AppConfig,
        catalog: Catalog,
        services_factory: Option<Arc<dyn ServicesFactory>>,
    ) -> Self {
        Self {
            cfg,
            catalog: Arc::new(catalog),
            services_factory,
        }
    }

    pub fn cfg(&self) -> &AppConfig {
        &self.cfg
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn planner(&self) -> TaskPlanner<'_> {
        TaskPlanner::new(self.catalog.as_ref())
    }

    pub fn projects(&self) -> ProjectStore {
        ProjectStore::new(&self.cfg.paths.projects_dir)
    }

    pub fn with_config(&self, cfg: AppConfig) -> Self {
        Self {
            cfg,
            catalog: self.catalog.clone(),
            services_factory: self.services_factory.clone(),
        }
    }

    pub async fn build_services(&self) -> anyhow::Result<Services> {
        let Some(factory) = self.services_factory.as_ref() else {
            anyhow::bail!("services_factory missing (cannot build runner/history plugins)");
        };
        factory.build_services(&self.cfg).await
    }
}
