//! Application state shared across all requests

use crate::config::ServerConfig;
use anyhow::Result;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use textcat_classifiers::{ClassifierService, ModelRegistry};
use textcat_core::ModelStore;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    /// Loaded configuration
    pub config: Arc<ServerConfig>,

    /// Train/score operations over the model store
    pub service: Arc<ClassifierService>,

    /// Prometheus metrics handle for rendering
    pub metrics_handle: PrometheusHandle,
}

impl AppState {
    /// Open the model store and rebuild the registry from it
    pub fn new(config: ServerConfig, metrics_handle: PrometheusHandle) -> Result<Self> {
        info!("Opening model storage at {}", config.storage_dir.display());
        let store = ModelStore::open(&config.storage_dir)?;

        let registry = ModelRegistry::from_store(&store)?;
        info!("Registered {} existing models", registry.len());

        let service = ClassifierService::new(store, Arc::new(registry), config.training.clone());

        Ok(Self {
            config: Arc::new(config),
            service: Arc::new(service),
            metrics_handle,
        })
    }
}
