//! Dataset loading
//!
//! Every configured dataset is opened as a lazy stream of JSON object
//! records. A `source` naming an existing local file is read as JSON lines;
//! anything else is treated as a Hub dataset and paged from datasets-server.

pub mod config;
pub mod hub;
pub mod jsonl;

pub use config::{DatasetSpec, DatasetsConfig, DEFAULT_DATASETS_CONFIG};
pub use hub::DEFAULT_HUB_URL;

use futures::stream::BoxStream;
use std::collections::BTreeMap;
use std::path::Path;
use textcat_core::Result;
use tracing::info;

/// One dataset row
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Lazily produced dataset rows
pub type RecordStream = BoxStream<'static, Result<Record>>;

/// Opens configured datasets
#[derive(Debug, Clone)]
pub struct DatasetLoader {
    http: reqwest::Client,
    hub_url: String,
}

impl DatasetLoader {
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            hub_url: DEFAULT_HUB_URL.to_string(),
        }
    }

    /// Point Hub lookups at another datasets-server
    pub fn with_hub_url(mut self, hub_url: impl Into<String>) -> Self {
        self.hub_url = hub_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Open a single dataset
    pub async fn open(&self, spec: &DatasetSpec) -> Result<RecordStream> {
        let local = Path::new(&spec.source);
        if local.is_file() {
            info!("Opening local dataset {}", local.display());
            return if spec.streaming {
                jsonl::open_streaming(local).await
            } else {
                jsonl::open_eager(local).await
            };
        }

        let split = hub::resolve(&self.http, &self.hub_url, spec).await?;
        info!(
            "Opening hub dataset {} ({}/{})",
            split.dataset, split.config, split.split
        );
        Ok(hub::rows(self.http.clone(), &self.hub_url, split))
    }

    /// Open every configured dataset, keyed like the config
    pub async fn open_all(&self, config: &DatasetsConfig) -> Result<BTreeMap<String, RecordStream>> {
        let mut streams = BTreeMap::new();
        for (key, spec) in &config.datasets {
            streams.insert(key.clone(), self.open(spec).await?);
        }
        Ok(streams)
    }
}

/// Load the datasets file and open everything it names
pub async fn fetch_datasets_from_config(
    loader: &DatasetLoader,
    config_path: impl AsRef<Path>,
) -> Result<BTreeMap<String, RecordStream>> {
    let config = DatasetsConfig::from_file(config_path)?;
    loader.open_all(&config).await
}

/// Remove a dataset from the opened set, failing if it was not configured
pub fn take_dataset(
    streams: &mut BTreeMap<String, RecordStream>,
    key: &str,
) -> Result<RecordStream> {
    streams
        .remove(key)
        .ok_or_else(|| textcat_core::Error::config(format!("dataset '{key}' is not configured")))
}
