//! Declarative dataset configuration
//!
//! ```yaml
//! datasets:
//!   ccnews:
//!     source: stanford-oval/ccnews
//!     name: "2024"
//!     split: train
//!     streaming: true
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use textcat_core::{Error, Result};

/// Default location of the datasets file
pub const DEFAULT_DATASETS_CONFIG: &str = "datasets_config.yaml";

/// One configured corpus
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetSpec {
    /// Hub dataset name, or the path of a local `.jsonl` file
    pub source: String,

    /// Dataset configuration (subset) name
    #[serde(default)]
    pub name: Option<String>,

    /// Split to read, e.g. `train`
    pub split: String,

    /// Read lazily instead of loading everything when the dataset is opened
    #[serde(default)]
    pub streaming: bool,
}

/// Top-level datasets file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetsConfig {
    pub datasets: BTreeMap<String, DatasetSpec>,
}

impl DatasetsConfig {
    /// Load datasets from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_yaml(&contents)
            .map_err(|e| Error::config(format!("{}: {e}", path.display())))
    }

    /// Parse datasets from YAML text
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| Error::config(e.to_string()))
    }

    /// Look up a dataset by key
    pub fn get(&self, key: &str) -> Result<&DatasetSpec> {
        self.datasets
            .get(key)
            .ok_or_else(|| Error::config(format!("dataset '{key}' is not configured")))
    }
}
