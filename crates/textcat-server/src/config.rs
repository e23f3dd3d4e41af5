//! Server configuration

use crate::cli::Cli;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use textcat_classifiers::TrainingConfig;

/// Environment variables with this prefix override file values,
/// e.g. `TEXTCAT__PORT=9000` or `TEXTCAT__TRAINING__EPOCHS=3`
const ENV_PREFIX: &str = "TEXTCAT";

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Listen port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory holding `model_<id>.bin` artifacts and temporary corpora
    #[serde(default = "default_storage_dir")]
    pub storage_dir: PathBuf,

    /// Largest accepted request body
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// Hyperparameters applied to every training request
    #[serde(default)]
    pub training: TrainingConfig,
}

impl ServerConfig {
    /// Load configuration from file, environment and CLI overrides
    pub fn load(config_path: &str, cli: &Cli) -> anyhow::Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(Path::new(config_path)).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut config: Self = settings.try_deserialize()?;

        // Apply CLI overrides
        if let Some(listen) = &cli.listen {
            config.listen = listen.clone();
        }

        if let Some(port) = cli.port {
            config.port = port;
        }

        if let Some(storage_dir) = &cli.storage_dir {
            config.storage_dir = storage_dir.clone();
        }

        config.training.validate()?;
        Ok(config)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            port: default_port(),
            storage_dir: default_storage_dir(),
            max_body_bytes: default_max_body_bytes(),
            training: TrainingConfig::default(),
        }
    }
}

fn default_listen() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_storage_dir() -> PathBuf {
    PathBuf::from("models")
}

fn default_max_body_bytes() -> usize {
    1024 * 1024 * 1024 // 1GiB; training payloads carry 40k+ documents
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn yaml_file(content: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        write!(file, "{content}").unwrap();
        file
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = ServerConfig::load("/no/such/config.yaml", &Cli::default()).unwrap();
        assert_eq!(config.port, 8000);
        assert_eq!(config.listen, "127.0.0.1");
        assert_eq!(config.storage_dir, PathBuf::from("models"));
        assert_eq!(config.training, TrainingConfig::default());
    }

    #[test]
    fn test_file_and_cli_overrides() {
        let file = yaml_file("port: 9100\nstorage_dir: /srv/models\ntraining:\n  epochs: 3\n");

        let cli = Cli {
            port: Some(9200),
            ..Default::default()
        };
        let config = ServerConfig::load(file.path().to_str().unwrap(), &cli).unwrap();

        assert_eq!(config.port, 9200);
        assert_eq!(config.storage_dir, PathBuf::from("/srv/models"));
        assert_eq!(config.training.epochs, 3);
        assert_eq!(config.training.dim, 50);
    }

    #[test]
    fn test_invalid_training_config_rejected() {
        let file = yaml_file("training:\n  dim: 0\n");
        assert!(ServerConfig::load(file.path().to_str().unwrap(), &Cli::default()).is_err());
    }
}
