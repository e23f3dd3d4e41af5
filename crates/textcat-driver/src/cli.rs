use crate::client::{ServiceClient, DEFAULT_SERVER};
use crate::datasets::{DatasetLoader, DEFAULT_DATASETS_CONFIG};
use clap::{Args, Parser};
use std::path::PathBuf;

/// Options shared by both drivers
#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// Base URL of the textcat service
    #[arg(long, env = "TEXTCAT_SERVER", default_value = DEFAULT_SERVER)]
    pub server: String,

    /// Datasets file
    #[arg(long, default_value = DEFAULT_DATASETS_CONFIG)]
    pub datasets_config: PathBuf,

    /// Override the datasets-server endpoint used for Hub datasets
    #[arg(long, env = "TEXTCAT_HUB_URL")]
    pub hub_url: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl CommonArgs {
    pub fn client(&self, http: reqwest::Client) -> ServiceClient {
        ServiceClient::new(http, &self.server)
    }

    pub fn dataset_loader(&self, http: reqwest::Client) -> DatasetLoader {
        let loader = DatasetLoader::new(http);
        match &self.hub_url {
            Some(url) => loader.with_hub_url(url),
            None => loader,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "textcat-train")]
#[command(author, version, about = "Train a news-vs-encyclopedia classifier from configured datasets")]
pub struct TrainArgs {
    /// Number of positive (news) documents
    pub positive_count: usize,

    /// Number of negative (encyclopedia) documents; defaults to the positive count
    pub negative_count: Option<usize>,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl TrainArgs {
    pub fn negative_count(&self) -> usize {
        self.negative_count.unwrap_or(self.positive_count)
    }
}

#[derive(Parser, Debug)]
#[command(name = "textcat-score")]
#[command(author, version, about = "Score sample documents with a trained classifier")]
pub struct ScoreArgs {
    /// Directory holding trained models
    #[arg(long, default_value = "models")]
    pub models_dir: PathBuf,

    /// Documents sampled from each dataset
    #[arg(long, default_value_t = 5)]
    pub sample_size: usize,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_count_defaults_to_positive() {
        let args = TrainArgs::try_parse_from(["textcat-train", "20000"]).unwrap();
        assert_eq!(args.positive_count, 20_000);
        assert_eq!(args.negative_count(), 20_000);
        assert_eq!(args.common.datasets_config, PathBuf::from("datasets_config.yaml"));

        let args = TrainArgs::try_parse_from(["textcat-train", "20000", "30000"]).unwrap();
        assert_eq!(args.negative_count(), 30_000);
    }

    #[test]
    fn test_train_requires_counts() {
        assert!(TrainArgs::try_parse_from(["textcat-train"]).is_err());
        assert!(TrainArgs::try_parse_from(["textcat-train", "many"]).is_err());
        assert!(TrainArgs::try_parse_from(["textcat-train", "1", "2", "3"]).is_err());
    }

    #[test]
    fn test_score_defaults() {
        let args = ScoreArgs::try_parse_from(["textcat-score", "--server", "http://localhost:9000"])
            .unwrap();
        assert_eq!(args.models_dir, PathBuf::from("models"));
        assert_eq!(args.sample_size, 5);
        assert_eq!(args.common.server, "http://localhost:9000");
    }
}
