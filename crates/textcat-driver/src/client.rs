//! Client for the training/scoring API

use crate::error::{DriverError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use textcat_core::{ScoreResult, ScoringRequest, TrainingRequest};
use tracing::debug;

/// Default service address
pub const DEFAULT_SERVER: &str = "http://127.0.0.1:8000";

#[derive(Debug, Clone)]
pub struct ServiceClient {
    http: reqwest::Client,
    base_url: String,
}

impl ServiceClient {
    /// Training has no deadline, so no request timeout is set
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Submit a training run; the raw JSON answer is returned for display
    pub async fn train(&self, request: &TrainingRequest) -> Result<serde_json::Value> {
        debug!(
            "Submitting {} positive / {} negative documents",
            request.positive_documents.len(),
            request.negative_documents.len()
        );
        self.post("train", request).await
    }

    /// Score samples against a trained model
    pub async fn score(&self, request: &ScoringRequest) -> Result<Vec<ScoreResult>> {
        debug!(
            "Scoring {} samples with model {}",
            request.samples_to_score.len(),
            request.model_identifier
        );
        self.post("score", request).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let response = self
            .http
            .post(format!("{}/{path}", self.base_url))
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            return Err(DriverError::Service { status, body });
        }
        Ok(response.json().await?)
    }
}
