//! HTTP routes and handlers

use axum::{
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::PathBuf;
use std::time::Instant;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

use crate::state::AppState;
use textcat_core::{ScoreResult, ScoringRequest, TrainingRequest, TrainingResponse};

pub fn create_router(state: AppState) -> Router {
    let max_body_bytes = state.config.max_body_bytes;

    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .route("/models", get(list_models))
        .route("/train", post(train))
        .route("/score", post(score))
        .fallback(fallback)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

async fn metrics(State(state): State<AppState>) -> String {
    state.metrics_handle.render()
}

/// Registry entry as listed by `GET /models`
#[derive(Debug, Serialize, Deserialize)]
pub struct ModelEntry {
    pub model_identifier: String,
    pub path: PathBuf,
}

async fn list_models(State(state): State<AppState>) -> Json<Vec<ModelEntry>> {
    metrics::counter!("textcat_requests_total", "endpoint" => "models").increment(1);

    let models = state
        .service
        .models()
        .into_iter()
        .map(|(model_identifier, path)| ModelEntry {
            model_identifier,
            path,
        })
        .collect();
    Json(models)
}

/// Train a classifier on labeled documents
async fn train(
    State(state): State<AppState>,
    Json(req): Json<TrainingRequest>,
) -> Result<Json<TrainingResponse>, AppError> {
    metrics::counter!("textcat_requests_total", "endpoint" => "train").increment(1);
    info!(
        "Received training request: {} positive, {} negative documents",
        req.positive_documents.len(),
        req.negative_documents.len()
    );

    let service = state.service.clone();
    let start = Instant::now();
    let model_identifier = tokio::task::spawn_blocking(move || service.train(&req)).await??;

    metrics::histogram!("textcat_training_duration_ms")
        .record(start.elapsed().as_millis() as f64);
    metrics::counter!("textcat_models_trained_total").increment(1);

    Ok(Json(TrainingResponse { model_identifier }))
}

/// Score samples with a trained classifier
async fn score(
    State(state): State<AppState>,
    Json(req): Json<ScoringRequest>,
) -> Result<Json<Vec<ScoreResult>>, AppError> {
    metrics::counter!("textcat_requests_total", "endpoint" => "score").increment(1);
    debug!(
        "Received scoring request for model {} with {} samples",
        req.model_identifier,
        req.samples_to_score.len()
    );

    let service = state.service.clone();
    let start = Instant::now();
    let results = tokio::task::spawn_blocking(move || {
        service.score(&req.model_identifier, &req.samples_to_score)
    })
    .await??;

    metrics::histogram!("textcat_scoring_latency_us")
        .record(start.elapsed().as_micros() as f64);

    Ok(Json(results))
}

async fn fallback() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Not found")
}

/// Error handling
#[derive(Debug)]
pub enum AppError {
    Service(textcat_core::Error),
    Internal(String),
}

impl From<textcat_core::Error> for AppError {
    fn from(err: textcat_core::Error) -> Self {
        AppError::Service(err)
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::Internal(format!("worker task failed: {err}"))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        use textcat_core::Error;

        let (status, kind, message) = match self {
            AppError::Service(err @ Error::Validation(_)) => {
                (StatusCode::BAD_REQUEST, err.kind(), err.to_string())
            }
            // includes NotFound: a missing model is reported as a server error
            AppError::Service(err) => {
                (StatusCode::INTERNAL_SERVER_ERROR, err.kind(), err.to_string())
            }
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal", msg),
        };

        if status.is_server_error() {
            error!("Request failed ({}): {}", kind, message);
        } else {
            warn!("Request rejected ({}): {}", kind, message);
        }
        metrics::counter!("textcat_errors_total", "kind" => kind).increment(1);

        (status, Json(json!({ "detail": message }))).into_response()
    }
}
