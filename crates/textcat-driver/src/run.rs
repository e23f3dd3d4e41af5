//! The train and score flows behind the two binaries
//!
//! Console output goes to a caller-supplied writer and the score flow asks a
//! [`ModelSelector`] which model to use.

use crate::cli::{CommonArgs, ScoreArgs, TrainArgs};
use crate::datasets::{fetch_datasets_from_config, take_dataset, RecordStream};
use crate::error::{DriverError, Result};
use crate::output::score_line;
use crate::sampling::{collect_documents, TextExtractor};
use crate::selection::ModelSelector;
use reqwest::StatusCode;
use std::io::Write;
use std::process::ExitCode;
use textcat_core::{ModelStore, ScoringRequest, TrainingRequest};
use tracing::warn;

/// Dataset key of the positive (news) corpus
pub const POSITIVE_DATASET: &str = "ccnews";

/// Dataset key of the negative (encyclopedia) corpus
pub const NEGATIVE_DATASET: &str = "wikipedia";

pub const NO_MODELS: &str = "No models available. Train a model first.";
pub const INVALID_SELECTION: &str = "Invalid selection.";

/// How a driver run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
}

impl From<Outcome> for ExitCode {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Success => ExitCode::SUCCESS,
            Outcome::Failure => ExitCode::FAILURE,
        }
    }
}

/// Open the configured datasets and hand back the news and encyclopedia streams
async fn open_corpora(
    common: &CommonArgs,
    http: &reqwest::Client,
) -> Result<(RecordStream, RecordStream)> {
    let loader = common.dataset_loader(http.clone());
    let mut datasets = fetch_datasets_from_config(&loader, &common.datasets_config).await?;
    let positive = take_dataset(&mut datasets, POSITIVE_DATASET)?;
    let negative = take_dataset(&mut datasets, NEGATIVE_DATASET)?;
    Ok((positive, negative))
}

fn report_rejection(out: &mut dyn Write, status: StatusCode, body: &str) -> Result<Outcome> {
    writeln!(out, "Error: {}", status.as_u16())?;
    writeln!(out, "{body}")?;
    Ok(Outcome::Failure)
}

/// Sample documents from both corpora and submit a training run
pub async fn run_train(args: &TrainArgs, out: &mut dyn Write) -> Result<Outcome> {
    let positive_count = args.positive_count;
    let negative_count = args.negative_count();

    let http = reqwest::Client::new();
    let (mut news, mut reference) = open_corpora(&args.common, &http).await?;

    writeln!(out, "Extracting {positive_count} positive samples from CCNews...")?;
    let positive = collect_documents(&mut news, &TextExtractor::ccnews(), positive_count).await?;

    writeln!(out, "\nExtracting {negative_count} negative samples from Wikipedia...")?;
    let negative =
        collect_documents(&mut reference, &TextExtractor::wikipedia(), negative_count).await?;

    writeln!(out, "\nSubmitting training request...")?;
    match args.common.client(http).train(&TrainingRequest::new(positive, negative)).await {
        Ok(answer) => {
            writeln!(out, "{answer}")?;
            Ok(Outcome::Success)
        }
        Err(DriverError::Service { status, body }) => report_rejection(out, status, &body),
        Err(e) => Err(e),
    }
}

/// Let `selector` pick a stored model, then score a few fresh samples with it
pub async fn run_score(
    args: &ScoreArgs,
    selector: &mut dyn ModelSelector,
    out: &mut dyn Write,
) -> Result<Outcome> {
    let models = ModelStore::at(&args.models_dir).list().unwrap_or_else(|e| {
        warn!("{e}");
        Vec::new()
    });
    if models.is_empty() {
        writeln!(out, "{NO_MODELS}")?;
        return Ok(Outcome::Failure);
    }

    writeln!(out, "Available models:")?;
    for (i, model) in models.iter().enumerate() {
        writeln!(out, "{}. {}", i + 1, model.file_name)?;
    }
    out.flush()?;

    let Some(model) = selector.select(&models).and_then(|i| models.get(i)) else {
        writeln!(out, "{INVALID_SELECTION}")?;
        return Ok(Outcome::Failure);
    };
    let model_identifier = model.identifier.clone();

    let http = reqwest::Client::new();
    let (mut news, mut reference) = open_corpora(&args.common, &http).await?;
    let sample_size = args.sample_size;

    writeln!(out, "Extracting {sample_size} positive samples from CCNews...")?;
    let mut samples = collect_documents(&mut news, &TextExtractor::ccnews(), sample_size).await?;

    writeln!(out, "\nExtracting {sample_size} negative samples from Wikipedia...")?;
    samples.extend(
        collect_documents(&mut reference, &TextExtractor::wikipedia(), sample_size).await?,
    );

    let request = ScoringRequest {
        samples_to_score: samples,
        model_identifier,
    };
    match args.common.client(http).score(&request).await {
        Ok(results) => {
            writeln!(out, "Received scores:")?;
            for (i, result) in results.iter().enumerate() {
                writeln!(out, "{}", score_line(i + 1, result))?;
            }
            Ok(Outcome::Success)
        }
        Err(DriverError::Service { status, body }) => report_rejection(out, status, &body),
        Err(e) => Err(e),
    }
}
