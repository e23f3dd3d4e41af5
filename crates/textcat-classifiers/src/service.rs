//! Training and scoring services
//!
//! Transport-independent: the HTTP layer only deserializes requests, calls
//! into [`ClassifierService`] on the blocking pool and maps errors.

use crate::classifier::Classifier;
use crate::config::TrainingConfig;
use crate::corpus::LabeledCorpus;
use crate::fasttext::{FastText, Trainer};
use crate::registry::SharedRegistry;
use std::path::PathBuf;
use std::time::Instant;
use textcat_core::storage::new_identifier;
use textcat_core::{Error, ModelStore, Result, ScoreResult, TrainingRequest};
use tracing::{debug, info};

/// Fewest positive documents a training request may carry
pub const MIN_POSITIVE_SAMPLES: usize = 20_000;

/// Message returned when a scored model does not exist
pub const MODEL_NOT_FOUND: &str = "Specified model not found.";

/// Check the sample counts of a training request.
///
/// The positive count is checked first, so a request short on both sides
/// reports the positive shortfall.
pub fn validate_sample_counts(positive: usize, negative: usize) -> Result<()> {
    if positive < MIN_POSITIVE_SAMPLES {
        return Err(Error::validation("Minimum 20,000 positive samples required."));
    }
    if negative < positive {
        return Err(Error::validation(format!(
            "Negative samples must be at least {positive}."
        )));
    }
    Ok(())
}

/// Score every sample with `classifier`, in input order
pub fn score_samples(classifier: &dyn Classifier, samples: &[String]) -> Vec<ScoreResult> {
    debug!("Scoring {} samples with {}", samples.len(), classifier.name());
    samples
        .iter()
        .map(|sample| match classifier.classify(sample) {
            Some(result) => ScoreResult::new(sample.as_str(), result.label, result.score),
            None => ScoreResult::unknown(sample.as_str()),
        })
        .collect()
}

/// Trains, persists, registers and scores models
#[derive(Clone)]
pub struct ClassifierService {
    store: ModelStore,
    registry: SharedRegistry,
    training: TrainingConfig,
}

impl ClassifierService {
    pub fn new(store: ModelStore, registry: SharedRegistry, training: TrainingConfig) -> Self {
        Self {
            store,
            registry,
            training,
        }
    }

    pub fn store(&self) -> &ModelStore {
        &self.store
    }

    pub fn registry(&self) -> &SharedRegistry {
        &self.registry
    }

    /// Train a model on `request` and return its identifier.
    ///
    /// The temporary corpus is removed whether or not training succeeds.
    pub fn train(&self, request: &TrainingRequest) -> Result<String> {
        let positive = request.positive_documents.len();
        let negative = request.negative_documents.len();
        validate_sample_counts(positive, negative)?;

        info!("Training on {} positive and {} negative documents", positive, negative);
        let start = Instant::now();

        let model = {
            let corpus = LabeledCorpus::write(self.store.new_corpus_path(), request)?;
            Trainer::new(self.training.clone())?.train_file(corpus.path())?
        };

        let identifier = new_identifier();
        let path = self.store.model_path(&identifier);
        model.save(&path)?;
        self.registry.register(identifier.as_str(), path)?;

        info!("Model {} trained in {:?}", identifier, start.elapsed());
        Ok(identifier)
    }

    /// Score `samples` with the model named `identifier`.
    ///
    /// The artifact is located from the identifier alone and loaded fresh on
    /// every call.
    pub fn score(&self, identifier: &str, samples: &[String]) -> Result<Vec<ScoreResult>> {
        let path = self
            .store
            .resolve(identifier)
            .ok_or_else(|| Error::not_found(MODEL_NOT_FOUND))?;

        let model = FastText::load(&path)?;
        debug!("Scoring {} samples with model {}", samples.len(), identifier);
        Ok(score_samples(&model, samples))
    }

    /// Registered models, sorted by identifier
    pub fn models(&self) -> Vec<(String, PathBuf)> {
        self.registry.entries()
    }
}
