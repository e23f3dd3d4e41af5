//! Core types for textcat

use serde::{Deserialize, Serialize};
use std::fmt;

/// Label reported when the classifier produces no prediction for a sample
pub const UNKNOWN_LABEL: &str = "unknown";

/// The two classes a textcat classifier distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    Positive,
    Negative,
}

impl Polarity {
    /// Class name as written after the `__label__` prefix
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
        }
    }
}

impl fmt::Display for Polarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of `POST /train`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrainingRequest {
    /// Documents of the positive class
    pub positive_documents: Vec<String>,

    /// Documents of the negative class
    pub negative_documents: Vec<String>,
}

impl TrainingRequest {
    /// Create a new training request
    pub fn new(positive_documents: Vec<String>, negative_documents: Vec<String>) -> Self {
        Self {
            positive_documents,
            negative_documents,
        }
    }

    /// Documents of one class
    pub fn documents(&self, polarity: Polarity) -> &[String] {
        match polarity {
            Polarity::Positive => &self.positive_documents,
            Polarity::Negative => &self.negative_documents,
        }
    }
}

/// Body returned by a successful `POST /train`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingResponse {
    pub model_identifier: String,
}

/// Body of `POST /score`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringRequest {
    /// Texts to classify, in the order results are wanted
    pub samples_to_score: Vec<String>,

    /// Identifier returned by a previous training run
    pub model_identifier: String,
}

/// Prediction for a single scored sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    /// The input sample, echoed back
    pub sample: String,

    /// Top label, or [`UNKNOWN_LABEL`]
    pub predicted_label: String,

    /// Probability of the top label (0.0-1.0)
    pub prediction_confidence: f32,
}

impl ScoreResult {
    /// Create a new score result
    pub fn new(sample: impl Into<String>, label: impl Into<String>, confidence: f32) -> Self {
        Self {
            sample: sample.into(),
            predicted_label: label.into(),
            prediction_confidence: confidence,
        }
    }

    /// Result for a sample the classifier could not label
    pub fn unknown(sample: impl Into<String>) -> Self {
        Self::new(sample, UNKNOWN_LABEL, 0.0)
    }
}
