//! textcat Classifiers
//!
//! Supervised text classification for the textcat service.
//!
//! - [`fasttext`]: the classifier engine (dictionary, n-gram hashing, SGD
//!   training, binary model format)
//! - [`registry`]: in-memory index of trained models
//! - [`service`]: train/score operations behind the HTTP API

pub mod classifier;
pub mod config;
pub mod corpus;
pub mod fasttext;
pub mod registry;
pub mod service;

pub use classifier::{ClassificationResult, Classifier};
pub use config::{LossKind, TrainingConfig};
pub use corpus::LabeledCorpus;
pub use fasttext::{FastText, Prediction, Trainer};
pub use registry::{ModelRegistry, SharedRegistry};
pub use service::{
    score_samples, validate_sample_counts, ClassifierService, MIN_POSITIVE_SAMPLES,
    MODEL_NOT_FOUND,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::classifier::{ClassificationResult, Classifier};
    pub use crate::config::TrainingConfig;
    pub use crate::fasttext::{FastText, Trainer};
    pub use crate::registry::ModelRegistry;
    pub use crate::service::ClassifierService;
}
