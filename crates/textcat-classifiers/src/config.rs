//! Training hyperparameters

use serde::{Deserialize, Serialize};
use textcat_core::{Error, Result};

/// Loss used by the output layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LossKind {
    /// Single softmax over all labels
    #[default]
    Softmax,
    /// Independent sigmoid per label
    OneVsAll,
}

impl LossKind {
    pub(crate) fn to_byte(self) -> u8 {
        match self {
            Self::Softmax => 0,
            Self::OneVsAll => 1,
        }
    }

    pub(crate) fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Self::Softmax),
            1 => Some(Self::OneVsAll),
            _ => None,
        }
    }
}

/// Hyperparameters for one training run.
///
/// `Default` holds the values every `/train` request is trained with:
/// 5 epochs, learning rate 1.0, word bigrams, 200,000 hashing buckets,
/// 50-dimensional embeddings and softmax loss. Only the server operator can
/// override them, through the server configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Passes over the corpus
    pub epochs: u32,

    /// Initial learning rate, decayed linearly to zero
    pub learning_rate: f32,

    /// Longest word n-gram hashed into the buckets
    pub word_ngrams: u32,

    /// Number of hashing buckets for word n-grams
    pub buckets: u32,

    /// Embedding dimension
    pub dim: u32,

    /// Output layer loss
    pub loss: LossKind,

    /// Words seen fewer times are dropped from the vocabulary
    pub min_count: u32,

    /// Seed for weight initialization and label sampling
    pub seed: u64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            epochs: 5,
            learning_rate: 1.0,
            word_ngrams: 2,
            buckets: 200_000,
            dim: 50,
            loss: LossKind::Softmax,
            min_count: 1,
            seed: 0,
        }
    }
}

impl TrainingConfig {
    /// Check that the hyperparameters describe a trainable model
    pub fn validate(&self) -> Result<()> {
        if self.epochs == 0 {
            return Err(Error::config("epochs must be at least 1"));
        }
        if self.dim == 0 {
            return Err(Error::config("dim must be at least 1"));
        }
        if self.word_ngrams == 0 {
            return Err(Error::config("word_ngrams must be at least 1"));
        }
        if self.word_ngrams > 1 && self.buckets == 0 {
            return Err(Error::config("word_ngrams > 1 requires at least one bucket"));
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(Error::config(format!(
                "learning_rate must be a positive number, got {}",
                self.learning_rate
            )));
        }
        Ok(())
    }
}
