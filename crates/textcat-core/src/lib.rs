//! textcat Core
//!
//! Core types, traits, and utilities shared across textcat components.
//!
//! This crate provides:
//! - Wire types for the training and scoring API
//! - Error types and result handling
//! - The text normalizer used before documents reach a classifier
//! - The on-disk layout of the model storage directory

pub mod error;
pub mod normalize;
pub mod storage;
pub mod types;

pub use error::{Error, Result};
pub use normalize::normalize_text;
pub use storage::{ModelStore, StoredModel};
pub use types::{
    Polarity, ScoreResult, ScoringRequest, TrainingRequest, TrainingResponse, UNKNOWN_LABEL,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::normalize::normalize_text;
    pub use crate::storage::{ModelStore, StoredModel};
    pub use crate::types::{Polarity, ScoreResult, ScoringRequest, TrainingRequest};
}
