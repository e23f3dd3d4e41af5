//! Error types for textcat

/// Result type alias using textcat's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for textcat operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Request rejected before any work was done
    #[error("{0}")]
    Validation(String),

    /// Referenced model or resource does not exist
    #[error("{0}")]
    NotFound(String),

    /// Training run failed
    #[error("training error: {0}")]
    Training(String),

    /// Model artifact is corrupt or unsupported
    #[error("model error: {0}")]
    Model(String),

    /// Dataset could not be resolved or read
    #[error("dataset error: {0}")]
    Dataset(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Filesystem/IO errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic internal errors
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a new not-found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a new training error
    pub fn training(msg: impl Into<String>) -> Self {
        Self::Training(msg.into())
    }

    /// Create a new model error
    pub fn model(msg: impl Into<String>) -> Self {
        Self::Model(msg.into())
    }

    /// Create a new dataset error
    pub fn dataset(msg: impl Into<String>) -> Self {
        Self::Dataset(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Short machine-readable name of the error kind, used as a metrics label
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::NotFound(_) => "not_found",
            Self::Training(_) => "training",
            Self::Model(_) => "model",
            Self::Dataset(_) => "dataset",
            Self::Config(_) => "config",
            Self::Io(_) => "io",
            Self::Serialization(_) => "serialization",
            Self::Internal(_) => "internal",
        }
    }
}
