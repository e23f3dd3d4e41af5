//! Error types for the drivers

use reqwest::StatusCode;

/// Result type alias for driver operations
pub type Result<T> = std::result::Result<T, DriverError>;

#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    /// Dataset, configuration or storage failure
    #[error(transparent)]
    Core(#[from] textcat_core::Error),

    /// The service could not be reached or answered with an unreadable body
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Console output failed
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The service answered with a non-success status
    #[error("service returned {status}: {body}")]
    Service { status: StatusCode, body: String },
}

impl DriverError {
    /// HTTP status of a rejected request
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Service { status, .. } => Some(*status),
            _ => None,
        }
    }
}
