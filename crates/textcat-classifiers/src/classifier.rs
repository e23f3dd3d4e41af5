//! Classifier trait and common types

/// Trait for all classifiers
pub trait Classifier: Send + Sync {
    /// Classify the given text, `None` when the text gives the classifier
    /// nothing to work with
    fn classify(&self, text: &str) -> Option<ClassificationResult>;

    /// Get the classifier name
    fn name(&self) -> &str;
}

/// Result of classification
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationResult {
    /// Classification label
    pub label: String,

    /// Confidence score (0.0-1.0)
    pub score: f32,
}

impl ClassificationResult {
    /// Create a new classification result
    pub fn new(label: impl Into<String>, score: f32) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}
