//! Trained classifier and prediction

use super::dictionary::Dictionary;
use super::matrix::Matrix;
use crate::classifier::{ClassificationResult, Classifier};
use crate::config::{LossKind, TrainingConfig};

/// A label with its predicted probability
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub label: String,
    pub probability: f32,
}

/// Supervised linear text classifier.
///
/// A document is represented by the mean of the embedding rows of its words
/// and hashed word n-grams; the output layer maps that vector to label
/// probabilities.
#[derive(Debug, Clone)]
pub struct FastText {
    pub(crate) config: TrainingConfig,
    pub(crate) dict: Dictionary,
    pub(crate) input: Matrix,
    pub(crate) output: Matrix,
}

impl FastText {
    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dict
    }

    /// Top `k` labels for `text`, most probable first.
    ///
    /// Empty when the text yields no features or the model has no labels.
    pub fn predict(&self, text: &str, k: usize) -> Vec<Prediction> {
        let features = self.dict.encode(text).features;
        if features.is_empty() || k == 0 {
            return Vec::new();
        }

        let hidden = self.hidden(&features);
        let probabilities = self.probabilities(&hidden);

        let mut ranked: Vec<(usize, f32)> = probabilities.into_iter().enumerate().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

        ranked
            .into_iter()
            .take(k)
            .filter_map(|(id, probability)| {
                self.dict.label(id).map(|label| Prediction {
                    label: label.to_string(),
                    probability,
                })
            })
            .collect()
    }

    /// Most probable label for `text`
    pub fn predict_top(&self, text: &str) -> Option<Prediction> {
        self.predict(text, 1).into_iter().next()
    }

    /// Mean of the input rows for `features`
    pub(crate) fn hidden(&self, features: &[usize]) -> Vec<f32> {
        let mut hidden = vec![0.0; self.input.cols()];
        if features.is_empty() {
            return hidden;
        }
        let scale = 1.0 / features.len() as f32;
        for &id in features {
            self.input.add_row_into(id, &mut hidden, scale);
        }
        hidden
    }

    /// Label probabilities for a hidden vector
    pub(crate) fn probabilities(&self, hidden: &[f32]) -> Vec<f32> {
        let scores = (0..self.output.rows()).map(|i| self.output.dot_row(i, hidden));
        match self.config.loss {
            LossKind::Softmax => softmax(scores.collect()),
            LossKind::OneVsAll => scores.map(sigmoid).collect(),
        }
    }
}

impl Classifier for FastText {
    fn classify(&self, text: &str) -> Option<ClassificationResult> {
        self.predict_top(text)
            .map(|p| ClassificationResult::new(p.label, p.probability))
    }

    fn name(&self) -> &str {
        "fasttext"
    }
}

pub(crate) fn softmax(mut scores: Vec<f32>) -> Vec<f32> {
    let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let mut sum = 0.0;
    for s in scores.iter_mut() {
        *s = (*s - max).exp();
        sum += *s;
    }
    for s in scores.iter_mut() {
        *s /= sum;
    }
    scores
}

pub(crate) fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}
