//! Stochastic gradient descent over a labeled corpus file

use super::dictionary::Dictionary;
use super::matrix::Matrix;
use super::model::{sigmoid, softmax, FastText};
use crate::config::{LossKind, TrainingConfig};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Instant;
use textcat_core::{Error, Result};
use tracing::{debug, info};

/// Floor applied to probabilities before taking the log loss
const MIN_PROBABILITY: f32 = 1e-5;

pub struct Trainer {
    config: TrainingConfig,
}

impl Trainer {
    pub fn new(config: TrainingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Train on a corpus of `__label__<class> <text>` lines
    pub fn train_file(&self, path: &Path) -> Result<FastText> {
        let start = Instant::now();
        let dict = Dictionary::from_reader(open(path)?, &self.config)?;

        if dict.nlabels() == 0 {
            return Err(Error::training("corpus contains no labels"));
        }
        if dict.nwords() == 0 {
            return Err(Error::training("corpus contains no words"));
        }
        info!(
            "Read {} tokens: {} words, {} labels",
            dict.ntokens(),
            dict.nwords(),
            dict.nlabels()
        );

        let dim = self.config.dim as usize;
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let input = Matrix::uniform(dict.input_rows(), dim, 1.0 / dim as f32, &mut rng);
        let output = Matrix::zeros(dict.nlabels(), dim);

        let mut model = FastText {
            config: self.config.clone(),
            dict,
            input,
            output,
        };

        let examples = load_examples(path, &model.dict)?;
        if examples.is_empty() {
            return Err(Error::training("corpus contains no labeled examples"));
        }

        let corpus_tokens: u64 = examples.iter().map(|ex| ex.ntokens).sum();
        let total_tokens = (u64::from(self.config.epochs) * corpus_tokens) as f64;
        let mut processed: u64 = 0;
        let mut order: Vec<usize> = (0..examples.len()).collect();

        for epoch in 0..self.config.epochs {
            // the corpus is grouped by label; visit it in a fresh random order
            order.shuffle(&mut rng);
            let mut loss_sum = 0.0f64;

            for &i in &order {
                let example = &examples[i];
                processed += example.ntokens;

                let progress = (processed as f64 / total_tokens).min(1.0);
                let lr = self.config.learning_rate * (1.0 - progress as f32);
                let target = example.labels[rng.gen_range(0..example.labels.len())];

                loss_sum += f64::from(update(&mut model, &example.features, target, lr));
            }

            debug!(
                "Epoch {}/{}: avg loss {:.4}",
                epoch + 1,
                self.config.epochs,
                loss_sum / examples.len() as f64
            );
        }

        info!(
            "Trained on {} examples in {:?}",
            examples.len(),
            start.elapsed()
        );
        Ok(model)
    }
}

/// An encoded corpus line
struct Example {
    features: Box<[u32]>,
    labels: Box<[usize]>,
    ntokens: u64,
}

/// Encode every usable line of the corpus; lines without a label or without
/// features are dropped
fn load_examples(path: &Path, dict: &Dictionary) -> Result<Vec<Example>> {
    if u32::try_from(dict.input_rows()).is_err() {
        return Err(Error::training(format!(
            "{} input rows exceed the supported maximum",
            dict.input_rows()
        )));
    }

    let mut examples = Vec::new();
    for line in open(path)?.lines() {
        let encoded = dict.encode(&line?);
        if encoded.labels.is_empty() || encoded.features.is_empty() {
            continue;
        }
        examples.push(Example {
            features: encoded.features.iter().map(|&f| f as u32).collect(),
            labels: encoded.labels.into_boxed_slice(),
            ntokens: encoded.ntokens,
        });
    }
    Ok(examples)
}

fn open(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path).map_err(|e| {
        Error::training(format!("cannot open corpus {}: {e}", path.display()))
    })?;
    Ok(BufReader::new(file))
}

/// One SGD step on a single example, returning its loss
fn update(model: &mut FastText, features: &[u32], target: usize, lr: f32) -> f32 {
    let mut hidden = vec![0.0f32; model.input.cols()];
    let scale = 1.0 / features.len() as f32;
    for &id in features {
        model.input.add_row_into(id as usize, &mut hidden, scale);
    }
    let mut grad = vec![0.0f32; hidden.len()];
    let nlabels = model.output.rows();

    let loss = match model.config.loss {
        LossKind::Softmax => {
            let scores = (0..nlabels).map(|i| model.output.dot_row(i, &hidden)).collect();
            let probs = softmax(scores);
            for (i, p) in probs.iter().enumerate() {
                let label = if i == target { 1.0 } else { 0.0 };
                let alpha = lr * (label - p);
                model.output.add_row_into(i, &mut grad, alpha);
                model.output.add_to_row(i, &hidden, alpha);
            }
            -probs[target].max(MIN_PROBABILITY).ln()
        }
        LossKind::OneVsAll => {
            let mut loss = 0.0;
            for i in 0..nlabels {
                let score = sigmoid(model.output.dot_row(i, &hidden));
                let is_target = i == target;
                let label = if is_target { 1.0 } else { 0.0 };
                let alpha = lr * (label - score);
                model.output.add_row_into(i, &mut grad, alpha);
                model.output.add_to_row(i, &hidden, alpha);
                let p = if is_target { score } else { 1.0 - score };
                loss -= p.max(MIN_PROBABILITY).ln();
            }
            loss
        }
    };

    for &id in features {
        model.input.add_to_row(id as usize, &grad, scale);
    }
    loss
}
