//! fastText-style supervised text classification
//!
//! Documents are bags of words and hashed word n-grams. Each feature owns an
//! embedding row; a document vector is the mean of its rows, and a linear
//! output layer turns it into label probabilities. Training is plain SGD
//! with a linearly decaying learning rate.

pub mod dictionary;
pub mod io;
pub mod matrix;
pub mod model;
pub mod trainer;

pub use dictionary::{Dictionary, LABEL_PREFIX};
pub use model::{FastText, Prediction};
pub use trainer::Trainer;
