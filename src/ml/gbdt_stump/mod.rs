//! Gradient-boosted decision stumps over binary symptom vectors.

mod model;
mod train;

pub use model::{BoostedStumpModel, SymptomStump, argmax, softmax};
pub use train::{StumpTrainOptions, train_boosted_stumps};
