//! Stacked ensemble classifier: boosted-stump base learners whose class
//! probabilities feed a logistic regression meta learner.
//!
//! This is the trained artifact the vector predictor consumes. Everything
//! outside this module sees it only through the [`Classifier`] trait.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ml::gbdt_stump::{BoostedStumpModel, argmax};
use crate::ml::logreg::LogRegModel;
use crate::ml::Classifier;

mod train;
pub use train::{StackingTrainOptions, train_stacking};

/// Versioned stacked-ensemble model persisted as JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StackingModel {
    /// Model format version.
    pub model_version: i64,
    /// Expected feature-vector width; must equal the symptom index size.
    pub n_features: usize,
    /// Disease labels in class-code order.
    pub classes: Vec<String>,
    /// Base learners; their probabilities are concatenated as meta inputs.
    pub bases: Vec<BoostedStumpModel>,
    /// Meta learner over the concatenated base probabilities.
    pub meta: LogRegModel,
}

impl StackingModel {
    /// Validate structural invariants across the ensemble.
    pub fn validate(&self) -> Result<(), String> {
        let n_classes = self.classes.len();
        if n_classes < 2 {
            return Err("Model must contain at least 2 classes".to_string());
        }
        if self.bases.is_empty() {
            return Err("Model must contain at least one base learner".to_string());
        }
        for (base_idx, base) in self.bases.iter().enumerate() {
            base.validate()
                .map_err(|err| format!("Base learner {base_idx}: {err}"))?;
            if base.n_features != self.n_features {
                return Err(format!(
                    "Base learner {base_idx} expects {} features but the model expects {}",
                    base.n_features, self.n_features
                ));
            }
            if base.n_classes != n_classes {
                return Err(format!(
                    "Base learner {base_idx} has {} classes but the model has {}",
                    base.n_classes, n_classes
                ));
            }
        }
        self.meta.validate().map_err(|err| format!("Meta learner: {err}"))?;
        if self.meta.n_inputs != self.bases.len() * n_classes {
            return Err("Meta learner input width does not match base outputs".to_string());
        }
        if self.meta.n_classes != n_classes {
            return Err("Meta learner class count mismatch".to_string());
        }
        Ok(())
    }

    /// Concatenated base-learner probabilities for one feature vector.
    pub fn meta_features(&self, features: &[f32]) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.bases.len() * self.classes.len());
        for base in &self.bases {
            out.extend(base.predict_proba(features));
        }
        out
    }

    /// Final class probabilities for one feature vector.
    pub fn predict_proba(&self, features: &[f32]) -> Vec<f32> {
        self.meta.predict_proba(&self.meta_features(features))
    }

    /// Load a model from a JSON file, validating it afterwards.
    pub fn load_json(path: &Path) -> Result<Self, String> {
        let bytes = std::fs::read(path).map_err(|err| err.to_string())?;
        let model: Self = serde_json::from_slice(&bytes).map_err(|err| err.to_string())?;
        model.validate()?;
        Ok(model)
    }

    /// Persist the model as a JSON file.
    pub fn save_json(&self, path: &Path) -> Result<(), String> {
        let bytes = serde_json::to_vec(self).map_err(|err| err.to_string())?;
        std::fs::write(path, bytes).map_err(|err| err.to_string())
    }
}

impl Classifier for StackingModel {
    fn feature_width(&self) -> usize {
        self.n_features
    }

    fn classify(&self, features: &[f32]) -> usize {
        argmax(&self.predict_proba(features))
    }
}
