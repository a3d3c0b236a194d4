//! Multinomial logistic regression, used as the stacking meta learner.

use serde::{Deserialize, Serialize};

use crate::ml::gbdt_stump::softmax;

mod train;
pub use train::{LogRegTrainOptions, train_logreg};

/// Versioned multinomial logistic regression model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRegModel {
    /// Model format version.
    pub model_version: i64,
    /// Expected input-vector width.
    pub n_inputs: usize,
    /// Number of target classes.
    pub n_classes: usize,
    /// Row-major `[n_classes][n_inputs]` weight matrix.
    pub weights: Vec<f32>,
    /// Per-class bias terms.
    pub bias: Vec<f32>,
}

impl LogRegModel {
    /// Validate the model dimensions.
    pub fn validate(&self) -> Result<(), String> {
        if self.n_classes < 2 {
            return Err("Model must contain at least 2 classes".to_string());
        }
        if self.n_inputs == 0 {
            return Err("Model must expect at least one input".to_string());
        }
        if self.weights.len() != self.n_classes * self.n_inputs {
            return Err("weights length mismatch".to_string());
        }
        if self.bias.len() != self.n_classes {
            return Err("bias length mismatch".to_string());
        }
        Ok(())
    }

    /// Raw logits for a single input vector.
    pub fn predict_raw(&self, inputs: &[f32]) -> Vec<f32> {
        let mut logits = vec![0.0f32; self.n_classes];
        for c in 0..self.n_classes {
            let base = c * self.n_inputs;
            let mut sum = self.bias[c];
            for i in 0..self.n_inputs.min(inputs.len()) {
                sum += self.weights[base + i] * inputs[i];
            }
            logits[c] = sum;
        }
        logits
    }

    /// Class probabilities for a single input vector.
    pub fn predict_proba(&self, inputs: &[f32]) -> Vec<f32> {
        softmax(&self.predict_raw(inputs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_model_predicts_uniform() {
        let model = LogRegModel {
            model_version: 1,
            n_inputs: 4,
            n_classes: 2,
            weights: vec![0.0; 8],
            bias: vec![0.0; 2],
        };
        model.validate().unwrap();
        let proba = model.predict_proba(&[0.3, 0.7, 0.1, 0.9]);
        assert!((proba[0] - 0.5).abs() < 1e-6);
        assert!((proba[1] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn weight_shape_mismatch_fails_validation() {
        let model = LogRegModel {
            model_version: 1,
            n_inputs: 4,
            n_classes: 2,
            weights: vec![0.0; 7],
            bias: vec![0.0; 2],
        };
        assert!(model.validate().is_err());
    }
}
