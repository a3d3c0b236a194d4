use serde::{Deserialize, Serialize};

/// Single-symptom decision stump used as a weak learner.
///
/// Symptom features are binary, so the stump branches purely on presence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymptomStump {
    /// Feature position of the symptom this stump splits on.
    pub symptom_index: u16,
    /// Prediction when the symptom is absent.
    pub absent_value: f32,
    /// Prediction when the symptom is present.
    pub present_value: f32,
}

impl SymptomStump {
    /// Predict the stump value for a feature vector.
    pub fn predict(&self, features: &[f32]) -> f32 {
        let value = features
            .get(self.symptom_index as usize)
            .copied()
            .unwrap_or(0.0);
        if value > 0.5 {
            self.present_value
        } else {
            self.absent_value
        }
    }
}

/// Boosted-stump model for multi-class classification over symptom vectors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoostedStumpModel {
    /// Model format version.
    pub model_version: i64,
    /// Expected feature-vector width.
    pub n_features: usize,
    /// Number of target classes.
    pub n_classes: usize,
    /// Learning rate applied to each stump prediction.
    pub learning_rate: f32,
    /// Initial raw logits before boosting rounds.
    pub init_raw: Vec<f32>,
    /// Shape: `[n_rounds][n_classes]`.
    pub stumps: Vec<Vec<SymptomStump>>,
}

impl BoostedStumpModel {
    /// Validate structural invariants of the model.
    pub fn validate(&self) -> Result<(), String> {
        if self.n_classes < 2 {
            return Err("Model must contain at least 2 classes".to_string());
        }
        if self.n_features == 0 {
            return Err("Model must expect at least one feature".to_string());
        }
        if self.init_raw.len() != self.n_classes {
            return Err("init_raw length must match the class count".to_string());
        }
        for (round_idx, round) in self.stumps.iter().enumerate() {
            if round.len() != self.n_classes {
                return Err(format!(
                    "Round {round_idx} has {} stumps but expected {}",
                    round.len(),
                    self.n_classes
                ));
            }
        }
        Ok(())
    }

    /// Predict raw logits for a feature vector.
    pub fn predict_raw(&self, features: &[f32]) -> Vec<f32> {
        let mut raw = self.init_raw.clone();
        for round in &self.stumps {
            for (class_idx, stump) in round.iter().enumerate() {
                raw[class_idx] += self.learning_rate * stump.predict(features);
            }
        }
        raw
    }

    /// Predict class probabilities for a feature vector.
    pub fn predict_proba(&self, features: &[f32]) -> Vec<f32> {
        softmax(&self.predict_raw(features))
    }
}

/// Compute a numerically-stable softmax for a set of logits.
pub fn softmax(raw: &[f32]) -> Vec<f32> {
    if raw.is_empty() {
        return Vec::new();
    }
    let max = raw
        .iter()
        .copied()
        .fold(f32::NEG_INFINITY, |a, b| a.max(b));
    let mut exps = Vec::with_capacity(raw.len());
    let mut sum = 0.0f32;
    for &v in raw {
        let e = (v - max).exp();
        exps.push(e);
        sum += e;
    }
    if sum == 0.0 {
        return vec![1.0 / raw.len() as f32; raw.len()];
    }
    for v in &mut exps {
        *v /= sum;
    }
    exps
}

/// Index of the largest value; the first occurrence wins ties.
pub fn argmax(values: &[f32]) -> usize {
    let mut best_idx = 0usize;
    let mut best_val = f32::NEG_INFINITY;
    for (idx, &v) in values.iter().enumerate() {
        if v > best_val {
            best_val = v;
            best_idx = idx;
        }
    }
    best_idx
}
