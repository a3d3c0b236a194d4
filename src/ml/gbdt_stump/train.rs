use super::model::{BoostedStumpModel, SymptomStump, softmax};
use crate::ml::TrainDataset;

/// Training hyperparameters for stump boosting.
#[derive(Debug, Clone)]
pub struct StumpTrainOptions {
    /// Number of boosting rounds.
    pub rounds: usize,
    /// Learning rate applied per round.
    pub learning_rate: f32,
}

impl Default for StumpTrainOptions {
    fn default() -> Self {
        Self {
            rounds: 150,
            learning_rate: 0.1,
        }
    }
}

/// Train a multi-class boosted-stump model using softmax gradient boosting.
///
/// Features are binary, so split search reduces to picking the symptom whose
/// presence partition minimizes residual squared error.
pub fn train_boosted_stumps(
    dataset: &TrainDataset,
    options: &StumpTrainOptions,
) -> Result<BoostedStumpModel, String> {
    dataset.validate()?;
    let n = dataset.x.len();
    let d = dataset.n_features;
    let n_classes = dataset.classes.len();
    if d > u16::MAX as usize {
        return Err(format!("Too many features for stump encoding: {d}"));
    }

    let priors = class_priors(&dataset.y, n_classes);
    let init_raw: Vec<f32> = priors.iter().map(|&p| p.max(1e-6).ln()).collect();
    let mut raw = vec![init_raw.clone(); n];

    let mut rounds_out: Vec<Vec<SymptomStump>> = Vec::with_capacity(options.rounds);
    for _round in 0..options.rounds {
        let probs: Vec<Vec<f32>> = raw.iter().map(|r| softmax(r)).collect();

        let mut stumps_for_round = Vec::with_capacity(n_classes);
        for class_idx in 0..n_classes {
            let residuals: Vec<f32> = (0..n)
                .map(|i| {
                    let target = if dataset.y[i] == class_idx { 1.0 } else { 0.0 };
                    target - probs[i][class_idx]
                })
                .collect();
            let stump = fit_best_stump(&dataset.x, &residuals, d);
            for i in 0..n {
                raw[i][class_idx] += options.learning_rate * stump.predict(&dataset.x[i]);
            }
            stumps_for_round.push(stump);
        }
        rounds_out.push(stumps_for_round);
    }

    let model = BoostedStumpModel {
        model_version: 1,
        n_features: d,
        n_classes,
        learning_rate: options.learning_rate,
        init_raw,
        stumps: rounds_out,
    };
    model.validate()?;
    Ok(model)
}

fn class_priors(y: &[usize], n_classes: usize) -> Vec<f32> {
    let mut counts = vec![0usize; n_classes];
    for &label in y {
        if label < n_classes {
            counts[label] += 1;
        }
    }
    let total = y.len().max(1) as f32;
    counts.into_iter().map(|c| c as f32 / total).collect()
}

fn fit_best_stump(x: &[Vec<f32>], residuals: &[f32], n_features: usize) -> SymptomStump {
    let total_count = x.len() as f64;
    let mut total_sum = 0f64;
    let mut total_sq = 0f64;
    let mut present_count = vec![0f64; n_features];
    let mut present_sum = vec![0f64; n_features];
    let mut present_sq = vec![0f64; n_features];

    for (i, row) in x.iter().enumerate() {
        let r = residuals[i] as f64;
        total_sum += r;
        total_sq += r * r;
        for (j, &v) in row.iter().take(n_features).enumerate() {
            if v > 0.5 {
                present_count[j] += 1.0;
                present_sum[j] += r;
                present_sq[j] += r * r;
            }
        }
    }

    let mut best_feature = 0usize;
    let mut best_score = f64::INFINITY;
    for j in 0..n_features {
        let right_count = present_count[j];
        let left_count = total_count - right_count;
        if right_count == 0.0 || left_count == 0.0 {
            continue;
        }
        let right_sse = present_sq[j] - (present_sum[j] * present_sum[j]) / right_count;
        let left_sum = total_sum - present_sum[j];
        let left_sq = total_sq - present_sq[j];
        let left_sse = left_sq - (left_sum * left_sum) / left_count;
        let score = left_sse + right_sse;
        if score < best_score {
            best_score = score;
            best_feature = j;
        }
    }

    let right_count = present_count[best_feature];
    let left_count = total_count - right_count;
    let present_value = if right_count > 0.0 {
        (present_sum[best_feature] / right_count) as f32
    } else {
        0.0
    };
    let absent_value = if left_count > 0.0 {
        ((total_sum - present_sum[best_feature]) / left_count) as f32
    } else {
        0.0
    };
    SymptomStump {
        symptom_index: best_feature as u16,
        absent_value,
        present_value,
    }
}
