use rand::rngs::StdRng;
use rand::{Rng, SeedableRng, seq::SliceRandom};

use super::LogRegModel;
use crate::ml::TrainDataset;
use crate::ml::gbdt_stump::softmax;

/// Training options for the logistic regression meta learner.
#[derive(Debug, Clone)]
pub struct LogRegTrainOptions {
    pub epochs: usize,
    pub learning_rate: f32,
    pub l2: f32,
    pub batch_size: usize,
    pub seed: u64,
}

impl Default for LogRegTrainOptions {
    fn default() -> Self {
        Self {
            epochs: 60,
            learning_rate: 0.1,
            l2: 1e-4,
            batch_size: 64,
            seed: 42,
        }
    }
}

/// Train a multinomial logistic regression with mini-batch gradient descent.
pub fn train_logreg(
    dataset: &TrainDataset,
    options: &LogRegTrainOptions,
) -> Result<LogRegModel, String> {
    dataset.validate()?;
    let n_classes = dataset.classes.len();
    let dim = dataset.n_features;

    let mut rng = StdRng::seed_from_u64(options.seed);
    let mut weights = vec![0.0f32; n_classes * dim];
    let mut bias = vec![0.0f32; n_classes];
    for w in &mut weights {
        *w = (rng.random::<f32>() - 0.5) * 0.01;
    }

    let mut indices: Vec<usize> = (0..dataset.x.len()).collect();
    let batch_size = options.batch_size.max(1);
    let lr = options.learning_rate;
    let l2 = options.l2.max(0.0);

    for _epoch in 0..options.epochs {
        indices.shuffle(&mut rng);
        for chunk in indices.chunks(batch_size) {
            let mut grad_w = vec![0.0f32; weights.len()];
            let mut grad_b = vec![0.0f32; bias.len()];
            for &idx in chunk {
                let x = &dataset.x[idx];
                let y = dataset.y[idx];
                let mut logits = vec![0.0f32; n_classes];
                for c in 0..n_classes {
                    let base = c * dim;
                    let mut sum = bias[c];
                    for i in 0..dim {
                        sum += weights[base + i] * x[i];
                    }
                    logits[c] = sum;
                }
                let probs = softmax(&logits);
                for c in 0..n_classes {
                    let diff = probs[c] - if c == y { 1.0 } else { 0.0 };
                    let base = c * dim;
                    for i in 0..dim {
                        grad_w[base + i] += diff * x[i];
                    }
                    grad_b[c] += diff;
                }
            }
            let inv = 1.0 / chunk.len() as f32;
            for c in 0..n_classes {
                let base = c * dim;
                for i in 0..dim {
                    let idx = base + i;
                    weights[idx] -= lr * (grad_w[idx] * inv + l2 * weights[idx]);
                }
                bias[c] -= lr * grad_b[c] * inv;
            }
        }
    }

    let model = LogRegModel {
        model_version: 1,
        n_inputs: dim,
        n_classes,
        weights,
        bias,
    };
    model.validate()?;
    Ok(model)
}
