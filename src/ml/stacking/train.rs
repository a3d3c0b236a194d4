use rand::rngs::StdRng;
use rand::{SeedableRng, seq::SliceRandom};

use super::StackingModel;
use crate::ml::TrainDataset;
use crate::ml::gbdt_stump::{StumpTrainOptions, train_boosted_stumps};
use crate::ml::logreg::{LogRegTrainOptions, train_logreg};

/// Training options for the stacked ensemble.
#[derive(Debug, Clone)]
pub struct StackingTrainOptions {
    /// One entry per base learner; differing hyperparameters keep the bases
    /// from collapsing into copies of each other.
    pub bases: Vec<StumpTrainOptions>,
    /// Cross-validation folds used to build out-of-fold meta inputs.
    pub folds: usize,
    /// Meta learner options.
    pub meta: LogRegTrainOptions,
    /// Seed for the fold assignment shuffle.
    pub seed: u64,
}

impl Default for StackingTrainOptions {
    fn default() -> Self {
        Self {
            bases: vec![
                StumpTrainOptions {
                    rounds: 200,
                    learning_rate: 0.05,
                },
                StumpTrainOptions {
                    rounds: 100,
                    learning_rate: 0.1,
                },
            ],
            folds: 5,
            meta: LogRegTrainOptions::default(),
            seed: 42,
        }
    }
}

/// Train the stacked ensemble.
///
/// The meta learner is fit on out-of-fold base probabilities so it never sees
/// a base learner's predictions on that learner's own training rows; the
/// persisted bases are then refit on the full dataset.
pub fn train_stacking(
    dataset: &TrainDataset,
    options: &StackingTrainOptions,
) -> Result<StackingModel, String> {
    dataset.validate()?;
    if options.bases.is_empty() {
        return Err("At least one base learner is required".to_string());
    }

    let n = dataset.x.len();
    let n_classes = dataset.classes.len();
    let meta_width = options.bases.len() * n_classes;
    let folds = options.folds.max(2).min(n);

    let meta_x = if folds < 2 {
        in_sample_meta_features(dataset, options)?
    } else {
        out_of_fold_meta_features(dataset, options, folds)?
    };

    let meta_dataset = TrainDataset {
        n_features: meta_width,
        classes: dataset.classes.clone(),
        x: meta_x,
        y: dataset.y.clone(),
    };
    let meta = train_logreg(&meta_dataset, &options.meta)?;

    let bases = options
        .bases
        .iter()
        .map(|base_options| train_boosted_stumps(dataset, base_options))
        .collect::<Result<Vec<_>, String>>()?;

    let model = StackingModel {
        model_version: 1,
        n_features: dataset.n_features,
        classes: dataset.classes.clone(),
        bases,
        meta,
    };
    model.validate()?;
    Ok(model)
}

fn in_sample_meta_features(
    dataset: &TrainDataset,
    options: &StackingTrainOptions,
) -> Result<Vec<Vec<f32>>, String> {
    let mut meta_x = vec![Vec::new(); dataset.x.len()];
    for base_options in &options.bases {
        let base = train_boosted_stumps(dataset, base_options)?;
        for (row, meta_row) in dataset.x.iter().zip(meta_x.iter_mut()) {
            meta_row.extend(base.predict_proba(row));
        }
    }
    Ok(meta_x)
}

fn out_of_fold_meta_features(
    dataset: &TrainDataset,
    options: &StackingTrainOptions,
    folds: usize,
) -> Result<Vec<Vec<f32>>, String> {
    let n = dataset.x.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.shuffle(&mut StdRng::seed_from_u64(options.seed));
    let mut fold_of = vec![0usize; n];
    for (position, &row) in order.iter().enumerate() {
        fold_of[row] = position % folds;
    }

    let mut meta_x = vec![Vec::new(); n];
    for fold in 0..folds {
        let train_rows: Vec<usize> = (0..n).filter(|&row| fold_of[row] != fold).collect();
        let holdout_rows: Vec<usize> = (0..n).filter(|&row| fold_of[row] == fold).collect();
        let fold_dataset = TrainDataset {
            n_features: dataset.n_features,
            classes: dataset.classes.clone(),
            x: train_rows.iter().map(|&row| dataset.x[row].clone()).collect(),
            y: train_rows.iter().map(|&row| dataset.y[row]).collect(),
        };
        for base_options in &options.bases {
            let base = train_boosted_stumps(&fold_dataset, base_options)?;
            for &row in &holdout_rows {
                meta_x[row].extend(base.predict_proba(&dataset.x[row]));
            }
        }
    }
    Ok(meta_x)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fold_assignment_covers_every_row() {
        let dataset = TrainDataset {
            n_features: 2,
            classes: vec!["a".into(), "b".into()],
            x: vec![
                vec![1.0, 0.0],
                vec![1.0, 0.0],
                vec![0.0, 1.0],
                vec![0.0, 1.0],
                vec![1.0, 1.0],
            ],
            y: vec![0, 0, 1, 1, 0],
        };
        let options = StackingTrainOptions {
            folds: 3,
            ..StackingTrainOptions::default()
        };
        let meta_x = out_of_fold_meta_features(&dataset, &options, 3).unwrap();
        let width = options.bases.len() * dataset.classes.len();
        assert!(meta_x.iter().all(|row| row.len() == width));
    }

    #[test]
    fn training_is_deterministic() {
        let dataset = TrainDataset {
            n_features: 2,
            classes: vec!["a".into(), "b".into()],
            x: vec![
                vec![1.0, 0.0],
                vec![1.0, 0.0],
                vec![0.0, 1.0],
                vec![0.0, 1.0],
            ],
            y: vec![0, 0, 1, 1],
        };
        let options = StackingTrainOptions::default();
        let first = train_stacking(&dataset, &options).unwrap();
        let second = train_stacking(&dataset, &options).unwrap();
        assert_eq!(first.meta.weights, second.meta.weights);
    }
}
