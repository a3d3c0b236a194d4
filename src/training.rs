//! Offline training pipeline: table in, persisted artifacts out.

use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::{SeedableRng, seq::SliceRandom};
use thiserror::Error;
use tracing::{info, warn};

use crate::dataset::TrainingTable;
use crate::engine::{DISEASE_INDEX_FILE_NAME, MODEL_FILE_NAME, SYMPTOM_INDEX_FILE_NAME};
use crate::index::{DiseaseIndex, SymptomIndex};
use crate::ml::metrics::{ConfusionMatrix, EvalSummary, summarize};
use crate::ml::stacking::{StackingTrainOptions, train_stacking};
use crate::ml::{Classifier, TrainDataset};

/// Options for one training run.
#[derive(Debug, Clone)]
pub struct TrainRunOptions {
    /// Ensemble hyperparameters.
    pub stacking: StackingTrainOptions,
    /// Fraction of rows held out for evaluation.
    pub test_fraction: f32,
    /// Seed for the stratified split shuffle.
    pub split_seed: u64,
}

impl Default for TrainRunOptions {
    fn default() -> Self {
        Self {
            stacking: StackingTrainOptions::default(),
            test_fraction: 0.2,
            split_seed: 42,
        }
    }
}

/// Errors surfaced by the training pipeline.
#[derive(Debug, Error)]
pub enum TrainError {
    /// Model fitting failed.
    #[error("Training failed: {0}")]
    Model(String),
    /// An artifact could not be written.
    #[error("Failed to write artifact {path}: {message}")]
    Persist {
        path: PathBuf,
        message: String,
    },
    /// The models directory could not be created.
    #[error("Failed to create models directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Numbers reported after a training run.
#[derive(Debug, Clone, Copy)]
pub struct TrainReport {
    /// Held-out evaluation metrics.
    pub summary: EvalSummary,
    /// Rows used for fitting.
    pub n_train: usize,
    /// Rows held out for evaluation.
    pub n_test: usize,
    /// Feature-vector width.
    pub n_symptoms: usize,
    /// Number of disease classes.
    pub n_classes: usize,
}

/// Train the stacked ensemble on a loaded table and persist all artifacts.
///
/// The split is stratified by disease and seeded, so repeated runs over the
/// same table produce identical artifacts and metrics.
pub fn run_training(
    table: &TrainingTable,
    models_dir: &Path,
    options: &TrainRunOptions,
) -> Result<TrainReport, TrainError> {
    let symptoms = SymptomIndex::build(table.schema().symptom_columns());
    let diseases = DiseaseIndex::build(table.labels());

    let mut x = Vec::with_capacity(table.len());
    let mut y = Vec::with_capacity(table.len());
    for record in table.records() {
        x.push(record.symptoms().iter().map(|&v| v as f32).collect::<Vec<f32>>());
        y.push(
            diseases
                .code(record.label())
                .expect("disease index was built from these labels"),
        );
    }

    let (train_rows, test_rows) = stratified_split(&y, options.test_fraction, options.split_seed);
    info!(
        total = table.len(),
        train = train_rows.len(),
        test = test_rows.len(),
        classes = diseases.len(),
        "Training split prepared"
    );

    let train_dataset = TrainDataset {
        n_features: symptoms.len(),
        classes: diseases.labels().to_vec(),
        x: train_rows.iter().map(|&row| x[row].clone()).collect(),
        y: train_rows.iter().map(|&row| y[row]).collect(),
    };
    let model = train_stacking(&train_dataset, &options.stacking).map_err(TrainError::Model)?;

    let eval_rows: &[usize] = if test_rows.is_empty() {
        warn!("Too few rows to hold out a test split; evaluating on the training rows");
        &train_rows
    } else {
        &test_rows
    };
    let mut cm = ConfusionMatrix::new(diseases.len());
    for &row in eval_rows {
        cm.add(y[row], model.classify(&x[row]));
    }
    let summary = summarize(&cm);
    info!(
        accuracy = summary.accuracy,
        macro_precision = summary.macro_precision,
        macro_recall = summary.macro_recall,
        "Evaluation complete"
    );

    std::fs::create_dir_all(models_dir).map_err(|source| TrainError::CreateDir {
        path: models_dir.to_path_buf(),
        source,
    })?;
    persist(models_dir.join(MODEL_FILE_NAME), |path| model.save_json(path))?;
    persist(models_dir.join(SYMPTOM_INDEX_FILE_NAME), |path| {
        symptoms.save_json(path)
    })?;
    persist(models_dir.join(DISEASE_INDEX_FILE_NAME), |path| {
        diseases.save_json(path)
    })?;
    info!("Artifacts saved under {}", models_dir.display());

    Ok(TrainReport {
        summary,
        n_train: train_rows.len(),
        n_test: test_rows.len(),
        n_symptoms: symptoms.len(),
        n_classes: diseases.len(),
    })
}

fn persist<F>(path: PathBuf, save: F) -> Result<(), TrainError>
where
    F: FnOnce(&Path) -> Result<(), String>,
{
    save(&path).map_err(|message| TrainError::Persist { path, message })
}

/// Seeded stratified split: every class contributes roughly `test_fraction`
/// of its rows to the test side, and classes with a single row stay entirely
/// on the train side.
fn stratified_split(y: &[usize], test_fraction: f32, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let n_classes = y.iter().copied().max().map_or(0, |max| max + 1);
    let mut by_class: Vec<Vec<usize>> = vec![Vec::new(); n_classes];
    for (row, &code) in y.iter().enumerate() {
        by_class[code].push(row);
    }

    let fraction = test_fraction.clamp(0.0, 0.5);
    let mut rng = StdRng::seed_from_u64(seed);
    let mut train_rows = Vec::new();
    let mut test_rows = Vec::new();
    for rows in &mut by_class {
        rows.shuffle(&mut rng);
        let n_test = if rows.len() > 1 {
            (((rows.len() as f32) * fraction).round() as usize).clamp(1, rows.len() - 1)
        } else {
            0
        };
        let (test, train) = rows.split_at(n_test);
        test_rows.extend_from_slice(test);
        train_rows.extend_from_slice(train);
    }
    train_rows.sort_unstable();
    test_rows.sort_unstable();
    (train_rows, test_rows)
}
