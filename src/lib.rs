//! Library exports for the symptom-to-disease prediction engine.
/// Application directory helpers.
pub mod app_dirs;
/// Command-line interface.
pub mod cli;
/// Training and reference table loading.
pub mod dataset;
/// Diagnosis engine facade.
pub mod engine;
/// Symptom and disease index artifacts.
pub mod index;
/// Logging setup.
pub mod logging;
/// Classifier models, training, and metrics.
pub mod ml;
/// Prediction paths over a symptom query.
pub mod predict;
/// Optional training configuration overrides.
pub mod train_config;
/// Offline training pipeline.
pub mod training;
