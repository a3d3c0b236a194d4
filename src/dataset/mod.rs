//! Loading and in-memory views of the tabular inputs.
//!
//! The training table doubles as the model-training source and the live
//! matching database for the heuristic predictor, so it is loaded once into
//! an immutable structure and shared read-only from then on. The reference
//! tables enrich a predicted disease with human-readable details.

mod reference;
mod schema;
mod table;

pub use reference::{
    DESCRIPTION_FALLBACK, DiseaseDetail, MEDICATIONS_FALLBACK, PRECAUTIONS_FALLBACK,
    ReferenceLibrary,
};
pub use schema::{LABEL_COLUMN_ALIASES, TableSchema};
pub use table::{TrainingRecord, TrainingTable};

use std::path::PathBuf;

use thiserror::Error;

/// Errors that may occur while loading tabular data from disk.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// Failed to open or read a CSV file.
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: csv::Error,
    },
    /// A CSV record could not be decoded.
    #[error("Malformed CSV record in {path}: {source}")]
    Record {
        path: PathBuf,
        source: csv::Error,
    },
    /// The table header names no recognized disease label column.
    #[error("No disease label column in {path}; header has {columns:?}")]
    LabelColumnNotFound {
        path: PathBuf,
        columns: Vec<String>,
    },
    /// The table header names no disease key column.
    #[error("No disease key column in reference table {path}")]
    KeyColumnNotFound { path: PathBuf },
    /// Every row of the table was dropped or the file had no rows.
    #[error("Training table {path} contains no usable rows")]
    Empty { path: PathBuf },
}
