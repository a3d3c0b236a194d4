//! Immutable in-memory training table.

use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, warn};

use super::schema::TableSchema;
use super::DatasetError;

/// One labeled training row: binary symptom cells plus the raw label cell.
#[derive(Debug, Clone)]
pub struct TrainingRecord {
    symptoms: Vec<u8>,
    label: String,
}

impl TrainingRecord {
    /// Binary symptom values aligned with the table's symptom columns.
    pub fn symptoms(&self) -> &[u8] {
        &self.symptoms
    }

    /// Raw label cell, trimmed. Either a disease name or an integer code.
    pub fn label(&self) -> &str {
        &self.label
    }
}

/// Ordered, read-only training table shared by the training pipeline and the
/// heuristic predictor. Row order is the file order and stays stable for the
/// lifetime of the process.
#[derive(Debug, Clone)]
pub struct TrainingTable {
    schema: TableSchema,
    column_positions: HashMap<String, usize>,
    records: Vec<TrainingRecord>,
}

impl TrainingTable {
    /// Load a training table from a CSV file.
    ///
    /// Header names are lowercased and trimmed before schema resolution. Rows
    /// with unparseable symptom cells or an empty label cell are dropped, the
    /// way the training pipeline has always discarded incomplete records.
    pub fn load(path: &Path) -> Result<Self, DatasetError> {
        let mut reader = csv::Reader::from_path(path).map_err(|source| DatasetError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let headers: Vec<String> = reader
            .headers()
            .map_err(|source| DatasetError::Read {
                path: path.to_path_buf(),
                source,
            })?
            .iter()
            .map(|header| header.trim().to_lowercase())
            .collect();

        let schema =
            TableSchema::resolve(&headers).ok_or_else(|| DatasetError::LabelColumnNotFound {
                path: path.to_path_buf(),
                columns: headers.clone(),
            })?;
        let label_cell = headers
            .iter()
            .position(|header| header == schema.label_column())
            .expect("resolved label column is present in the header");
        let symptom_cells: Vec<usize> = (0..headers.len()).filter(|cell| *cell != label_cell).collect();

        let mut records = Vec::new();
        let mut dropped = 0usize;
        for row in reader.records() {
            let row = row.map_err(|source| DatasetError::Record {
                path: path.to_path_buf(),
                source,
            })?;
            match parse_record(&row, &symptom_cells, label_cell) {
                Some(record) => records.push(record),
                None => dropped += 1,
            }
        }
        if dropped > 0 {
            warn!("Dropped {dropped} incomplete rows from {}", path.display());
        }
        if records.is_empty() {
            return Err(DatasetError::Empty {
                path: path.to_path_buf(),
            });
        }

        let encoded = records
            .iter()
            .all(|record| record.label.parse::<i64>().is_ok());
        let schema = schema.with_label_encoding(encoded);
        let column_positions = schema
            .symptom_columns()
            .iter()
            .enumerate()
            .map(|(position, name)| (name.clone(), position))
            .collect();

        debug!(
            rows = records.len(),
            symptoms = schema.symptom_columns().len(),
            label = schema.label_column(),
            encoded_labels = schema.label_is_encoded(),
            "Training table loaded"
        );
        Ok(Self {
            schema,
            column_positions,
            records,
        })
    }

    /// The schema resolved at load time.
    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    /// All rows in file order.
    pub fn records(&self) -> &[TrainingRecord] {
        &self.records
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when the table holds no rows.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Position of a symptom column within each record, if the column exists.
    pub fn column_position(&self, name: &str) -> Option<usize> {
        self.column_positions.get(name).copied()
    }

    /// Iterate over the raw label cells in row order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(TrainingRecord::label)
    }
}

fn parse_record(
    row: &csv::StringRecord,
    symptom_cells: &[usize],
    label_cell: usize,
) -> Option<TrainingRecord> {
    let label = row.get(label_cell)?.trim();
    if label.is_empty() {
        return None;
    }
    let mut symptoms = Vec::with_capacity(symptom_cells.len());
    for &cell in symptom_cells {
        let value: f64 = row.get(cell)?.trim().parse().ok()?;
        symptoms.push((value != 0.0) as u8);
    }
    Some(TrainingRecord {
        symptoms,
        label: label.to_string(),
    })
}
