//! Disease reference tables and detail resolution.

use std::collections::HashMap;
use std::path::Path;

use super::DatasetError;

/// Placeholder description when a disease has no description row.
pub const DESCRIPTION_FALLBACK: &str = "Description not available.";
/// Placeholder entry when a disease has no precaution row.
pub const PRECAUTIONS_FALLBACK: &str = "No precautions available.";
/// Placeholder entry when a disease has no medication row.
pub const MEDICATIONS_FALLBACK: &str = "No medications available.";

/// Human-readable details attached to a predicted disease.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiseaseDetail {
    /// Prose description of the disease.
    pub description: String,
    /// Recommended precautions, in table column order.
    pub precautions: Vec<String>,
    /// Suggested medications.
    pub medications: Vec<String>,
}

/// Read-only lookup over the three reference tables, keyed by disease label.
///
/// Absent rows are a valid state resolved through placeholder text, never an
/// error.
#[derive(Debug, Clone)]
pub struct ReferenceLibrary {
    descriptions: HashMap<String, String>,
    precautions: HashMap<String, Vec<String>>,
    medications: HashMap<String, Vec<String>>,
}

impl ReferenceLibrary {
    /// Load the description, precaution, and medication tables.
    ///
    /// Each table needs a `disease` key column (matched case-insensitively);
    /// the first row per disease wins.
    pub fn load(
        descriptions_path: &Path,
        precautions_path: &Path,
        medications_path: &Path,
    ) -> Result<Self, DatasetError> {
        let mut descriptions = HashMap::new();
        for (disease, fields) in read_keyed_rows(descriptions_path, Some("description"))? {
            descriptions
                .entry(disease)
                .or_insert_with(|| fields.into_iter().next().unwrap_or_default());
        }

        let mut precautions = HashMap::new();
        for (disease, fields) in read_keyed_rows(precautions_path, None)? {
            precautions.entry(disease).or_insert(fields);
        }

        let mut medications = HashMap::new();
        for (disease, fields) in read_keyed_rows(medications_path, None)? {
            medications
                .entry(disease)
                .or_insert_with(|| split_medication_fields(fields));
        }

        Ok(Self {
            descriptions,
            precautions,
            medications,
        })
    }

    /// Build a library from already-materialized rows. Test seam.
    #[cfg(test)]
    pub(crate) fn from_rows(
        descriptions: Vec<(String, String)>,
        precautions: Vec<(String, Vec<String>)>,
        medications: Vec<(String, Vec<String>)>,
    ) -> Self {
        Self {
            descriptions: descriptions.into_iter().collect(),
            precautions: precautions.into_iter().collect(),
            medications: medications
                .into_iter()
                .map(|(disease, fields)| (disease, split_medication_fields(fields)))
                .collect(),
        }
    }

    /// Resolve the details for a disease label, substituting placeholders for
    /// whatever the tables do not cover.
    pub fn resolve(&self, label: &str) -> DiseaseDetail {
        let description = self
            .descriptions
            .get(label)
            .cloned()
            .unwrap_or_else(|| DESCRIPTION_FALLBACK.to_string());
        let precautions = self
            .precautions
            .get(label)
            .filter(|fields| !fields.is_empty())
            .cloned()
            .unwrap_or_else(|| vec![PRECAUTIONS_FALLBACK.to_string()]);
        let medications = self
            .medications
            .get(label)
            .filter(|fields| !fields.is_empty())
            .cloned()
            .unwrap_or_else(|| vec![MEDICATIONS_FALLBACK.to_string()]);
        DiseaseDetail {
            description,
            precautions,
            medications,
        }
    }
}

/// Read `(disease, non-empty auxiliary fields)` pairs from a reference table.
///
/// When `preferred_column` names an existing column, only that column's value
/// is kept; otherwise every non-key column contributes in header order.
fn read_keyed_rows(
    path: &Path,
    preferred_column: Option<&str>,
) -> Result<Vec<(String, Vec<String>)>, DatasetError> {
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

    let key_cell = headers
        .iter()
        .position(|header| header == "disease")
        .ok_or_else(|| DatasetError::KeyColumnNotFound {
            path: path.to_path_buf(),
        })?;
    let value_cells: Vec<usize> = match preferred_column
        .and_then(|name| headers.iter().position(|header| header == name))
    {
        Some(cell) => vec![cell],
        None => (0..headers.len()).filter(|cell| *cell != key_cell).collect(),
    };

    let mut rows = Vec::new();
    for row in reader.records() {
        let row = row.map_err(|source| DatasetError::Record {
            path: path.to_path_buf(),
            source,
        })?;
        let Some(disease) = row.get(key_cell).map(str::trim) else {
            continue;
        };
        if disease.is_empty() {
            continue;
        }
        let fields: Vec<String> = value_cells
            .iter()
            .filter_map(|&cell| row.get(cell))
            .map(str::trim)
            .filter(|field| !field.is_empty())
            .map(str::to_string)
            .collect();
        rows.push((disease.to_string(), fields));
    }
    Ok(rows)
}

/// A sole medication field holding a comma-delimited list is split into its
/// pieces; multiple fields are taken as independent entries.
fn split_medication_fields(fields: Vec<String>) -> Vec<String> {
    if fields.len() == 1 {
        return fields[0]
            .split(',')
            .map(str::trim)
            .filter(|piece| !piece.is_empty())
            .map(str::to_string)
            .collect();
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    fn library() -> ReferenceLibrary {
        ReferenceLibrary::from_rows(
            vec![("Malaria".to_string(), "A mosquito-borne infection.".to_string())],
            vec![(
                "Malaria".to_string(),
                vec!["use mosquito nets".to_string(), "seek medical help".to_string()],
            )],
            vec![("Flu".to_string(), vec!["Oseltamivir, Rest, Fluids".to_string()])],
        )
    }

    #[test]
    fn unknown_label_resolves_to_all_placeholders() {
        let detail = library().resolve("Cholera");
        assert_eq!(detail.description, DESCRIPTION_FALLBACK);
        assert_eq!(detail.precautions, vec![PRECAUTIONS_FALLBACK.to_string()]);
        assert_eq!(detail.medications, vec![MEDICATIONS_FALLBACK.to_string()]);
    }

    #[test]
    fn partial_coverage_mixes_rows_and_placeholders() {
        let detail = library().resolve("Malaria");
        assert_eq!(detail.description, "A mosquito-borne infection.");
        assert_eq!(detail.precautions.len(), 2);
        assert_eq!(detail.medications, vec![MEDICATIONS_FALLBACK.to_string()]);
    }

    #[test]
    fn sole_medication_field_is_comma_split() {
        let detail = library().resolve("Flu");
        assert_eq!(detail.medications, vec!["Oseltamivir", "Rest", "Fluids"]);
    }

    #[test]
    fn loads_tables_from_csv_files() {
        let dir = tempfile::tempdir().unwrap();
        let desc = dir.path().join("description.csv");
        let prec = dir.path().join("precautions.csv");
        let med = dir.path().join("medications.csv");
        std::fs::write(&desc, "Disease,Description\nFlu,Seasonal viral infection.\n").unwrap();
        std::fs::write(
            &prec,
            "Disease,Precaution_1,Precaution_2\nFlu,rest,drink fluids\n",
        )
        .unwrap();
        std::fs::write(&med, "Disease,Medication\nFlu,\"Oseltamivir, Paracetamol\"\n").unwrap();

        let library = ReferenceLibrary::load(&desc, &prec, &med).unwrap();
        let detail = library.resolve("Flu");
        assert_eq!(detail.description, "Seasonal viral infection.");
        assert_eq!(detail.precautions, vec!["rest", "drink fluids"]);
        assert_eq!(detail.medications, vec!["Oseltamivir", "Paracetamol"]);
    }

    #[test]
    fn first_row_per_disease_wins() {
        let dir = tempfile::tempdir().unwrap();
        let desc = dir.path().join("description.csv");
        let prec = dir.path().join("precautions.csv");
        let med = dir.path().join("medications.csv");
        std::fs::write(&desc, "Disease,Description\nFlu,First.\nFlu,Second.\n").unwrap();
        std::fs::write(&prec, "Disease,Precaution_1\n").unwrap();
        std::fs::write(&med, "Disease,Medication\n").unwrap();

        let library = ReferenceLibrary::load(&desc, &prec, &med).unwrap();
        assert_eq!(library.resolve("Flu").description, "First.");
    }
}
