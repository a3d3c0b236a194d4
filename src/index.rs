//! Bidirectional symptom and disease index artifacts.
//!
//! `SymptomIndex` fixes the position of every symptom in the classifier's
//! feature vector; `DiseaseIndex` maps encoded class codes back to disease
//! labels. Both are immutable after construction and can be persisted as JSON
//! next to the trained model so a later process consumes exactly the mappings
//! the model was trained against.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Mapping between symptom names and fixed feature-vector positions.
///
/// Positions follow the order the symptom columns appeared in the training
/// header. Names are stored lowercase and trimmed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymptomIndex {
    names: Vec<String>,
    #[serde(skip)]
    positions: HashMap<String, usize>,
}

impl SymptomIndex {
    /// Build an index from symptom column names, preserving their order.
    ///
    /// Duplicate names keep their first position.
    pub fn build<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut names = Vec::new();
        let mut positions = HashMap::new();
        for column in columns {
            let name = column.as_ref().trim().to_lowercase();
            if name.is_empty() || positions.contains_key(&name) {
                continue;
            }
            positions.insert(name.clone(), names.len());
            names.push(name);
        }
        Self { names, positions }
    }

    /// Number of symptoms, i.e. the classifier's feature-vector width.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// True when the index holds no symptoms.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Look up the feature position for a normalized symptom name.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    /// Reverse lookup from a feature position to its symptom name.
    pub fn name(&self, position: usize) -> Option<&str> {
        self.names.get(position).map(String::as_str)
    }

    /// All symptom names in feature-vector order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Load a persisted index from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self, String> {
        let bytes = std::fs::read(path).map_err(|err| err.to_string())?;
        let mut index: Self = serde_json::from_slice(&bytes).map_err(|err| err.to_string())?;
        index.positions = index
            .names
            .iter()
            .enumerate()
            .map(|(position, name)| (name.clone(), position))
            .collect();
        index.validate()?;
        Ok(index)
    }

    /// Persist the index as a JSON file.
    pub fn save_json(&self, path: &Path) -> Result<(), String> {
        let bytes = serde_json::to_vec_pretty(self).map_err(|err| err.to_string())?;
        std::fs::write(path, bytes).map_err(|err| err.to_string())
    }

    fn validate(&self) -> Result<(), String> {
        if self.names.is_empty() {
            return Err("Symptom index is empty".to_string());
        }
        if self.positions.len() != self.names.len() {
            return Err("Symptom index contains duplicate names".to_string());
        }
        Ok(())
    }
}

/// Mapping from encoded class codes to disease labels.
///
/// Codes follow label-encoder semantics: distinct labels sorted
/// lexicographically, assigned ascending codes from zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiseaseIndex {
    labels: Vec<String>,
}

impl DiseaseIndex {
    /// Build an index from label values, sorting distinct labels.
    pub fn build<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut distinct: Vec<String> = labels
            .into_iter()
            .map(|label| label.as_ref().trim().to_string())
            .filter(|label| !label.is_empty())
            .collect();
        distinct.sort();
        distinct.dedup();
        Self { labels: distinct }
    }

    /// Number of disease classes.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// True when the index holds no diseases.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Resolve a class code to its disease label.
    pub fn label(&self, code: usize) -> Option<&str> {
        self.labels.get(code).map(String::as_str)
    }

    /// Look up the class code assigned to a disease label.
    pub fn code(&self, label: &str) -> Option<usize> {
        self.labels.binary_search_by(|probe| probe.as_str().cmp(label)).ok()
    }

    /// All disease labels in class-code order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Load a persisted index from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self, String> {
        let bytes = std::fs::read(path).map_err(|err| err.to_string())?;
        let index: Self = serde_json::from_slice(&bytes).map_err(|err| err.to_string())?;
        index.validate()?;
        Ok(index)
    }

    /// Persist the index as a JSON file.
    pub fn save_json(&self, path: &Path) -> Result<(), String> {
        let bytes = serde_json::to_vec_pretty(self).map_err(|err| err.to_string())?;
        std::fs::write(path, bytes).map_err(|err| err.to_string())
    }

    fn validate(&self) -> Result<(), String> {
        if self.labels.is_empty() {
            return Err("Disease index is empty".to_string());
        }
        if self.labels.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err("Disease index labels must be sorted and distinct".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symptom_positions_cover_header_order() {
        let index = SymptomIndex::build(["Itching ", "fever", "headache"]);
        assert_eq!(index.len(), 3);
        assert_eq!(index.position("itching"), Some(0));
        assert_eq!(index.position("fever"), Some(1));
        assert_eq!(index.position("headache"), Some(2));
        assert_eq!(index.name(2), Some("headache"));
        assert_eq!(index.position("chills"), None);
    }

    #[test]
    fn symptom_round_trip_is_bijective() {
        let columns = ["a", "b", "c", "d", "e"];
        let index = SymptomIndex::build(columns);
        let mut seen = vec![false; columns.len()];
        for name in columns {
            let position = index.position(name).unwrap();
            assert!(!seen[position]);
            seen[position] = true;
        }
        assert!(seen.into_iter().all(|hit| hit));
    }

    #[test]
    fn disease_codes_follow_sorted_label_order() {
        let index = DiseaseIndex::build(["Malaria", "Allergy", "Flu", "Allergy"]);
        assert_eq!(index.len(), 3);
        assert_eq!(index.label(0), Some("Allergy"));
        assert_eq!(index.label(1), Some("Flu"));
        assert_eq!(index.label(2), Some("Malaria"));
        assert_eq!(index.code("Flu"), Some(1));
        assert_eq!(index.code("Cholera"), None);
    }

    #[test]
    fn symptom_index_survives_json_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("symptom_index.json");
        let index = SymptomIndex::build(["itching", "fever"]);
        index.save_json(&path).unwrap();
        let loaded = SymptomIndex::load_json(&path).unwrap();
        assert_eq!(loaded.position("fever"), Some(1));
        assert_eq!(loaded.len(), 2);
    }
}
