//! Typed schema resolved once from a training table header.

/// Column names recognized as the disease label column, case-insensitively.
pub const LABEL_COLUMN_ALIASES: &[&str] = &["disease", "prognosis", "label", "diagnosis"];

/// Resolved structure of a training table.
///
/// Produced once at load time so neither predictor repeats column-name
/// matching per call. `label_is_encoded` records whether the label column
/// stores integer class codes rather than disease names, decided from the
/// full column contents rather than per row.
#[derive(Debug, Clone)]
pub struct TableSchema {
    label_column: String,
    symptom_columns: Vec<String>,
    label_is_encoded: bool,
}

impl TableSchema {
    /// Resolve a schema from normalized header names.
    ///
    /// Returns `None` when no header matches a recognized label alias. The
    /// first alias match wins; every other column is a symptom column.
    pub fn resolve(headers: &[String]) -> Option<Self> {
        let label_position = headers
            .iter()
            .position(|header| LABEL_COLUMN_ALIASES.contains(&header.to_lowercase().as_str()))?;
        let symptom_columns = headers
            .iter()
            .enumerate()
            .filter(|(position, _)| *position != label_position)
            .map(|(_, header)| header.clone())
            .collect();
        Some(Self {
            label_column: headers[label_position].clone(),
            symptom_columns,
            label_is_encoded: false,
        })
    }

    /// Record whether every label cell parses as an integer class code.
    pub(crate) fn with_label_encoding(mut self, encoded: bool) -> Self {
        self.label_is_encoded = encoded;
        self
    }

    /// Name of the resolved label column.
    pub fn label_column(&self) -> &str {
        &self.label_column
    }

    /// Symptom column names in header order.
    pub fn symptom_columns(&self) -> &[String] {
        &self.symptom_columns
    }

    /// True when the label column stores integer class codes.
    pub fn label_is_encoded(&self) -> bool {
        self.label_is_encoded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn resolves_prognosis_alias_case_insensitively() {
        let schema = TableSchema::resolve(&headers(&["itching", "fever", "Prognosis"])).unwrap();
        assert_eq!(schema.label_column(), "Prognosis");
        assert_eq!(schema.symptom_columns(), &["itching", "fever"]);
        assert!(!schema.label_is_encoded());
    }

    #[test]
    fn label_column_in_the_middle_keeps_symptom_order() {
        let schema = TableSchema::resolve(&headers(&["itching", "disease", "fever"])).unwrap();
        assert_eq!(schema.label_column(), "disease");
        assert_eq!(schema.symptom_columns(), &["itching", "fever"]);
    }

    #[test]
    fn missing_label_column_is_rejected() {
        assert!(TableSchema::resolve(&headers(&["itching", "fever"])).is_none());
    }
}
