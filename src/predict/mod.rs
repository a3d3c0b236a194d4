//! Disease prediction over a normalized symptom query.
//!
//! Two interchangeable paths produce a disease label: the vector predictor
//! queries the trained classifier artifact, and the overlap predictor falls
//! back to a best-match search over the raw training rows when no artifact is
//! available. Both ignore unknown symptoms silently and add no randomness of
//! their own.

mod overlap;
mod vector;

pub use overlap::OverlapPredictor;
pub use vector::VectorPredictor;

use thiserror::Error;

/// Errors surfaced by the prediction paths.
#[derive(Debug, Error)]
pub enum PredictError {
    /// The classifier produced a class code with no disease index entry,
    /// which means the artifact and index do not belong together.
    #[error("Classifier produced class code {code} with no disease index entry")]
    UnknownClassCode {
        /// The offending class code.
        code: usize,
    },
}

/// Normalized symptom query: lowercased, trimmed, deduplicated.
///
/// May contain tokens absent from the symptom index; predictors skip those
/// without erroring.
#[derive(Debug, Clone, Default)]
pub struct SymptomQuery {
    symptoms: Vec<String>,
}

impl SymptomQuery {
    /// Normalize raw symptom strings into a query.
    ///
    /// Duplicates collapse onto their first occurrence; empty tokens are
    /// dropped.
    pub fn new<I, S>(raw: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut symptoms: Vec<String> = Vec::new();
        for token in raw {
            let symptom = token.as_ref().trim().to_lowercase();
            if symptom.is_empty() || symptoms.contains(&symptom) {
                continue;
            }
            symptoms.push(symptom);
        }
        Self { symptoms }
    }

    /// Parse a comma-separated symptom string, the CLI input form.
    pub fn parse(raw: &str) -> Self {
        Self::new(raw.split(','))
    }

    /// Number of distinct symptoms in the query.
    pub fn len(&self) -> usize {
        self.symptoms.len()
    }

    /// True when the query holds no symptoms.
    pub fn is_empty(&self) -> bool {
        self.symptoms.is_empty()
    }

    /// Iterate over the normalized symptoms.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.symptoms.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_case_whitespace_and_duplicates() {
        let query = SymptomQuery::new([" Itching", "FEVER ", "itching", "", "  "]);
        let symptoms: Vec<&str> = query.iter().collect();
        assert_eq!(symptoms, vec!["itching", "fever"]);
    }

    #[test]
    fn parses_comma_separated_input() {
        let query = SymptomQuery::parse("itching, skin rash ,fever");
        assert_eq!(query.len(), 3);
        assert!(query.iter().any(|symptom| symptom == "skin rash"));
    }
}
