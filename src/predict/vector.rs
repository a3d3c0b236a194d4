//! Classifier-backed prediction over an encoded symptom vector.

use tracing::debug;

use super::{PredictError, SymptomQuery};
use crate::index::{DiseaseIndex, SymptomIndex};
use crate::ml::Classifier;

/// Predicts a disease by encoding the query into a fixed-width binary vector
/// and asking the trained classifier for the most probable class.
///
/// Pure: no state beyond the borrowed artifacts, no randomness.
#[derive(Debug)]
pub struct VectorPredictor<'a, C: Classifier> {
    classifier: &'a C,
    symptoms: &'a SymptomIndex,
    diseases: &'a DiseaseIndex,
}

impl<'a, C: Classifier> VectorPredictor<'a, C> {
    /// Borrow the loaded artifacts. The caller has already verified that the
    /// classifier width matches the symptom index.
    pub fn new(classifier: &'a C, symptoms: &'a SymptomIndex, diseases: &'a DiseaseIndex) -> Self {
        Self {
            classifier,
            symptoms,
            diseases,
        }
    }

    /// Encode the query as a binary feature vector over the symptom index.
    ///
    /// Unknown symptoms contribute nothing; an all-unknown query encodes to
    /// the zero vector, which is still a valid classifier input.
    pub fn encode(&self, query: &SymptomQuery) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.symptoms.len()];
        let mut unknown: Vec<&str> = Vec::new();
        for symptom in query.iter() {
            match self.symptoms.position(symptom) {
                Some(position) => vector[position] = 1.0,
                None => unknown.push(symptom),
            }
        }
        if !unknown.is_empty() {
            debug!("Ignoring symptoms absent from the index: {unknown:?}");
        }
        vector
    }

    /// Predict the disease label for a query.
    pub fn predict(&self, query: &SymptomQuery) -> Result<String, PredictError> {
        let vector = self.encode(query);
        let code = self.classifier.classify(&vector);
        self.diseases
            .label(code)
            .map(str::to_string)
            .ok_or(PredictError::UnknownClassCode { code })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Fixed-output classifier for exercising the encoding layer alone.
    struct StubClassifier {
        width: usize,
        code: usize,
    }

    impl Classifier for StubClassifier {
        fn feature_width(&self) -> usize {
            self.width
        }

        fn classify(&self, features: &[f32]) -> usize {
            assert_eq!(features.len(), self.width);
            self.code
        }
    }

    fn indexes() -> (SymptomIndex, DiseaseIndex) {
        (
            SymptomIndex::build(["itching", "fever", "chills"]),
            DiseaseIndex::build(["Flu", "Malaria"]),
        )
    }

    #[test]
    fn encodes_known_symptoms_at_their_positions() {
        let (symptoms, diseases) = indexes();
        let classifier = StubClassifier { width: 3, code: 0 };
        let predictor = VectorPredictor::new(&classifier, &symptoms, &diseases);
        let vector = predictor.encode(&SymptomQuery::new(["fever", "itching"]));
        assert_eq!(vector, vec![1.0, 1.0, 0.0]);
    }

    #[test]
    fn all_unknown_query_still_predicts() {
        let (symptoms, diseases) = indexes();
        let classifier = StubClassifier { width: 3, code: 1 };
        let predictor = VectorPredictor::new(&classifier, &symptoms, &diseases);
        let label = predictor
            .predict(&SymptomQuery::new(["sneezing", "fatigue"]))
            .unwrap();
        assert_eq!(label, "Malaria");
    }

    #[test]
    fn out_of_range_class_code_is_an_error() {
        let (symptoms, diseases) = indexes();
        let classifier = StubClassifier { width: 3, code: 7 };
        let predictor = VectorPredictor::new(&classifier, &symptoms, &diseases);
        let err = predictor.predict(&SymptomQuery::new(["fever"])).unwrap_err();
        assert!(matches!(err, PredictError::UnknownClassCode { code: 7 }));
    }

    #[test]
    fn repeated_queries_yield_the_same_label() {
        let (symptoms, diseases) = indexes();
        let classifier = StubClassifier { width: 3, code: 0 };
        let predictor = VectorPredictor::new(&classifier, &symptoms, &diseases);
        let query = SymptomQuery::new(["chills", "fever"]);
        assert_eq!(
            predictor.predict(&query).unwrap(),
            predictor.predict(&query).unwrap()
        );
    }
}
