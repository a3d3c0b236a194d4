//! Diagnosis engine: loaded read-only state plus the prediction API.
//!
//! The engine owns everything a prediction needs — indexes, the training
//! table, reference tables, and optionally the trained classifier — and
//! exposes the two synchronous operations callers build on: `predict` and
//! `details`. Nothing here mutates after construction, so an engine can be
//! shared freely across threads.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

use crate::dataset::{DatasetError, DiseaseDetail, ReferenceLibrary, TrainingTable};
use crate::index::{DiseaseIndex, SymptomIndex};
use crate::ml::Classifier;
use crate::ml::stacking::StackingModel;
use crate::predict::{OverlapPredictor, PredictError, SymptomQuery, VectorPredictor};

/// File name of the persisted classifier artifact.
pub const MODEL_FILE_NAME: &str = "model.json";
/// File name of the persisted symptom index.
pub const SYMPTOM_INDEX_FILE_NAME: &str = "symptom_index.json";
/// File name of the persisted disease index.
pub const DISEASE_INDEX_FILE_NAME: &str = "disease_index.json";

/// A prediction plus its human-readable enrichment.
#[derive(Debug, Clone)]
pub struct Diagnosis {
    /// Predicted disease label.
    pub disease: String,
    /// Description, precautions, and medications for the disease.
    pub detail: DiseaseDetail,
}

/// Errors surfaced by engine construction and prediction.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The caller supplied no symptoms at all.
    #[error("No symptoms provided")]
    EmptySymptoms,
    /// None of the supplied symptoms exist in the symptom index.
    #[error("None of the reported symptoms are recognized: {0:?}")]
    UnrecognizedSymptoms(Vec<String>),
    /// The classifier artifact was trained against a different symptom index.
    #[error("Classifier expects {actual} symptoms but the index defines {expected}")]
    SymptomWidthMismatch {
        /// Width of the loaded symptom index.
        expected: usize,
        /// Width the classifier was trained with.
        actual: usize,
    },
    /// The classifier's class labels disagree with the disease index.
    #[error("Classifier class labels do not match the disease index")]
    DiseaseClassMismatch,
    /// The training table lost all rows, leaving the fallback nothing to match.
    #[error("No training records available for row matching")]
    NoTrainingRecords,
    /// A prediction-path failure.
    #[error(transparent)]
    Predict(#[from] PredictError),
}

/// Errors surfaced while loading engine state from disk.
#[derive(Debug, Error)]
pub enum LoadError {
    /// A tabular input failed to load.
    #[error(transparent)]
    Dataset(#[from] DatasetError),
    /// A persisted artifact failed to load or validate.
    #[error("Failed to load artifact {path}: {message}")]
    Artifact {
        path: PathBuf,
        message: String,
    },
    /// The loaded pieces do not belong together.
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Disk locations of the engine's inputs.
#[derive(Debug, Clone)]
pub struct EngineSources {
    /// Training table CSV.
    pub training: PathBuf,
    /// Disease description CSV.
    pub descriptions: PathBuf,
    /// Disease precautions CSV.
    pub precautions: PathBuf,
    /// Disease medications CSV.
    pub medications: PathBuf,
    /// Directory holding trained artifacts; `None` forces row matching.
    pub models_dir: Option<PathBuf>,
}

/// Loaded, immutable prediction state.
#[derive(Debug)]
pub struct DiagnosisEngine<C: Classifier = StackingModel> {
    symptoms: SymptomIndex,
    diseases: DiseaseIndex,
    table: TrainingTable,
    references: ReferenceLibrary,
    classifier: Option<C>,
}

impl DiagnosisEngine<StackingModel> {
    /// Load all engine state from disk.
    ///
    /// A missing model artifact engages the heuristic row-match path; a model
    /// that is present but inconsistent with the indexes is a fatal error
    /// rather than a silent downgrade.
    pub fn load(sources: &EngineSources) -> Result<Self, LoadError> {
        let table = TrainingTable::load(&sources.training)?;
        let references = ReferenceLibrary::load(
            &sources.descriptions,
            &sources.precautions,
            &sources.medications,
        )?;

        let Some(models_dir) = &sources.models_dir else {
            return Self::assemble(table, references, None).map_err(Into::into);
        };
        let model_path = models_dir.join(MODEL_FILE_NAME);
        if !model_path.exists() {
            warn!(
                "No trained model at {}; falling back to row matching",
                model_path.display()
            );
            return Self::assemble(table, references, None).map_err(Into::into);
        }
        let model = StackingModel::load_json(&model_path).map_err(|message| LoadError::Artifact {
            path: model_path.clone(),
            message,
        })?;

        let symptoms = load_or_build_symptom_index(models_dir, &table)?;
        let diseases = load_or_build_disease_index(models_dir, &table)?;
        if model.classes != diseases.labels() {
            return Err(EngineError::DiseaseClassMismatch.into());
        }
        info!("Loaded classifier artifact from {}", model_path.display());
        Ok(Self::new(symptoms, diseases, table, references, Some(model))?)
    }
}

impl<C: Classifier> DiagnosisEngine<C> {
    /// Wire already-loaded parts together, checking that the classifier and
    /// the symptom index agree on the feature width.
    pub fn new(
        symptoms: SymptomIndex,
        diseases: DiseaseIndex,
        table: TrainingTable,
        references: ReferenceLibrary,
        classifier: Option<C>,
    ) -> Result<Self, EngineError> {
        if let Some(classifier) = &classifier {
            if classifier.feature_width() != symptoms.len() {
                return Err(EngineError::SymptomWidthMismatch {
                    expected: symptoms.len(),
                    actual: classifier.feature_width(),
                });
            }
        }
        Ok(Self {
            symptoms,
            diseases,
            table,
            references,
            classifier,
        })
    }

    /// Build both indexes from the training table itself and wire the engine.
    pub fn assemble(
        table: TrainingTable,
        references: ReferenceLibrary,
        classifier: Option<C>,
    ) -> Result<Self, EngineError> {
        let symptoms = SymptomIndex::build(table.schema().symptom_columns());
        let diseases = DiseaseIndex::build(table.labels());
        Self::new(symptoms, diseases, table, references, classifier)
    }

    /// Predict a disease from raw symptom strings and enrich it with details.
    pub fn predict<I, S>(&self, raw_symptoms: I) -> Result<Diagnosis, EngineError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.predict_query(&SymptomQuery::new(raw_symptoms))
    }

    /// Predict from an already-normalized query.
    pub fn predict_query(&self, query: &SymptomQuery) -> Result<Diagnosis, EngineError> {
        if query.is_empty() {
            return Err(EngineError::EmptySymptoms);
        }
        if query.iter().all(|symptom| self.symptoms.position(symptom).is_none()) {
            return Err(EngineError::UnrecognizedSymptoms(
                query.iter().map(str::to_string).collect(),
            ));
        }

        let disease = match &self.classifier {
            Some(classifier) => {
                let predictor = VectorPredictor::new(classifier, &self.symptoms, &self.diseases);
                predictor.predict(query)?
            }
            None => OverlapPredictor::new(&self.table, &self.diseases)
                .predict(query)
                .ok_or(EngineError::NoTrainingRecords)?,
        };
        info!(disease = %disease, symptoms = query.len(), "Prediction complete");
        Ok(Diagnosis {
            detail: self.references.resolve(&disease),
            disease,
        })
    }

    /// Resolve reference details for a disease label. Absent rows resolve to
    /// placeholder text, never an error.
    pub fn details(&self, label: &str) -> DiseaseDetail {
        self.references.resolve(label.trim())
    }

    /// The symptom index in use; the list of known symptoms in vector order.
    pub fn symptoms(&self) -> &SymptomIndex {
        &self.symptoms
    }

    /// The disease index in use.
    pub fn diseases(&self) -> &DiseaseIndex {
        &self.diseases
    }

    /// True when predictions run through the trained classifier rather than
    /// the row-match fallback.
    pub fn has_classifier(&self) -> bool {
        self.classifier.is_some()
    }
}

fn load_or_build_symptom_index(
    models_dir: &Path,
    table: &TrainingTable,
) -> Result<SymptomIndex, LoadError> {
    let path = models_dir.join(SYMPTOM_INDEX_FILE_NAME);
    if path.exists() {
        SymptomIndex::load_json(&path).map_err(|message| LoadError::Artifact { path, message })
    } else {
        Ok(SymptomIndex::build(table.schema().symptom_columns()))
    }
}

fn load_or_build_disease_index(
    models_dir: &Path,
    table: &TrainingTable,
) -> Result<DiseaseIndex, LoadError> {
    let path = models_dir.join(DISEASE_INDEX_FILE_NAME);
    if path.exists() {
        DiseaseIndex::load_json(&path).map_err(|message| LoadError::Artifact { path, message })
    } else {
        Ok(DiseaseIndex::build(table.labels()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[derive(Debug)]
    struct FixedClassifier {
        width: usize,
        code: usize,
    }

    impl Classifier for FixedClassifier {
        fn feature_width(&self) -> usize {
            self.width
        }

        fn classify(&self, _features: &[f32]) -> usize {
            self.code
        }
    }

    fn load_table(contents: &str) -> TrainingTable {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("training.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        TrainingTable::load(&path).unwrap()
    }

    fn references() -> ReferenceLibrary {
        ReferenceLibrary::from_rows(
            vec![("Flu".to_string(), "Seasonal viral infection.".to_string())],
            Vec::new(),
            Vec::new(),
        )
    }

    #[test]
    fn heuristic_engine_predicts_and_enriches() {
        let table = load_table("itching,fever,prognosis\n1,0,Allergy\n1,1,Flu\n");
        let engine: DiagnosisEngine = DiagnosisEngine::assemble(table, references(), None).unwrap();
        let diagnosis = engine.predict(["itching", "fever"]).unwrap();
        assert_eq!(diagnosis.disease, "Flu");
        assert_eq!(diagnosis.detail.description, "Seasonal viral infection.");
        assert!(!engine.has_classifier());
    }

    #[test]
    fn empty_input_is_rejected_at_the_boundary() {
        let table = load_table("itching,fever,prognosis\n1,0,Allergy\n");
        let engine: DiagnosisEngine = DiagnosisEngine::assemble(table, references(), None).unwrap();
        let err = engine.predict(Vec::<String>::new()).unwrap_err();
        assert!(matches!(err, EngineError::EmptySymptoms));
    }

    #[test]
    fn fully_unrecognized_input_is_rejected() {
        let table = load_table("itching,fever,prognosis\n1,0,Allergy\n");
        let engine: DiagnosisEngine = DiagnosisEngine::assemble(table, references(), None).unwrap();
        let err = engine.predict(["glowing", "levitation"]).unwrap_err();
        assert!(matches!(err, EngineError::UnrecognizedSymptoms(_)));
    }

    #[test]
    fn classifier_width_mismatch_is_fatal() {
        let table = load_table("itching,fever,prognosis\n1,0,Allergy\n0,1,Flu\n");
        let classifier = FixedClassifier { width: 7, code: 0 };
        let err = DiagnosisEngine::assemble(table, references(), Some(classifier)).unwrap_err();
        assert!(matches!(
            err,
            EngineError::SymptomWidthMismatch {
                expected: 2,
                actual: 7
            }
        ));
    }

    #[test]
    fn classifier_path_resolves_codes_through_the_disease_index() {
        let table = load_table("itching,fever,prognosis\n1,0,Allergy\n0,1,Flu\n");
        let classifier = FixedClassifier { width: 2, code: 1 };
        let engine = DiagnosisEngine::assemble(table, references(), Some(classifier)).unwrap();
        let diagnosis = engine.predict(["itching"]).unwrap();
        assert_eq!(diagnosis.disease, "Flu");
        assert!(engine.has_classifier());
    }

    #[test]
    fn details_for_unknown_disease_are_placeholders() {
        let table = load_table("itching,fever,prognosis\n1,0,Allergy\n");
        let engine: DiagnosisEngine = DiagnosisEngine::assemble(table, references(), None).unwrap();
        let detail = engine.details("Cholera");
        assert_eq!(detail.description, crate::dataset::DESCRIPTION_FALLBACK);
        assert_eq!(
            detail.precautions,
            vec![crate::dataset::PRECAUTIONS_FALLBACK.to_string()]
        );
        assert_eq!(
            detail.medications,
            vec![crate::dataset::MEDICATIONS_FALLBACK.to_string()]
        );
    }
}
