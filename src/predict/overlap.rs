//! Model-free fallback: best symptom-overlap search over the training rows.

use tracing::debug;

use super::SymptomQuery;
use crate::dataset::TrainingTable;
use crate::index::DiseaseIndex;

/// Scores every training row by how many of the query's symptoms are positive
/// in that row and returns the best row's label.
///
/// Ties break toward the first row in table order, so the result is
/// deterministic for a fixed table. The table is borrowed immutably; scores
/// live on the stack, so concurrent calls never interfere.
#[derive(Debug)]
pub struct OverlapPredictor<'a> {
    table: &'a TrainingTable,
    diseases: &'a DiseaseIndex,
}

impl<'a> OverlapPredictor<'a> {
    /// Borrow the training table and the disease index used to resolve
    /// encoded labels.
    pub fn new(table: &'a TrainingTable, diseases: &'a DiseaseIndex) -> Self {
        Self { table, diseases }
    }

    /// Predict the disease label for a query.
    ///
    /// Always answers when the table has rows: an empty query (or one with no
    /// valid symptom columns) scores every row zero and returns the first
    /// row's label. Returns `None` only for an empty table.
    pub fn predict(&self, query: &SymptomQuery) -> Option<String> {
        let columns: Vec<usize> = query
            .iter()
            .filter_map(|symptom| self.table.column_position(symptom))
            .collect();
        if columns.len() < query.len() {
            let unknown: Vec<&str> = query
                .iter()
                .filter(|symptom| self.table.column_position(symptom).is_none())
                .collect();
            debug!("Ignoring symptoms absent from the table: {unknown:?}");
        }

        let mut best: Option<(usize, &str)> = None;
        for record in self.table.records() {
            let score = columns
                .iter()
                .filter(|&&column| record.symptoms()[column] == 1)
                .count();
            if best.is_none_or(|(best_score, _)| score > best_score) {
                best = Some((score, record.label()));
            }
        }

        let (score, raw_label) = best?;
        debug!(score, label = raw_label, "Best-overlap row selected");
        Some(self.resolve_label(raw_label))
    }

    /// An encoded label resolves through the disease index; anything else is
    /// taken as the label text itself. A code without an index entry also
    /// falls back to the raw text rather than failing the prediction.
    fn resolve_label(&self, raw_label: &str) -> String {
        if self.table.schema().label_is_encoded() {
            if let Some(label) = raw_label
                .parse::<usize>()
                .ok()
                .and_then(|code| self.diseases.label(code))
            {
                return label.to_string();
            }
        }
        raw_label.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn load_table(contents: &str) -> TrainingTable {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("training.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        TrainingTable::load(&path).unwrap()
    }

    #[test]
    fn highest_overlap_row_wins() {
        let table = load_table("itching,fever,prognosis\n1,0,Flu\n1,1,Flu\n");
        let diseases = DiseaseIndex::build(table.labels());
        let predictor = OverlapPredictor::new(&table, &diseases);
        let label = predictor
            .predict(&SymptomQuery::new(["itching", "fever"]))
            .unwrap();
        assert_eq!(label, "Flu");
    }

    #[test]
    fn distinct_labels_follow_the_better_row() {
        let table = load_table(
            "itching,fever,chills,prognosis\n1,0,0,Allergy\n0,1,1,Malaria\n1,1,0,Flu\n",
        );
        let diseases = DiseaseIndex::build(table.labels());
        let predictor = OverlapPredictor::new(&table, &diseases);
        let label = predictor
            .predict(&SymptomQuery::new(["fever", "chills"]))
            .unwrap();
        assert_eq!(label, "Malaria");
    }

    #[test]
    fn ties_break_toward_the_first_row() {
        let table = load_table("itching,fever,prognosis\n1,0,Allergy\n1,0,Flu\n");
        let diseases = DiseaseIndex::build(table.labels());
        let predictor = OverlapPredictor::new(&table, &diseases);
        let label = predictor.predict(&SymptomQuery::new(["itching"])).unwrap();
        assert_eq!(label, "Allergy");
    }

    #[test]
    fn empty_query_returns_the_first_row() {
        let table = load_table("itching,fever,prognosis\n0,1,Malaria\n1,1,Flu\n");
        let diseases = DiseaseIndex::build(table.labels());
        let predictor = OverlapPredictor::new(&table, &diseases);
        let label = predictor.predict(&SymptomQuery::default()).unwrap();
        assert_eq!(label, "Malaria");
    }

    #[test]
    fn unknown_symptoms_contribute_nothing() {
        let table = load_table("itching,fever,prognosis\n1,0,Allergy\n0,1,Flu\n");
        let diseases = DiseaseIndex::build(table.labels());
        let predictor = OverlapPredictor::new(&table, &diseases);
        let label = predictor
            .predict(&SymptomQuery::new(["fever", "glowing"]))
            .unwrap();
        assert_eq!(label, "Flu");
    }

    #[test]
    fn encoded_labels_resolve_through_the_disease_index() {
        let table = load_table("itching,fever,prognosis\n1,0,1\n0,1,0\n");
        assert!(table.schema().label_is_encoded());
        let diseases = DiseaseIndex::build(["Allergy", "Flu"]);
        let predictor = OverlapPredictor::new(&table, &diseases);
        let label = predictor.predict(&SymptomQuery::new(["itching"])).unwrap();
        assert_eq!(label, "Flu");
    }

    #[test]
    fn encoded_label_without_index_entry_stays_raw() {
        let table = load_table("itching,prognosis\n1,9\n");
        let diseases = DiseaseIndex::build(["Allergy", "Flu"]);
        let predictor = OverlapPredictor::new(&table, &diseases);
        let label = predictor.predict(&SymptomQuery::new(["itching"])).unwrap();
        assert_eq!(label, "9");
    }
}
