//! Evaluation metrics for classification models.

/// Confusion matrix for a `K`-class classifier.
#[derive(Debug, Clone)]
pub struct ConfusionMatrix {
    /// Number of classes.
    pub n_classes: usize,
    /// Row-major `KxK` counts (`truth * K + predicted`).
    pub counts: Vec<u32>,
}

impl ConfusionMatrix {
    /// Create an empty `KxK` confusion matrix.
    pub fn new(n_classes: usize) -> Self {
        Self {
            n_classes,
            counts: vec![0; n_classes * n_classes],
        }
    }

    /// Record one prediction.
    pub fn add(&mut self, truth: usize, predicted: usize) {
        if truth >= self.n_classes || predicted >= self.n_classes {
            return;
        }
        let idx = truth * self.n_classes + predicted;
        self.counts[idx] = self.counts[idx].saturating_add(1);
    }

    /// Count for a `(truth, predicted)` pair.
    pub fn get(&self, truth: usize, predicted: usize) -> u32 {
        self.counts[truth * self.n_classes + predicted]
    }

    /// Total number of recorded predictions.
    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }

    /// Fraction of predictions on the diagonal.
    pub fn accuracy(&self) -> f32 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        let correct: u32 = (0..self.n_classes).map(|idx| self.get(idx, idx)).sum();
        correct as f32 / total as f32
    }
}

/// Precision/recall statistics for a single class.
#[derive(Debug, Clone)]
pub struct PerClassStats {
    /// `TP / (TP + FP)`.
    pub precision: f32,
    /// `TP / (TP + FN)`.
    pub recall: f32,
    /// Total number of true examples for the class.
    pub support: u32,
}

/// Compute per-class precision and recall from a confusion matrix.
pub fn precision_recall_by_class(cm: &ConfusionMatrix) -> Vec<PerClassStats> {
    let k = cm.n_classes;
    let mut stats = Vec::with_capacity(k);
    for class_idx in 0..k {
        let tp = cm.get(class_idx, class_idx) as f32;
        let mut fp = 0f32;
        let mut fn_ = 0f32;
        let mut support = 0u32;
        for other in 0..k {
            let truth_row = cm.get(class_idx, other);
            support = support.saturating_add(truth_row);
            if other != class_idx {
                fn_ += truth_row as f32;
                fp += cm.get(other, class_idx) as f32;
            }
        }
        let precision = if tp + fp > 0.0 { tp / (tp + fp) } else { 0.0 };
        let recall = if tp + fn_ > 0.0 { tp / (tp + fn_) } else { 0.0 };
        stats.push(PerClassStats {
            precision,
            recall,
            support,
        });
    }
    stats
}

/// Headline numbers reported after a training run.
#[derive(Debug, Clone, Copy)]
pub struct EvalSummary {
    /// Overall accuracy on the evaluation split.
    pub accuracy: f32,
    /// Unweighted mean of per-class precision.
    pub macro_precision: f32,
    /// Unweighted mean of per-class recall.
    pub macro_recall: f32,
}

/// Summarize a confusion matrix into the headline training metrics.
pub fn summarize(cm: &ConfusionMatrix) -> EvalSummary {
    let stats = precision_recall_by_class(cm);
    let k = stats.len().max(1) as f32;
    EvalSummary {
        accuracy: cm.accuracy(),
        macro_precision: stats.iter().map(|s| s.precision).sum::<f32>() / k,
        macro_recall: stats.iter().map(|s| s.recall).sum::<f32>() / k,
    }
}
