//! Evaluation metrics for classification models.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
/// Confusion matrix for a `K`-class classifier.
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

    /// Tally paired truth/prediction labels. Out-of-range labels are ignored.
    pub fn from_labels(n_classes: usize, truth: &[usize], predicted: &[usize]) -> Self {
        let mut cm = Self::new(n_classes);
        for (&t, &p) in truth.iter().zip(predicted) {
            cm.add(t, p);
        }
        cm
    }

    pub fn add(&mut self, truth: usize, predicted: usize) {
        if truth >= self.n_classes || predicted >= self.n_classes {
            return;
        }
        let idx = truth * self.n_classes + predicted;
        self.counts[idx] = self.counts[idx].saturating_add(1);
    }

    pub fn get(&self, truth: usize, predicted: usize) -> u32 {
        self.counts[truth * self.n_classes + predicted]
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().map(|&v| u64::from(v)).sum()
    }

    /// Rows of the matrix, truth-major.
    pub fn rows(&self) -> Vec<Vec<u32>> {
        self.counts
            .chunks(self.n_classes.max(1))
            .map(<[u32]>::to_vec)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
/// Precision/recall statistics for a single class.
pub struct PerClassStats {
    pub class: String,
    /// `TP / (TP + FP)`.
    pub precision: f64,
    /// `TP / (TP + FN)`.
    pub recall: f64,
    /// Harmonic mean of precision and recall.
    pub f1: f64,
    /// Total number of true examples for the class.
    pub support: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AveragedStats {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

/// Scored predictions of one classifier on the evaluation subset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationResult {
    pub accuracy: f64,
    pub per_class: Vec<PerClassStats>,
    /// Unweighted mean over classes.
    pub macro_avg: AveragedStats,
    /// Mean over classes weighted by support.
    pub weighted_avg: AveragedStats,
    pub confusion: ConfusionMatrix,
    pub predicted: Vec<usize>,
    pub truth: Vec<usize>,
}

impl ClassificationResult {
    /// Score `predicted` against `truth` for the named classes.
    pub fn score(classes: &[String], truth: Vec<usize>, predicted: Vec<usize>) -> Self {
        let confusion = ConfusionMatrix::from_labels(classes.len(), &truth, &predicted);
        let per_class = precision_recall_by_class(&confusion, classes);
        let macro_avg = average(&per_class, |_| 1.0);
        let weighted_avg = average(&per_class, |stats| f64::from(stats.support));
        Self {
            accuracy: accuracy(&confusion),
            per_class,
            macro_avg,
            weighted_avg,
            confusion,
            predicted,
            truth,
        }
    }
}

/// Compute per-class precision, recall and F1 from a confusion matrix.
pub fn precision_recall_by_class(cm: &ConfusionMatrix, classes: &[String]) -> Vec<PerClassStats> {
    let k = cm.n_classes;
    let mut stats = Vec::with_capacity(k);
    for class_idx in 0..k {
        let tp = f64::from(cm.get(class_idx, class_idx));
        let mut fp = 0f64;
        let mut fn_ = 0f64;
        let mut support = 0u32;
        for j in 0..k {
            let v = cm.get(class_idx, j);
            support = support.saturating_add(v);
            if j != class_idx {
                fn_ += f64::from(v);
            }
        }
        for i in 0..k {
            if i != class_idx {
                fp += f64::from(cm.get(i, class_idx));
            }
        }
        let precision = if tp + fp == 0.0 { 0.0 } else { tp / (tp + fp) };
        let recall = if tp + fn_ == 0.0 { 0.0 } else { tp / (tp + fn_) };
        let f1 = if precision + recall == 0.0 {
            0.0
        } else {
            2.0 * precision * recall / (precision + recall)
        };
        stats.push(PerClassStats {
            class: classes
                .get(class_idx)
                .cloned()
                .unwrap_or_else(|| class_idx.to_string()),
            precision,
            recall,
            f1,
            support,
        });
    }
    stats
}

/// Compute overall accuracy from a confusion matrix.
pub fn accuracy(cm: &ConfusionMatrix) -> f64 {
    let total = cm.total();
    if total == 0 {
        return 0.0;
    }
    let correct: u64 = (0..cm.n_classes).map(|c| u64::from(cm.get(c, c))).sum();
    correct as f64 / total as f64
}

fn average(stats: &[PerClassStats], weight: impl Fn(&PerClassStats) -> f64) -> AveragedStats {
    let total: f64 = stats.iter().map(&weight).sum();
    if total == 0.0 {
        return AveragedStats {
            precision: 0.0,
            recall: 0.0,
            f1: 0.0,
        };
    }
    let mean_of = |field: fn(&PerClassStats) -> f64| {
        stats.iter().map(|s| weight(s) * field(s)).sum::<f64>() / total
    };
    AveragedStats {
        precision: mean_of(|s| s.precision),
        recall: mean_of(|s| s.recall),
        f1: mean_of(|s| s.f1),
    }
}
