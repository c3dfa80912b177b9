//! Classifiers for the comparison panel and the metrics used to score them.
//!
//! Every model is fitted from a row-major `Array2<f64>` of features and a slice of
//! class indices, and predicts class indices for new rows. Logistic regression and
//! the decision tree wrap `linfa`; the forest bags `linfa-trees` members; the
//! linear SVM and k-NN are implemented here.

pub mod forest;
pub mod knn;
pub mod logistic;
pub mod metrics;
pub mod svm;
pub mod tree;

pub use forest::{ForestModel, ForestParams};
pub use knn::{KnnModel, KnnParams};
pub use logistic::{LogisticModel, LogisticParams};
pub use metrics::{ClassificationResult, ConfusionMatrix};
pub use svm::{SvmKernel, SvmModel, SvmParams};
pub use tree::{TreeModel, TreeParams};

use ndarray::Array2;

use crate::error::FitError;

pub(crate) fn check_training_set(records: &Array2<f64>, labels: &[usize]) -> Result<(), FitError> {
    if records.nrows() == 0 || labels.is_empty() {
        return Err(FitError::new("Empty training set"));
    }
    if records.nrows() != labels.len() {
        return Err(FitError::new(format!(
            "Mismatched training inputs/labels ({} rows, {} labels)",
            records.nrows(),
            labels.len()
        )));
    }
    if records.ncols() == 0 {
        return Err(FitError::new("Training set has no features"));
    }
    Ok(())
}

/// Index of the largest vote count; ties go to the lowest index.
pub(crate) fn majority(votes: &[usize]) -> usize {
    let mut best = 0;
    for (idx, &count) in votes.iter().enumerate() {
        if count > votes[best] {
            best = idx;
        }
    }
    best
}

/// Index of the largest score; ties go to the lowest index.
pub(crate) fn argmax(scores: impl IntoIterator<Item = f64>) -> usize {
    let mut best = 0;
    let mut best_score = f64::NEG_INFINITY;
    for (idx, score) in scores.into_iter().enumerate() {
        if score > best_score {
            best = idx;
            best_score = score;
        }
    }
    best
}

#[cfg(test)]
pub(crate) mod test_support {
    use ndarray::Array2;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    /// Gaussian blobs with unit spread around well separated centers.
    pub(crate) fn blobs(
        classes: usize,
        per_class: usize,
        dims: usize,
        spacing: f64,
        seed: u64,
    ) -> (Array2<f64>, Vec<usize>) {
        let mut rng = StdRng::seed_from_u64(seed);
        let n = classes * per_class;
        let mut records = Array2::zeros((n, dims));
        let mut labels = Vec::with_capacity(n);
        for row in 0..n {
            let class = row % classes;
            for j in 0..dims {
                let center = spacing * ((class + j) % classes) as f64;
                let u1: f64 = rng.random::<f64>().max(f64::MIN_POSITIVE);
                let u2: f64 = rng.random();
                let noise = (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos();
                records[[row, j]] = center + noise;
            }
            labels.push(class);
        }
        (records, labels)
    }
}
