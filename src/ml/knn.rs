//! k-nearest-neighbours classifier with Euclidean distance and uniform votes.

use ndarray::{Array2, ArrayView1, Axis};

use super::{check_training_set, majority};
use crate::error::FitError;

#[derive(Debug, Clone, PartialEq)]
pub struct KnnParams {
    pub k: usize,
}

impl Default for KnnParams {
    fn default() -> Self {
        Self { k: 5 }
    }
}

/// Stores the training rows; all work happens at prediction time.
pub struct KnnModel {
    records: Array2<f64>,
    labels: Vec<usize>,
    n_classes: usize,
    k: usize,
}

impl KnnModel {
    pub fn fit(
        records: &Array2<f64>,
        labels: &[usize],
        n_classes: usize,
        params: &KnnParams,
    ) -> Result<Self, FitError> {
        check_training_set(records, labels)?;
        if params.k == 0 {
            return Err(FitError::new("k must be at least 1"));
        }
        if params.k > labels.len() {
            return Err(FitError::new(format!(
                "k = {} exceeds the {} training rows",
                params.k,
                labels.len()
            )));
        }
        Ok(Self {
            records: records.clone(),
            labels: labels.to_vec(),
            n_classes: n_classes.max(1),
            k: params.k,
        })
    }

    /// Vote among the `k` closest training rows. Equal distances keep training row
    /// order; tied votes go to the lowest class index.
    pub fn predict(&self, records: &Array2<f64>) -> Vec<usize> {
        records
            .axis_iter(Axis(0))
            .map(|query| self.predict_one(query))
            .collect()
    }

    fn predict_one(&self, query: ArrayView1<'_, f64>) -> usize {
        let mut distances: Vec<(f64, usize)> = self
            .records
            .axis_iter(Axis(0))
            .enumerate()
            .map(|(idx, row)| {
                let dist: f64 = row.iter().zip(query.iter()).map(|(a, b)| (a - b).powi(2)).sum();
                (dist, idx)
            })
            .collect();
        distances.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        let mut votes = vec![0usize; self.n_classes];
        for &(_, idx) in distances.iter().take(self.k) {
            if let Some(slot) = votes.get_mut(self.labels[idx]) {
                *slot += 1;
            }
        }
        majority(&votes)
    }
}
