//! Multinomial logistic regression backed by `linfa-logistic`.

use linfa::prelude::*;
use linfa_logistic::{MultiFittedLogisticRegression, MultiLogisticRegression};
use ndarray::{Array1, Array2};

use super::check_training_set;
use crate::error::FitError;

/// Training options for the logistic regression classifier.
#[derive(Debug, Clone, PartialEq)]
pub struct LogisticParams {
    /// L2 penalty strength.
    pub alpha: f64,
    pub max_iterations: u64,
}

impl Default for LogisticParams {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            max_iterations: 100,
        }
    }
}

pub struct LogisticModel {
    inner: MultiFittedLogisticRegression<f64, usize>,
}

impl LogisticModel {
    pub fn fit(
        records: &Array2<f64>,
        labels: &[usize],
        params: &LogisticParams,
    ) -> Result<Self, FitError> {
        check_training_set(records, labels)?;
        let dataset = Dataset::new(records.clone(), Array1::from(labels.to_vec()));
        let inner = MultiLogisticRegression::default()
            .alpha(params.alpha)
            .max_iterations(params.max_iterations)
            .fit(&dataset)
            .map_err(|err| FitError::new(format!("logistic regression: {err}")))?;
        Ok(Self { inner })
    }

    pub fn predict(&self, records: &Array2<f64>) -> Vec<usize> {
        let predicted: Array1<usize> = self.inner.predict(records);
        predicted.to_vec()
    }
}
