//! Linear one-vs-rest support vector classifier.
//!
//! Each class gets a hyperplane trained on the regularized hinge loss
//! `lambda/2 |w|^2 + mean(max(0, 1 - y (w.x + b)))` with `lambda = 1 / (C n)`,
//! which matches the soft-margin objective up to scale. Optimization is seeded
//! mini-batch sub-gradient descent with a decaying step.

use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::{SeedableRng, seq::SliceRandom};
use serde::{Deserialize, Serialize};

use super::{argmax, check_training_set};
use crate::error::FitError;

/// Kernel used by the margin classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SvmKernel {
    #[default]
    Linear,
}

/// Training options for the margin classifier.
#[derive(Debug, Clone, PartialEq)]
pub struct SvmParams {
    pub kernel: SvmKernel,
    /// Inverse regularization strength.
    pub c: f64,
    pub epochs: usize,
    pub learning_rate: f64,
    pub batch_size: usize,
    pub seed: u64,
}

impl Default for SvmParams {
    fn default() -> Self {
        Self {
            kernel: SvmKernel::Linear,
            c: 1.0,
            epochs: 200,
            learning_rate: 0.05,
            batch_size: 16,
            seed: 42,
        }
    }
}

pub struct SvmModel {
    /// One row of weights per class.
    weights: Array2<f64>,
    bias: Array1<f64>,
}

impl SvmModel {
    pub fn fit(
        records: &Array2<f64>,
        labels: &[usize],
        n_classes: usize,
        params: &SvmParams,
    ) -> Result<Self, FitError> {
        check_training_set(records, labels)?;
        if n_classes < 2 {
            return Err(FitError::new("need at least two classes"));
        }
        if !(params.c > 0.0) {
            return Err(FitError::new(format!("C must be positive (got {})", params.c)));
        }
        match params.kernel {
            SvmKernel::Linear => Self::fit_linear(records, labels, n_classes, params),
        }
    }

    fn fit_linear(
        records: &Array2<f64>,
        labels: &[usize],
        n_classes: usize,
        params: &SvmParams,
    ) -> Result<Self, FitError> {
        let n = records.nrows();
        let dim = records.ncols();
        let lambda = 1.0 / (params.c * n as f64);
        let batch_size = params.batch_size.max(1);

        let mut rng = StdRng::seed_from_u64(params.seed);
        let mut weights = Array2::<f64>::zeros((n_classes, dim));
        let mut bias = Array1::<f64>::zeros(n_classes);
        let mut indices: Vec<usize> = (0..n).collect();
        let mut step = 0usize;

        for _epoch in 0..params.epochs {
            indices.shuffle(&mut rng);
            for chunk in indices.chunks(batch_size) {
                let lr = params.learning_rate / (1.0 + params.learning_rate * lambda * step as f64);
                step += 1;
                let mut grad_w = weights.mapv(|w| lambda * w);
                let mut grad_b = Array1::<f64>::zeros(n_classes);
                let inv = 1.0 / chunk.len() as f64;
                for &idx in chunk {
                    let x = records.row(idx);
                    for class in 0..n_classes {
                        let y = if labels[idx] == class { 1.0 } else { -1.0 };
                        let margin = y * (weights.row(class).dot(&x) + bias[class]);
                        if margin < 1.0 {
                            grad_w.row_mut(class).scaled_add(-y * inv, &x);
                            grad_b[class] -= y * inv;
                        }
                    }
                }
                weights.scaled_add(-lr, &grad_w);
                bias.scaled_add(-lr, &grad_b);
            }
        }

        if weights.iter().chain(bias.iter()).any(|v| !v.is_finite()) {
            return Err(FitError::new("training diverged"));
        }
        Ok(Self { weights, bias })
    }

    /// Signed distance-like score of every row against every class hyperplane.
    pub fn decision_function(&self, records: &Array2<f64>) -> Array2<f64> {
        records.dot(&self.weights.t()) + &self.bias
    }

    /// Class with the highest decision value; ties go to the lowest index.
    pub fn predict(&self, records: &Array2<f64>) -> Vec<usize> {
        self.decision_function(records)
            .axis_iter(Axis(0))
            .map(|scores| argmax(scores.iter().copied()))
            .collect()
    }
}
