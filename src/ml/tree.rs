//! CART decision tree (Gini impurity) backed by `linfa-trees`.

use linfa::prelude::*;
use linfa_trees::{DecisionTree, SplitQuality};
use ndarray::{Array1, Array2};

use super::check_training_set;
use crate::error::FitError;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TreeParams {
    /// `None` grows the tree until leaves are pure.
    pub max_depth: Option<usize>,
}

pub struct TreeModel {
    inner: DecisionTree<f64, usize>,
}

impl TreeModel {
    pub fn fit(records: &Array2<f64>, labels: &[usize], params: &TreeParams) -> Result<Self, FitError> {
        check_training_set(records, labels)?;
        let dataset = Dataset::new(records.clone(), Array1::from(labels.to_vec()));
        let inner = DecisionTree::<f64, usize>::params()
            .split_quality(SplitQuality::Gini)
            .max_depth(params.max_depth)
            .fit(&dataset)
            .map_err(|err| FitError::new(format!("decision tree: {err}")))?;
        Ok(Self { inner })
    }

    pub fn predict(&self, records: &Array2<f64>) -> Vec<usize> {
        let predicted: Array1<usize> = self.inner.predict(records);
        predicted.to_vec()
    }
}
