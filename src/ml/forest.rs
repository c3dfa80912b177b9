//! Bagged ensemble of CART trees with per-tree feature subspaces.

use ndarray::{Array2, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::tree::{TreeModel, TreeParams};
use super::{check_training_set, majority};
use crate::error::FitError;

#[derive(Debug, Clone, PartialEq)]
pub struct ForestParams {
    pub n_trees: usize,
    pub seed: u64,
    pub max_depth: Option<usize>,
    /// Features drawn per tree; `None` uses `round(sqrt(d))`.
    pub max_features: Option<usize>,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: 100,
            seed: 42,
            max_depth: None,
            max_features: None,
        }
    }
}

struct Member {
    features: Vec<usize>,
    tree: TreeModel,
}

pub struct ForestModel {
    members: Vec<Member>,
    n_classes: usize,
}

impl ForestModel {
    /// Fit `n_trees` trees, each on a bootstrap sample of the rows and a random
    /// subset of the columns. Deterministic for a given seed.
    pub fn fit(
        records: &Array2<f64>,
        labels: &[usize],
        n_classes: usize,
        params: &ForestParams,
    ) -> Result<Self, FitError> {
        check_training_set(records, labels)?;
        if params.n_trees == 0 {
            return Err(FitError::new("forest needs at least one tree"));
        }
        let n = records.nrows();
        let d = records.ncols();
        let per_tree = params
            .max_features
            .unwrap_or_else(|| (d as f64).sqrt().round() as usize)
            .clamp(1, d);
        let tree_params = TreeParams {
            max_depth: params.max_depth,
        };

        let mut rng = StdRng::seed_from_u64(params.seed);
        let mut members = Vec::with_capacity(params.n_trees);
        for _ in 0..params.n_trees {
            let rows: Vec<usize> = (0..n).map(|_| rng.random_range(0..n)).collect();
            let mut features = rand::seq::index::sample(&mut rng, d, per_tree).into_vec();
            features.sort_unstable();
            let sample = records.select(Axis(0), &rows).select(Axis(1), &features);
            let sample_labels: Vec<usize> = rows.iter().map(|&i| labels[i]).collect();
            let tree = TreeModel::fit(&sample, &sample_labels, &tree_params)?;
            members.push(Member { features, tree });
        }
        tracing::debug!(
            "Random forest: {} trees, {} of {} features each",
            members.len(),
            per_tree,
            d
        );
        Ok(Self { members, n_classes })
    }

    /// Majority vote across members; ties go to the lowest class index.
    pub fn predict(&self, records: &Array2<f64>) -> Vec<usize> {
        let mut votes = vec![vec![0usize; self.n_classes.max(1)]; records.nrows()];
        for member in &self.members {
            let view = records.select(Axis(1), &member.features);
            for (row, label) in member.tree.predict(&view).into_iter().enumerate() {
                if let Some(slot) = votes[row].get_mut(label) {
                    *slot += 1;
                }
            }
        }
        votes.iter().map(|counts| majority(counts)).collect()
    }

    pub fn n_trees(&self) -> usize {
        self.members.len()
    }
}
