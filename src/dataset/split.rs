//! Deterministic train/evaluation partition.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use super::Dataset;
use crate::error::PipelineError;

/// Disjoint, covering partition of a dataset.
#[derive(Debug, Clone)]
pub struct Split {
    pub train: Dataset,
    pub eval: Dataset,
    /// Source row of each training row, in training order.
    pub train_indices: Vec<usize>,
    /// Source row of each evaluation row, in evaluation order.
    pub eval_indices: Vec<usize>,
}

/// Shuffle row indices with a seeded RNG and hold out `ceil(ratio * n)` rows.
///
/// The first held-out block of the permutation becomes the evaluation subset, the
/// remainder the training subset. Identical `(dataset, ratio, seed)` always gives
/// the identical partition.
pub fn split(dataset: &Dataset, ratio: f64, seed: u64) -> Result<Split, PipelineError> {
    if !(ratio > 0.0 && ratio < 1.0) {
        return Err(PipelineError::InvalidRatio {
            ratio,
            reason: "must lie strictly between 0 and 1".to_string(),
        });
    }
    let n = dataset.n_rows();
    let n_eval = (ratio * n as f64).ceil() as usize;
    if n_eval == 0 || n_eval >= n {
        return Err(PipelineError::InvalidRatio {
            ratio,
            reason: format!("leaves an empty subset for {n} rows"),
        });
    }

    let mut permutation: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    permutation.shuffle(&mut rng);
    let (eval_indices, train_indices) = permutation.split_at(n_eval);

    tracing::debug!(
        "Split {} rows into {} train / {} eval (seed {seed})",
        n,
        train_indices.len(),
        eval_indices.len()
    );
    Ok(Split {
        train: dataset.select(train_indices),
        eval: dataset.select(eval_indices),
        train_indices: train_indices.to_vec(),
        eval_indices: eval_indices.to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Target;

    fn dataset(n: usize) -> Dataset {
        Dataset::new(
            "t",
            vec!["x".into()],
            (0..n).map(|i| vec![i as f64]).collect(),
            Target::Continuous {
                name: "y".into(),
                values: (0..n).map(|i| i as f64 * 2.0).collect(),
            },
        )
        .unwrap()
    }

    #[test]
    fn partition_is_deterministic_and_covering() {
        let data = dataset(50);
        for (ratio, seed) in [(0.2, 42), (0.5, 1), (0.01, 7), (0.9, 3)] {
            let a = split(&data, ratio, seed).unwrap();
            let b = split(&data, ratio, seed).unwrap();
            assert_eq!(a.train_indices, b.train_indices);
            assert_eq!(a.eval_indices, b.eval_indices);

            let mut all: Vec<usize> = a
                .train_indices
                .iter()
                .chain(a.eval_indices.iter())
                .copied()
                .collect();
            all.sort_unstable();
            assert_eq!(all, (0..50).collect::<Vec<_>>());
            assert_eq!(a.eval.n_rows(), (ratio * 50.0f64).ceil() as usize);
        }
    }

    #[test]
    fn subsets_keep_rows_and_targets_together() {
        let data = dataset(20);
        let s = split(&data, 0.25, 9).unwrap();
        for (pos, &src) in s.eval_indices.iter().enumerate() {
            assert_eq!(s.eval.records()[pos][0], src as f64);
            assert_eq!(s.eval.continuous_target().unwrap()[pos], src as f64 * 2.0);
        }
    }

    #[test]
    fn different_seeds_give_different_partitions() {
        let data = dataset(100);
        let a = split(&data, 0.2, 1).unwrap();
        let b = split(&data, 0.2, 2).unwrap();
        assert_ne!(a.eval_indices, b.eval_indices);
    }

    #[test]
    fn rejects_out_of_range_ratios() {
        let data = dataset(10);
        for ratio in [0.0, 1.0, -0.1, 1.5, f64::NAN] {
            let err = split(&data, ratio, 42).unwrap_err();
            assert!(matches!(err, PipelineError::InvalidRatio { .. }));
        }
    }

    #[test]
    fn rejects_ratio_that_empties_training() {
        let data = dataset(1);
        let err = split(&data, 0.5, 42).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidRatio { .. }));
    }
}
