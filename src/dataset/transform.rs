//! Per-feature standardization fitted on the training subset.

use serde::Serialize;

use super::Dataset;
use crate::error::PipelineError;

/// Relative tolerance under which a feature's spread counts as zero.
const DEGENERATE_STD_TOLERANCE: f64 = 1e-12;

/// Fitted `(x - mean) / std` mapping. Immutable once fitted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transform {
    feature_names: Vec<String>,
    means: Vec<f64>,
    stds: Vec<f64>,
}

impl Transform {
    /// Fit per-feature mean and population standard deviation on `train`.
    ///
    /// Fails with `DegenerateFeature` for the first feature whose spread is zero.
    pub fn fit(train: &Dataset) -> Result<Self, PipelineError> {
        let n = train.n_rows();
        if n == 0 {
            return Err(PipelineError::SchemaMismatch(
                "cannot fit a transform on an empty dataset".to_string(),
            ));
        }
        let d = train.n_features();
        let mut means = vec![0.0f64; d];
        for row in train.records() {
            for (mean, &v) in means.iter_mut().zip(row) {
                *mean += v;
            }
        }
        for mean in &mut means {
            *mean /= n as f64;
        }
        let mut stds = vec![0.0f64; d];
        for row in train.records() {
            for (j, &v) in row.iter().enumerate() {
                let diff = v - means[j];
                stds[j] += diff * diff;
            }
        }
        for (j, std) in stds.iter_mut().enumerate() {
            *std = (*std / n as f64).sqrt();
            if !std.is_finite() || *std <= DEGENERATE_STD_TOLERANCE * means[j].abs().max(1.0) {
                return Err(PipelineError::DegenerateFeature {
                    feature: train.feature_names()[j].clone(),
                });
            }
        }
        Ok(Self {
            feature_names: train.feature_names().to_vec(),
            means,
            stds,
        })
    }

    /// Rescale every feature of `dataset`. The target is carried over unchanged.
    pub fn apply(&self, dataset: &Dataset) -> Result<Dataset, PipelineError> {
        if dataset.feature_names() != self.feature_names.as_slice() {
            return Err(PipelineError::SchemaMismatch(format!(
                "transform fitted on [{}] applied to [{}]",
                self.feature_names.join(", "),
                dataset.feature_names().join(", ")
            )));
        }
        let records = dataset
            .records()
            .iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .map(|(j, &v)| (v - self.means[j]) / self.stds[j])
                    .collect()
            })
            .collect();
        Ok(dataset.with_records(records))
    }

    pub fn means(&self) -> &[f64] {
        &self.means
    }

    pub fn stds(&self) -> &[f64] {
        &self.stds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Target;

    fn dataset(rows: Vec<Vec<f64>>) -> Dataset {
        let n = rows.len();
        Dataset::new(
            "t",
            vec!["a".into(), "b".into()],
            rows,
            Target::Classes {
                labels: vec![0; n],
                classes: vec!["only".into()],
            },
        )
        .unwrap()
    }

    #[test]
    fn transformed_training_columns_are_standard() {
        let train = dataset(vec![
            vec![1.0, 100.0],
            vec![2.0, 250.0],
            vec![4.0, 175.0],
            vec![7.0, 90.0],
            vec![11.0, 310.0],
        ]);
        let transform = Transform::fit(&train).unwrap();
        let scaled = transform.apply(&train).unwrap();
        for j in 0..2 {
            let col: Vec<f64> = scaled.records().iter().map(|r| r[j]).collect();
            let mean = col.iter().sum::<f64>() / col.len() as f64;
            let var = col.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / col.len() as f64;
            assert!(mean.abs() < 1e-12);
            assert!((var.sqrt() - 1.0).abs() < 1e-12);
        }
        assert_eq!(scaled.target(), train.target());
    }

    #[test]
    fn uses_training_statistics_on_other_data() {
        let train = dataset(vec![vec![0.0, 0.0], vec![2.0, 4.0]]);
        let transform = Transform::fit(&train).unwrap();
        assert_eq!(transform.means(), &[1.0, 2.0]);
        assert_eq!(transform.stds(), &[1.0, 2.0]);
        let other = dataset(vec![vec![3.0, 6.0]]);
        assert_eq!(transform.apply(&other).unwrap().records(), &[vec![2.0, 2.0]]);
    }

    #[test]
    fn constant_feature_is_degenerate() {
        let train = dataset(vec![vec![1.0, 0.1], vec![2.0, 0.1], vec![3.0, 0.1]]);
        match Transform::fit(&train).unwrap_err() {
            PipelineError::DegenerateFeature { feature } => assert_eq!(feature, "b"),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn rejects_mismatched_features() {
        let train = dataset(vec![vec![0.0, 0.0], vec![2.0, 4.0]]);
        let transform = Transform::fit(&train).unwrap();
        let other = Dataset::new(
            "o",
            vec!["a".into(), "c".into()],
            vec![vec![1.0, 1.0]],
            Target::Continuous {
                name: "y".into(),
                values: vec![0.0],
            },
        )
        .unwrap();
        assert!(matches!(
            transform.apply(&other),
            Err(PipelineError::SchemaMismatch(_))
        ));
    }
}
