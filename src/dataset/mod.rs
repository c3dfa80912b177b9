//! Tabular datasets: rows of named numeric features plus one target column.

pub mod catalog;
pub mod loader;
pub mod split;
pub mod summary;
pub mod transform;

pub use catalog::DatasetId;
pub use loader::{load, load_from_reader};
pub use split::{Split, split};
pub use summary::{DatasetSummary, FeatureSummary, describe};
pub use transform::Transform;

use ndarray::Array2;
use serde::Serialize;

use crate::error::PipelineError;

/// Target column of a dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Target {
    /// Class indices into `classes`.
    Classes {
        labels: Vec<usize>,
        classes: Vec<String>,
    },
    /// Continuous response values.
    Continuous { name: String, values: Vec<f64> },
}

impl Target {
    pub fn len(&self) -> usize {
        match self {
            Target::Classes { labels, .. } => labels.len(),
            Target::Continuous { values, .. } => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keep the entries at `indices`, in that order.
    fn select(&self, indices: &[usize]) -> Target {
        match self {
            Target::Classes { labels, classes } => Target::Classes {
                labels: indices.iter().map(|&i| labels[i]).collect(),
                classes: classes.clone(),
            },
            Target::Continuous { name, values } => Target::Continuous {
                name: name.clone(),
                values: indices.iter().map(|&i| values[i]).collect(),
            },
        }
    }
}

/// Immutable table with a fixed feature order shared by every row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    name: String,
    feature_names: Vec<String>,
    records: Vec<Vec<f64>>,
    target: Target,
}

impl Dataset {
    /// Build a dataset, checking that every row matches the feature list, every
    /// value is finite and the target has one entry per row.
    pub fn new(
        name: impl Into<String>,
        feature_names: Vec<String>,
        records: Vec<Vec<f64>>,
        target: Target,
    ) -> Result<Self, PipelineError> {
        let name = name.into();
        if let Some((idx, row)) = records
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != feature_names.len())
        {
            return Err(PipelineError::SchemaMismatch(format!(
                "{name}: row {idx} has {} values but {} features are declared",
                row.len(),
                feature_names.len()
            )));
        }
        if target.len() != records.len() {
            return Err(PipelineError::SchemaMismatch(format!(
                "{name}: {} target values for {} rows",
                target.len(),
                records.len()
            )));
        }
        for (idx, row) in records.iter().enumerate() {
            if let Some(col) = row.iter().position(|v| !v.is_finite()) {
                return Err(PipelineError::SchemaMismatch(format!(
                    "{name}: row {idx} has a non-finite value for {}",
                    feature_names[col]
                )));
            }
        }
        if let Target::Continuous { values, .. } = &target {
            if let Some(idx) = values.iter().position(|v| !v.is_finite()) {
                return Err(PipelineError::SchemaMismatch(format!(
                    "{name}: target value {idx} is not finite"
                )));
            }
        }
        if let Target::Classes { labels, classes } = &target {
            if let Some(&bad) = labels.iter().find(|&&label| label >= classes.len()) {
                return Err(PipelineError::SchemaMismatch(format!(
                    "{name}: class label {bad} out of range for {} classes",
                    classes.len()
                )));
            }
        }
        Ok(Self {
            name,
            feature_names,
            records,
            target,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn records(&self) -> &[Vec<f64>] {
        &self.records
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn n_rows(&self) -> usize {
        self.records.len()
    }

    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    pub fn feature_index(&self, name: &str) -> Option<usize> {
        self.feature_names.iter().position(|f| f == name)
    }

    /// Copy one feature column out, or `None` for an unknown name.
    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let idx = self.feature_index(name)?;
        Some(self.records.iter().map(|row| row[idx]).collect())
    }

    /// Continuous target values, if this is a regression dataset.
    pub fn continuous_target(&self) -> Option<&[f64]> {
        match &self.target {
            Target::Continuous { values, .. } => Some(values),
            Target::Classes { .. } => None,
        }
    }

    /// Class labels and class names, if this is a classification dataset.
    pub fn class_labels(&self) -> Option<(&[usize], &[String])> {
        match &self.target {
            Target::Classes { labels, classes } => Some((labels, classes)),
            Target::Continuous { .. } => None,
        }
    }

    /// Row-major feature matrix for the model layer.
    pub fn records_array(&self) -> Array2<f64> {
        let n = self.records.len();
        let d = self.feature_names.len();
        Array2::from_shape_fn((n, d), |(i, j)| self.records[i][j])
    }

    /// Keep the rows at `indices`, in that order.
    pub fn select(&self, indices: &[usize]) -> Dataset {
        Dataset {
            name: self.name.clone(),
            feature_names: self.feature_names.clone(),
            records: indices.iter().map(|&i| self.records[i].clone()).collect(),
            target: self.target.select(indices),
        }
    }

    /// Same shape and target with new feature values.
    pub(crate) fn with_records(&self, records: Vec<Vec<f64>>) -> Dataset {
        Dataset {
            name: self.name.clone(),
            feature_names: self.feature_names.clone(),
            records,
            target: self.target.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn rejects_ragged_rows() {
        let err = Dataset::new(
            "t",
            names(&["a", "b"]),
            vec![vec![1.0, 2.0], vec![3.0]],
            Target::Continuous {
                name: "y".into(),
                values: vec![0.0, 1.0],
            },
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::SchemaMismatch(_)));
    }

    #[test]
    fn rejects_non_finite_features() {
        let mut records: Vec<Vec<f64>> = (0..20).map(|i| vec![f64::from(i)]).collect();
        records[3][0] = f64::NAN;
        let err = Dataset::new(
            "t",
            names(&["a"]),
            records,
            Target::Classes {
                labels: (0..20).map(|i| i % 2).collect(),
                classes: names(&["x", "y"]),
            },
        )
        .unwrap_err();
        match err {
            PipelineError::SchemaMismatch(msg) => assert!(msg.contains("row 3"), "{msg}"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn rejects_non_finite_target() {
        let err = Dataset::new(
            "t",
            names(&["a"]),
            vec![vec![1.0], vec![2.0]],
            Target::Continuous {
                name: "y".into(),
                values: vec![0.0, f64::INFINITY],
            },
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::SchemaMismatch(_)));
    }

    #[test]
    fn rejects_out_of_range_labels() {
        let err = Dataset::new(
            "t",
            names(&["a"]),
            vec![vec![1.0], vec![2.0]],
            Target::Classes {
                labels: vec![0, 2],
                classes: names(&["x", "y"]),
            },
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::SchemaMismatch(_)));
    }

    #[test]
    fn select_keeps_target_aligned() {
        let dataset = Dataset::new(
            "t",
            names(&["a", "b"]),
            vec![vec![1.0, 10.0], vec![2.0, 20.0], vec![3.0, 30.0]],
            Target::Classes {
                labels: vec![0, 1, 0],
                classes: names(&["x", "y"]),
            },
        )
        .unwrap();
        let picked = dataset.select(&[2, 1]);
        assert_eq!(picked.records(), &[vec![3.0, 30.0], vec![2.0, 20.0]]);
        assert_eq!(picked.class_labels().unwrap().0, &[0, 1]);
        assert_eq!(picked.column("b").unwrap(), vec![30.0, 20.0]);
        assert!(picked.column("missing").is_none());
        assert_eq!(picked.records_array()[[0, 1]], 30.0);
    }
}
