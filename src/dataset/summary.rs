//! Per-feature descriptive summary of a dataset.

use std::fmt::Write as _;

use serde::Serialize;

use super::{Dataset, Target};
use crate::stats::descriptive::{mean, quantile, sample_std, sorted};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureSummary {
    pub name: String,
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation.
    pub std: f64,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

impl FeatureSummary {
    fn of(name: &str, values: &[f64]) -> Self {
        let ordered = sorted(values);
        Self {
            name: name.to_string(),
            count: values.len(),
            mean: mean(values),
            std: sample_std(values),
            min: ordered.first().copied().unwrap_or(f64::NAN),
            q1: quantile(&ordered, 0.25),
            median: quantile(&ordered, 0.5),
            q3: quantile(&ordered, 0.75),
            max: ordered.last().copied().unwrap_or(f64::NAN),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetSummary {
    pub name: String,
    pub rows: usize,
    pub features: Vec<FeatureSummary>,
    /// Rows per class, in class order. `None` for a continuous target.
    pub classes: Option<Vec<(String, usize)>>,
    /// Summary of a continuous target.
    pub target: Option<FeatureSummary>,
}

/// Summarize every feature column and the target.
pub fn describe(dataset: &Dataset) -> DatasetSummary {
    let features = dataset
        .feature_names()
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let column: Vec<f64> = dataset.records().iter().map(|row| row[idx]).collect();
            FeatureSummary::of(name, &column)
        })
        .collect();
    let (classes, target) = match dataset.target() {
        Target::Classes { labels, classes } => {
            let mut counts = vec![0usize; classes.len()];
            for &label in labels {
                counts[label] += 1;
            }
            let per_class = classes.iter().cloned().zip(counts).collect();
            (Some(per_class), None)
        }
        Target::Continuous { name, values } => (None, Some(FeatureSummary::of(name, values))),
    };
    DatasetSummary {
        name: dataset.name().to_string(),
        rows: dataset.n_rows(),
        features,
        classes,
        target,
    }
}

impl DatasetSummary {
    /// Fixed-width text table, one line per column.
    pub fn render(&self) -> String {
        let width = self
            .features
            .iter()
            .map(|f| f.name.len())
            .chain(self.target.iter().map(|t| t.name.len()))
            .max()
            .unwrap_or(0)
            .max(7);
        let mut out = String::new();
        let _ = writeln!(out, "{}: {} rows, {} features", self.name, self.rows, self.features.len());
        let _ = writeln!(
            out,
            "{:<width$} {:>6} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10}",
            "feature", "count", "mean", "std", "min", "25%", "50%", "75%", "max"
        );
        for summary in self.features.iter().chain(self.target.iter()) {
            let _ = writeln!(
                out,
                "{:<width$} {:>6} {:>10.3} {:>10.3} {:>10.3} {:>10.3} {:>10.3} {:>10.3} {:>10.3}",
                summary.name,
                summary.count,
                summary.mean,
                summary.std,
                summary.min,
                summary.q1,
                summary.median,
                summary.q3,
                summary.max
            );
        }
        if let Some(classes) = &self.classes {
            out.push_str("class counts:\n");
            for (class, count) in classes {
                let _ = writeln!(out, "  {class}: {count}");
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summarizes_columns_and_classes() {
        let dataset = Dataset::new(
            "toy",
            vec!["a".into(), "b".into()],
            vec![
                vec![1.0, 10.0],
                vec![2.0, 10.0],
                vec![3.0, 10.0],
                vec![4.0, 10.0],
            ],
            Target::Classes {
                labels: vec![0, 1, 1, 1],
                classes: vec!["x".into(), "y".into()],
            },
        )
        .unwrap();
        let summary = describe(&dataset);
        assert_eq!(summary.rows, 4);
        let a = &summary.features[0];
        assert_eq!((a.min, a.q1, a.median, a.q3, a.max), (1.0, 1.75, 2.5, 3.25, 4.0));
        assert_eq!(a.mean, 2.5);
        assert_eq!(summary.features[1].std, 0.0);
        assert_eq!(
            summary.classes,
            Some(vec![("x".to_string(), 1), ("y".to_string(), 3)])
        );
        assert!(summary.target.is_none());
        let text = summary.render();
        assert!(text.starts_with("toy: 4 rows, 2 features"));
        assert!(text.contains("  y: 3"));
    }

    #[test]
    fn continuous_target_is_summarized() {
        let dataset = Dataset::new(
            "reg",
            vec!["a".into()],
            vec![vec![0.0], vec![1.0], vec![2.0]],
            Target::Continuous {
                name: "progression".into(),
                values: vec![5.0, 7.0, 9.0],
            },
        )
        .unwrap();
        let summary = describe(&dataset);
        let target = summary.target.unwrap();
        assert_eq!(target.name, "progression");
        assert_eq!(target.median, 7.0);
        assert_eq!(target.std, 2.0);
        assert!(summary.classes.is_none());
    }
}
