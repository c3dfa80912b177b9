//! Ranked summary of a panel run.

mod render;

pub use render::{render_result, render_summary};

use serde::Serialize;

use crate::panel::{MetricKind, PanelRun, SkippedProcedure};

/// One ranked line of the report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportEntry {
    pub procedure: String,
    pub metric: MetricKind,
    pub value: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Report {
    /// Sorted by `value`, largest first. Equal values keep panel order.
    pub entries: Vec<ReportEntry>,
    pub skipped: Vec<SkippedProcedure>,
    /// Hypothesis tests in the run; more than one means uncorrected repeated testing.
    pub tests_run: usize,
}

impl Report {
    pub fn build(run: &PanelRun) -> Self {
        let entries = run
            .records
            .iter()
            .filter_map(|record| {
                record
                    .result
                    .metric_value(record.metric)
                    .map(|value| ReportEntry {
                        procedure: record.name.clone(),
                        metric: record.metric,
                        value,
                    })
            })
            .collect();
        Self::from_entries(entries, run.skipped.clone(), run.test_count())
    }

    /// Rank arbitrary entries with the same ordering rules as `build`.
    pub fn from_entries(
        mut entries: Vec<ReportEntry>,
        skipped: Vec<SkippedProcedure>,
        tests_run: usize,
    ) -> Self {
        // `sort_by` is stable, so ties keep their input order.
        entries.sort_by(|a, b| b.value.total_cmp(&a.value));
        Self {
            entries,
            skipped,
            tests_run,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Whether several tests ran on the same data without multiple-comparison correction.
    pub fn has_uncorrected_tests(&self) -> bool {
        self.tests_run > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, value: f64) -> ReportEntry {
        ReportEntry {
            procedure: name.to_string(),
            metric: MetricKind::Accuracy,
            value,
        }
    }

    #[test]
    fn sorts_descending_and_keeps_ties_in_order() {
        let entries = vec![
            entry("A", 1.0),
            entry("B", 1.0),
            entry("C", 0.97),
            entry("D", 0.94),
            entry("E", 0.94),
        ];
        let shuffled = vec![
            entries[3].clone(),
            entries[0].clone(),
            entries[2].clone(),
            entries[4].clone(),
            entries[1].clone(),
        ];
        let report = Report::from_entries(entries, Vec::new(), 0);
        let names: Vec<&str> = report.entries.iter().map(|e| e.procedure.as_str()).collect();
        assert_eq!(names, ["A", "B", "C", "D", "E"]);

        let report = Report::from_entries(shuffled, Vec::new(), 0);
        let names: Vec<&str> = report.entries.iter().map(|e| e.procedure.as_str()).collect();
        assert_eq!(names, ["A", "B", "C", "D", "E"]);
    }

    #[test]
    fn serializes_to_json() {
        let report = Report::from_entries(
            vec![entry("KNN", 0.9)],
            vec![SkippedProcedure {
                name: "SVM".into(),
                reason: "boom".into(),
            }],
            0,
        );
        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(json["entries"][0]["metric"], "accuracy");
        assert_eq!(json["skipped"][0]["reason"], "boom");
        assert!(!report.has_uncorrected_tests());
    }
}
