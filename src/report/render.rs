use std::fmt::Write as _;

use super::Report;
use crate::ml::ClassificationResult;
use crate::panel::{MetricKind, ProcedureResult};
use crate::stats::{RegressionResult, TestResult};

/// Ranked table followed by skipped procedures and the repeated-testing note.
pub fn render_summary(report: &Report) -> String {
    let width = report
        .entries
        .iter()
        .map(|entry| entry.procedure.len())
        .chain(std::iter::once("procedure".len()))
        .max()
        .unwrap_or(0);
    let mut out = String::new();
    let _ = writeln!(out, "{:<width$}  {:<10}  {:>10}", "procedure", "metric", "value");
    for entry in &report.entries {
        let _ = writeln!(
            out,
            "{:<width$}  {:<10}  {:>10}",
            entry.procedure,
            entry.metric.to_string(),
            format_metric(entry.metric, entry.value)
        );
    }
    if !report.skipped.is_empty() {
        out.push_str("\nSkipped:\n");
        for skipped in &report.skipped {
            let _ = writeln!(out, "  {}: {}", skipped.name, skipped.reason);
        }
    }
    if report.has_uncorrected_tests() {
        let _ = writeln!(
            out,
            "\nNote: {} hypothesis tests ran on the same data without multiple-comparison correction.",
            report.tests_run
        );
    }
    out
}

/// Detailed output for one procedure.
pub fn render_result(name: &str, result: &ProcedureResult) -> String {
    let mut out = format!("== {name} ==\n");
    match result {
        ProcedureResult::Classification(result) => render_classification(&mut out, result),
        ProcedureResult::Test(result) => render_test(&mut out, result),
        ProcedureResult::Regression(result) => render_regression(&mut out, result),
    }
    out
}

fn format_metric(kind: MetricKind, value: f64) -> String {
    match kind {
        MetricKind::PValue if value != 0.0 && value < 1e-4 => format!("{value:.3e}"),
        _ => format!("{value:.4}"),
    }
}

fn format_p(p: f64) -> String {
    format_metric(MetricKind::PValue, p)
}

fn render_classification(out: &mut String, result: &ClassificationResult) {
    let width = result
        .per_class
        .iter()
        .map(|stats| stats.class.len())
        .chain(std::iter::once("weighted avg".len()))
        .max()
        .unwrap_or(0);
    let _ = writeln!(
        out,
        "{:<width$}  {:>9}  {:>9}  {:>9}  {:>7}",
        "", "precision", "recall", "f1-score", "support"
    );
    for stats in &result.per_class {
        let _ = writeln!(
            out,
            "{:<width$}  {:>9.2}  {:>9.2}  {:>9.2}  {:>7}",
            stats.class, stats.precision, stats.recall, stats.f1, stats.support
        );
    }
    let total = result.truth.len();
    out.push('\n');
    let _ = writeln!(
        out,
        "{:<width$}  {:>9}  {:>9}  {:>9.2}  {:>7}",
        "accuracy", "", "", result.accuracy, total
    );
    for (label, avg) in [("macro avg", &result.macro_avg), ("weighted avg", &result.weighted_avg)] {
        let _ = writeln!(
            out,
            "{:<width$}  {:>9.2}  {:>9.2}  {:>9.2}  {:>7}",
            label, avg.precision, avg.recall, avg.f1, total
        );
    }
    out.push_str("confusion matrix (rows = truth):\n");
    for row in result.confusion.rows() {
        let cells: Vec<String> = row.iter().map(|v| format!("{v:>4}")).collect();
        let _ = writeln!(out, "  {}", cells.join(""));
    }
}

fn render_test(out: &mut String, result: &TestResult) {
    let _ = writeln!(
        out,
        "statistic = {:.4}, df = {}, p-value = {}",
        result.statistic,
        result.df,
        format_p(result.p_value)
    );
    let _ = writeln!(out, "estimate = {:.4}", result.estimate);
    if let Some(interval) = &result.interval {
        let _ = writeln!(
            out,
            "{:.0}% interval = [{:.4}, {:.4}]",
            interval.level * 100.0,
            interval.lower,
            interval.upper
        );
    }
    let _ = writeln!(out, "verdict at alpha {}: {}", result.alpha, result.verdict);
}

fn render_regression(out: &mut String, result: &RegressionResult) {
    let width = result
        .coefficients
        .iter()
        .map(|coef| coef.name.len())
        .max()
        .unwrap_or(0)
        .max("term".len());
    let _ = writeln!(
        out,
        "{:<width$}  {:>12}  {:>10}  {:>9}  {:>10}",
        "term", "estimate", "std err", "t", "p-value"
    );
    for coef in &result.coefficients {
        let _ = writeln!(
            out,
            "{:<width$}  {:>12.4}  {:>10.4}  {:>9.3}  {:>10}",
            coef.name,
            coef.estimate,
            coef.std_error,
            coef.t_statistic,
            format_p(coef.p_value)
        );
    }
    let _ = writeln!(
        out,
        "n = {}, R^2 = {:.4}, adj. R^2 = {:.4}",
        result.n_obs, result.r_squared, result.adj_r_squared
    );
    let _ = writeln!(
        out,
        "F = {:.4}, p-value = {}, verdict at alpha {}: {}",
        result.f_statistic,
        format_p(result.f_p_value),
        result.alpha,
        result.verdict
    );
}
