//! Student t procedures: one-sample, two-sample, paired and mean intervals.

use super::descriptive::{mean, median, sample_variance};
use super::{
    ConfidenceInterval, DegreesOfFreedom, TestResult, Verdict, t_critical, t_two_sided_p,
};
use crate::error::FitError;

/// Test `H0: mean(values) == reference`.
pub fn one_sample(values: &[f64], reference: f64, alpha: f64) -> Result<TestResult, FitError> {
    let (result, _) = mean_test(values, reference, alpha)?;
    Ok(result)
}

/// Test `H0: mean(a) == mean(b)` for independent samples.
///
/// `equal_var` selects the pooled-variance statistic; otherwise Welch's statistic
/// with Satterthwaite degrees of freedom.
pub fn two_sample(
    a: &[f64],
    b: &[f64],
    equal_var: bool,
    alpha: f64,
) -> Result<TestResult, FitError> {
    let (n1, n2) = (a.len(), b.len());
    if n1 < 2 || n2 < 2 {
        return Err(FitError::new(format!(
            "each group needs at least 2 values (got {n1} and {n2})"
        )));
    }
    let (m1, m2) = (mean(a), mean(b));
    let (v1, v2) = (sample_variance(a, m1), sample_variance(b, m2));
    let (n1f, n2f) = (n1 as f64, n2 as f64);

    let (se, df) = if equal_var {
        let pooled = ((n1f - 1.0) * v1 + (n2f - 1.0) * v2) / (n1f + n2f - 2.0);
        ((pooled * (1.0 / n1f + 1.0 / n2f)).sqrt(), n1f + n2f - 2.0)
    } else {
        let (q1, q2) = (v1 / n1f, v2 / n2f);
        let se = (q1 + q2).sqrt();
        let df = (q1 + q2).powi(2) / (q1 * q1 / (n1f - 1.0) + q2 * q2 / (n2f - 1.0));
        (se, df)
    };
    if !(se.is_finite() && se > 0.0) {
        return Err(FitError::new("both groups have zero variance"));
    }
    let statistic = (m1 - m2) / se;
    let p_value = t_two_sided_p(statistic, df)?;
    Ok(TestResult {
        statistic,
        df: DegreesOfFreedom::Single(df),
        p_value,
        alpha,
        verdict: Verdict::from_p_value(p_value, alpha),
        estimate: m1 - m2,
        interval: None,
    })
}

/// Test `H0: mean(a - b) == 0` for paired observations.
pub fn paired(a: &[f64], b: &[f64], alpha: f64) -> Result<TestResult, FitError> {
    if a.len() != b.len() {
        return Err(FitError::new(format!(
            "paired samples differ in length ({} vs {})",
            a.len(),
            b.len()
        )));
    }
    let diffs: Vec<f64> = a.iter().zip(b).map(|(x, y)| x - y).collect();
    one_sample(&diffs, 0.0, alpha)
}

/// Confidence interval for the mean at level `1 - alpha`, paired with the test of
/// `H0: mean == reference` so that the verdict is `Reject` exactly when the
/// reference falls outside the interval.
pub fn mean_interval(values: &[f64], reference: f64, alpha: f64) -> Result<TestResult, FitError> {
    let (mut result, se) = mean_test(values, reference, alpha)?;
    let DegreesOfFreedom::Single(df) = result.df else {
        return Err(FitError::new("unexpected degrees of freedom"));
    };
    let level = 1.0 - alpha;
    let half_width = t_critical(level, df)? * se;
    result.interval = Some(ConfidenceInterval {
        level,
        lower: result.estimate - half_width,
        upper: result.estimate + half_width,
    });
    Ok(result)
}

/// Split `values` into the rows whose `target` is above its median and the rows at
/// or below it. Returns `(above, at_or_below)`.
pub fn split_by_target_median(values: &[f64], target: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let cut = median(target);
    let mut above = Vec::new();
    let mut rest = Vec::new();
    for (&value, &t) in values.iter().zip(target) {
        if t > cut {
            above.push(value);
        } else {
            rest.push(value);
        }
    }
    (above, rest)
}

fn mean_test(values: &[f64], reference: f64, alpha: f64) -> Result<(TestResult, f64), FitError> {
    let n = values.len();
    if n < 2 {
        return Err(FitError::new(format!("need at least 2 values (got {n})")));
    }
    let m = mean(values);
    let se = (sample_variance(values, m) / n as f64).sqrt();
    if !(se.is_finite() && se > 0.0) {
        return Err(FitError::new("sample has zero variance"));
    }
    let df = (n - 1) as f64;
    let statistic = (m - reference) / se;
    let p_value = t_two_sided_p(statistic, df)?;
    Ok((
        TestResult {
            statistic,
            df: DegreesOfFreedom::Single(df),
            p_value,
            alpha,
            verdict: Verdict::from_p_value(p_value, alpha),
            estimate: m,
            interval: None,
        },
        se,
    ))
}
