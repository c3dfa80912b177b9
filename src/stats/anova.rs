//! One-way ANOVA with equal-frequency grouping.

use super::descriptive::{mean, quantile, sorted};
use super::{DegreesOfFreedom, TestResult, Verdict, f_upper_p};
use crate::error::FitError;

/// Assign each value to one of `groups` equal-frequency bins.
///
/// Interior edges are the `i / groups` quantiles (linear interpolation). A value
/// equal to an edge belongs to the lower bin, so tied values always share a bin.
pub fn quantile_bins(values: &[f64], groups: usize) -> Vec<usize> {
    let groups = groups.max(1);
    let ordered = sorted(values);
    let edges: Vec<f64> = (1..groups)
        .map(|i| quantile(&ordered, i as f64 / groups as f64))
        .collect();
    values
        .iter()
        .map(|&v| edges.iter().position(|&edge| v <= edge).unwrap_or(groups - 1))
        .collect()
}

/// Classic one-way ANOVA across the given groups. Empty groups are ignored.
///
/// The estimate is eta squared, the share of total variance between groups.
pub fn one_way(groups: &[Vec<f64>], alpha: f64) -> Result<TestResult, FitError> {
    let groups: Vec<&Vec<f64>> = groups.iter().filter(|g| !g.is_empty()).collect();
    let k = groups.len();
    if k < 2 {
        return Err(FitError::new(format!(
            "need at least 2 non-empty groups (got {k})"
        )));
    }
    let n: usize = groups.iter().map(|g| g.len()).sum();
    if n <= k {
        return Err(FitError::new(format!(
            "no within-group degrees of freedom ({n} values in {k} groups)"
        )));
    }
    let all: Vec<f64> = groups.iter().flat_map(|g| g.iter().copied()).collect();
    let grand_mean = mean(&all);

    let mut ss_between = 0.0;
    let mut ss_within = 0.0;
    for group in &groups {
        let m = mean(group);
        ss_between += group.len() as f64 * (m - grand_mean).powi(2);
        ss_within += group.iter().map(|v| (v - m).powi(2)).sum::<f64>();
    }
    if !(ss_within > 0.0) {
        return Err(FitError::new("no variance within groups"));
    }
    let df_between = (k - 1) as f64;
    let df_within = (n - k) as f64;
    let statistic = (ss_between / df_between) / (ss_within / df_within);
    let p_value = f_upper_p(statistic, df_between, df_within)?;
    Ok(TestResult {
        statistic,
        df: DegreesOfFreedom::Pair(df_between, df_within),
        p_value,
        alpha,
        verdict: Verdict::from_p_value(p_value, alpha),
        estimate: ss_between / (ss_between + ss_within),
        interval: None,
    })
}

/// ANOVA of `response` across `groups` quantile bins of `grouping`.
pub fn by_quantile_groups(
    response: &[f64],
    grouping: &[f64],
    groups: usize,
    alpha: f64,
) -> Result<TestResult, FitError> {
    if response.len() != grouping.len() {
        return Err(FitError::new("response and grouping lengths differ"));
    }
    let bins = quantile_bins(grouping, groups);
    let mut buckets = vec![Vec::new(); groups.max(1)];
    for (&value, &bin) in response.iter().zip(&bins) {
        buckets[bin].push(value);
    }
    tracing::debug!(
        "ANOVA bins: {:?}",
        buckets.iter().map(Vec::len).collect::<Vec<_>>()
    );
    one_way(&buckets, alpha)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quartile_bins_are_equal_frequency() {
        let values: Vec<f64> = (1..=8).map(f64::from).collect();
        assert_eq!(quantile_bins(&values, 4), vec![0, 0, 1, 1, 2, 2, 3, 3]);
    }

    #[test]
    fn ties_fall_into_the_lower_bin() {
        // Edges at 2.0, 2.0, 3.25: every 2.0 lands in bin 0.
        let values = [1.0, 2.0, 2.0, 2.0, 2.0, 3.0, 4.0, 5.0];
        let bins = quantile_bins(&values, 4);
        assert_eq!(bins, vec![0, 0, 0, 0, 0, 2, 3, 3]);
    }

    #[test]
    fn matches_textbook_example() {
        // Three groups with means 5, 9, 7: SSB = 40, SSW = 6, F = (40/2)/(6/12) = 40.
        let groups = vec![
            vec![4.0, 5.0, 6.0, 5.0, 5.0],
            vec![8.0, 9.0, 10.0, 9.0, 9.0],
            vec![6.0, 7.0, 8.0, 7.0, 7.0],
        ];
        let result = one_way(&groups, 0.05).unwrap();
        assert!((result.statistic - 40.0).abs() < 1e-9);
        assert_eq!(result.df, DegreesOfFreedom::Pair(2.0, 12.0));
        assert!(result.p_value < 1e-4);
        assert_eq!(result.verdict, Verdict::Reject);
    }

    #[test]
    fn identical_groups_do_not_reject() {
        let groups = vec![vec![1.0, 2.0, 3.0], vec![1.0, 2.0, 3.0], vec![3.0, 2.0, 1.0]];
        let result = one_way(&groups, 0.05).unwrap();
        assert_eq!(result.statistic, 0.0);
        assert!((result.p_value - 1.0).abs() < 1e-12);
    }

    #[test]
    fn needs_two_groups_and_spread() {
        assert!(one_way(&[vec![1.0, 2.0], vec![]], 0.05).is_err());
        assert!(one_way(&[vec![1.0, 1.0], vec![2.0, 2.0]], 0.05).is_err());
    }

    #[test]
    fn response_tracking_grouping_is_significant() {
        let grouping: Vec<f64> = (0..40).map(f64::from).collect();
        let response: Vec<f64> = grouping
            .iter()
            .map(|g| g * 2.0 + if g.rem_euclid(2.0) == 0.0 { 1.0 } else { -1.0 })
            .collect();
        let result = by_quantile_groups(&response, &grouping, 4, 0.05).unwrap();
        assert!(result.p_value < 1e-6);
        assert!((0.0..=1.0).contains(&result.estimate));
    }
}
