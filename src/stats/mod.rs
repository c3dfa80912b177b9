//! Inferential statistics: t-tests, intervals, one-way ANOVA and OLS.
//!
//! Every routine is a pure function of its inputs and returns a typed result with
//! the statistic, its p-value and a verdict at the caller's alpha. Distribution
//! tails come from `statrs`. No correction for multiple comparisons is applied
//! when several tests run on the same data.

pub mod anova;
pub mod descriptive;
pub mod ols;
pub mod ttest;

use std::fmt;

use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, FisherSnedecor, StudentsT};

use crate::dataset::Dataset;
use crate::error::FitError;

/// Outcome of comparing a p-value with alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Reject,
    FailToReject,
}

impl Verdict {
    /// `Reject` iff `p_value < alpha`.
    pub fn from_p_value(p_value: f64, alpha: f64) -> Self {
        if p_value < alpha {
            Verdict::Reject
        } else {
            Verdict::FailToReject
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Reject => f.write_str("reject"),
            Verdict::FailToReject => f.write_str("fail to reject"),
        }
    }
}

/// Degrees of freedom of a test statistic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DegreesOfFreedom {
    Single(f64),
    /// Numerator and denominator degrees of freedom of an F statistic.
    Pair(f64, f64),
}

impl fmt::Display for DegreesOfFreedom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DegreesOfFreedom::Single(df) => write!(f, "{}", format_df(*df)),
            DegreesOfFreedom::Pair(a, b) => write!(f, "{}, {}", format_df(*a), format_df(*b)),
        }
    }
}

fn format_df(df: f64) -> String {
    if df.fract() == 0.0 {
        format!("{df:.0}")
    } else {
        format!("{df:.2}")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfidenceInterval {
    /// Coverage, e.g. `0.95`.
    pub level: f64,
    pub lower: f64,
    pub upper: f64,
}

impl ConfidenceInterval {
    pub fn contains(&self, value: f64) -> bool {
        self.lower <= value && value <= self.upper
    }
}

/// Result of a hypothesis test.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestResult {
    pub statistic: f64,
    pub df: DegreesOfFreedom,
    pub p_value: f64,
    pub alpha: f64,
    pub verdict: Verdict,
    /// Point estimate behind the statistic (mean, mean difference, eta squared).
    pub estimate: f64,
    pub interval: Option<ConfidenceInterval>,
}

/// One fitted OLS term.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Coefficient {
    pub name: String,
    pub estimate: f64,
    pub std_error: f64,
    pub t_statistic: f64,
    pub p_value: f64,
}

/// Result of an ordinary least squares fit. The intercept is the first term.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegressionResult {
    pub coefficients: Vec<Coefficient>,
    pub r_squared: f64,
    pub adj_r_squared: f64,
    pub f_statistic: f64,
    pub f_p_value: f64,
    pub n_obs: usize,
    pub alpha: f64,
    /// Verdict of the overall F test.
    pub verdict: Verdict,
}

/// A column a statistical procedure reads: a named feature or the target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variable {
    Feature(String),
    Target,
}

impl Variable {
    /// Copy the column out of `dataset`.
    pub fn values(&self, dataset: &Dataset) -> Result<Vec<f64>, FitError> {
        match self {
            Variable::Feature(name) => feature_column(dataset, name),
            Variable::Target => continuous_target(dataset).map(<[f64]>::to_vec),
        }
    }
}

pub(crate) fn feature_column(dataset: &Dataset, name: &str) -> Result<Vec<f64>, FitError> {
    dataset
        .column(name)
        .ok_or_else(|| FitError::new(format!("unknown feature {name}")))
}

pub(crate) fn continuous_target(dataset: &Dataset) -> Result<&[f64], FitError> {
    dataset
        .continuous_target()
        .ok_or_else(|| FitError::new("target is categorical; a continuous target is required"))
}

/// Two-sided p-value of a t statistic.
pub(crate) fn t_two_sided_p(t: f64, df: f64) -> Result<f64, FitError> {
    let dist = StudentsT::new(0.0, 1.0, df)
        .map_err(|err| FitError::new(format!("invalid t distribution (df {df}): {err:?}")))?;
    Ok((2.0 * dist.sf(t.abs())).clamp(0.0, 1.0))
}

/// Two-sided critical value of the t distribution for coverage `level`.
pub(crate) fn t_critical(level: f64, df: f64) -> Result<f64, FitError> {
    let dist = StudentsT::new(0.0, 1.0, df)
        .map_err(|err| FitError::new(format!("invalid t distribution (df {df}): {err:?}")))?;
    Ok(dist.inverse_cdf(1.0 - (1.0 - level) / 2.0))
}

/// Upper-tail p-value of an F statistic.
pub(crate) fn f_upper_p(f: f64, df1: f64, df2: f64) -> Result<f64, FitError> {
    let dist = FisherSnedecor::new(df1, df2).map_err(|err| {
        FitError::new(format!("invalid F distribution (df {df1}, {df2}): {err:?}"))
    })?;
    Ok(dist.sf(f).clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verdict_is_strict_less_than() {
        assert_eq!(Verdict::from_p_value(0.049, 0.05), Verdict::Reject);
        assert_eq!(Verdict::from_p_value(0.05, 0.05), Verdict::FailToReject);
        assert_eq!(Verdict::FailToReject.to_string(), "fail to reject");
    }

    #[test]
    fn t_tail_matches_reference_values() {
        // t = 2.228 is the 97.5th percentile at 10 df.
        let p = t_two_sided_p(2.228_138_851_986_274, 10.0).unwrap();
        assert!((p - 0.05).abs() < 1e-6);
        assert!((t_critical(0.95, 10.0).unwrap() - 2.228_138_851_986_274).abs() < 1e-6);
        assert_eq!(t_two_sided_p(0.0, 5.0).unwrap(), 1.0);
    }

    #[test]
    fn f_tail_matches_reference_value() {
        // F(2, 10) upper 5% point is 4.102821.
        let p = f_upper_p(4.102_821_015_130_4, 2.0, 10.0).unwrap();
        assert!((p - 0.05).abs() < 1e-6);
    }

    #[test]
    fn df_display_trims_whole_numbers() {
        assert_eq!(DegreesOfFreedom::Single(9.0).to_string(), "9");
        assert_eq!(DegreesOfFreedom::Pair(3.0, 96.5).to_string(), "3, 96.50");
    }
}
