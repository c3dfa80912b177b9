//! Ordinary least squares with an intercept.

use ndarray::{Array1, Array2};

use super::descriptive::mean;
use super::{Coefficient, RegressionResult, Verdict, f_upper_p, t_two_sided_p};
use crate::error::FitError;

/// Pivots smaller than this fraction of the largest entry count as singular.
const SINGULAR_TOLERANCE: f64 = 1e-12;

/// Regress `response` on the named `columns` plus an intercept.
pub fn fit(
    names: &[String],
    columns: &[Vec<f64>],
    response: &[f64],
    alpha: f64,
) -> Result<RegressionResult, FitError> {
    let n = response.len();
    let p = columns.len() + 1;
    if names.len() != columns.len() {
        return Err(FitError::new("regressor names and columns differ in count"));
    }
    if let Some(col) = columns.iter().find(|col| col.len() != n) {
        return Err(FitError::new(format!(
            "regressor has {} values for {n} observations",
            col.len()
        )));
    }
    if n <= p {
        return Err(FitError::new(format!(
            "need more than {p} observations (got {n})"
        )));
    }

    let design = Array2::from_shape_fn((n, p), |(i, j)| if j == 0 { 1.0 } else { columns[j - 1][i] });
    let y = Array1::from(response.to_vec());
    let xtx = design.t().dot(&design);
    let xty = design.t().dot(&y);
    let inverse = invert(&xtx).ok_or_else(|| FitError::new("singular design matrix"))?;
    let beta = inverse.dot(&xty);

    let fitted = design.dot(&beta);
    let sse: f64 = y.iter().zip(fitted.iter()).map(|(a, b)| (a - b).powi(2)).sum();
    let y_mean = mean(response);
    let sst: f64 = response.iter().map(|v| (v - y_mean).powi(2)).sum();
    if !(sst > 0.0) {
        return Err(FitError::new("response has zero variance"));
    }

    let df_resid = (n - p) as f64;
    let df_model = (p - 1) as f64;
    let sigma2 = sse / df_resid;
    let mut coefficients = Vec::with_capacity(p);
    for j in 0..p {
        let estimate = beta[j];
        let std_error = (sigma2 * inverse[[j, j]]).max(0.0).sqrt();
        let (t_statistic, p_value) = if std_error > 0.0 {
            let t = estimate / std_error;
            (t, t_two_sided_p(t, df_resid)?)
        } else if estimate == 0.0 {
            (0.0, 1.0)
        } else {
            (f64::INFINITY.copysign(estimate), 0.0)
        };
        coefficients.push(Coefficient {
            name: if j == 0 {
                "intercept".to_string()
            } else {
                names[j - 1].clone()
            },
            estimate,
            std_error,
            t_statistic,
            p_value,
        });
    }

    let r_squared = 1.0 - sse / sst;
    let adj_r_squared = 1.0 - (1.0 - r_squared) * (n - 1) as f64 / df_resid;
    let (f_statistic, f_p_value) = if sse > 0.0 {
        let f = ((sst - sse) / df_model) / (sse / df_resid);
        (f, f_upper_p(f, df_model, df_resid)?)
    } else {
        (f64::INFINITY, 0.0)
    };

    Ok(RegressionResult {
        coefficients,
        r_squared,
        adj_r_squared,
        f_statistic,
        f_p_value,
        n_obs: n,
        alpha,
        verdict: Verdict::from_p_value(f_p_value, alpha),
    })
}

/// Gauss-Jordan inverse with partial pivoting; `None` when singular.
fn invert(matrix: &Array2<f64>) -> Option<Array2<f64>> {
    let n = matrix.nrows();
    let mut a = matrix.clone();
    let mut inv = Array2::<f64>::eye(n);
    let scale = a.iter().fold(0.0f64, |m, v| m.max(v.abs()));
    if !(scale > 0.0 && scale.is_finite()) {
        return None;
    }

    for col in 0..n {
        let pivot = (col..n).max_by(|&i, &j| a[[i, col]].abs().total_cmp(&a[[j, col]].abs()))?;
        if a[[pivot, col]].abs() <= SINGULAR_TOLERANCE * scale {
            return None;
        }
        if pivot != col {
            for k in 0..n {
                a.swap([pivot, k], [col, k]);
                inv.swap([pivot, k], [col, k]);
            }
        }
        let diag = a[[col, col]];
        for k in 0..n {
            a[[col, k]] /= diag;
            inv[[col, k]] /= diag;
        }
        for row in 0..n {
            if row == col {
                continue;
            }
            let factor = a[[row, col]];
            if factor == 0.0 {
                continue;
            }
            for k in 0..n {
                let da = factor * a[[col, k]];
                let di = factor * inv[[col, k]];
                a[[row, k]] -= da;
                inv[[row, k]] -= di;
            }
        }
    }
    Some(inv)
}
