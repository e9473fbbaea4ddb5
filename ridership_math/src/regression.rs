//! Multiple linear regression by ordinary least squares
//!
//! The fit always includes an intercept. Regressors are centred and scaled
//! to unit length before the normal equations are solved, which keeps the
//! normal matrix well conditioned when columns live on very different
//! scales (a month counter next to passenger-kilometre totals). The
//! resulting coefficients are mapped back to the original units, so the
//! solution is the same exact least-squares solution.

use crate::{mean, MathError, Result};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, FisherSnedecor, StudentsT};

/// Pivot threshold on the scaled (correlation-like) normal matrix
const PIVOT_TOLERANCE: f64 = 1e-10;

/// Inference statistics for one model term
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TermStatistics {
    /// Point estimate of the coefficient
    pub estimate: f64,
    /// Standard error of the estimate
    pub std_error: f64,
    /// t statistic (estimate / standard error)
    pub t_statistic: f64,
    /// Two-sided p-value of the t test
    pub p_value: f64,
    /// Lower bound of the 95% confidence interval
    pub conf_low: f64,
    /// Upper bound of the 95% confidence interval
    pub conf_high: f64,
}

/// Fitted multiple linear regression model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultipleLinearRegression {
    intercept: f64,
    coefficients: Vec<f64>,
    n_observations: usize,
    r_squared: f64,
    adj_r_squared: Option<f64>,
    f_statistic: Option<f64>,
    f_p_value: Option<f64>,
    residual_std_error: Option<f64>,
    /// Intercept first, then one entry per regressor
    terms: Option<Vec<TermStatistics>>,
    fitted_values: Vec<f64>,
    residuals: Vec<f64>,
}

impl MultipleLinearRegression {
    /// Fit `target ~ 1 + rows` by ordinary least squares.
    ///
    /// `rows` is row-major: one slice of regressor values per observation.
    /// Needs at least `p + 1` observations for `p` regressors. Inference
    /// statistics need a positive residual degree of freedom and are `None`
    /// otherwise.
    pub fn fit<R: AsRef<[f64]>>(rows: &[R], target: &[f64]) -> Result<Self> {
        let n = rows.len();
        if n == 0 {
            return Err(MathError::InsufficientData(
                "Cannot fit a regression on zero observations".to_string(),
            ));
        }
        if target.len() != n {
            return Err(MathError::InvalidInput(format!(
                "Got {} feature rows but {} target values",
                n,
                target.len()
            )));
        }

        let p = rows[0].as_ref().len();
        if p == 0 {
            return Err(MathError::InvalidInput(
                "At least one regressor is required".to_string(),
            ));
        }
        if n < p + 1 {
            return Err(MathError::InsufficientData(format!(
                "Need at least {} observations to fit {} regressors and an intercept, got {}",
                p + 1,
                p,
                n
            )));
        }

        // Column-major copy, validating shape and finiteness on the way
        let mut columns = vec![Vec::with_capacity(n); p];
        for (i, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != p {
                return Err(MathError::InvalidInput(format!(
                    "Row {} has {} regressors, expected {}",
                    i,
                    row.len(),
                    p
                )));
            }
            for (j, &value) in row.iter().enumerate() {
                if !value.is_finite() {
                    return Err(MathError::InvalidInput(format!(
                        "Non-finite value in row {}, regressor {}",
                        i, j
                    )));
                }
                columns[j].push(value);
            }
        }
        if let Some(i) = target.iter().position(|v| !v.is_finite()) {
            return Err(MathError::InvalidInput(format!(
                "Non-finite target value in row {}",
                i
            )));
        }

        let means: Vec<f64> = columns.iter().map(|c| mean(c)).collect();
        let mut scales = Vec::with_capacity(p);
        for (j, column) in columns.iter().enumerate() {
            if column.iter().all(|&v| v == column[0]) {
                return Err(MathError::ZeroVariance { column: j });
            }
            let ss: f64 = column.iter().map(|v| (v - means[j]).powi(2)).sum();
            scales.push(ss.sqrt());
        }

        let scaled: Vec<Vec<f64>> = columns
            .iter()
            .enumerate()
            .map(|(j, c)| c.iter().map(|v| (v - means[j]) / scales[j]).collect())
            .collect();

        let y_mean = mean(target);
        let y_centered: Vec<f64> = target.iter().map(|y| y - y_mean).collect();

        // Normal equations on the scaled design: (Z'Z) b = Z'y
        let mut gram = vec![0.0; p * p];
        let mut rhs = vec![0.0; p];
        for a in 0..p {
            for b in a..p {
                let dot: f64 = scaled[a].iter().zip(&scaled[b]).map(|(x, z)| x * z).sum();
                gram[a * p + b] = dot;
                gram[b * p + a] = dot;
            }
            rhs[a] = scaled[a].iter().zip(&y_centered).map(|(x, y)| x * y).sum();
        }

        let inverse = invert(&gram, p)?;

        let mut coefficients = Vec::with_capacity(p);
        for j in 0..p {
            let b_scaled: f64 = (0..p).map(|k| inverse[j * p + k] * rhs[k]).sum();
            coefficients.push(b_scaled / scales[j]);
        }
        let intercept = y_mean
            - coefficients
                .iter()
                .zip(&means)
                .map(|(b, m)| b * m)
                .sum::<f64>();

        let fitted_values: Vec<f64> = rows
            .iter()
            .map(|row| linear_combination(intercept, &coefficients, row.as_ref()))
            .collect();
        let residuals: Vec<f64> = target
            .iter()
            .zip(&fitted_values)
            .map(|(y, f)| y - f)
            .collect();

        let sse: f64 = residuals.iter().map(|r| r * r).sum();
        let sst: f64 = y_centered.iter().map(|y| y * y).sum();
        let r_squared = if sst > 0.0 { 1.0 - sse / sst } else { 0.0 };

        let mut model = Self {
            intercept,
            coefficients,
            n_observations: n,
            r_squared,
            adj_r_squared: None,
            f_statistic: None,
            f_p_value: None,
            residual_std_error: None,
            terms: None,
            fitted_values,
            residuals,
        };

        let df_resid = n - p - 1;
        if df_resid > 0 {
            model.attach_inference(&inverse, &means, &scales, sse, sst, df_resid)?;
        }

        Ok(model)
    }

    fn attach_inference(
        &mut self,
        inverse: &[f64],
        means: &[f64],
        scales: &[f64],
        sse: f64,
        sst: f64,
        df_resid: usize,
    ) -> Result<()> {
        let n = self.n_observations as f64;
        let p = self.coefficients.len();
        let df = df_resid as f64;
        let sigma2 = sse / df;

        self.residual_std_error = Some(sigma2.sqrt());
        self.adj_r_squared = Some(1.0 - (1.0 - self.r_squared) * (n - 1.0) / df);

        let fisher = FisherSnedecor::new(p as f64, df)
            .map_err(|e| MathError::CalculationError(e.to_string()))?;
        let f_statistic = if sse > 0.0 {
            ((sst - sse) / p as f64) / sigma2
        } else {
            f64::INFINITY
        };
        self.f_statistic = Some(f_statistic);
        self.f_p_value = Some(if f_statistic.is_finite() {
            1.0 - fisher.cdf(f_statistic)
        } else {
            0.0
        });

        let t_dist = StudentsT::new(0.0, 1.0, df)
            .map_err(|e| MathError::CalculationError(e.to_string()))?;
        let t_critical = t_dist.inverse_cdf(0.975);

        // Var(intercept) = sigma^2 * (1/n + sum_jk (m_j/s_j)(m_k/s_k) inv_jk)
        let mut intercept_quad = 0.0;
        for j in 0..p {
            for k in 0..p {
                intercept_quad +=
                    (means[j] / scales[j]) * (means[k] / scales[k]) * inverse[j * p + k];
            }
        }
        let mut std_errors = vec![(sigma2 * (1.0 / n + intercept_quad)).sqrt()];
        for j in 0..p {
            std_errors.push((sigma2 * inverse[j * p + j]).sqrt() / scales[j]);
        }

        let estimates = std::iter::once(self.intercept).chain(self.coefficients.iter().copied());
        let terms = estimates
            .zip(std_errors)
            .map(|(estimate, std_error)| {
                let t_statistic = if std_error > 0.0 {
                    estimate / std_error
                } else {
                    f64::INFINITY
                };
                let p_value = if t_statistic.is_finite() {
                    2.0 * (1.0 - t_dist.cdf(t_statistic.abs()))
                } else {
                    0.0
                };
                TermStatistics {
                    estimate,
                    std_error,
                    t_statistic,
                    p_value,
                    conf_low: estimate - t_critical * std_error,
                    conf_high: estimate + t_critical * std_error,
                }
            })
            .collect();
        self.terms = Some(terms);

        Ok(())
    }

    /// Predict the target for one row of regressors
    pub fn predict(&self, row: &[f64]) -> Result<f64> {
        if row.len() != self.coefficients.len() {
            return Err(MathError::InvalidInput(format!(
                "Expected {} regressors, got {}",
                self.coefficients.len(),
                row.len()
            )));
        }
        Ok(linear_combination(self.intercept, &self.coefficients, row))
    }

    /// Predict the target for many rows
    pub fn predict_many<R: AsRef<[f64]>>(&self, rows: &[R]) -> Result<Vec<f64>> {
        rows.iter().map(|row| self.predict(row.as_ref())).collect()
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn n_observations(&self) -> usize {
        self.n_observations
    }

    /// Coefficient of determination on the training data
    pub fn r_squared(&self) -> f64 {
        self.r_squared
    }

    pub fn adj_r_squared(&self) -> Option<f64> {
        self.adj_r_squared
    }

    pub fn f_statistic(&self) -> Option<f64> {
        self.f_statistic
    }

    pub fn f_p_value(&self) -> Option<f64> {
        self.f_p_value
    }

    pub fn residual_std_error(&self) -> Option<f64> {
        self.residual_std_error
    }

    /// Per-term statistics, intercept first
    pub fn terms(&self) -> Option<&[TermStatistics]> {
        self.terms.as_deref()
    }

    pub fn fitted_values(&self) -> &[f64] {
        &self.fitted_values
    }

    pub fn residuals(&self) -> &[f64] {
        &self.residuals
    }
}

fn linear_combination(intercept: f64, coefficients: &[f64], row: &[f64]) -> f64 {
    intercept
        + coefficients
            .iter()
            .zip(row)
            .map(|(b, x)| b * x)
            .sum::<f64>()
}

/// Least-squares coefficients of `target` on `rows` with no intercept term
pub(crate) fn fit_through_origin<R: AsRef<[f64]>>(
    rows: &[R],
    target: &[f64],
) -> Result<Vec<f64>> {
    let p = rows.first().map(|r| r.as_ref().len()).unwrap_or(0);
    if rows.len() != target.len() || p == 0 {
        return Err(MathError::InvalidInput(
            "rows and target must be non-empty and of equal length".to_string(),
        ));
    }

    let mut xtx = vec![0.0; p * p];
    let mut xty = vec![0.0; p];
    for (row, y) in rows.iter().zip(target) {
        let row = row.as_ref();
        for i in 0..p {
            xty[i] += row[i] * y;
            for j in 0..p {
                xtx[i * p + j] += row[i] * row[j];
            }
        }
    }

    let inv = invert(&xtx, p)?;
    Ok((0..p)
        .map(|i| (0..p).map(|j| inv[i * p + j] * xty[j]).sum())
        .collect())
}

/// Gauss-Jordan inversion with partial pivoting of a row-major `n x n` matrix
fn invert(matrix: &[f64], n: usize) -> Result<Vec<f64>> {
    let mut a = matrix.to_vec();
    let mut inv = vec![0.0; n * n];
    for i in 0..n {
        inv[i * n + i] = 1.0;
    }

    for i in 0..n {
        let mut max_row = i;
        for k in (i + 1)..n {
            if a[k * n + i].abs() > a[max_row * n + i].abs() {
                max_row = k;
            }
        }

        if max_row != i {
            for j in 0..n {
                a.swap(i * n + j, max_row * n + j);
                inv.swap(i * n + j, max_row * n + j);
            }
        }

        let pivot = a[i * n + i];
        if pivot.abs() < PIVOT_TOLERANCE {
            return Err(MathError::SingularMatrix);
        }

        for j in 0..n {
            a[i * n + j] /= pivot;
            inv[i * n + j] /= pivot;
        }

        for k in 0..n {
            if k != i {
                let factor = a[k * n + i];
                if factor != 0.0 {
                    for j in 0..n {
                        a[k * n + j] -= factor * a[i * n + j];
                        inv[k * n + j] -= factor * inv[i * n + j];
                    }
                }
            }
        }
    }

    Ok(inv)
}
