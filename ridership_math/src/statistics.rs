//! Descriptive statistics and correlation

use crate::regression::fit_through_origin;
use crate::{MathError, Result};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// Column summary in the shape of a classic `describe()` table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n - 1 denominator), NaN for one value
    pub std: f64,
    pub min: f64,
    /// 25th percentile
    pub q1: f64,
    pub median: f64,
    /// 75th percentile
    pub q3: f64,
    pub max: f64,
}

/// Summarise a column of values
pub fn describe(values: &[f64]) -> Result<Summary> {
    if values.is_empty() {
        return Err(MathError::InsufficientData(
            "Cannot describe an empty column".to_string(),
        ));
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    Ok(Summary {
        count: values.len(),
        mean: Statistics::mean(values),
        std: Statistics::std_dev(values),
        min: sorted[0],
        q1: quantile_sorted(&sorted, 0.25),
        median: quantile_sorted(&sorted, 0.5),
        q3: quantile_sorted(&sorted, 0.75),
        max: sorted[sorted.len() - 1],
    })
}

/// Quantile with linear interpolation between closest ranks
fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let weight = position - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * weight
}

/// Pearson correlation coefficient.
///
/// Returns NaN when either column is constant.
pub fn pearson_correlation(x: &[f64], y: &[f64]) -> Result<f64> {
    if x.len() != y.len() {
        return Err(MathError::InvalidInput(format!(
            "Columns differ in length: {} vs {}",
            x.len(),
            y.len()
        )));
    }
    if x.len() < 2 {
        return Err(MathError::InsufficientData(
            "Correlation needs at least two observations".to_string(),
        ));
    }

    let mean_x = Statistics::mean(x);
    let mean_y = Statistics::mean(y);
    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (a, b) in x.iter().zip(y) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    if sxx == 0.0 || syy == 0.0 {
        return Ok(f64::NAN);
    }
    Ok((sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0))
}

/// Pairwise Pearson correlation matrix over equally long columns
pub fn correlation_matrix(columns: &[&[f64]]) -> Result<Vec<Vec<f64>>> {
    let k = columns.len();
    let mut matrix = vec![vec![0.0; k]; k];
    for i in 0..k {
        for j in i..k {
            let r = pearson_correlation(columns[i], columns[j])?;
            matrix[i][j] = r;
            matrix[j][i] = r;
        }
    }
    Ok(matrix)
}

/// Variance inflation factor of every regressor in a row-major matrix.
///
/// Each regressor is regressed on all the others through the origin, with
/// no constant column added, and its VIF is `1 / (1 - R^2)` using the
/// uncentered `R^2 = 1 - SSR / sum(x^2)`. A perfectly explained regressor
/// yields infinity.
pub fn variance_inflation_factors<R: AsRef<[f64]>>(rows: &[R]) -> Result<Vec<f64>> {
    let p = rows.first().map(|r| r.as_ref().len()).unwrap_or(0);
    if p < 2 {
        return Err(MathError::InvalidInput(
            "VIF needs at least two regressors".to_string(),
        ));
    }

    let mut factors = Vec::with_capacity(p);
    for j in 0..p {
        let target: Vec<f64> = rows.iter().map(|r| r.as_ref()[j]).collect();
        let others: Vec<Vec<f64>> = rows
            .iter()
            .map(|r| {
                r.as_ref()
                    .iter()
                    .enumerate()
                    .filter(|(k, _)| *k != j)
                    .map(|(_, v)| *v)
                    .collect()
            })
            .collect();

        let total: f64 = target.iter().map(|x| x * x).sum();
        if total == 0.0 {
            return Err(MathError::InvalidInput(format!(
                "regressor {} is zero in every row",
                j
            )));
        }
        let coefficients = fit_through_origin(&others, &target)?;
        let residual: f64 = others
            .iter()
            .zip(&target)
            .map(|(row, y)| {
                let fitted: f64 = row.iter().zip(&coefficients).map(|(x, b)| x * b).sum();
                (y - fitted).powi(2)
            })
            .sum();

        let unexplained = residual / total;
        factors.push(if unexplained > 0.0 {
            1.0 / unexplained
        } else {
            f64::INFINITY
        });
    }
    Ok(factors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_describe() {
        let summary = describe(&[4.0, 1.0, 3.0, 2.0]).unwrap();
        assert_eq!(summary.count, 4);
        assert_relative_eq!(summary.mean, 2.5);
        assert_relative_eq!(summary.std, (5.0_f64 / 3.0).sqrt(), epsilon = 1e-12);
        assert_eq!(summary.min, 1.0);
        assert_relative_eq!(summary.q1, 1.75);
        assert_relative_eq!(summary.median, 2.5);
        assert_relative_eq!(summary.q3, 3.25);
        assert_eq!(summary.max, 4.0);
    }

    #[test]
    fn test_describe_empty() {
        assert!(describe(&[]).is_err());
    }

    #[test]
    fn test_correlation() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y = [2.0, 4.0, 6.0, 8.0];
        let z = [8.0, 6.0, 4.0, 2.0];
        assert_relative_eq!(pearson_correlation(&x, &y).unwrap(), 1.0);
        assert_relative_eq!(pearson_correlation(&x, &z).unwrap(), -1.0);
        assert!(pearson_correlation(&x, &[1.0; 4]).unwrap().is_nan());
    }

    #[test]
    fn test_correlation_matrix_is_symmetric() {
        let a = [1.0, 2.0, 3.0, 5.0];
        let b = [3.0, 1.0, 4.0, 1.0];
        let matrix = correlation_matrix(&[&a[..], &b[..]]).unwrap();
        assert_relative_eq!(matrix[0][0], 1.0);
        assert_eq!(matrix[0][1], matrix[1][0]);
    }

    #[test]
    fn test_vif_uncorrelated_regressors() {
        // Orthogonal centred columns give R^2 = 0 and VIF = 1
        let rows = vec![[1.0, 1.0], [1.0, -1.0], [-1.0, 1.0], [-1.0, -1.0]];
        let vif = variance_inflation_factors(&rows).unwrap();
        assert_relative_eq!(vif[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(vif[1], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_vif_has_no_constant_term() {
        // x0 on x1 through the origin: b = 28/30, R^2 = 784/900
        let rows = vec![[1.0, 2.0], [2.0, 1.0], [3.0, 4.0], [4.0, 3.0]];
        let vif = variance_inflation_factors(&rows).unwrap();
        assert_relative_eq!(vif[0], 900.0 / 116.0, epsilon = 1e-9);
        assert_relative_eq!(vif[1], 900.0 / 116.0, epsilon = 1e-9);
    }

    #[test]
    fn test_vif_all_zero_regressor() {
        let rows = vec![[0.0, 1.0], [0.0, 2.0], [0.0, 3.0]];
        assert!(matches!(
            variance_inflation_factors(&rows),
            Err(MathError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_vif_correlated_regressors() {
        let rows = vec![[1.0, 1.1], [2.0, 1.9], [3.0, 3.2], [4.0, 3.9], [5.0, 5.1]];
        let vif = variance_inflation_factors(&rows).unwrap();
        assert!(vif[0] > 10.0);
        assert_relative_eq!(vif[0], vif[1], epsilon = 1e-9);
    }
}
