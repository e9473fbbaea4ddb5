//! Error metrics for comparing predicted against actual values

use crate::{MathError, Result};
use serde::{Deserialize, Serialize};

/// Stand-in denominator for actual values of exactly zero in MAPE.
pub const DEFAULT_ZERO_EPSILON: f64 = 1e-10;

fn check_pair(actual: &[f64], predicted: &[f64]) -> Result<()> {
    if actual.is_empty() {
        return Err(MathError::InsufficientData(
            "Actual and predicted values must be non-empty".to_string(),
        ));
    }
    if actual.len() != predicted.len() {
        return Err(MathError::InvalidInput(format!(
            "Length mismatch: {} actual values vs {} predicted values",
            actual.len(),
            predicted.len()
        )));
    }
    Ok(())
}

/// Mean Absolute Error
pub fn mean_absolute_error(actual: &[f64], predicted: &[f64]) -> Result<f64> {
    check_pair(actual, predicted)?;
    let sum: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).abs())
        .sum();
    Ok(sum / actual.len() as f64)
}

/// Mean Squared Error
pub fn mean_squared_error(actual: &[f64], predicted: &[f64]) -> Result<f64> {
    check_pair(actual, predicted)?;
    let sum: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum();
    Ok(sum / actual.len() as f64)
}

/// Root Mean Squared Error
pub fn root_mean_squared_error(actual: &[f64], predicted: &[f64]) -> Result<f64> {
    Ok(mean_squared_error(actual, predicted)?.sqrt())
}

/// Mean Absolute Percentage Error, in percent.
///
/// Actual values of exactly `0.0` are replaced by `zero_epsilon` in the
/// denominator instead of being skipped, so every pair contributes.
pub fn mean_absolute_percentage_error(
    actual: &[f64],
    predicted: &[f64],
    zero_epsilon: f64,
) -> Result<f64> {
    check_pair(actual, predicted)?;
    if zero_epsilon.is_nan() || zero_epsilon <= 0.0 {
        return Err(MathError::InvalidInput(format!(
            "MAPE zero epsilon must be positive, got {}",
            zero_epsilon
        )));
    }

    let sum: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(&a, &p)| {
            let denominator = if a == 0.0 { zero_epsilon } else { a };
            ((a - p) / denominator).abs()
        })
        .sum();
    Ok(sum / actual.len() as f64 * 100.0)
}

/// Accuracy metrics for one data split
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ErrorMetrics {
    /// Mean Absolute Error
    pub mae: f64,
    /// Mean Squared Error
    pub mse: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// Mean Absolute Percentage Error
    pub mape: f64,
}

impl ErrorMetrics {
    /// Compute all metrics for a set of (actual, predicted) pairs
    pub fn evaluate(actual: &[f64], predicted: &[f64], zero_epsilon: f64) -> Result<Self> {
        let mse = mean_squared_error(actual, predicted)?;
        Ok(Self {
            mae: mean_absolute_error(actual, predicted)?,
            mse,
            rmse: mse.sqrt(),
            mape: mean_absolute_percentage_error(actual, predicted, zero_epsilon)?,
        })
    }
}

impl std::fmt::Display for ErrorMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "  MAE:   {:.4}", self.mae)?;
        writeln!(f, "  MSE:   {:.4}", self.mse)?;
        writeln!(f, "  RMSE:  {:.4}", self.rmse)?;
        writeln!(f, "  MAPE:  {:.4}%", self.mape)?;
        Ok(())
    }
}
