//! # Ridership Math
//!
//! Numeric building blocks for monthly ridership modelling.
//! This crate knows nothing about files or month names; it works on
//! plain `f64` slices and row-major feature matrices.

use thiserror::Error;

pub mod metrics;
pub mod regression;
pub mod statistics;

pub use metrics::{ErrorMetrics, DEFAULT_ZERO_EPSILON};
pub use regression::{MultipleLinearRegression, TermStatistics};

/// Errors that can occur in regression and metric calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),

    #[error("Regressor {column} has zero variance")]
    ZeroVariance { column: usize },

    #[error("Normal matrix is singular; regressors are linearly dependent")]
    SingularMatrix,
}

/// Result type for ridership math operations
pub type Result<T> = std::result::Result<T, MathError>;

/// Arithmetic mean of a non-empty slice.
pub(crate) fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}
