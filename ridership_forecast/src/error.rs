//! Error types for the ridership_forecast crate

use polars::prelude::PolarsError;
use ridership_math::MathError;
use thiserror::Error;

/// Custom error types for the ridership_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// File extension is neither `.csv` nor `.xlsx`
    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    /// Fuzzy header matching found no candidate column
    #[error("Cannot find required column '{column}' in {file}")]
    MissingColumn { file: String, column: String },

    /// No 4-digit year cell anywhere in a ridership file
    #[error("Cannot find a year in file: {0}")]
    MissingYear(String),

    /// Nothing usable remained after reading and concatenating files
    #[error("No valid data to combine: {0}")]
    NoValidData(String),

    /// A category of input files was not supplied at all
    #[error("Missing input: {0}")]
    EmptyInput(String),

    /// The same file name was uploaded for both training and testing
    #[error("Files appear in both training and testing data: {}", .0.join(", "))]
    FileOverlap(Vec<String>),

    /// Two ridership rows describe the same calendar month
    #[error("Duplicate ridership data for {month} {year}")]
    DuplicateMonth { month: String, year: i32 },

    /// Regression could not be fitted or evaluated
    #[error("Model error: {0}")]
    ModelFit(String),

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Delimited text could not be read
    #[error("CSV error in {file}: {message}")]
    Csv { file: String, message: String },

    /// Workbook could not be read
    #[error("Spreadsheet error in {file}: {message}")]
    Spreadsheet { file: String, message: String },

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    PolarsError(String),

    /// Error from JSON (de)serialization
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<PolarsError> for ForecastError {
    fn from(err: PolarsError) -> Self {
        ForecastError::PolarsError(err.to_string())
    }
}

impl From<MathError> for ForecastError {
    fn from(err: MathError) -> Self {
        ForecastError::ModelFit(err.to_string())
    }
}
