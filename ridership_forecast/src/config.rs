//! Pipeline configuration

use crate::error::{ForecastError, Result};
use ridership_math::DEFAULT_ZERO_EPSILON;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Zero-based row holding the metric header in wide ridership sheets
pub const RIDERSHIP_HEADER_ROW: usize = 3;
/// Zero-based row holding the column header in long holiday sheets
pub const HOLIDAY_HEADER_ROW: usize = 0;
/// Number of future months produced by the projector
pub const DEFAULT_FORECAST_HORIZON: usize = 60;

/// Tunables of one pipeline run.
///
/// The defaults are the values the file formats and reports are built
/// around; overriding them is meant for hosts with differently laid out
/// spreadsheets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Header row offset for ridership files
    pub ridership_header_row: usize,
    /// Header row offset for holiday files
    pub holiday_header_row: usize,
    /// Months to forecast past the last observed month
    pub forecast_horizon: usize,
    /// Denominator used in MAPE when an actual value is exactly zero
    pub mape_zero_epsilon: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            ridership_header_row: RIDERSHIP_HEADER_ROW,
            holiday_header_row: HOLIDAY_HEADER_ROW,
            forecast_horizon: DEFAULT_FORECAST_HORIZON,
            mape_zero_epsilon: DEFAULT_ZERO_EPSILON,
        }
    }
}

impl PipelineConfig {
    /// Load a configuration from a JSON file; missing keys take defaults
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            ForecastError::Config(format!("cannot open {}: {}", path.display(), e))
        })?;
        let config: Self = serde_json::from_reader(BufReader::new(file))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make the pipeline meaningless
    pub fn validate(&self) -> Result<()> {
        if self.forecast_horizon == 0 {
            return Err(ForecastError::InvalidParameter(
                "forecast_horizon must be at least 1".to_string(),
            ));
        }
        if !self.mape_zero_epsilon.is_finite() || self.mape_zero_epsilon <= 0.0 {
            return Err(ForecastError::InvalidParameter(format!(
                "mape_zero_epsilon must be a positive number, got {}",
                self.mape_zero_epsilon
            )));
        }
        Ok(())
    }
}
