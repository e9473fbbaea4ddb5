//! # Ridership Forecast
//!
//! Monthly commuter-rail ridership modelling from hand-maintained
//! spreadsheets.
//!
//! ## Features
//!
//! - Reading `.csv` and `.xlsx` uploads with no header assumptions
//! - Wide ridership sheets (months across, metrics down) and long holiday
//!   calendars, located by fuzzy column matching
//! - Chronological merging of many files per split, with holiday counts
//! - Ordinary least squares over five regressors, with inference statistics
//! - MAE / MAPE evaluation and accuracy banding
//! - A fixed-horizon forecast with regressors held at their training means
//!
//! ## Quick Start
//!
//! ```no_run
//! use ridership_forecast::data::RawFile;
//! use ridership_forecast::pipeline::{PipelineInput, Session, SplitFiles};
//!
//! # fn main() -> ridership_forecast::Result<()> {
//! let input = PipelineInput {
//!     training: SplitFiles::new(
//!         vec![RawFile::from_path("penumpang_2023.xlsx")?],
//!         vec![RawFile::from_path("libur_2023.csv")?],
//!     ),
//!     testing: SplitFiles::new(
//!         vec![RawFile::from_path("penumpang_2024.xlsx")?],
//!         vec![RawFile::from_path("libur_2024.csv")?],
//!     ),
//! };
//!
//! let mut session = Session::default();
//! let result = session.process(&input)?;
//! println!("testing MAPE: {:.2}%", result.evaluation().testing.metrics.mape);
//!
//! let forecast = session.forecast()?;
//! println!("{} months forecast", forecast.len());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod export;
pub mod forecast;
pub mod merge;
pub mod model;
pub mod month;
pub mod pipeline;
pub mod report;

// Re-export commonly used types
pub use crate::config::PipelineConfig;
pub use crate::data::{HolidayRecord, RawFile, RidershipRecord};
pub use crate::error::{ForecastError, Result};
pub use crate::forecast::{Forecast, ForecastProjector, ForecastRow};
pub use crate::merge::{DatasetMerger, MonthlyDataset, MonthlyRow, Regressor};
pub use crate::model::{AccuracyCategory, FittedModel, ModelEvaluation, RegressionEngine};
pub use crate::month::Period;
pub use crate::pipeline::{Pipeline, PipelineInput, PipelineResult, Session, SplitFiles};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
