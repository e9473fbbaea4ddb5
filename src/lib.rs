//! # Ridership Workspace
//!
//! Umbrella crate for the ridership modelling workspace.
//!
//! - [`math`]: regression, error metrics and descriptive statistics
//! - [`forecast`]: spreadsheet ingestion, dataset merging, model
//!   evaluation, forecasting and reporting
//!
//! ## Example
//!
//! ```
//! use ridership_workspace::forecast::AccuracyCategory;
//!
//! let category = AccuracyCategory::from_mape(12.5);
//! assert_eq!(category.indonesian_label(), "Akurat");
//! ```

pub use ridership_forecast as forecast;
pub use ridership_math as math;

pub use ridership_forecast::{Pipeline, PipelineResult, Session};
