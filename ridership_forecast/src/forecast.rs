//! Multi-year ridership projection
//!
//! Future months are synthesised by holding every exogenous regressor at
//! its training mean and advancing only the month index, then scoring the
//! rows with the fitted model.

use crate::config::DEFAULT_FORECAST_HORIZON;
use crate::error::{ForecastError, Result};
use crate::merge::{MonthlyDataset, Regressor};
use crate::model::FittedModel;
use crate::month::Period;
use serde::Serialize;
use tracing::info;

/// One projected month
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastRow {
    pub month_index: u32,
    #[serde(flatten)]
    pub period: Period,
    pub total_distance: f64,
    pub average_distance: f64,
    pub national_holidays: f64,
    pub collective_leave: f64,
    pub predicted_ridership: f64,
}

impl ForecastRow {
    /// Regressor values in [`Regressor::ALL`] order
    pub fn regressors(&self) -> [f64; 5] {
        [
            self.month_index as f64,
            self.total_distance,
            self.average_distance,
            self.national_holidays,
            self.collective_leave,
        ]
    }
}

/// Projected months in chronological order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Forecast {
    rows: Vec<ForecastRow>,
}

impl Forecast {
    pub fn rows(&self) -> &[ForecastRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn find(&self, period: Period) -> Option<&ForecastRow> {
        self.rows.iter().find(|r| r.period == period)
    }
}

/// Generates [`Forecast`]s from a fitted model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForecastProjector {
    horizon: usize,
}

impl Default for ForecastProjector {
    fn default() -> Self {
        Self::new(DEFAULT_FORECAST_HORIZON)
    }
}

fn column_mean(dataset: &MonthlyDataset, regressor: Regressor) -> f64 {
    let values = dataset.column(regressor);
    values.iter().sum::<f64>() / values.len() as f64
}

impl ForecastProjector {
    pub fn new(horizon: usize) -> Self {
        Self { horizon }
    }

    pub fn horizon(&self) -> usize {
        self.horizon
    }

    /// Project `horizon` months.
    ///
    /// Month indices start at `next_index`; month labels continue from the
    /// last training month.
    pub fn project(
        &self,
        model: &FittedModel,
        training: &MonthlyDataset,
        next_index: u32,
    ) -> Result<Forecast> {
        if self.horizon == 0 {
            return Err(ForecastError::InvalidParameter(
                "forecast horizon must be at least 1".to_string(),
            ));
        }
        let last_period = training.last_period().ok_or_else(|| {
            ForecastError::NoValidData("cannot forecast without training data".to_string())
        })?;

        let total_distance = column_mean(training, Regressor::TotalDistance);
        let average_distance = column_mean(training, Regressor::AverageDistance);
        let national_holidays = column_mean(training, Regressor::NationalHolidays);
        let collective_leave = column_mean(training, Regressor::CollectiveLeave);

        let mut period = last_period;
        let mut rows = Vec::with_capacity(self.horizon);
        for month_index in (next_index..).take(self.horizon) {
            period = period.next();
            let mut row = ForecastRow {
                month_index,
                period,
                total_distance,
                average_distance,
                national_holidays,
                collective_leave,
                predicted_ridership: 0.0,
            };
            row.predicted_ridership = model.predict(&row.regressors())?;
            rows.push(row);
        }

        info!(
            months = rows.len(),
            first = %rows[0].period,
            first_index = next_index,
            "projected ridership forecast"
        );
        Ok(Forecast { rows })
    }
}
