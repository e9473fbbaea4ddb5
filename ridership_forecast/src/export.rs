//! Tabular export of datasets, evaluations and forecasts

use crate::error::Result;
use crate::forecast::{Forecast, ForecastRow};
use crate::merge::{MonthlyDataset, Regressor, TARGET_COLUMN};
use crate::model::PredictionComparison;
use crate::month::{indonesian_name, Period};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;
use tracing::debug;

fn period_columns<'a>(periods: impl Iterator<Item = &'a Period> + Clone) -> (Series, Series) {
    let months: Vec<String> = periods
        .clone()
        .map(|p| indonesian_name(p.month).to_string())
        .collect();
    let years: Vec<i32> = periods.map(|p| p.year).collect();
    (Series::new("Bulan", months), Series::new("Tahun", years))
}

/// One split as a regression table
pub fn dataset_frame(dataset: &MonthlyDataset) -> Result<DataFrame> {
    let rows = dataset.rows();
    let (months, years) = period_columns(rows.iter().map(|r| &r.period));

    let df = DataFrame::new(vec![
        Series::new(
            Regressor::MonthIndex.column_name(),
            rows.iter().map(|r| r.month_index).collect::<Vec<u32>>(),
        ),
        months,
        years,
        Series::new(TARGET_COLUMN, dataset.target()),
        Series::new(
            Regressor::TotalDistance.column_name(),
            dataset.column(Regressor::TotalDistance),
        ),
        Series::new(
            Regressor::AverageDistance.column_name(),
            dataset.column(Regressor::AverageDistance),
        ),
        Series::new(
            Regressor::NationalHolidays.column_name(),
            rows.iter().map(|r| r.national_holidays).collect::<Vec<u32>>(),
        ),
        Series::new(
            Regressor::CollectiveLeave.column_name(),
            rows.iter().map(|r| r.collective_leave).collect::<Vec<u32>>(),
        ),
    ])?;
    Ok(df)
}

/// Actual against predicted ridership
pub fn comparison_frame(comparison: &[PredictionComparison]) -> Result<DataFrame> {
    let (months, years) = period_columns(comparison.iter().map(|c| &c.period));

    let df = DataFrame::new(vec![
        Series::new(
            Regressor::MonthIndex.column_name(),
            comparison.iter().map(|c| c.month_index).collect::<Vec<u32>>(),
        ),
        months,
        years,
        Series::new(
            TARGET_COLUMN,
            comparison.iter().map(|c| c.actual).collect::<Vec<f64>>(),
        ),
        Series::new(
            "Y_Prediksi",
            comparison.iter().map(|c| c.predicted).collect::<Vec<f64>>(),
        ),
        Series::new(
            "Selisih",
            comparison.iter().map(|c| c.difference).collect::<Vec<f64>>(),
        ),
    ])?;
    Ok(df)
}

/// Projected months with their held-constant regressors
pub fn forecast_frame(forecast: &Forecast) -> Result<DataFrame> {
    let rows = forecast.rows();
    let (months, years) = period_columns(rows.iter().map(|r| &r.period));
    let column = |f: fn(&ForecastRow) -> f64| rows.iter().map(f).collect::<Vec<f64>>();

    let df = DataFrame::new(vec![
        months,
        years,
        Series::new(
            Regressor::MonthIndex.column_name(),
            rows.iter().map(|r| r.month_index).collect::<Vec<u32>>(),
        ),
        Series::new(Regressor::TotalDistance.column_name(), column(|r| r.total_distance)),
        Series::new(Regressor::AverageDistance.column_name(), column(|r| r.average_distance)),
        Series::new(Regressor::NationalHolidays.column_name(), column(|r| r.national_holidays)),
        Series::new(Regressor::CollectiveLeave.column_name(), column(|r| r.collective_leave)),
        Series::new(TARGET_COLUMN, column(|r| r.predicted_ridership)),
    ])?;
    Ok(df)
}

/// Write a frame as CSV with a header row
pub fn write_csv<P: AsRef<Path>>(df: &mut DataFrame, path: P) -> Result<()> {
    let path = path.as_ref();
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file).has_header(true).finish(df)?;
    debug!(path = %path.display(), rows = df.height(), "wrote csv");
    Ok(())
}
