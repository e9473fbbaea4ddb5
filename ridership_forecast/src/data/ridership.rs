//! Wide-layout ridership sheets
//!
//! A ridership sheet holds one year. Metrics run down the first column and
//! months run across the header row:
//!
//! ```text
//! Uraian            | Januari | Februari | ... | Tahunan
//! Penumpang (000)   | 21.500  | 22.100   | ... | 270.300
//! Total Jarak ...   | ...
//! ```
//!
//! Parsing transposes this into one [`RidershipRecord`] per month.

use super::columns::{self, resolve_column, ColumnRule};
use super::{Cell, RawFile, RawGrid};
use crate::error::{ForecastError, Result};
use crate::month::{parse_month, Period, YEARLY_TOTAL_LABEL};
use serde::Serialize;
use tracing::{debug, info, warn};

/// One month of ridership observations
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RidershipRecord {
    #[serde(flatten)]
    pub period: Period,
    /// Passengers, in thousands
    pub ridership: f64,
    pub total_distance: f64,
    /// Kilometres per passenger, rounded to 2 decimals
    pub average_distance: f64,
}

/// Find the year of a sheet: the first cell, row by row, holding exactly
/// four digits.
pub fn find_year(grid: &RawGrid) -> Option<i32> {
    grid.cells().find_map(|cell| match cell {
        Cell::Text(s) => {
            let s = s.trim();
            if s.len() == 4 && s.bytes().all(|b| b.is_ascii_digit()) {
                s.parse().ok()
            } else {
                None
            }
        }
        Cell::Number(v) if v.fract() == 0.0 && (1000.0..=9999.0).contains(v) => Some(*v as i32),
        _ => None,
    })
}

/// Coerce a metric cell to a number after removing `separator`.
///
/// Numeric spreadsheet cells are taken as they are; only text goes through
/// separator stripping.
pub fn coerce_metric(cell: &Cell, separator: char) -> Option<f64> {
    let value = match cell {
        Cell::Empty => return None,
        Cell::Number(v) => *v,
        Cell::Text(s) => s.trim().replace(separator, "").parse::<f64>().ok()?,
    };
    value.is_finite().then_some(value)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// Transpose one wide ridership grid into monthly records.
///
/// Months whose metrics do not all coerce to numbers are dropped.
pub fn parse_ridership_grid(
    file: &str,
    grid: &RawGrid,
    header_row: usize,
) -> Result<Vec<RidershipRecord>> {
    let year = find_year(grid).ok_or_else(|| ForecastError::MissingYear(file.to_string()))?;
    let table = grid.with_header_row(header_row);

    let labels: Vec<String> = (0..table.rows.len())
        .map(|row| table.cell(row, 0).as_text())
        .collect();
    let metric_row = |rule: &ColumnRule| resolve_column(&labels, rule, file);
    let ridership_row = metric_row(&columns::RIDERSHIP)?;
    let total_row = metric_row(&columns::TOTAL_DISTANCE)?;
    let average_row = metric_row(&columns::AVERAGE_DISTANCE)?;

    let mut records = Vec::new();
    for (column, label) in table.header.iter().enumerate().skip(1) {
        if label.is_empty() || label.eq_ignore_ascii_case(YEARLY_TOTAL_LABEL) {
            continue;
        }
        let Some(month) = parse_month(label) else {
            warn!(file, label = %label, "skipping column with unknown month label");
            continue;
        };

        let ridership = coerce_metric(table.cell(ridership_row, column), '.');
        let total = coerce_metric(table.cell(total_row, column), '.');
        let average = coerce_metric(table.cell(average_row, column), ',');

        match (ridership, total, average) {
            (Some(ridership), Some(total_distance), Some(average)) => {
                records.push(RidershipRecord {
                    period: Period::new(month, year),
                    ridership,
                    total_distance,
                    average_distance: round2(average),
                });
            }
            _ => {
                warn!(file, month = %label, year, "dropping month with non-numeric metrics");
            }
        }
    }

    debug!(file, year, months = records.len(), "parsed ridership sheet");
    Ok(records)
}

/// Read, concatenate and chronologically sort the ridership files of one split
pub fn read_ridership_files(files: &[RawFile], header_row: usize) -> Result<Vec<RidershipRecord>> {
    if files.is_empty() {
        return Err(ForecastError::EmptyInput(
            "no ridership files were uploaded".to_string(),
        ));
    }

    let mut records = Vec::new();
    for file in files {
        let grid = file.read_grid()?;
        let parsed = parse_ridership_grid(file.name(), &grid, header_row)?;
        info!(file = file.name(), months = parsed.len(), "read ridership file");
        records.extend(parsed);
    }

    if records.is_empty() {
        return Err(ForecastError::NoValidData(
            "ridership files contain no valid months".to_string(),
        ));
    }

    records.sort_by_key(|r| r.period);
    if let Some(pair) = records.windows(2).find(|w| w[0].period == w[1].period) {
        let period = pair[0].period;
        return Err(ForecastError::DuplicateMonth {
            month: crate::month::indonesian_name(period.month).to_string(),
            year: period.year,
        });
    }

    Ok(records)
}
