//! Long-layout holiday calendars
//!
//! One row per dated event, with a month, a year and two marker columns.
//! A marker cell holding anything at all counts as one national holiday or
//! one collective-leave day for that month.

use super::columns::{self, resolve_column};
use super::{Cell, RawFile, RawGrid};
use crate::error::{ForecastError, Result};
use crate::month::{parse_month, Period};
use serde::Serialize;
use tracing::{debug, info};

/// One calendar row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HolidayRecord {
    #[serde(flatten)]
    pub period: Period,
    pub national_holiday: Option<String>,
    pub collective_leave: Option<String>,
}

fn marker(cell: &Cell) -> Option<String> {
    (!cell.is_empty()).then(|| cell.as_text())
}

fn coerce_year(cell: &Cell) -> Option<i32> {
    let value = match cell {
        Cell::Empty => return None,
        Cell::Number(v) => *v,
        Cell::Text(s) => s.trim().parse::<f64>().ok()?,
    };
    (value.is_finite() && value.fract() == 0.0 && value.abs() <= i32::MAX as f64)
        .then_some(value as i32)
}

/// Parse one holiday grid into calendar rows.
///
/// Rows without a usable year or month are skipped.
pub fn parse_holiday_grid(file: &str, grid: &RawGrid, header_row: usize) -> Result<Vec<HolidayRecord>> {
    let table = grid.with_header_row(header_row);
    let month_col = resolve_column(&table.header, &columns::MONTH, file)?;
    let year_col = resolve_column(&table.header, &columns::YEAR, file)?;
    let national_col = resolve_column(&table.header, &columns::NATIONAL_HOLIDAY, file)?;
    let leave_col = resolve_column(&table.header, &columns::COLLECTIVE_LEAVE, file)?;

    let mut records = Vec::with_capacity(table.rows.len());
    for row in 0..table.rows.len() {
        let label = table.cell(row, month_col).as_text();
        let Some(year) = coerce_year(table.cell(row, year_col)) else {
            debug!(file, row, "skipping holiday row without a numeric year");
            continue;
        };
        if label.is_empty() {
            debug!(file, row, "skipping holiday row without a month");
            continue;
        }
        let Some(month) = parse_month(&label) else {
            debug!(file, row, label = %label, "skipping holiday row with unknown month");
            continue;
        };

        records.push(HolidayRecord {
            period: Period::new(month, year),
            national_holiday: marker(table.cell(row, national_col)),
            collective_leave: marker(table.cell(row, leave_col)),
        });
    }

    Ok(records)
}

/// Read, concatenate and chronologically sort the holiday files of one split
pub fn read_holiday_files(files: &[RawFile], header_row: usize) -> Result<Vec<HolidayRecord>> {
    if files.is_empty() {
        return Err(ForecastError::EmptyInput(
            "no holiday files were uploaded".to_string(),
        ));
    }

    let mut records = Vec::new();
    for file in files {
        let grid = file.read_grid()?;
        let parsed = parse_holiday_grid(file.name(), &grid, header_row)?;
        info!(file = file.name(), rows = parsed.len(), "read holiday file");
        records.extend(parsed);
    }

    if records.is_empty() {
        return Err(ForecastError::NoValidData(
            "holiday files contain no valid rows".to_string(),
        ));
    }

    // stable: rows of one month keep their upload order
    records.sort_by_key(|r| r.period);
    Ok(records)
}
