//! Raw spreadsheet ingestion
//!
//! Uploaded files are read without any header assumption into a
//! [`RawGrid`] of cells. The table-specific parsers in [`ridership`] and
//! [`holiday`] then pick their header row out of the grid.

use crate::error::{ForecastError, Result};
use calamine::{open_workbook_from_rs, Data, Range, Reader, Xlsx, XlsxError};
use std::fs;
use std::io::Cursor;
use std::path::Path;
use tracing::debug;

pub mod columns;
pub mod holiday;
pub mod ridership;

pub use holiday::{read_holiday_files, HolidayRecord};
pub use ridership::{read_ridership_files, RidershipRecord};

/// An uploaded spreadsheet: its original name and its bytes
#[derive(Debug, Clone, PartialEq)]
pub struct RawFile {
    name: String,
    bytes: Vec<u8>,
}

impl RawFile {
    /// Wrap already-loaded file contents
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a file from disk, keeping only its file name
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self { name, bytes })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Detect the format from the file extension
    pub fn format(&self) -> Result<FileFormat> {
        FileFormat::from_file_name(&self.name)
    }

    /// Read every cell of the first sheet, with no header handling
    pub fn read_grid(&self) -> Result<RawGrid> {
        let grid = match self.format()? {
            FileFormat::Csv => read_csv_grid(&self.name, &self.bytes)?,
            FileFormat::Xlsx => read_xlsx_grid(&self.name, &self.bytes)?,
        };
        debug!(file = %self.name, rows = grid.rows().len(), "read raw grid");
        Ok(grid)
    }
}

/// Supported upload formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// Comma separated text
    Csv,
    /// Office Open XML workbook
    Xlsx,
}

impl FileFormat {
    /// Match the (case-insensitive) extension of a file name
    pub fn from_file_name(name: &str) -> Result<Self> {
        let extension = Path::new(name)
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase());
        match extension.as_deref() {
            Some("csv") => Ok(FileFormat::Csv),
            Some("xlsx") => Ok(FileFormat::Xlsx),
            _ => Err(ForecastError::UnsupportedFileType(name.to_string())),
        }
    }
}

/// One spreadsheet cell
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
}

impl Cell {
    /// Text cell, or `Empty` for an empty string
    pub fn text(value: &str) -> Self {
        if value.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(value.to_string())
        }
    }

    /// True for missing cells and whitespace-only text
    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            Cell::Number(_) => false,
        }
    }

    /// Cell content rendered as trimmed text.
    ///
    /// Integral numbers render without a fractional part, so a year typed
    /// into a numeric cell reads back as `2023`.
    pub fn as_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.trim().to_string(),
            Cell::Number(v) if v.fract() == 0.0 && v.abs() < 1e15 => format!("{}", *v as i64),
            Cell::Number(v) => v.to_string(),
        }
    }
}

impl From<&Data> for Cell {
    fn from(value: &Data) -> Self {
        match value {
            Data::Empty => Cell::Empty,
            Data::Int(v) => Cell::Number(*v as f64),
            Data::Float(v) => Cell::Number(*v),
            Data::String(s) => Cell::text(s),
            other => Cell::text(&other.to_string()),
        }
    }
}

/// All cells of a sheet at their absolute positions, row-major
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawGrid {
    rows: Vec<Vec<Cell>>,
}

impl RawGrid {
    pub fn new(rows: Vec<Vec<Cell>>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Every cell, row by row
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.rows.iter().flat_map(|row| row.iter())
    }

    /// Split the grid at `header_row`: that row becomes the header and the
    /// non-empty rows after it become data rows.
    pub fn with_header_row(&self, header_row: usize) -> HeadedTable {
        let header = self
            .rows
            .get(header_row)
            .map(|row| row.iter().map(Cell::as_text).collect())
            .unwrap_or_default();
        let rows = self
            .rows
            .iter()
            .skip(header_row + 1)
            .filter(|row| !row.iter().all(Cell::is_empty))
            .cloned()
            .collect();
        HeadedTable { header, rows }
    }
}

/// A table whose first row has been taken as column labels
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeadedTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl HeadedTable {
    /// Cell at a position, `Empty` when a ragged row is too short
    pub fn cell(&self, row: usize, column: usize) -> &Cell {
        const EMPTY: &Cell = &Cell::Empty;
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .unwrap_or(EMPTY)
    }
}

fn read_csv_grid(name: &str, bytes: &[u8]) -> Result<RawGrid> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| ForecastError::Csv {
            file: name.to_string(),
            message: e.to_string(),
        })?;
        rows.push(record.iter().map(Cell::text).collect());
    }
    Ok(RawGrid::new(rows))
}

fn read_xlsx_grid(name: &str, bytes: &[u8]) -> Result<RawGrid> {
    let spreadsheet_error = |message: String| ForecastError::Spreadsheet {
        file: name.to_string(),
        message,
    };

    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes))
        .map_err(|e: XlsxError| spreadsheet_error(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| spreadsheet_error("workbook has no worksheets".to_string()))?
        .map_err(|e| spreadsheet_error(e.to_string()))?;

    Ok(grid_from_range(&range))
}

/// Convert a worksheet range to a grid anchored at cell A1.
///
/// Ranges start at their first used cell; leading blank rows and columns
/// are restored so header offsets count from the top of the sheet.
pub fn grid_from_range(range: &Range<Data>) -> RawGrid {
    let (row_offset, column_offset) = range
        .start()
        .map(|(r, c)| (r as usize, c as usize))
        .unwrap_or((0, 0));

    let mut rows: Vec<Vec<Cell>> = vec![Vec::new(); row_offset];
    for row in range.rows() {
        let mut cells = vec![Cell::Empty; column_offset];
        cells.extend(row.iter().map(Cell::from));
        rows.push(cells);
    }
    RawGrid::new(rows)
}
