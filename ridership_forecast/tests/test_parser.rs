mod common;

use chrono::Month;
use pretty_assertions::assert_eq;
use ridership_forecast::data::{read_holiday_files, read_ridership_files};
use ridership_forecast::{ForecastError, Period, RawFile};
use rust_xlsxwriter::{Workbook, XlsxError};
use std::io::Write;
use tempfile::Builder;

fn write_temp(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
    let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_ridership_file_from_disk() {
    let file = write_temp(".csv", &common::ridership_sheet(2023));
    let raw = RawFile::from_path(file.path()).unwrap();
    assert!(raw.name().ends_with(".csv"));

    let records = read_ridership_files(&[raw], 3).unwrap();
    assert_eq!(records.len(), 12);

    let may = &records[4];
    assert_eq!(may.period, Period::new(Month::May, 2023));
    assert_eq!(may.ridership, common::ridership(5, 2023));
    assert_eq!(may.total_distance, common::total_distance(5, 2023));
    assert_eq!(may.average_distance, common::average_distance(5, 2023));
}

#[test]
fn test_multiple_years_sorted_regardless_of_order() {
    let files = vec![
        common::ridership_file(2024),
        common::ridership_file(2022),
        common::ridership_file(2023),
    ];
    let records = read_ridership_files(&files, 3).unwrap();
    assert_eq!(records.len(), 36);
    assert_eq!(records[0].period, Period::new(Month::January, 2022));
    assert_eq!(records[35].period, Period::new(Month::December, 2024));
    assert!(records.windows(2).all(|w| w[0].period < w[1].period));
}

#[test]
fn test_non_numeric_metric_excludes_month() {
    let sheet = common::with_cell(&common::ridership_sheet(2023), "Penumpang", 3, "N/A");
    let records = read_ridership_files(&[RawFile::new("p.csv", sheet)], 3).unwrap();
    assert_eq!(records.len(), 11);
    assert!(records.iter().all(|r| r.period.month != Month::March));
}

#[test]
fn test_unsupported_extension() {
    let err = read_ridership_files(&[RawFile::new("penumpang.xls", "")], 3).unwrap_err();
    assert!(matches!(err, ForecastError::UnsupportedFileType(ref name) if name == "penumpang.xls"));
}

#[test]
fn test_error_names_offending_file() {
    let files = vec![
        common::ridership_file(2022),
        RawFile::new("rusak.csv", "a,b\n1,2\n"),
    ];
    let err = read_ridership_files(&files, 3).unwrap_err();
    assert!(err.to_string().contains("rusak.csv"), "{err}");
}

#[test]
fn test_holiday_calendar_counts_survive_parsing() {
    let records = read_holiday_files(&[common::holiday_file(2023)], 0).unwrap();
    let expected: usize = (1..=12)
        .map(|m| common::national_count(m, 2023) + common::leave_count(m, 2023))
        .sum();
    assert_eq!(records.len(), expected);
    assert!(records.windows(2).all(|w| w[0].period <= w[1].period));
}

/// Two months of a ridership workbook: a numeric year cell, the metric
/// header on sheet row 4, and metrics stored both as text and as numbers.
fn ridership_workbook() -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, "Jumlah Penumpang KRL Commuter Line")?;
    sheet.write_string(1, 0, "Tahun")?;
    sheet.write_number(1, 1, 2023.0)?;

    sheet.write_string(3, 0, "Uraian")?;
    sheet.write_string(3, 1, "Januari")?;
    sheet.write_string(3, 2, "Februari")?;
    sheet.write_string(3, 3, "Tahunan")?;

    sheet.write_string(4, 0, "Penumpang (000)")?;
    sheet.write_string(4, 1, "21.500")?;
    sheet.write_number(4, 2, 22_100.0)?;
    sheet.write_number(4, 3, 43_600.0)?;

    sheet.write_string(5, 0, "Total Jarak Tempuh Penumpang (000.000 km)")?;
    sheet.write_number(5, 1, 1_120.0)?;
    sheet.write_string(5, 2, "1.150")?;

    sheet.write_string(6, 0, "Rata-rata Jarak Perjalanan Per penumpang (km)")?;
    sheet.write_number(6, 1, 52.1)?;
    sheet.write_number(6, 2, 52.104)?;

    workbook.save_to_buffer()
}

fn holiday_workbook() -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, "Bulan")?;
    sheet.write_string(0, 1, "Tahun")?;
    sheet.write_string(0, 2, "Libur Nasional")?;
    sheet.write_string(0, 3, "Cuti Bersama")?;
    sheet.write_string(1, 0, " Januari ")?;
    sheet.write_number(1, 1, 2023.0)?;
    sheet.write_string(1, 2, "Tahun Baru Masehi")?;
    workbook.save_to_buffer()
}

#[test]
fn test_ridership_workbook() {
    let file = RawFile::new("penumpang_2023.xlsx", ridership_workbook().unwrap());
    let records = read_ridership_files(&[file], 3).unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].period, Period::new(Month::January, 2023));
    assert_eq!(records[0].ridership, 21_500.0);
    assert_eq!(records[0].total_distance, 1_120.0);
    assert_eq!(records[0].average_distance, 52.1);
    assert_eq!(records[1].period, Period::new(Month::February, 2023));
    assert_eq!(records[1].ridership, 22_100.0);
    assert_eq!(records[1].total_distance, 1_150.0);
    assert_eq!(records[1].average_distance, 52.1);
}

#[test]
fn test_holiday_workbook() {
    let file = RawFile::new("libur_2023.xlsx", holiday_workbook().unwrap());
    let records = read_holiday_files(&[file], 0).unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].period, Period::new(Month::January, 2023));
    assert_eq!(records[0].national_holiday.as_deref(), Some("Tahun Baru Masehi"));
    assert_eq!(records[0].collective_leave, None);
}

#[test]
fn test_corrupt_workbook_names_file() {
    let file = RawFile::new("rusak.xlsx", "not a zip archive");
    let err = read_ridership_files(&[file], 3).unwrap_err();
    assert!(matches!(err, ForecastError::Spreadsheet { ref file, .. } if file == "rusak.xlsx"));
}
