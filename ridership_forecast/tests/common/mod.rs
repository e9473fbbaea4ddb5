//! Shared spreadsheet fixtures for the integration tests
#![allow(dead_code)]

use ridership_forecast::month::MONTH_NAMES;
use ridership_forecast::report::format_indonesian;
use ridership_forecast::{PipelineInput, RawFile, SplitFiles};

/// National holidays in a month of the synthetic calendar
pub fn national_count(month: usize, year: i32) -> usize {
    (month * 7 + year as usize) % 3
}

/// Collective-leave days in a month of the synthetic calendar
pub fn leave_count(month: usize, year: i32) -> usize {
    (month + year as usize) % 2
}

/// Running month number from January 2020
fn sequence(month: usize, year: i32) -> f64 {
    ((year - 2020) as usize * 12 + month) as f64
}

pub fn ridership(month: usize, year: i32) -> f64 {
    let t = sequence(month, year);
    20_000.0 + 150.0 * t + 300.0 * ((t as usize * 7) % 5) as f64
        - 400.0 * national_count(month, year) as f64
        + 250.0 * leave_count(month, year) as f64
}

pub fn total_distance(month: usize, year: i32) -> f64 {
    let t = sequence(month, year);
    1_000.0 + 25.0 * t + 60.0 * ((t as usize * 3) % 4) as f64
}

pub fn average_distance(month: usize, year: i32) -> f64 {
    let t = sequence(month, year) as usize;
    50.0 + 0.25 * ((t * 5) % 7) as f64
}

/// A wide ridership sheet for one year in the layout of the source
/// publications: title rows, the metric header on the fourth row and a
/// trailing yearly total column.
pub fn ridership_sheet(year: i32) -> String {
    let months = 1..=12usize;
    let mut out = String::new();
    out.push_str("Jumlah Penumpang KRL Commuter Line Jabodetabek\n");
    out.push_str(&format!("Tahun,{year}\n"));
    out.push_str(",,\n");
    out.push_str(&format!("Uraian,{},Tahunan\n", MONTH_NAMES.join(",")));

    let row = |label: &str, value: &dyn Fn(usize) -> String, total: String| {
        let cells: Vec<String> = months.clone().map(value).collect();
        format!("{label},{},{total}\n", cells.join(","))
    };

    let ridership_total: f64 = months.clone().map(|m| ridership(m, year)).sum();
    out.push_str(&row(
        "Penumpang (000)",
        &|m| format_indonesian(ridership(m, year), 0),
        format_indonesian(ridership_total, 0),
    ));
    let distance_total: f64 = months.clone().map(|m| total_distance(m, year)).sum();
    out.push_str(&row(
        "Total Jarak Tempuh Penumpang (000.000 km)",
        &|m| format_indonesian(total_distance(m, year), 0),
        format_indonesian(distance_total, 0),
    ));
    out.push_str(&row(
        "Rata-rata Jarak Perjalanan Per penumpang (km)",
        &|m| format!("{:.2}", average_distance(m, year)),
        String::new(),
    ));
    out
}

/// Replace one cell of the sheet row whose label starts with `label`
pub fn with_cell(sheet: &str, label: &str, column: usize, value: &str) -> String {
    sheet
        .lines()
        .map(|line| {
            if line.starts_with(label) {
                let mut cells: Vec<&str> = line.split(',').collect();
                cells[column] = value;
                cells.join(",")
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// A long holiday calendar for one year
pub fn holiday_sheet(year: i32) -> String {
    let mut out = String::from("Tanggal,Bulan,Tahun,Libur Nasional,Cuti Bersama\n");
    for (i, name) in MONTH_NAMES.iter().enumerate() {
        let month = i + 1;
        for k in 0..national_count(month, year) {
            out.push_str(&format!("{},{name},{year},Libur {},\n", k + 1, k + 1));
        }
        for k in 0..leave_count(month, year) {
            out.push_str(&format!("{},{name},{year},,Cuti {}\n", k + 10, k + 1));
        }
    }
    out
}

pub fn ridership_file(year: i32) -> RawFile {
    RawFile::new(format!("penumpang_{year}.csv"), ridership_sheet(year))
}

pub fn holiday_file(year: i32) -> RawFile {
    RawFile::new(format!("libur_{year}.csv"), holiday_sheet(year))
}

/// Training on `training_years`, testing on `testing_years`
pub fn input(training_years: &[i32], testing_years: &[i32]) -> PipelineInput {
    let split = |years: &[i32]| {
        SplitFiles::new(
            years.iter().map(|&y| ridership_file(y)).collect(),
            years.iter().map(|&y| holiday_file(y)).collect(),
        )
    };
    PipelineInput {
        training: split(training_years),
        testing: split(testing_years),
    }
}
