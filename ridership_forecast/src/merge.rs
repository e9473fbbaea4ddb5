//! Joining ridership with holiday counts into regression datasets

use crate::data::{HolidayRecord, RidershipRecord};
use crate::month::Period;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use tracing::{debug, warn};

/// Column name of the regression target
pub const TARGET_COLUMN: &str = "Penumpang (000)";

/// The five explanatory variables, in model order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Regressor {
    MonthIndex,
    TotalDistance,
    AverageDistance,
    NationalHolidays,
    CollectiveLeave,
}

impl Regressor {
    pub const ALL: [Regressor; 5] = [
        Regressor::MonthIndex,
        Regressor::TotalDistance,
        Regressor::AverageDistance,
        Regressor::NationalHolidays,
        Regressor::CollectiveLeave,
    ];

    /// Column name used in tables and reports
    pub fn column_name(&self) -> &'static str {
        match self {
            Regressor::MonthIndex => "Bulan ke-n",
            Regressor::TotalDistance => "Total Jarak Tempuh Penumpang",
            Regressor::AverageDistance => "Rata-rata Jarak Perjalanan Per penumpang",
            Regressor::NationalHolidays => "jumlah_libur_nasional",
            Regressor::CollectiveLeave => "jumlah_cuti_bersama",
        }
    }

    /// Position in [`Regressor::ALL`] and in model coefficient vectors
    pub fn position(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Regressor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

/// One regression-ready month
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyRow {
    pub month_index: u32,
    #[serde(flatten)]
    pub period: Period,
    pub ridership: f64,
    pub total_distance: f64,
    pub average_distance: f64,
    pub national_holidays: u32,
    pub collective_leave: u32,
}

impl MonthlyRow {
    /// Regressor values in [`Regressor::ALL`] order
    pub fn regressors(&self) -> [f64; 5] {
        [
            self.month_index as f64,
            self.total_distance,
            self.average_distance,
            self.national_holidays as f64,
            self.collective_leave as f64,
        ]
    }

    pub fn regressor(&self, regressor: Regressor) -> f64 {
        self.regressors()[regressor.position()]
    }
}

/// One split of the regression data, ordered by month index
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MonthlyDataset {
    rows: Vec<MonthlyRow>,
}

impl MonthlyDataset {
    pub fn new(rows: Vec<MonthlyRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[MonthlyRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Design matrix, one row per month
    pub fn features(&self) -> Vec<[f64; 5]> {
        self.rows.iter().map(MonthlyRow::regressors).collect()
    }

    /// Ridership values
    pub fn target(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.ridership).collect()
    }

    pub fn column(&self, regressor: Regressor) -> Vec<f64> {
        self.rows.iter().map(|r| r.regressor(regressor)).collect()
    }

    pub fn first_index(&self) -> Option<u32> {
        self.rows.first().map(|r| r.month_index)
    }

    pub fn last_index(&self) -> Option<u32> {
        self.rows.last().map(|r| r.month_index)
    }

    pub fn last_period(&self) -> Option<Period> {
        self.rows.last().map(|r| r.period)
    }

    /// Rows observed in a given month
    pub fn find(&self, period: Period) -> Option<&MonthlyRow> {
        self.rows.iter().find(|r| r.period == period)
    }

    /// Whether month indices run `start, start + 1, ...` without gaps
    pub fn is_contiguous_from(&self, start: u32) -> bool {
        self.rows
            .iter()
            .zip(start..)
            .all(|(row, expected)| row.month_index == expected)
    }
}

/// Holiday markers counted for one month
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HolidayCounts {
    pub national: u32,
    pub collective: u32,
}

/// Builds [`MonthlyDataset`]s from parsed records
#[derive(Debug)]
pub struct DatasetMerger;

impl DatasetMerger {
    /// Count present markers per month
    pub fn count_holidays(holidays: &[HolidayRecord]) -> BTreeMap<Period, HolidayCounts> {
        let mut counts: BTreeMap<Period, HolidayCounts> = BTreeMap::new();
        for record in holidays {
            let entry = counts.entry(record.period).or_default();
            entry.national += u32::from(record.national_holiday.is_some());
            entry.collective += u32::from(record.collective_leave.is_some());
        }
        counts
    }

    /// Left-join ridership months with holiday counts and number them from
    /// `start_index`.
    ///
    /// Every ridership month is kept; months without holiday rows count 0.
    pub fn merge_split(
        ridership: &[RidershipRecord],
        holidays: &[HolidayRecord],
        start_index: u32,
    ) -> MonthlyDataset {
        let counts = Self::count_holidays(holidays);
        let rows: Vec<MonthlyRow> = ridership
            .iter()
            .zip(start_index..)
            .map(|(record, month_index)| {
                let holiday = counts.get(&record.period).copied().unwrap_or_default();
                MonthlyRow {
                    month_index,
                    period: record.period,
                    ridership: record.ridership,
                    total_distance: record.total_distance,
                    average_distance: record.average_distance,
                    national_holidays: holiday.national,
                    collective_leave: holiday.collective,
                }
            })
            .collect();

        let unmatched = rows
            .iter()
            .filter(|r| !counts.contains_key(&r.period))
            .count();
        debug!(rows = rows.len(), start_index, unmatched, "merged split");
        MonthlyDataset::new(rows)
    }

    /// Merge both splits: training is numbered from 1 and testing continues
    /// right after the last training month.
    pub fn build_datasets(
        training_ridership: &[RidershipRecord],
        training_holidays: &[HolidayRecord],
        testing_ridership: &[RidershipRecord],
        testing_holidays: &[HolidayRecord],
    ) -> (MonthlyDataset, MonthlyDataset) {
        let training = Self::merge_split(training_ridership, training_holidays, 1);
        let testing_start = training.len() as u32 + 1;
        let testing = Self::merge_split(testing_ridership, testing_holidays, testing_start);

        let training_periods: HashSet<Period> = training.rows().iter().map(|r| r.period).collect();
        let shared = testing
            .rows()
            .iter()
            .filter(|r| training_periods.contains(&r.period))
            .count();
        if shared > 0 {
            warn!(shared, "testing split repeats months already present in training");
        }

        (training, testing)
    }
}
