//! Indonesian month vocabulary and calendar periods
//!
//! Source spreadsheets label months with their Indonesian names. Ordering
//! and arithmetic go through [`chrono::Month`]; these helpers translate
//! between the two.

use chrono::Month;
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;

/// Canonical month names, January first
pub const MONTH_NAMES: [&str; 12] = [
    "Januari",
    "Februari",
    "Maret",
    "April",
    "Mei",
    "Juni",
    "Juli",
    "Agustus",
    "September",
    "Oktober",
    "November",
    "Desember",
];

/// Label of the yearly total column in wide ridership sheets
pub const YEARLY_TOTAL_LABEL: &str = "Tahunan";

/// Canonical Indonesian name of a month
pub fn indonesian_name(month: Month) -> &'static str {
    MONTH_NAMES[month.number_from_month() as usize - 1]
}

/// Parse an Indonesian month name, ignoring case and surrounding whitespace
pub fn parse_month(label: &str) -> Option<Month> {
    let label = label.trim();
    MONTH_NAMES
        .iter()
        .position(|name| name.eq_ignore_ascii_case(label))
        .and_then(|i| month_from_number(i as u32 + 1))
}

/// Month from its 1-based number
pub fn month_from_number(number: u32) -> Option<Month> {
    u8::try_from(number)
        .ok()
        .and_then(|n| Month::try_from(n).ok())
}

/// Serialize a month as its Indonesian name
pub fn serialize_month<S: Serializer>(month: &Month, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(indonesian_name(*month))
}

/// One calendar month of one year
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Period {
    #[serde(serialize_with = "serialize_month")]
    pub month: Month,
    pub year: i32,
}

impl Period {
    pub fn new(month: Month, year: i32) -> Self {
        Self { month, year }
    }

    /// The following month, rolling Desember over into Januari of the next year
    pub fn next(&self) -> Self {
        match self.month {
            Month::December => Self::new(Month::January, self.year + 1),
            month => Self::new(month.succ(), self.year),
        }
    }

    /// Chronological sort key: (year, month number)
    pub fn sort_key(&self) -> (i32, u32) {
        (self.year, self.month.number_from_month())
    }
}

impl Ord for Period {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl PartialOrd for Period {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", indonesian_name(self.month), self.year)
    }
}
