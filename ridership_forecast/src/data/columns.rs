//! Fuzzy column resolution
//!
//! Source sheets are hand-made and their labels drift between years
//! ("Penumpang (000)", "Jumlah Penumpang (000 orang)", ...). Columns are
//! therefore located by case-insensitive substring rules rather than by
//! exact name, and resolution either yields an index or a typed
//! [`ForecastError::MissingColumn`].

use crate::error::{ForecastError, Result};

/// A substring rule identifying one required column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnRule {
    /// Name used in error messages
    pub name: &'static str,
    /// Every one of these must appear in the label
    pub all_of: &'static [&'static str],
    /// At least one of these must appear (ignored when empty)
    pub any_of: &'static [&'static str],
}

impl ColumnRule {
    /// Whether a label satisfies this rule
    pub fn matches(&self, label: &str) -> bool {
        let label = label.to_lowercase();
        self.all_of.iter().all(|needle| label.contains(needle))
            && (self.any_of.is_empty() || self.any_of.iter().any(|needle| label.contains(needle)))
    }
}

/// Ridership count, in thousands of passengers
pub const RIDERSHIP: ColumnRule = ColumnRule {
    name: "Penumpang (000)",
    all_of: &["penumpang", "000"],
    any_of: &[],
};

/// Total passenger-distance travelled
pub const TOTAL_DISTANCE: ColumnRule = ColumnRule {
    name: "Total Jarak Tempuh Penumpang",
    all_of: &["total jarak"],
    any_of: &[],
};

/// Average trip length per passenger
pub const AVERAGE_DISTANCE: ColumnRule = ColumnRule {
    name: "Rata-rata Jarak Perjalanan Per penumpang",
    all_of: &[],
    any_of: &["rata-rata jarak", "rata2"],
};

pub const MONTH: ColumnRule = ColumnRule {
    name: "Bulan",
    all_of: &["bulan"],
    any_of: &[],
};

pub const YEAR: ColumnRule = ColumnRule {
    name: "Tahun",
    all_of: &["tahun"],
    any_of: &[],
};

pub const NATIONAL_HOLIDAY: ColumnRule = ColumnRule {
    name: "Libur Nasional",
    all_of: &["libur nasional"],
    any_of: &[],
};

pub const COLLECTIVE_LEAVE: ColumnRule = ColumnRule {
    name: "Cuti Bersama",
    all_of: &["cuti bersama"],
    any_of: &[],
};

/// Index of the first label matching `rule`
pub fn resolve_column<S: AsRef<str>>(labels: &[S], rule: &ColumnRule, file: &str) -> Result<usize> {
    labels
        .iter()
        .position(|label| rule.matches(label.as_ref()))
        .ok_or_else(|| ForecastError::MissingColumn {
            file: file.to_string(),
            column: rule.name.to_string(),
        })
}
