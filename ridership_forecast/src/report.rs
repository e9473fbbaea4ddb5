//! Read-only views over a [`PipelineResult`]
//!
//! Formatting, the model equation, descriptive statistics, multicollinearity
//! checks, month lookups and the plain-text context handed to an external
//! assistant. Nothing here mutates the result it reads.

use crate::error::Result;
use crate::forecast::Forecast;
use crate::merge::{MonthlyDataset, Regressor, TARGET_COLUMN};
use crate::model::{AccuracyCategory, FittedModel};
use crate::month::{indonesian_name, parse_month, Period, MONTH_NAMES};
use crate::pipeline::PipelineResult;
use once_cell::sync::Lazy;
use regex::Regex;
use ridership_math::statistics::{self, Summary};
use serde::Serialize;
use std::fmt::{self, Write as _};

static PERIOD_QUERY: Lazy<Regex> = Lazy::new(|| {
    let months = MONTH_NAMES.join("|");
    Regex::new(&format!(r"(?i)({months})\s+(\d{{4}})")).expect("month query pattern is valid")
});

/// Format a number the Indonesian way: `.` groups thousands, `,` marks
/// decimals.
///
/// ```
/// use ridership_forecast::report::format_indonesian;
/// assert_eq!(format_indonesian(1234567.891, 2), "1.234.567,89");
/// ```
pub fn format_indonesian(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let formatted = format!("{:.*}", decimals, value.abs());
    let (integer, fraction) = match formatted.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (formatted.as_str(), None),
    };

    let mut out = String::with_capacity(formatted.len() + integer.len() / 3 + 1);
    if value < 0.0 && formatted.bytes().any(|b| b.is_ascii_digit() && b != b'0') {
        out.push('-');
    }
    for (i, ch) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    if let Some(fraction) = fraction {
        out.push(',');
        out.push_str(fraction);
    }
    out
}

/// `Y' = b0 + b1 (X1) - b2 (X2) ...` with Indonesian number formatting
pub fn model_equation(model: &FittedModel) -> String {
    let mut equation = format!("Y' = {}", format_indonesian(model.intercept(), 2));
    for (i, coefficient) in model.coefficients().iter().enumerate() {
        let sign = if *coefficient < 0.0 { '-' } else { '+' };
        let _ = write!(
            equation,
            " {} {} (X{})",
            sign,
            format_indonesian(coefficient.abs(), 2),
            i + 1
        );
    }
    equation
}

/// Symbol and column name of each regressor in the equation
pub fn feature_legend(model: &FittedModel) -> Vec<(String, &'static str)> {
    model
        .features()
        .iter()
        .enumerate()
        .map(|(i, regressor)| (format!("X{}", i + 1), regressor.column_name()))
        .collect()
}

/// `describe()` row for one column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub column: &'static str,
    pub summary: Summary,
}

fn named_columns(dataset: &MonthlyDataset) -> Vec<(&'static str, Vec<f64>)> {
    Regressor::ALL
        .iter()
        .map(|r| (r.column_name(), dataset.column(*r)))
        .chain(std::iter::once((TARGET_COLUMN, dataset.target())))
        .collect()
}

/// Descriptive statistics of every regressor and the target
pub fn describe_dataset(dataset: &MonthlyDataset) -> Result<Vec<ColumnSummary>> {
    named_columns(dataset)
        .into_iter()
        .map(|(column, values)| {
            Ok(ColumnSummary {
                column,
                summary: statistics::describe(&values)?,
            })
        })
        .collect()
}

/// Pearson correlations between the regressors and the target
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationTable {
    pub columns: Vec<&'static str>,
    pub values: Vec<Vec<f64>>,
}

pub fn correlation_table(dataset: &MonthlyDataset) -> Result<CorrelationTable> {
    let named = named_columns(dataset);
    let slices: Vec<&[f64]> = named.iter().map(|(_, values)| values.as_slice()).collect();
    Ok(CorrelationTable {
        values: statistics::correlation_matrix(&slices)?,
        columns: named.iter().map(|(name, _)| *name).collect(),
    })
}

/// Variance inflation factor of one regressor
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VifEntry {
    pub regressor: Regressor,
    pub vif: f64,
}

/// Multicollinearity check on the training regressors
pub fn vif_table(dataset: &MonthlyDataset) -> Result<Vec<VifEntry>> {
    let factors = statistics::variance_inflation_factors(&dataset.features())?;
    Ok(Regressor::ALL
        .iter()
        .zip(factors)
        .map(|(&regressor, vif)| VifEntry { regressor, vif })
        .collect())
}

/// Which table a looked-up row came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DataSource {
    Training,
    Testing,
    Forecast,
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DataSource::Training => "Training",
            DataSource::Testing => "Testing",
            DataSource::Forecast => "Prediksi",
        })
    }
}

/// A row found by [`lookup_period`]; ridership is predicted for forecast rows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodMatch {
    pub source: DataSource,
    pub month_index: u32,
    #[serde(flatten)]
    pub period: Period,
    pub ridership: f64,
    pub total_distance: f64,
    pub average_distance: f64,
    pub national_holidays: f64,
    pub collective_leave: f64,
}

/// First `<bulan> <yyyy>` mention in free text
pub fn parse_period_query(text: &str) -> Option<Period> {
    let captures = PERIOD_QUERY.captures(text)?;
    let month = parse_month(captures.get(1)?.as_str())?;
    let year = captures.get(2)?.as_str().parse().ok()?;
    Some(Period::new(month, year))
}

/// Rows for the month named in `text`, across every table.
///
/// `None` when the text names no month; an empty list when it does but no
/// table covers it.
pub fn lookup_period(
    text: &str,
    result: &PipelineResult,
    forecast: Option<&Forecast>,
) -> Option<Vec<PeriodMatch>> {
    let period = parse_period_query(text)?;

    let observed = [
        (DataSource::Training, result.training()),
        (DataSource::Testing, result.testing()),
    ];
    let mut matches: Vec<PeriodMatch> = observed
        .iter()
        .flat_map(|(source, dataset)| {
            dataset
                .rows()
                .iter()
                .filter(move |r| r.period == period)
                .map(move |r| PeriodMatch {
                    source: *source,
                    month_index: r.month_index,
                    period: r.period,
                    ridership: r.ridership,
                    total_distance: r.total_distance,
                    average_distance: r.average_distance,
                    national_holidays: r.national_holidays as f64,
                    collective_leave: r.collective_leave as f64,
                })
        })
        .collect();

    if let Some(row) = forecast.and_then(|f| f.find(period)) {
        matches.push(PeriodMatch {
            source: DataSource::Forecast,
            month_index: row.month_index,
            period: row.period,
            ridership: row.predicted_ridership,
            total_distance: row.total_distance,
            average_distance: row.average_distance,
            national_holidays: row.national_holidays,
            collective_leave: row.collective_leave,
        });
    }
    Some(matches)
}

fn markdown_table(header: &[&str], rows: &[Vec<String>]) -> String {
    let mut out = format!("| {} |\n", header.join(" | "));
    let _ = writeln!(out, "|{}", "---|".repeat(header.len()));
    for row in rows {
        let _ = writeln!(out, "| {} |", row.join(" | "));
    }
    out
}

/// Deterministic markdown summary of a run for an external assistant
pub fn assistant_context(result: &PipelineResult, forecast: Option<&Forecast>) -> Result<String> {
    let evaluation = result.evaluation();
    let model = result.model();
    let accuracy = evaluation.accuracy();
    let mut out = String::new();

    let _ = writeln!(out, "### Hasil Analisis dan Evaluasi Model\n");
    let _ = writeln!(
        out,
        "- Status Akurasi Model: {} ({})",
        accuracy.indonesian_label(),
        accuracy.range_label()
    );
    for (label, split) in [("Training", &evaluation.training), ("Testing", &evaluation.testing)] {
        let _ = writeln!(out, "- MAE {}: {}", label, format_indonesian(split.metrics.mae, 3));
        let _ = writeln!(out, "- MAPE {}: {}%", label, format_indonesian(split.metrics.mape, 2));
    }

    let _ = writeln!(out, "\n#### Kategori Akurasi MAPE\n");
    let categories: Vec<Vec<String>> = AccuracyCategory::ALL
        .iter()
        .map(|c| vec![c.range_label().to_string(), c.indonesian_label().to_string()])
        .collect();
    out.push_str(&markdown_table(&["Nilai", "Kategori Peramalan"], &categories));

    let _ = writeln!(out, "\n#### Persamaan Regresi\n\n{}\n", model_equation(model));
    for (symbol, name) in feature_legend(model) {
        let _ = writeln!(out, "- {symbol} = {name}");
    }

    let _ = writeln!(out, "\n#### Koefisien Model\n");
    let names = std::iter::once("const").chain(Regressor::ALL.iter().map(|r| r.column_name()));
    let coefficient_rows: Vec<Vec<String>> = match model.regression().terms() {
        Some(terms) => names
            .zip(terms)
            .map(|(name, t)| {
                vec![
                    name.to_string(),
                    format_indonesian(t.estimate, 4),
                    format_indonesian(t.std_error, 4),
                    format_indonesian(t.t_statistic, 3),
                    format_indonesian(t.p_value, 4),
                    format_indonesian(t.conf_low, 4),
                    format_indonesian(t.conf_high, 4),
                ]
            })
            .collect(),
        None => {
            let estimates = std::iter::once(model.intercept()).chain(model.coefficients().iter().copied());
            names
                .zip(estimates)
                .map(|(name, estimate)| {
                    let mut row = vec![name.to_string(), format_indonesian(estimate, 4)];
                    row.extend(std::iter::repeat("-".to_string()).take(5));
                    row
                })
                .collect()
        }
    };
    out.push_str(&markdown_table(
        &["Variabel", "Coef.", "Std.Err.", "t", "P>|t|", "[0.025", "0.975]"],
        &coefficient_rows,
    ));
    let regression = model.regression();
    let _ = writeln!(out, "\n- R-squared: {}", format_indonesian(regression.r_squared(), 4));
    if let (Some(adj), Some(f), Some(p)) = (
        regression.adj_r_squared(),
        regression.f_statistic(),
        regression.f_p_value(),
    ) {
        let _ = writeln!(out, "- Adj. R-squared: {}", format_indonesian(adj, 4));
        let _ = writeln!(out, "- F-statistic: {} (p = {})", format_indonesian(f, 3), format_indonesian(p, 4));
    }

    let _ = writeln!(out, "\n#### Nilai VIF\n");
    let vif_rows: Vec<Vec<String>> = vif_table(result.training())?
        .iter()
        .map(|entry| vec![entry.regressor.column_name().to_string(), format_indonesian(entry.vif, 3)])
        .collect();
    out.push_str(&markdown_table(&["feature", "VIF"], &vif_rows));

    let _ = writeln!(out, "\n#### Sampel Hasil Prediksi (Data Testing)\n");
    let sample: Vec<Vec<String>> = evaluation
        .testing
        .comparison
        .iter()
        .map(|c| {
            vec![
                indonesian_name(c.period.month).to_string(),
                c.period.year.to_string(),
                format_indonesian(c.actual, 0),
                c.month_index.to_string(),
                format_indonesian(c.predicted, 0),
                format_indonesian(c.difference, 0),
            ]
        })
        .collect();
    out.push_str(&markdown_table(
        &["Bulan", "Tahun", TARGET_COLUMN, "Bulan ke-n", "Y_Prediksi", "Selisih"],
        &sample,
    ));

    let _ = writeln!(out);
    match forecast.and_then(|f| Some((f.rows().first()?, f.rows().last()?))) {
        Some((first, last)) => {
            let _ = writeln!(
                out,
                "Prediksi tersedia untuk {} sampai {} ({} bulan).",
                first.period,
                last.period,
                forecast.map_or(0, Forecast::len)
            );
        }
        None => {
            let _ = writeln!(out, "Prediksi ke depan belum dibuat.");
        }
    }

    Ok(out)
}
