mod common;

use chrono::Month;
use pretty_assertions::assert_eq;
use ridership_forecast::export::{forecast_frame, write_csv};
use ridership_forecast::report::{
    assistant_context, correlation_table, describe_dataset, lookup_period, model_equation,
    vif_table, DataSource,
};
use ridership_forecast::{Period, Pipeline, PipelineConfig, PipelineResult, Regressor};
use ridership_math::ErrorMetrics;
use tempfile::tempdir;

fn processed() -> PipelineResult {
    Pipeline::default()
        .process(&common::input(&[2022, 2023], &[2024]))
        .unwrap()
}

fn training_mean(result: &PipelineResult, regressor: Regressor) -> f64 {
    let values = result.training().column(regressor);
    values.iter().sum::<f64>() / values.len() as f64
}

#[test]
fn test_forecast_shape_and_labels() {
    let result = processed();
    let forecast = result.forecast().unwrap();

    assert_eq!(forecast.len(), 60);
    // labels continue from the last training month, indices from the last testing month
    assert_eq!(forecast.rows()[0].period, Period::new(Month::January, 2024));
    assert_eq!(forecast.rows()[0].month_index, 37);
    assert_eq!(forecast.rows()[59].month_index, 96);
    assert_eq!(forecast.rows()[59].period, Period::new(Month::December, 2028));

    for regressor in [
        Regressor::TotalDistance,
        Regressor::AverageDistance,
        Regressor::NationalHolidays,
        Regressor::CollectiveLeave,
    ] {
        let mean = training_mean(&result, regressor);
        assert!(forecast
            .rows()
            .iter()
            .all(|row| row.regressors()[regressor.position()] == mean));
    }
}

#[test]
fn test_forecast_follows_model() {
    let result = processed();
    let forecast = result.forecast().unwrap();
    let model = result.model();

    for row in forecast.rows() {
        let expected = model.predict(&row.regressors()).unwrap();
        assert_eq!(row.predicted_ridership, expected);
    }
    // only the month index varies, so the slope between rows is its coefficient
    let step = forecast.rows()[1].predicted_ridership - forecast.rows()[0].predicted_ridership;
    approx::assert_relative_eq!(
        step,
        model.coefficient(Regressor::MonthIndex),
        epsilon = 1e-6,
        max_relative = 1e-6
    );
}

#[test]
fn test_configured_horizon() {
    let config = PipelineConfig {
        forecast_horizon: 24,
        ..PipelineConfig::default()
    };
    let result = Pipeline::new(config)
        .unwrap()
        .process(&common::input(&[2022, 2023], &[2024]))
        .unwrap();
    assert_eq!(result.forecast().unwrap().len(), 24);
}

#[test]
fn test_lookup_spans_all_tables() {
    let result = processed();
    let forecast = result.forecast().unwrap();

    let training = lookup_period("berapa penumpang Mei 2023?", &result, Some(&forecast)).unwrap();
    assert_eq!(training.len(), 1);
    assert_eq!(training[0].source, DataSource::Training);
    assert_eq!(training[0].ridership, common::ridership(5, 2023));

    // 2024 is both the testing year and the first forecast year
    let both = lookup_period("Juni 2024", &result, Some(&forecast)).unwrap();
    let sources: Vec<DataSource> = both.iter().map(|m| m.source).collect();
    assert_eq!(sources, vec![DataSource::Testing, DataSource::Forecast]);

    let future = lookup_period("maret 2027", &result, None).unwrap();
    assert!(future.is_empty());

    assert!(lookup_period("bagaimana trennya?", &result, Some(&forecast)).is_none());
}

#[test]
fn test_reports_on_training_data() {
    let result = processed();

    let summaries = describe_dataset(result.training()).unwrap();
    assert_eq!(summaries.len(), 6);
    assert_eq!(summaries[0].column, "Bulan ke-n");
    assert_eq!(summaries[0].summary.count, 24);
    assert_eq!(summaries[0].summary.min, 1.0);
    assert_eq!(summaries[0].summary.max, 24.0);

    let correlations = correlation_table(result.training()).unwrap();
    assert_eq!(correlations.columns.len(), 6);
    for (i, row) in correlations.values.iter().enumerate() {
        approx::assert_relative_eq!(row[i], 1.0, epsilon = 1e-12);
    }

    let vif = vif_table(result.training()).unwrap();
    assert_eq!(vif.len(), 5);
    assert!(vif.iter().all(|entry| entry.vif >= 1.0));

    let equation = model_equation(result.model());
    assert!(equation.starts_with("Y' = "));
    assert!(equation.ends_with("(X5)"));
}

#[test]
fn test_assistant_context_is_deterministic() {
    let result = processed();
    let forecast = result.forecast().unwrap();

    let context = assistant_context(&result, Some(&forecast)).unwrap();
    assert_eq!(context, assistant_context(&result, Some(&forecast)).unwrap());
    assert!(context.contains(result.evaluation().accuracy().indonesian_label()));
    assert!(context.contains("Sangat Akurat"));
    assert!(context.contains("jumlah_cuti_bersama"));
    assert!(context.contains("Januari 2024 sampai Desember 2028"));

    let without = assistant_context(&result, None).unwrap();
    assert!(without.contains("belum dibuat"));
}

#[test]
fn test_forecast_export() {
    let result = processed();
    let forecast = result.forecast().unwrap();
    let mut df = forecast_frame(&forecast).unwrap();
    assert_eq!(df.height(), 60);

    let dir = tempdir().unwrap();
    let path = dir.path().join("forecast.csv");
    write_csv(&mut df, &path).unwrap();
    let written = std::fs::read_to_string(path).unwrap();
    assert_eq!(written.lines().count(), 61);
    assert!(written.lines().nth(1).unwrap().starts_with("Januari,2024,37,"));
}

#[test]
fn test_perfect_predictions_score_zero() {
    let values: Vec<f64> = (1..=12).map(|m| common::ridership(m, 2022)).collect();
    let metrics = ErrorMetrics::evaluate(&values, &values, 1e-10).unwrap();
    assert_eq!(metrics.mae, 0.0);
    assert_eq!(metrics.mse, 0.0);
    assert_eq!(metrics.rmse, 0.0);
    assert_eq!(metrics.mape, 0.0);
}
