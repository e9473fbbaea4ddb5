//! Command-line host for the ridership pipeline

use clap::Parser;
use ridership_forecast::export::{comparison_frame, dataset_frame, forecast_frame, write_csv};
use ridership_forecast::report::{
    assistant_context, feature_legend, format_indonesian, lookup_period, model_equation, vif_table,
};
use ridership_forecast::{
    Pipeline, PipelineConfig, PipelineInput, PipelineResult, RawFile, Session, SplitFiles,
};
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Ridership file for the training split (repeatable)
    #[arg(long = "train-ridership", required = true)]
    train_ridership: Vec<PathBuf>,

    /// Holiday calendar for the training split (repeatable)
    #[arg(long = "train-holiday", required = true)]
    train_holiday: Vec<PathBuf>,

    /// Ridership file for the testing split (repeatable)
    #[arg(long = "test-ridership", required = true)]
    test_ridership: Vec<PathBuf>,

    /// Holiday calendar for the testing split (repeatable)
    #[arg(long = "test-holiday", required = true)]
    test_holiday: Vec<PathBuf>,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Also project the forecast horizon
    #[arg(long)]
    forecast: bool,

    /// Look up a month in the results, e.g. "Maret 2024"
    #[arg(long)]
    query: Option<String>,

    /// Print the assistant context summary
    #[arg(long)]
    context: bool,

    /// Directory for CSV exports
    #[arg(short, long)]
    output_dir: Option<PathBuf>,
}

fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("ridership_forecast=info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn read_files(paths: &[PathBuf]) -> ridership_forecast::Result<Vec<RawFile>> {
    paths.iter().map(RawFile::from_path).collect()
}

fn print_summary(result: &PipelineResult) -> Result<(), Box<dyn Error>> {
    let evaluation = result.evaluation();
    println!(
        "Training months: {}, testing months: {}",
        result.training().len(),
        result.testing().len()
    );
    println!("\n{}", model_equation(result.model()));
    for (symbol, name) in feature_legend(result.model()) {
        println!("  {symbol} = {name}");
    }
    println!(
        "\nR-squared: {}",
        format_indonesian(result.model().regression().r_squared(), 4)
    );

    println!("\nTraining:\n{}", evaluation.training.metrics);
    println!("Testing:\n{}", evaluation.testing.metrics);
    let accuracy = evaluation.accuracy();
    println!(
        "Accuracy: {} ({}, MAPE {})",
        accuracy,
        accuracy.indonesian_label(),
        accuracy.range_label()
    );

    println!("\nVIF:");
    for entry in vif_table(result.training())? {
        println!("  {:<45} {}", entry.regressor.column_name(), format_indonesian(entry.vif, 3));
    }
    Ok(())
}

fn export_all(
    dir: &Path,
    result: &PipelineResult,
    forecast: Option<&ridership_forecast::Forecast>,
) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(dir)?;
    write_csv(&mut dataset_frame(result.training())?, dir.join("training.csv"))?;
    write_csv(&mut dataset_frame(result.testing())?, dir.join("testing.csv"))?;
    write_csv(
        &mut comparison_frame(&result.evaluation().testing.comparison)?,
        dir.join("testing_predictions.csv"),
    )?;
    if let Some(forecast) = forecast {
        write_csv(&mut forecast_frame(forecast)?, dir.join("forecast.csv"))?;
    }
    info!(dir = %dir.display(), "exported tables");
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_logging();

    let config = match &args.config {
        Some(path) => PipelineConfig::from_json_file(path)?,
        None => PipelineConfig::default(),
    };

    let input = PipelineInput {
        training: SplitFiles::new(read_files(&args.train_ridership)?, read_files(&args.train_holiday)?),
        testing: SplitFiles::new(read_files(&args.test_ridership)?, read_files(&args.test_holiday)?),
    };

    let mut session = Session::new(Pipeline::new(config)?);
    let result = session.process(&input)?;
    print_summary(&result)?;

    let forecast = if args.forecast {
        let forecast = session.forecast()?;
        println!("\nForecast ({} months):", forecast.len());
        for row in forecast.rows().iter().take(12) {
            println!(
                "  {:>4}  {:<15} {:>12}",
                row.month_index,
                row.period.to_string(),
                format_indonesian(row.predicted_ridership, 0)
            );
        }
        Some(forecast)
    } else {
        None
    };

    if let Some(query) = &args.query {
        match lookup_period(query, &result, forecast.as_deref()) {
            None => println!("\nNo month and year found in query"),
            Some(matches) if matches.is_empty() => println!("\nNo data for that month"),
            Some(matches) => {
                for m in matches {
                    println!(
                        "\n[{}] {} (Bulan ke-{}): {}",
                        m.source,
                        m.period,
                        m.month_index,
                        format_indonesian(m.ridership, 0)
                    );
                }
            }
        }
    }

    if args.context {
        println!("\n{}", assistant_context(&result, forecast.as_deref())?);
    }

    if let Some(dir) = &args.output_dir {
        export_all(dir, &result, forecast.as_deref())?;
    }

    Ok(())
}
