//! End-to-end processing: files in, fitted and evaluated model out
//!
//! [`Pipeline::process`] runs parsing, merging, fitting and evaluation in
//! one go and returns an immutable [`PipelineResult`]. [`Session`] keeps the
//! last successful result for later read-only consumers and only replaces
//! it when a new run completes.

use crate::config::PipelineConfig;
use crate::data::{read_holiday_files, read_ridership_files, HolidayRecord, RawFile, RidershipRecord};
use crate::error::{ForecastError, Result};
use crate::forecast::{Forecast, ForecastProjector};
use crate::merge::{DatasetMerger, MonthlyDataset};
use crate::model::{FittedModel, ModelEvaluation, RegressionEngine};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{info, warn};

/// Uploaded files of one split
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SplitFiles {
    pub ridership: Vec<RawFile>,
    pub holidays: Vec<RawFile>,
}

impl SplitFiles {
    pub fn new(ridership: Vec<RawFile>, holidays: Vec<RawFile>) -> Self {
        Self { ridership, holidays }
    }

    /// Names of every file in the split
    pub fn file_names(&self) -> BTreeSet<&str> {
        self.ridership
            .iter()
            .chain(&self.holidays)
            .map(RawFile::name)
            .collect()
    }
}

/// Everything one "process" action receives
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineInput {
    pub training: SplitFiles,
    pub testing: SplitFiles,
}

/// Fail when a file name was uploaded to both splits
pub fn validate_disjoint(input: &PipelineInput) -> Result<()> {
    let training = input.training.file_names();
    let testing = input.testing.file_names();
    let shared: Vec<String> = training
        .intersection(&testing)
        .map(|name| name.to_string())
        .collect();

    if shared.is_empty() {
        Ok(())
    } else {
        warn!(files = ?shared, "rejecting input with files shared between splits");
        Err(ForecastError::FileOverlap(shared))
    }
}

/// Parsed records of one split, before merging
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedSplit {
    pub ridership: Vec<RidershipRecord>,
    pub holidays: Vec<HolidayRecord>,
}

impl ParsedSplit {
    fn read(files: &SplitFiles, config: &PipelineConfig) -> Result<Self> {
        Ok(Self {
            ridership: read_ridership_files(&files.ridership, config.ridership_header_row)?,
            holidays: read_holiday_files(&files.holidays, config.holiday_header_row)?,
        })
    }
}

/// Output of one successful pipeline run
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineResult {
    config: PipelineConfig,
    training_records: ParsedSplit,
    testing_records: ParsedSplit,
    training: MonthlyDataset,
    testing: MonthlyDataset,
    model: FittedModel,
    evaluation: ModelEvaluation,
}

impl PipelineResult {
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn training_records(&self) -> &ParsedSplit {
        &self.training_records
    }

    pub fn testing_records(&self) -> &ParsedSplit {
        &self.testing_records
    }

    pub fn training(&self) -> &MonthlyDataset {
        &self.training
    }

    pub fn testing(&self) -> &MonthlyDataset {
        &self.testing
    }

    pub fn model(&self) -> &FittedModel {
        &self.model
    }

    pub fn evaluation(&self) -> &ModelEvaluation {
        &self.evaluation
    }

    /// Month index following both splits
    pub fn next_month_index(&self) -> u32 {
        (self.training.len() + self.testing.len()) as u32 + 1
    }

    /// Project the configured horizon past the observed data
    pub fn forecast(&self) -> Result<Forecast> {
        ForecastProjector::new(self.config.forecast_horizon).project(
            &self.model,
            &self.training,
            self.next_month_index(),
        )
    }
}

/// Runs the parse, merge, fit and evaluate stages
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run every stage; the first failure aborts the run
    pub fn process(&self, input: &PipelineInput) -> Result<PipelineResult> {
        validate_disjoint(input)?;

        let training_records = ParsedSplit::read(&input.training, &self.config)?;
        let testing_records = ParsedSplit::read(&input.testing, &self.config)?;

        let (training, testing) = DatasetMerger::build_datasets(
            &training_records.ridership,
            &training_records.holidays,
            &testing_records.ridership,
            &testing_records.holidays,
        );
        info!(
            training_months = training.len(),
            testing_months = testing.len(),
            "built regression datasets"
        );

        let engine = RegressionEngine::new(self.config.mape_zero_epsilon);
        let (model, evaluation) = engine.fit_and_evaluate(&training, &testing)?;

        Ok(PipelineResult {
            config: self.config.clone(),
            training_records,
            testing_records,
            training,
            testing,
            model,
            evaluation,
        })
    }
}

/// Holds the committed result of the latest successful run
#[derive(Debug, Default)]
pub struct Session {
    pipeline: Pipeline,
    result: Option<Arc<PipelineResult>>,
    forecast: Option<Arc<Forecast>>,
}

impl Session {
    pub fn new(pipeline: Pipeline) -> Self {
        Self {
            pipeline,
            result: None,
            forecast: None,
        }
    }

    /// Run the pipeline and commit its result.
    ///
    /// On failure the previously committed result stays in place.
    pub fn process(&mut self, input: &PipelineInput) -> Result<Arc<PipelineResult>> {
        let result = Arc::new(self.pipeline.process(input)?);
        self.result = Some(Arc::clone(&result));
        self.forecast = None;
        Ok(result)
    }

    pub fn result(&self) -> Option<&Arc<PipelineResult>> {
        self.result.as_ref()
    }

    /// Forecast from the committed result, computed once and cached
    pub fn forecast(&mut self) -> Result<Arc<Forecast>> {
        if let Some(forecast) = &self.forecast {
            return Ok(Arc::clone(forecast));
        }
        let result = self.result.as_ref().ok_or_else(|| {
            ForecastError::NoValidData("no data has been processed yet".to_string())
        })?;
        let forecast = Arc::new(result.forecast()?);
        self.forecast = Some(Arc::clone(&forecast));
        Ok(forecast)
    }

    pub fn cached_forecast(&self) -> Option<&Arc<Forecast>> {
        self.forecast.as_ref()
    }
}
