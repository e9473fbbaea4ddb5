//! Regression fitting and evaluation over monthly datasets

use crate::error::{ForecastError, Result};
use crate::merge::{MonthlyDataset, Regressor};
use crate::month::Period;
use ridership_math::{ErrorMetrics, MathError, MultipleLinearRegression, DEFAULT_ZERO_EPSILON};
use serde::Serialize;
use std::fmt;
use tracing::info;

/// Forecast quality band derived from a MAPE value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AccuracyCategory {
    VeryAccurate,
    Accurate,
    FairlyAccurate,
    Inaccurate,
}

impl AccuracyCategory {
    pub const ALL: [AccuracyCategory; 4] = [
        AccuracyCategory::VeryAccurate,
        AccuracyCategory::Accurate,
        AccuracyCategory::FairlyAccurate,
        AccuracyCategory::Inaccurate,
    ];

    /// Band a MAPE percentage; upper bounds are inclusive
    pub fn from_mape(mape: f64) -> Self {
        if mape <= 10.0 {
            AccuracyCategory::VeryAccurate
        } else if mape <= 20.0 {
            AccuracyCategory::Accurate
        } else if mape <= 50.0 {
            AccuracyCategory::FairlyAccurate
        } else {
            AccuracyCategory::Inaccurate
        }
    }

    pub fn indonesian_label(&self) -> &'static str {
        match self {
            AccuracyCategory::VeryAccurate => "Sangat Akurat",
            AccuracyCategory::Accurate => "Akurat",
            AccuracyCategory::FairlyAccurate => "Cukup Akurat",
            AccuracyCategory::Inaccurate => "Tidak Akurat",
        }
    }

    /// MAPE range covered by the band
    pub fn range_label(&self) -> &'static str {
        match self {
            AccuracyCategory::VeryAccurate => "< 10%",
            AccuracyCategory::Accurate => "10% - 20%",
            AccuracyCategory::FairlyAccurate => "20% - 50%",
            AccuracyCategory::Inaccurate => "> 50%",
        }
    }
}

impl fmt::Display for AccuracyCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AccuracyCategory::VeryAccurate => "very accurate",
            AccuracyCategory::Accurate => "accurate",
            AccuracyCategory::FairlyAccurate => "fairly accurate",
            AccuracyCategory::Inaccurate => "inaccurate",
        };
        f.write_str(label)
    }
}

/// OLS model over the five ridership regressors
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FittedModel {
    regression: MultipleLinearRegression,
    features: [Regressor; 5],
}

impl FittedModel {
    pub fn intercept(&self) -> f64 {
        self.regression.intercept()
    }

    /// Coefficients in [`Regressor::ALL`] order
    pub fn coefficients(&self) -> &[f64] {
        self.regression.coefficients()
    }

    pub fn coefficient(&self, regressor: Regressor) -> f64 {
        self.regression.coefficients()[regressor.position()]
    }

    pub fn features(&self) -> &[Regressor; 5] {
        &self.features
    }

    /// Full regression output, including inference statistics
    pub fn regression(&self) -> &MultipleLinearRegression {
        &self.regression
    }

    pub fn predict(&self, regressors: &[f64; 5]) -> Result<f64> {
        Ok(self.regression.predict(regressors)?)
    }

    pub fn predict_dataset(&self, dataset: &MonthlyDataset) -> Result<Vec<f64>> {
        Ok(self.regression.predict_many(&dataset.features())?)
    }
}

/// Actual against predicted ridership for one month
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionComparison {
    pub month_index: u32,
    #[serde(flatten)]
    pub period: Period,
    pub actual: f64,
    pub predicted: f64,
    /// Absolute difference
    pub difference: f64,
}

/// Scores of the model on one split
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SplitEvaluation {
    pub predictions: Vec<f64>,
    pub metrics: ErrorMetrics,
    pub comparison: Vec<PredictionComparison>,
}

impl SplitEvaluation {
    pub fn accuracy(&self) -> AccuracyCategory {
        AccuracyCategory::from_mape(self.metrics.mape)
    }
}

/// Scores on both splits
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelEvaluation {
    pub training: SplitEvaluation,
    pub testing: SplitEvaluation,
}

impl ModelEvaluation {
    /// Overall rating, taken from the testing MAPE
    pub fn accuracy(&self) -> AccuracyCategory {
        self.testing.accuracy()
    }
}

/// Fits and scores [`FittedModel`]s
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegressionEngine {
    zero_epsilon: f64,
}

impl Default for RegressionEngine {
    fn default() -> Self {
        Self::new(DEFAULT_ZERO_EPSILON)
    }
}

impl RegressionEngine {
    /// `zero_epsilon` replaces actual values of exactly zero in MAPE
    pub fn new(zero_epsilon: f64) -> Self {
        Self { zero_epsilon }
    }

    /// Fit ridership on the five regressors of the training split
    pub fn fit(&self, training: &MonthlyDataset) -> Result<FittedModel> {
        if training.is_empty() {
            return Err(ForecastError::ModelFit(
                "training split has no rows".to_string(),
            ));
        }

        let regression = MultipleLinearRegression::fit(&training.features(), &training.target())
            .map_err(|e| match e {
                MathError::ZeroVariance { column } => ForecastError::ModelFit(format!(
                    "regressor '{}' has zero variance in the training data",
                    Regressor::ALL[column]
                )),
                other => ForecastError::from(other),
            })?;

        Ok(FittedModel {
            regression,
            features: Regressor::ALL,
        })
    }

    /// Predict a split and compare against its actual ridership
    pub fn evaluate(&self, model: &FittedModel, dataset: &MonthlyDataset) -> Result<SplitEvaluation> {
        let actual = dataset.target();
        let predictions = model.predict_dataset(dataset)?;
        let metrics = ErrorMetrics::evaluate(&actual, &predictions, self.zero_epsilon)?;

        let comparison = dataset
            .rows()
            .iter()
            .zip(&predictions)
            .map(|(row, &predicted)| PredictionComparison {
                month_index: row.month_index,
                period: row.period,
                actual: row.ridership,
                predicted,
                difference: (row.ridership - predicted).abs(),
            })
            .collect();

        Ok(SplitEvaluation {
            predictions,
            metrics,
            comparison,
        })
    }

    /// Fit on training, then score both splits
    pub fn fit_and_evaluate(
        &self,
        training: &MonthlyDataset,
        testing: &MonthlyDataset,
    ) -> Result<(FittedModel, ModelEvaluation)> {
        let model = self.fit(training)?;
        let evaluation = ModelEvaluation {
            training: self.evaluate(&model, training)?,
            testing: self.evaluate(&model, testing)?,
        };

        info!(
            r_squared = model.regression().r_squared(),
            mape_training = evaluation.training.metrics.mape,
            mape_testing = evaluation.testing.metrics.mape,
            accuracy = %evaluation.accuracy(),
            "fitted regression model"
        );
        Ok((model, evaluation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::MonthlyRow;
    use approx::assert_relative_eq;
    use chrono::Month;
    use rstest::rstest;

    #[rstest]
    #[case(9.9, AccuracyCategory::VeryAccurate)]
    #[case(10.0, AccuracyCategory::VeryAccurate)]
    #[case(10.1, AccuracyCategory::Accurate)]
    #[case(20.0, AccuracyCategory::Accurate)]
    #[case(50.0, AccuracyCategory::FairlyAccurate)]
    #[case(50.1, AccuracyCategory::Inaccurate)]
    fn test_accuracy_bands(#[case] mape: f64, #[case] expected: AccuracyCategory) {
        assert_eq!(AccuracyCategory::from_mape(mape), expected);
    }

    #[test]
    fn test_category_labels() {
        assert_eq!(AccuracyCategory::FairlyAccurate.to_string(), "fairly accurate");
        assert_eq!(AccuracyCategory::Inaccurate.indonesian_label(), "Tidak Akurat");
        assert_eq!(AccuracyCategory::Accurate.range_label(), "10% - 20%");
    }

    /// Rows whose ridership is an exact linear function of the regressors
    fn linear_rows(start: u32, count: u32) -> MonthlyDataset {
        let mut period = Period::new(Month::January, 2022);
        let rows = (start..start + count)
            .map(|i| {
                let x = i as f64;
                let total = 1000.0 + 37.0 * ((i * 7) % 11) as f64;
                let average = 50.0 + ((i * 3) % 5) as f64 * 0.5;
                let national = i % 3;
                let leave = u32::from((i * 5) % 4 == 1);
                let row = MonthlyRow {
                    month_index: i,
                    period,
                    ridership: 100.0 + 2.0 * x + 0.5 * total - 3.0 * average
                        + 4.0 * national as f64
                        - 6.0 * leave as f64,
                    total_distance: total,
                    average_distance: average,
                    national_holidays: national,
                    collective_leave: leave,
                };
                period = period.next();
                row
            })
            .collect();
        MonthlyDataset::new(rows)
    }

    #[test]
    fn test_recovers_exact_relationship() {
        let engine = RegressionEngine::default();
        let training = linear_rows(1, 24);
        let testing = linear_rows(25, 6);
        let (model, evaluation) = engine.fit_and_evaluate(&training, &testing).unwrap();

        assert_relative_eq!(model.intercept(), 100.0, epsilon = 1e-6);
        assert_relative_eq!(model.coefficient(Regressor::MonthIndex), 2.0, epsilon = 1e-8);
        assert_relative_eq!(model.coefficient(Regressor::CollectiveLeave), -6.0, epsilon = 1e-8);
        assert!(evaluation.testing.metrics.mae < 1e-6);
        assert_eq!(evaluation.accuracy(), AccuracyCategory::VeryAccurate);
        assert_eq!(evaluation.testing.comparison.len(), 6);
        assert_eq!(evaluation.testing.comparison[0].month_index, 25);
    }

    #[test]
    fn test_zero_variance_names_regressor() {
        let rows = linear_rows(1, 12)
            .rows()
            .iter()
            .cloned()
            .map(|mut row| {
                row.collective_leave = 0;
                row
            })
            .collect();
        let err = RegressionEngine::default()
            .fit(&MonthlyDataset::new(rows))
            .unwrap_err();
        assert!(err.to_string().contains("jumlah_cuti_bersama"), "{err}");
    }

    #[test]
    fn test_empty_training() {
        let err = RegressionEngine::default()
            .fit(&MonthlyDataset::default())
            .unwrap_err();
        assert!(matches!(err, ForecastError::ModelFit(_)));
    }
}
