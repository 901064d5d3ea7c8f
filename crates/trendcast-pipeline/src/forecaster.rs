//! Next-step score forecasting from lag, rolling and engagement features.
//!
//! The model is fitted against the same score column its lag features were
//! derived from, so the "forecast" is a smoothed estimate of the current
//! score given its recent history rather than a held-out future value.

use serde::Serialize;

use crate::error::PipelineError;
use crate::regression::Regressor;
use crate::table::{ScoreColumn, TrendRow};
use crate::timeseries::{Expanded, SeriesFeatureExpander};

const STAGE: &str = "forecaster";

/// Column order of the forecaster's feature vector.
pub const FORECAST_FEATURES: [&str; 8] = [
    "prev_score",
    "prev_score2",
    "prev_score3",
    "likes",
    "shares",
    "comments",
    "rolling_mean",
    "rolling_std",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastRecord {
    pub trend_name: String,
    pub forecasted_trend_score: f64,
}

pub struct Forecaster {
    expander: SeriesFeatureExpander,
    model: Box<dyn Regressor>,
    column: ScoreColumn,
    trained: bool,
}

impl Forecaster {
    /// Build a forecaster that expands and fits on `column`.
    #[must_use]
    pub fn new(
        model: Box<dyn Regressor>,
        expander: SeriesFeatureExpander,
        column: ScoreColumn,
    ) -> Self {
        Self {
            expander,
            model,
            column,
            trained: false,
        }
    }

    /// # Errors
    ///
    /// Returns [`PipelineError::MissingColumn`] if the rows lack the column.
    pub fn prepare_features<R: TrendRow + Clone>(
        &self,
        rows: &[R],
    ) -> Result<Vec<Expanded<R>>, PipelineError> {
        self.expander.expand(rows, self.column)
    }

    /// # Errors
    ///
    /// Returns [`PipelineError::EmptyDataset`] for zero rows, plus any
    /// feature-expansion or model error.
    pub fn train<R: TrendRow + Clone>(&mut self, rows: &[R]) -> Result<(), PipelineError> {
        if rows.is_empty() {
            return Err(PipelineError::EmptyDataset { stage: STAGE });
        }
        let expanded = self.prepare_features(rows)?;
        let x: Vec<Vec<f64>> = expanded.iter().map(feature_vector).collect();
        let y: Vec<f64> = expanded
            .iter()
            .map(|e| {
                Ok(e.score(self.column)?
                    .filter(|v| v.is_finite())
                    .unwrap_or(0.0))
            })
            .collect::<Result<_, PipelineError>>()?;

        self.model.fit(&x, &y)?;
        self.trained = true;
        tracing::debug!(
            stage = STAGE,
            model = self.model.name(),
            column = %self.column,
            rows = y.len(),
            "forecaster trained"
        );
        Ok(())
    }

    /// Forecast a score for every row, in series order. Non-finite model
    /// output becomes `0.0`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::ModelNotFitted`] before [`Forecaster::train`],
    /// plus any feature-expansion or model error.
    pub fn forecast<R: TrendRow + Clone>(
        &self,
        rows: &[R],
    ) -> Result<Vec<ForecastRecord>, PipelineError> {
        if !self.trained {
            return Err(PipelineError::ModelNotFitted { stage: STAGE });
        }
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let expanded = self.prepare_features(rows)?;
        let x: Vec<Vec<f64>> = expanded.iter().map(feature_vector).collect();
        let predictions = self.model.predict(&x)?;
        if predictions.len() != expanded.len() {
            return Err(PipelineError::Model(format!(
                "{STAGE}: model returned {} predictions for {} rows",
                predictions.len(),
                expanded.len()
            )));
        }

        Ok(expanded
            .iter()
            .zip(predictions)
            .map(|(e, predicted)| ForecastRecord {
                trend_name: e.post().trend_name.clone(),
                forecasted_trend_score: if predicted.is_finite() { predicted } else { 0.0 },
            })
            .collect())
    }
}

#[allow(clippy::cast_precision_loss)]
fn feature_vector<R: TrendRow>(e: &Expanded<R>) -> Vec<f64> {
    let post = e.post();
    let f = &e.features;
    vec![
        f.prev_score,
        f.prev_score2,
        f.prev_score3,
        post.likes as f64,
        post.shares as f64,
        post.comments as f64,
        f.rolling_mean,
        f.rolling_std,
    ]
}
