//! Orchestrates impute, forecast, direction and aggregate over one dataset.

use serde::Serialize;
use trendcast_core::PostRecord;

use crate::config::PipelineConfig;
use crate::direction::{DirectionClassifier, TrendOverview};
use crate::error::PipelineError;
use crate::forecaster::{ForecastRecord, Forecaster};
use crate::imputer::ScoreImputer;
use crate::jitter::jitter_observed_scores;
use crate::merge::{merge_forecasts, TrendRecord};
use crate::regression::RegressorFactory;
use crate::table::{ScoreColumn, ScoredPost};
use crate::timeseries::SeriesFeatureExpander;

/// Column every stage after imputation reads.
const CANONICAL_SCORE: ScoreColumn = ScoreColumn::PredictedTrendScore;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineOutput {
    /// One row per input post, in (`trend_name`, `timestamp`) order.
    pub rows: Vec<TrendRecord>,
    /// One row per trend. Empty if the aggregate stage failed.
    pub overview: Vec<TrendOverview>,
}

/// Train a fresh imputer on `posts` and fill their missing scores.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyDataset`] for zero posts, or any model error.
pub fn predict_scores(
    posts: Vec<PostRecord>,
    config: &PipelineConfig,
    factory: &dyn RegressorFactory,
) -> Result<Vec<ScoredPost>, PipelineError> {
    let mut imputer = ScoreImputer::new(factory.build(), config.imputer);
    imputer.train(&posts)?;
    let scored = imputer.predict_missing(posts)?;
    tracing::info!(stage = "imputer", rows = scored.len(), "scores predicted");
    Ok(scored)
}

/// Train a fresh forecaster on the canonical score and forecast every row.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyDataset`] for zero rows, or any model error.
pub fn forecast_scores(
    scored: &[ScoredPost],
    config: &PipelineConfig,
    factory: &dyn RegressorFactory,
) -> Result<Vec<ForecastRecord>, PipelineError> {
    let expander = SeriesFeatureExpander::new(config.window)?;
    let mut forecaster = Forecaster::new(factory.build(), expander, CANONICAL_SCORE);
    forecaster.train(scored)?;
    let forecasts = forecaster.forecast(scored)?;
    tracing::info!(stage = "forecaster", rows = forecasts.len(), "scores forecasted");
    Ok(forecasts)
}

/// Run the whole pipeline over `posts`.
///
/// Every model is built from `factory` for this call only. Stage failures are
/// returned to the caller.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidConfig`] for a bad `config`,
/// [`PipelineError::EmptyDataset`] for zero posts, or any model error.
pub fn run_trend_pipeline(
    posts: Vec<PostRecord>,
    config: &PipelineConfig,
    factory: &dyn RegressorFactory,
) -> Result<PipelineOutput, PipelineError> {
    config.validate()?;
    let classifier = DirectionClassifier::new(config.direction)?;
    tracing::info!(stage = "data", rows = posts.len(), "pipeline started");

    let posts = jitter_observed_scores(posts, config.score_jitter, config.forest.random_state);
    let scored = predict_scores(posts, config, factory)?;
    let forecasts = forecast_scores(&scored, config, factory)?;

    let directed = classifier.compute_direction(&scored, CANONICAL_SCORE)?;
    tracing::info!(stage = "direction", rows = directed.len(), "row directions computed");

    let rows = merge_forecasts(directed, &forecasts);
    tracing::info!(stage = "merge", rows = rows.len(), "forecasts merged");

    let overview = classifier.compute_overall_direction(&rows, CANONICAL_SCORE)?;
    tracing::info!(
        stage = "aggregate",
        trends = overview.len(),
        policy = %config.direction.overall_policy,
        "pipeline finished"
    );

    Ok(PipelineOutput { rows, overview })
}
