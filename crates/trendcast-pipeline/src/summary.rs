//! Per-trend dashboard cards built from the merged row table.

use std::collections::HashMap;

use serde::Serialize;
use trendcast_core::{OverallDirectionPolicy, PostRecord, TrendDirection};

use crate::config::PipelineConfig;
use crate::direction::{DirectionClassifier, DirectionConfig};
use crate::error::PipelineError;
use crate::merge::TrendRecord;
use crate::pipeline::run_trend_pipeline;
use crate::regression::RegressorFactory;
use crate::table::{series_bounds, series_order, ScoreColumn, TrendRow};

const NO_DESCRIPTION: &str = "No description";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendSummary {
    pub trend_name: String,
    /// Content of the earliest post, or `"No description"`.
    pub content: String,
    pub hashtags: Vec<String>,
    pub predicted_trend_score: f64,
    pub forecasted_trend_score: f64,
    #[serde(rename = "trendDirection")]
    pub trend_direction: TrendDirection,
}

/// One summary per trend, sorted by trend name.
///
/// The merged table carries a single forecast per trend, so the direction
/// compares the trend's mean predicted score with its forecast using the
/// classifier's thresholds, whatever overall policy it was built with.
///
/// # Errors
///
/// Returns any error from [`DirectionClassifier::compute_overall_direction`].
pub fn summarize_trends(
    rows: &[TrendRecord],
    classifier: &DirectionClassifier,
) -> Result<Vec<TrendSummary>, PipelineError> {
    let forecast_classifier = DirectionClassifier::new(DirectionConfig {
        overall_policy: OverallDirectionPolicy::PredictedToForecast,
        ..*classifier.config()
    })?;
    let overview = forecast_classifier
        .compute_overall_direction(rows, ScoreColumn::ForecastedTrendScore)?;
    let by_trend: HashMap<&str, _> = overview
        .iter()
        .map(|o| (o.trend_name.as_str(), o))
        .collect();

    let mut sorted: Vec<&TrendRecord> = rows.iter().collect();
    sorted.sort_by(|a, b| series_order(a, b));

    Ok(series_bounds(&sorted)
        .into_iter()
        .map(|range| {
            let first = sorted[range.start].post();
            let trend = by_trend.get(first.trend_name.as_str());
            TrendSummary {
                trend_name: first.trend_name.clone(),
                content: if first.content.trim().is_empty() {
                    NO_DESCRIPTION.to_string()
                } else {
                    first.content.clone()
                },
                hashtags: first.hashtags.clone(),
                predicted_trend_score: trend.map_or(0.0, |o| o.mean_predicted_trend_score),
                forecasted_trend_score: trend.map_or(0.0, |o| o.mean_forecasted_trend_score),
                trend_direction: trend.map_or(TrendDirection::Stable, |o| o.trend_direction),
            }
        })
        .collect())
}

/// Run the pipeline over `posts` and summarize the merged rows.
///
/// # Errors
///
/// Returns any error from [`run_trend_pipeline`] or [`summarize_trends`].
pub fn build_trend_summary(
    posts: Vec<PostRecord>,
    config: &PipelineConfig,
    factory: &dyn RegressorFactory,
) -> Result<Vec<TrendSummary>, PipelineError> {
    let output = run_trend_pipeline(posts, config, factory)?;
    let classifier = DirectionClassifier::new(config.direction)?;
    let summaries = summarize_trends(&output.rows, &classifier)?;
    tracing::info!(stage = "insights", trends = summaries.len(), "trend summary built");
    Ok(summaries)
}
