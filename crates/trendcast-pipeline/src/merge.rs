//! Joins per-trend forecasts back onto the labelled row table.

use std::collections::HashMap;

use serde::Serialize;
use trendcast_core::{PostRecord, TrendDirection};

use crate::direction::DirectedRow;
use crate::error::PipelineError;
use crate::forecaster::ForecastRecord;
use crate::table::{ScoreColumn, ScoredPost, TrendRow};

/// Frontend-ready row: the original post plus every computed column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendRecord {
    #[serde(flatten)]
    pub post: PostRecord,
    pub predicted_trend_score: f64,
    pub forecasted_trend_score: f64,
    pub prev_score: Option<f64>,
    pub score_change: Option<f64>,
    #[serde(rename = "trendDirection")]
    pub trend_direction: TrendDirection,
}

impl TrendRow for TrendRecord {
    fn post(&self) -> &PostRecord {
        &self.post
    }

    fn score(&self, column: ScoreColumn) -> Result<Option<f64>, PipelineError> {
        match column {
            ScoreColumn::TrendScore => Ok(self.post.trend_score),
            ScoreColumn::PredictedTrendScore => Ok(Some(self.predicted_trend_score)),
            ScoreColumn::ForecastedTrendScore => Ok(Some(self.forecasted_trend_score)),
        }
    }
}

/// Left-join `forecasts` onto `rows` by trend name.
///
/// Forecasts are reduced to one value per trend first, keeping the last one
/// seen (forecasts arrive in series order, so that is the latest row). Rows
/// whose trend has no forecast get `0.0`. Row order is preserved.
#[must_use]
pub fn merge_forecasts(
    rows: Vec<DirectedRow<ScoredPost>>,
    forecasts: &[ForecastRecord],
) -> Vec<TrendRecord> {
    let latest: HashMap<&str, f64> = forecasts
        .iter()
        .map(|f| (f.trend_name.as_str(), f.forecasted_trend_score))
        .collect();

    let mut unmatched = 0usize;
    let merged: Vec<TrendRecord> = rows
        .into_iter()
        .map(|directed| {
            let forecasted_trend_score = latest
                .get(directed.row.post.trend_name.as_str())
                .copied()
                .unwrap_or_else(|| {
                    unmatched += 1;
                    0.0
                });
            TrendRecord {
                post: directed.row.post,
                predicted_trend_score: directed.row.predicted_trend_score,
                forecasted_trend_score,
                prev_score: directed.prev_score,
                score_change: directed.score_change,
                trend_direction: directed.trend_direction,
            }
        })
        .collect();

    if unmatched > 0 {
        tracing::debug!(unmatched, "rows without a forecast defaulted to 0.0");
    }
    merged
}
