//! Up/down/stable labelling of score movement, per row and per trend.

use serde::Serialize;
use trendcast_core::{OverallDirectionPolicy, PostRecord, TrendDirection};

use crate::error::PipelineError;
use crate::table::{
    column_values, series_bounds, series_order, sorted_by_series, ScoreColumn, TrendRow,
};
use crate::timeseries::lag;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionConfig {
    /// A change strictly above this is `up`.
    pub up_threshold: f64,
    /// A change strictly below this is `down`.
    pub down_threshold: f64,
    pub overall_policy: OverallDirectionPolicy,
}

impl Default for DirectionConfig {
    fn default() -> Self {
        Self {
            up_threshold: 0.01,
            down_threshold: -0.01,
            overall_policy: OverallDirectionPolicy::FirstToLast,
        }
    }
}

/// A row labelled with its change from the previous row of its series.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectedRow<R> {
    pub row: R,
    pub prev_score: Option<f64>,
    pub score_change: Option<f64>,
    pub trend_direction: TrendDirection,
}

impl<R: TrendRow> TrendRow for DirectedRow<R> {
    fn post(&self) -> &PostRecord {
        self.row.post()
    }

    fn score(&self, column: ScoreColumn) -> Result<Option<f64>, PipelineError> {
        self.row.score(column)
    }
}

/// One row per trend: display means plus the compared score pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendOverview {
    pub trend_name: String,
    pub mean_predicted_trend_score: f64,
    pub mean_forecasted_trend_score: f64,
    pub baseline_score: f64,
    pub latest_score: f64,
    pub score_change: f64,
    #[serde(rename = "trendDirection")]
    pub trend_direction: TrendDirection,
}

#[derive(Debug, Clone)]
pub struct DirectionClassifier {
    config: DirectionConfig,
}

impl DirectionClassifier {
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] if a threshold is not finite or
    /// `down_threshold > up_threshold`.
    pub fn new(config: DirectionConfig) -> Result<Self, PipelineError> {
        if !config.up_threshold.is_finite() || !config.down_threshold.is_finite() {
            return Err(PipelineError::InvalidConfig(
                "direction thresholds must be finite".to_string(),
            ));
        }
        if config.down_threshold > config.up_threshold {
            return Err(PipelineError::InvalidConfig(format!(
                "down threshold {} is above up threshold {}",
                config.down_threshold, config.up_threshold
            )));
        }
        Ok(Self { config })
    }

    #[must_use]
    pub fn config(&self) -> &DirectionConfig {
        &self.config
    }

    /// Bucket a signed change. An undefined change is `stable`.
    #[must_use]
    pub fn classify(&self, change: Option<f64>) -> TrendDirection {
        match change {
            Some(c) if c > self.config.up_threshold => TrendDirection::Up,
            Some(c) if c < self.config.down_threshold => TrendDirection::Down,
            _ => TrendDirection::Stable,
        }
    }

    /// Label every row against the previous row of its series on `column`.
    /// Output is in series order.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::MissingColumn`] if the rows lack `column`.
    pub fn compute_direction<R: TrendRow + Clone>(
        &self,
        rows: &[R],
        column: ScoreColumn,
    ) -> Result<Vec<DirectedRow<R>>, PipelineError> {
        let sorted = sorted_by_series(rows);
        let scores = column_values(&sorted, column)?;

        let mut labelled = Vec::with_capacity(sorted.len());
        for range in series_bounds(&sorted) {
            let series = &scores[range];
            for (pos, &current) in series.iter().enumerate() {
                let prev_score = lag(series, pos, 1);
                let score_change = current.zip(prev_score).map(|(c, p)| c - p);
                labelled.push((prev_score, score_change, self.classify(score_change)));
            }
        }

        Ok(sorted
            .into_iter()
            .zip(labelled)
            .map(|(row, (prev_score, score_change, trend_direction))| DirectedRow {
                row,
                prev_score,
                score_change,
                trend_direction,
            })
            .collect())
    }

    /// One overview row per trend, sorted by trend name.
    ///
    /// Under [`OverallDirectionPolicy::FirstToLast`] the change is last minus
    /// first non-null value of `column` by timestamp. Under
    /// [`OverallDirectionPolicy::PredictedToForecast`] it is the mean
    /// forecasted score minus the mean predicted score and `column` is unused.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::MissingColumn`] if the rows lack `column`,
    /// `predicted_trend_score` or `forecasted_trend_score`.
    pub fn compute_overall_direction<R: TrendRow>(
        &self,
        rows: &[R],
        column: ScoreColumn,
    ) -> Result<Vec<TrendOverview>, PipelineError> {
        let mut sorted: Vec<&R> = rows.iter().collect();
        sorted.sort_by(|a, b| series_order(a, b));

        let predicted = column_values(&sorted, ScoreColumn::PredictedTrendScore)?;
        let forecasted = column_values(&sorted, ScoreColumn::ForecastedTrendScore)?;
        let chosen = column_values(&sorted, column)?;

        let mut overview = Vec::new();
        for range in series_bounds(&sorted) {
            let trend_name = sorted[range.start].post().trend_name.clone();
            let mean_predicted = mean(&predicted[range.clone()]);
            let mean_forecasted = mean(&forecasted[range.clone()]);

            let (baseline_score, latest_score) = match self.config.overall_policy {
                OverallDirectionPolicy::FirstToLast => {
                    let series = &chosen[range];
                    let first = series.iter().flatten().next().copied();
                    let last = series.iter().flatten().last().copied();
                    (first.unwrap_or(0.0), last.unwrap_or(0.0))
                }
                OverallDirectionPolicy::PredictedToForecast => (mean_predicted, mean_forecasted),
            };
            let score_change = latest_score - baseline_score;

            overview.push(TrendOverview {
                trend_name,
                mean_predicted_trend_score: mean_predicted,
                mean_forecasted_trend_score: mean_forecasted,
                baseline_score,
                latest_score,
                score_change,
                trend_direction: self.classify(Some(score_change)),
            });
        }

        Ok(overview)
    }
}

/// Mean of the non-null values, `0.0` if there are none.
#[allow(clippy::cast_precision_loss)]
fn mean(values: &[Option<f64>]) -> f64 {
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    if present.is_empty() {
        0.0
    } else {
        present.iter().sum::<f64>() / present.len() as f64
    }
}

#[cfg(test)]
#[path = "direction_test.rs"]
mod tests;
