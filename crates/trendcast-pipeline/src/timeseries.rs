//! Lag and rolling-window features computed within each trend series.
//!
//! Rows are re-sorted by (`trend_name`, `timestamp`) before anything is
//! computed, and no value ever crosses a trend-name boundary. Missing history
//! (the first rows of a series, or null scores) becomes `0.0` in the output.

use trendcast_core::PostRecord;

use crate::error::PipelineError;
use crate::table::{column_values, series_bounds, sorted_by_series, ScoreColumn, TrendRow};

/// Number of lag columns produced (`prev_score` .. `prev_score3`).
pub const LAG_DEPTH: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowConfig {
    /// Trailing window length for `rolling_mean` / `rolling_std`, current row included.
    pub window_size: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self { window_size: 3 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SeriesFeatures {
    pub prev_score: f64,
    pub prev_score2: f64,
    pub prev_score3: f64,
    pub rolling_mean: f64,
    pub rolling_std: f64,
}

/// A row together with the series features computed for it.
#[derive(Debug, Clone, PartialEq)]
pub struct Expanded<R> {
    pub row: R,
    pub features: SeriesFeatures,
}

impl<R: TrendRow> TrendRow for Expanded<R> {
    fn post(&self) -> &PostRecord {
        self.row.post()
    }

    fn score(&self, column: ScoreColumn) -> Result<Option<f64>, PipelineError> {
        self.row.score(column)
    }
}

#[derive(Debug, Clone)]
pub struct SeriesFeatureExpander {
    config: WindowConfig,
}

impl SeriesFeatureExpander {
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] for a zero-length window.
    pub fn new(config: WindowConfig) -> Result<Self, PipelineError> {
        if config.window_size == 0 {
            return Err(PipelineError::InvalidConfig(
                "rolling window size must be at least 1".to_string(),
            ));
        }
        Ok(Self { config })
    }

    #[must_use]
    pub fn window_size(&self) -> usize {
        self.config.window_size
    }

    /// Sort `rows` into trend series and compute lag and rolling features on
    /// `column`. Output is in series order.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::MissingColumn`] if the rows lack `column`.
    pub fn expand<R: TrendRow + Clone>(
        &self,
        rows: &[R],
        column: ScoreColumn,
    ) -> Result<Vec<Expanded<R>>, PipelineError> {
        let sorted = sorted_by_series(rows);
        let scores = column_values(&sorted, column)?;
        let depth = LAG_DEPTH.max(self.config.window_size);

        let mut features = Vec::with_capacity(sorted.len());
        let mut short_series = 0usize;
        for range in series_bounds(&sorted) {
            let series = &scores[range];
            if series.len() < depth {
                short_series += 1;
            }
            features.extend((0..series.len()).map(|pos| self.features_at(series, pos)));
        }

        if short_series > 0 {
            tracing::warn!(
                column = %column,
                short_series,
                depth,
                "insufficient history: short series get zero-filled lag features"
            );
        }

        Ok(sorted
            .into_iter()
            .zip(features)
            .map(|(row, features)| Expanded { row, features })
            .collect())
    }

    fn features_at(&self, series: &[Option<f64>], pos: usize) -> SeriesFeatures {
        let start = (pos + 1).saturating_sub(self.config.window_size);
        let (rolling_mean, rolling_std) = rolling_stats(&series[start..=pos]);
        SeriesFeatures {
            prev_score: lag(series, pos, 1).unwrap_or(0.0),
            prev_score2: lag(series, pos, 2).unwrap_or(0.0),
            prev_score3: lag(series, pos, 3).unwrap_or(0.0),
            rolling_mean,
            rolling_std,
        }
    }
}

/// Value `k` positions before `pos`, if there is one and it is not null.
pub(crate) fn lag(series: &[Option<f64>], pos: usize, k: usize) -> Option<f64> {
    pos.checked_sub(k).and_then(|i| series[i])
}

/// Mean and sample standard deviation of the non-null values in `window`.
///
/// A window with one value has std `0.0`; a window with no values yields
/// `(0.0, 0.0)`.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn rolling_stats(window: &[Option<f64>]) -> (f64, f64) {
    let values: Vec<f64> = window.iter().flatten().copied().collect();
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    if values.len() < 2 {
        return (mean, 0.0);
    }
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    (mean, var.sqrt())
}
