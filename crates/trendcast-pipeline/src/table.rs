//! Row abstractions shared by the pipeline stages.
//!
//! Stages never mutate their input. Each one takes a slice of rows and returns
//! a new table whose row type carries the extra columns it computed.

use std::cmp::Ordering;
use std::ops::Range;

use trendcast_core::PostRecord;

use crate::error::PipelineError;

/// Score columns a stage can be pointed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScoreColumn {
    TrendScore,
    PredictedTrendScore,
    ForecastedTrendScore,
}

impl ScoreColumn {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            ScoreColumn::TrendScore => "trend_score",
            ScoreColumn::PredictedTrendScore => "predicted_trend_score",
            ScoreColumn::ForecastedTrendScore => "forecasted_trend_score",
        }
    }

    pub(crate) fn missing(self) -> PipelineError {
        PipelineError::MissingColumn {
            column: self.name(),
        }
    }
}

impl std::fmt::Display for ScoreColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A row that belongs to a trend series and exposes score columns.
pub trait TrendRow {
    fn post(&self) -> &PostRecord;

    /// Value of `column` for this row.
    ///
    /// `Ok(None)` is a null cell; `Err(MissingColumn)` means the row type
    /// does not have the column at all.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::MissingColumn`] when the column is absent.
    fn score(&self, column: ScoreColumn) -> Result<Option<f64>, PipelineError>;
}

impl TrendRow for PostRecord {
    fn post(&self) -> &PostRecord {
        self
    }

    fn score(&self, column: ScoreColumn) -> Result<Option<f64>, PipelineError> {
        match column {
            ScoreColumn::TrendScore => Ok(self.trend_score),
            other => Err(other.missing()),
        }
    }
}

impl<T: TrendRow + ?Sized> TrendRow for &T {
    fn post(&self) -> &PostRecord {
        (**self).post()
    }

    fn score(&self, column: ScoreColumn) -> Result<Option<f64>, PipelineError> {
        (**self).score(column)
    }
}

/// A post after imputation: `trend_score` is filled and mirrored into
/// `predicted_trend_score`, the canonical score for later stages.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredPost {
    pub post: PostRecord,
    pub predicted_trend_score: f64,
}

impl TrendRow for ScoredPost {
    fn post(&self) -> &PostRecord {
        &self.post
    }

    fn score(&self, column: ScoreColumn) -> Result<Option<f64>, PipelineError> {
        match column {
            ScoreColumn::TrendScore => Ok(self.post.trend_score),
            ScoreColumn::PredictedTrendScore => Ok(Some(self.predicted_trend_score)),
            ScoreColumn::ForecastedTrendScore => Err(column.missing()),
        }
    }
}

/// Ordering by (`trend_name`, `timestamp`) ascending.
pub(crate) fn series_order<R: TrendRow>(a: &R, b: &R) -> Ordering {
    let (a, b) = (a.post(), b.post());
    a.trend_name
        .cmp(&b.trend_name)
        .then_with(|| a.timestamp.cmp(&b.timestamp))
}

/// Copy of `rows` sorted by (`trend_name`, `timestamp`). Ties keep input order.
pub(crate) fn sorted_by_series<R: TrendRow + Clone>(rows: &[R]) -> Vec<R> {
    let mut sorted = rows.to_vec();
    sorted.sort_by(series_order);
    sorted
}

/// Index ranges of each contiguous trend series in a series-sorted slice.
pub(crate) fn series_bounds<R: TrendRow>(sorted: &[R]) -> Vec<Range<usize>> {
    let mut bounds = Vec::new();
    let mut start = 0;
    for i in 1..=sorted.len() {
        let boundary = i == sorted.len()
            || sorted[i].post().trend_name != sorted[start].post().trend_name;
        if boundary {
            bounds.push(start..i);
            start = i;
        }
    }
    bounds
}

/// Values of `column` for every row. Non-finite values are treated as null.
pub(crate) fn column_values<R: TrendRow>(
    rows: &[R],
    column: ScoreColumn,
) -> Result<Vec<Option<f64>>, PipelineError> {
    rows.iter()
        .map(|row| Ok(row.score(column)?.filter(|v| v.is_finite())))
        .collect()
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use trendcast_core::PostRecord;

    pub(crate) fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    pub(crate) fn post(trend: &str, hour: i64, score: Option<f64>) -> PostRecord {
        PostRecord {
            trend_name: trend.to_string(),
            content: format!("{trend} look #{hour}"),
            hashtags: vec![format!("#{}", trend.replace(' ', ""))],
            tags: vec!["street".to_string()],
            timestamp: base_time() + Duration::hours(hour),
            likes: 100 + u64::try_from(hour).unwrap_or(0) * 10,
            shares: 10,
            comments: 5,
            trend_score: score,
        }
    }
}
