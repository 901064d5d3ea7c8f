//! Popularity-over-time view of raw posts for charting.

use serde::Serialize;
use trendcast_core::PostRecord;

use crate::table::sorted_by_series;

/// One post on the popularity chart, with every column of the row.
/// `timestamp` serializes as RFC 3339.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PopularityPoint {
    #[serde(flatten)]
    pub post: PostRecord,
}

impl From<PostRecord> for PopularityPoint {
    fn from(post: PostRecord) -> Self {
        Self { post }
    }
}

/// Split a comma-separated list of trend names. Names are trimmed and blanks
/// dropped; `None` or an all-blank list means "no filter".
#[must_use]
pub fn parse_trend_filter(raw: Option<&str>) -> Option<Vec<String>> {
    let names: Vec<String> = raw?
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect();
    if names.is_empty() {
        None
    } else {
        Some(names)
    }
}

/// Posts (optionally restricted to `filter`) as points sorted by trend name
/// then timestamp.
#[must_use]
pub fn popularity_over_time(
    posts: &[PostRecord],
    filter: Option<&[String]>,
) -> Vec<PopularityPoint> {
    let selected: Vec<PostRecord> = posts
        .iter()
        .filter(|p| filter.is_none_or(|names| names.iter().any(|n| *n == p.trend_name)))
        .cloned()
        .collect();
    sorted_by_series(&selected)
        .into_iter()
        .map(PopularityPoint::from)
        .collect()
}
