//! Post records and direction labels shared by every trendcast crate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// One social-media-style fashion post.
///
/// `hashtags` and `tags` are always sequences; a `null` or missing value in the
/// source is normalized to an empty `Vec`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostRecord {
    pub trend_name: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub hashtags: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tags: Vec<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub shares: u64,
    #[serde(default)]
    pub comments: u64,
    /// Observed popularity in `[0, 1]`; `None` when not yet scored.
    #[serde(default)]
    pub trend_score: Option<f64>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Direction of a trend's score movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
    #[default]
    Stable,
}

impl TrendDirection {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TrendDirection::Up => "up",
            TrendDirection::Down => "down",
            TrendDirection::Stable => "stable",
        }
    }
}

impl std::fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_hashtags_and_tags_become_empty() {
        let json = r#"{
            "trend_name": "bucket hat",
            "content": "spotted at the festival",
            "hashtags": null,
            "timestamp": "2024-05-01T12:00:00Z",
            "likes": 10,
            "shares": 2,
            "comments": 1,
            "trend_score": null
        }"#;
        let post: PostRecord = serde_json::from_str(json).unwrap();
        assert!(post.hashtags.is_empty());
        assert!(post.tags.is_empty());
        assert!(post.trend_score.is_none());
    }

    #[test]
    fn observed_score_is_kept() {
        let json = r##"{
            "trend_name": "neon colors",
            "content": "bright",
            "hashtags": ["#neon"],
            "tags": ["color", "summer"],
            "timestamp": "2024-05-01T12:00:00Z",
            "trend_score": 0.42
        }"##;
        let post: PostRecord = serde_json::from_str(json).unwrap();
        assert_eq!(post.hashtags, vec!["#neon".to_string()]);
        assert_eq!(post.tags.len(), 2);
        assert_eq!(post.trend_score, Some(0.42));
        assert_eq!(post.likes, 0);
    }

    #[test]
    fn direction_serializes_as_lowercase_literal() {
        assert_eq!(serde_json::to_string(&TrendDirection::Up).unwrap(), "\"up\"");
        assert_eq!(
            serde_json::to_string(&TrendDirection::Down).unwrap(),
            "\"down\""
        );
        assert_eq!(
            serde_json::to_string(&TrendDirection::Stable).unwrap(),
            "\"stable\""
        );
    }

    #[test]
    fn direction_defaults_to_stable() {
        assert_eq!(TrendDirection::default(), TrendDirection::Stable);
        assert_eq!(TrendDirection::default().to_string(), "stable");
    }
}
