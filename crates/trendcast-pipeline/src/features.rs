//! Per-post content and engagement features.

use trendcast_core::PostRecord;

/// Column order of the imputer's feature vector.
pub const IMPUTER_FEATURES: [&str; 6] = [
    "likes",
    "shares",
    "comments",
    "content_length",
    "num_hashtags",
    "num_tags",
];

/// Features derived from a post's text attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ContentFeatures {
    /// Character count of `content` (not bytes). Empty content is 0.
    pub content_length: usize,
    pub num_hashtags: usize,
    pub num_tags: usize,
}

#[must_use]
pub fn build_features(post: &PostRecord) -> ContentFeatures {
    ContentFeatures {
        content_length: post.content.chars().count(),
        num_hashtags: post.hashtags.len(),
        num_tags: post.tags.len(),
    }
}

/// The 6-dimensional vector the score imputer trains and predicts on,
/// in [`IMPUTER_FEATURES`] order.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn imputer_feature_vector(post: &PostRecord) -> Vec<f64> {
    let content = build_features(post);
    vec![
        post.likes as f64,
        post.shares as f64,
        post.comments as f64,
        content.content_length as f64,
        content.num_hashtags as f64,
        content.num_tags as f64,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::test_support::post;

    #[test]
    fn counts_characters_not_bytes() {
        let mut p = post("bucket hat", 0, None);
        p.content = "café ☕".to_string();
        assert_eq!(build_features(&p).content_length, 6);
    }

    #[test]
    fn empty_content_and_lists_are_zero() {
        let mut p = post("bucket hat", 0, None);
        p.content.clear();
        p.hashtags.clear();
        p.tags.clear();
        assert_eq!(build_features(&p), ContentFeatures::default());
    }

    #[test]
    fn counts_hashtags_and_tags() {
        let mut p = post("bucket hat", 0, None);
        p.hashtags = vec!["#a".into(), "#b".into(), "#c".into()];
        p.tags = vec!["x".into()];
        let f = build_features(&p);
        assert_eq!(f.num_hashtags, 3);
        assert_eq!(f.num_tags, 1);
    }

    #[test]
    fn imputer_vector_follows_declared_order() {
        let mut p = post("bucket hat", 0, None);
        p.likes = 7;
        p.shares = 3;
        p.comments = 2;
        p.content = "abcd".to_string();
        p.hashtags = vec!["#x".into()];
        p.tags = vec![];
        assert_eq!(
            imputer_feature_vector(&p),
            vec![7.0, 3.0, 2.0, 4.0, 1.0, 0.0]
        );
        assert_eq!(IMPUTER_FEATURES.len(), imputer_feature_vector(&p).len());
    }
}
