//! Optional seeded noise on observed scores.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use trendcast_core::PostRecord;

/// Add uniform noise in `[-amplitude, amplitude]` to every observed score and
/// clip the result to `[0, 1]`. Missing scores stay missing.
///
/// An amplitude of zero (or anything not strictly positive and finite) leaves
/// the posts untouched.
#[must_use]
pub fn jitter_observed_scores(
    mut posts: Vec<PostRecord>,
    amplitude: f64,
    seed: u64,
) -> Vec<PostRecord> {
    if !(amplitude.is_finite() && amplitude > 0.0) {
        return posts;
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut touched = 0usize;
    for post in &mut posts {
        if let Some(score) = post.trend_score.filter(|s| s.is_finite()) {
            let noise: f64 = rng.random_range(-amplitude..=amplitude);
            post.trend_score = Some((score + noise).clamp(0.0, 1.0));
            touched += 1;
        }
    }
    tracing::debug!(amplitude, seed, touched, "jittered observed scores");
    posts
}
