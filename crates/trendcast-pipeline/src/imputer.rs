//! Model-based imputation of missing `trend_score` values.

use trendcast_core::PostRecord;

use crate::error::PipelineError;
use crate::features::imputer_feature_vector;
use crate::regression::{ConstantRegressor, Regressor};
use crate::table::ScoredPost;

const STAGE: &str = "score imputer";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImputerConfig {
    /// Value predicted for every missing score when no row has an observed
    /// score to learn from.
    pub fallback_score: f64,
}

impl Default for ImputerConfig {
    fn default() -> Self {
        Self {
            fallback_score: 0.0,
        }
    }
}

/// Learns `trend_score` from engagement and content features and fills the
/// rows where it is missing.
pub struct ScoreImputer {
    model: Box<dyn Regressor>,
    config: ImputerConfig,
    trained: bool,
}

impl ScoreImputer {
    #[must_use]
    pub fn new(model: Box<dyn Regressor>, config: ImputerConfig) -> Self {
        Self {
            model,
            config,
            trained: false,
        }
    }

    /// Fit the model on the rows that have an observed score.
    ///
    /// If no row has one, the model is replaced by a constant predictor of
    /// [`ImputerConfig::fallback_score`].
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::EmptyDataset`] for zero rows, or any error the
    /// model raises while fitting.
    pub fn train(&mut self, posts: &[PostRecord]) -> Result<(), PipelineError> {
        if posts.is_empty() {
            return Err(PipelineError::EmptyDataset { stage: STAGE });
        }

        let (x, y): (Vec<Vec<f64>>, Vec<f64>) = posts
            .iter()
            .filter_map(|post| {
                post.trend_score
                    .filter(|s| s.is_finite())
                    .map(|score| (imputer_feature_vector(post), score))
            })
            .unzip();

        if y.is_empty() {
            tracing::warn!(
                stage = STAGE,
                rows = posts.len(),
                fallback = self.config.fallback_score,
                "no observed scores to train on; using constant fallback"
            );
            self.model = Box::new(ConstantRegressor::fixed(self.config.fallback_score));
        } else {
            self.model.fit(&x, &y)?;
            tracing::debug!(
                stage = STAGE,
                model = self.model.name(),
                observed = y.len(),
                "imputer trained"
            );
        }

        self.trained = true;
        Ok(())
    }

    /// Fill missing scores and expose the result as `predicted_trend_score`.
    ///
    /// Observed scores are passed through unchanged. Imputed values are
    /// clamped to `[0, 1]` and also written into `trend_score`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::ModelNotFitted`] before [`ScoreImputer::train`],
    /// or [`PipelineError::Model`] if the model yields a non-finite value.
    pub fn predict_missing(
        &self,
        posts: Vec<PostRecord>,
    ) -> Result<Vec<ScoredPost>, PipelineError> {
        if !self.trained {
            return Err(PipelineError::ModelNotFitted { stage: STAGE });
        }

        let missing: Vec<Vec<f64>> = posts
            .iter()
            .filter(|p| !p.trend_score.is_some_and(f64::is_finite))
            .map(imputer_feature_vector)
            .collect();
        let predictions = if missing.is_empty() {
            Vec::new()
        } else {
            self.model.predict(&missing)?
        };
        if predictions.len() != missing.len() {
            return Err(PipelineError::Model(format!(
                "{STAGE}: model returned {} predictions for {} rows",
                predictions.len(),
                missing.len()
            )));
        }
        tracing::debug!(stage = STAGE, imputed = missing.len(), "filled missing scores");

        let mut predictions = predictions.into_iter();
        posts
            .into_iter()
            .map(|mut post| {
                let score = match post.trend_score.filter(|s| s.is_finite()) {
                    Some(observed) => observed,
                    None => {
                        let predicted = predictions.next().ok_or_else(|| {
                            PipelineError::Model(format!("{STAGE}: prediction stream ended early"))
                        })?;
                        if !predicted.is_finite() {
                            return Err(PipelineError::Model(format!(
                                "{STAGE}: non-finite prediction for trend '{}'",
                                post.trend_name
                            )));
                        }
                        let bounded = predicted.clamp(0.0, 1.0);
                        post.trend_score = Some(bounded);
                        bounded
                    }
                };
                Ok(ScoredPost {
                    post,
                    predicted_trend_score: score,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forest::{ForestConfig, RandomForestRegressor};
    use crate::table::test_support::post;

    fn forest_imputer() -> ScoreImputer {
        ScoreImputer::new(
            Box::new(RandomForestRegressor::new(ForestConfig::default())),
            ImputerConfig::default(),
        )
    }

    fn mixed_posts() -> Vec<PostRecord> {
        vec![
            post("bucket hat", 0, Some(0.2)),
            post("bucket hat", 1, None),
            post("bucket hat", 2, Some(0.3)),
            post("neon colors", 0, Some(0.7)),
            post("neon colors", 1, None),
        ]
    }

    #[test]
    fn observed_scores_pass_through_unchanged() {
        let posts = mixed_posts();
        let mut imputer = forest_imputer();
        imputer.train(&posts).unwrap();
        let scored = imputer.predict_missing(posts.clone()).unwrap();

        assert_eq!(scored.len(), posts.len());
        for (before, after) in posts.iter().zip(&scored) {
            if let Some(observed) = before.trend_score {
                assert_eq!(after.post.trend_score, Some(observed));
                assert_eq!(after.predicted_trend_score, observed);
            }
        }
    }

    #[test]
    fn missing_scores_are_filled_with_finite_bounded_values() {
        let posts = mixed_posts();
        let mut imputer = forest_imputer();
        imputer.train(&posts).unwrap();
        let scored = imputer.predict_missing(posts).unwrap();

        for row in &scored {
            let filled = row.post.trend_score.expect("every score filled");
            assert!(filled.is_finite());
            assert!((0.0..=1.0).contains(&filled));
            assert_eq!(filled, row.predicted_trend_score);
        }
    }

    #[test]
    fn all_null_scores_use_fallback_constant() {
        let posts = vec![post("a", 0, None), post("a", 1, None)];
        let mut imputer = ScoreImputer::new(
            Box::new(RandomForestRegressor::default()),
            ImputerConfig {
                fallback_score: 0.25,
            },
        );
        imputer.train(&posts).unwrap();
        let scored = imputer.predict_missing(posts).unwrap();
        assert!(scored.iter().all(|r| r.predicted_trend_score == 0.25));
        assert!(scored.iter().all(|r| r.post.trend_score == Some(0.25)));
    }

    #[test]
    fn out_of_range_predictions_are_clamped() {
        let posts = vec![post("a", 0, None)];
        let mut imputer = ScoreImputer::new(
            Box::new(ConstantRegressor::fixed(1.7)),
            ImputerConfig::default(),
        );
        imputer.train(&[post("a", 1, Some(0.5))]).unwrap();
        let scored = imputer.predict_missing(posts).unwrap();
        assert_eq!(scored[0].predicted_trend_score, 1.0);
    }

    #[test]
    fn non_finite_prediction_is_an_error() {
        let mut imputer = ScoreImputer::new(
            Box::new(ConstantRegressor::fixed(f64::NAN)),
            ImputerConfig::default(),
        );
        imputer.train(&[post("a", 0, Some(0.5))]).unwrap();
        let err = imputer.predict_missing(vec![post("a", 1, None)]).unwrap_err();
        assert!(matches!(err, PipelineError::Model(_)));
    }

    #[test]
    fn empty_dataset_cannot_be_trained() {
        let mut imputer = forest_imputer();
        assert!(matches!(
            imputer.train(&[]),
            Err(PipelineError::EmptyDataset { .. })
        ));
    }

    #[test]
    fn predicting_before_training_fails() {
        let imputer = forest_imputer();
        assert!(matches!(
            imputer.predict_missing(vec![post("a", 0, None)]),
            Err(PipelineError::ModelNotFitted { .. })
        ));
    }

    #[test]
    fn fully_observed_dataset_skips_the_model() {
        let posts = vec![post("a", 0, Some(0.1)), post("a", 1, Some(0.9))];
        let mut imputer = forest_imputer();
        imputer.train(&posts).unwrap();
        let scored = imputer.predict_missing(posts).unwrap();
        let values: Vec<f64> = scored.iter().map(|r| r.predicted_trend_score).collect();
        assert_eq!(values, vec![0.1, 0.9]);
    }
}
