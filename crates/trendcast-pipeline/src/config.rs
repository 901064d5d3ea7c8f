use trendcast_core::AppConfig;

use crate::direction::{DirectionClassifier, DirectionConfig};
use crate::error::PipelineError;
use crate::forest::ForestConfig;
use crate::imputer::ImputerConfig;
use crate::timeseries::{SeriesFeatureExpander, WindowConfig};

/// Per-stage settings for one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PipelineConfig {
    pub direction: DirectionConfig,
    pub window: WindowConfig,
    pub forest: ForestConfig,
    pub imputer: ImputerConfig,
    /// Amplitude of the noise added to observed scores before imputation;
    /// `0.0` disables it.
    pub score_jitter: f64,
}

impl PipelineConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            direction: DirectionConfig {
                up_threshold: config.up_threshold,
                down_threshold: config.down_threshold,
                overall_policy: config.overall_policy,
            },
            window: WindowConfig {
                window_size: config.window_size,
            },
            forest: ForestConfig {
                n_estimators: config.forest_trees,
                max_depth: config.forest_max_depth,
                random_state: config.forest_seed,
                ..ForestConfig::default()
            },
            imputer: ImputerConfig {
                fallback_score: config.imputer_fallback_score,
            },
            score_jitter: config.score_jitter,
        }
    }

    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] for inverted or non-finite
    /// thresholds, a zero window, a zero-tree forest, or an out-of-range
    /// fallback score or jitter amplitude.
    pub fn validate(&self) -> Result<(), PipelineError> {
        DirectionClassifier::new(self.direction)?;
        SeriesFeatureExpander::new(self.window)?;
        if self.forest.n_estimators == 0 {
            return Err(PipelineError::InvalidConfig(
                "forest needs at least one tree".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.imputer.fallback_score) {
            return Err(PipelineError::InvalidConfig(format!(
                "imputer fallback score {} is outside [0, 1]",
                self.imputer.fallback_score
            )));
        }
        if !(0.0..1.0).contains(&self.score_jitter) {
            return Err(PipelineError::InvalidConfig(format!(
                "score jitter {} is outside [0, 1)",
                self.score_jitter
            )));
        }
        Ok(())
    }
}
