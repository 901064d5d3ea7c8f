//! Random forest regressor backed by `aprender`.
//!
//! `aprender` grows bootstrap-aggregated CART trees on `f32` matrices with a
//! per-tree seed of `random_state + i`; this module adapts it to the
//! [`Regressor`] seam used by the imputer and the forecaster.

use aprender::primitives::{Matrix, Vector};
use aprender::tree::RandomForestRegressor as AprenderForest;

use crate::error::PipelineError;
use crate::regression::{validate_training_set, validate_width, Regressor, RegressorFactory};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForestConfig {
    pub n_estimators: usize,
    /// `None` grows trees until leaves are pure or hold a single sample.
    pub max_depth: Option<usize>,
    pub random_state: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_estimators: 50,
            max_depth: None,
            random_state: 42,
        }
    }
}

impl RegressorFactory for ForestConfig {
    fn build(&self) -> Box<dyn Regressor> {
        Box::new(RandomForestRegressor::new(*self))
    }
}

/// Random forest regressor over dense `f64` features.
#[derive(Debug, Clone)]
pub struct RandomForestRegressor {
    config: ForestConfig,
    model: Option<AprenderForest>,
    n_features: usize,
}

impl RandomForestRegressor {
    #[must_use]
    pub fn new(config: ForestConfig) -> Self {
        Self {
            config,
            model: None,
            n_features: 0,
        }
    }

    #[must_use]
    pub fn is_fitted(&self) -> bool {
        self.model.is_some()
    }

    fn untrained(&self) -> AprenderForest {
        let forest = AprenderForest::new(self.config.n_estimators)
            .with_random_state(self.config.random_state);
        match self.config.max_depth {
            Some(depth) => forest.with_max_depth(depth),
            None => forest,
        }
    }
}

impl Default for RandomForestRegressor {
    fn default() -> Self {
        Self::new(ForestConfig::default())
    }
}

#[allow(clippy::cast_possible_truncation)]
fn to_matrix(x: &[Vec<f64>], n_features: usize) -> Result<Matrix<f32>, PipelineError> {
    let data: Vec<f32> = x.iter().flatten().map(|&v| v as f32).collect();
    Matrix::from_vec(x.len(), n_features, data)
        .map_err(|e| PipelineError::Model(format!("random forest: {e}")))
}

#[allow(clippy::cast_possible_truncation)]
fn to_vector(y: &[f64]) -> Vector<f32> {
    let data: Vec<f32> = y.iter().map(|&v| v as f32).collect();
    Vector::from_slice(&data)
}

impl Regressor for RandomForestRegressor {
    fn name(&self) -> &'static str {
        "random_forest"
    }

    fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<(), PipelineError> {
        let n_features = validate_training_set("random forest", x, y)?;
        if self.config.n_estimators == 0 {
            return Err(PipelineError::InvalidConfig(
                "random forest needs at least one tree".to_string(),
            ));
        }
        if x.iter().flatten().any(|v| !v.is_finite()) {
            return Err(PipelineError::Model(
                "random forest: features must be finite".to_string(),
            ));
        }

        let mut model = self.untrained();
        model
            .fit(&to_matrix(x, n_features)?, &to_vector(y))
            .map_err(|e| PipelineError::Model(format!("random forest: {e}")))?;

        self.model = Some(model);
        self.n_features = n_features;
        Ok(())
    }

    fn predict(&self, x: &[Vec<f64>]) -> Result<Vec<f64>, PipelineError> {
        let Some(model) = &self.model else {
            return Err(PipelineError::ModelNotFitted {
                stage: "random forest",
            });
        };
        validate_width(x, self.n_features)?;
        if x.is_empty() {
            return Ok(Vec::new());
        }

        let predictions = model.predict(&to_matrix(x, self.n_features)?);
        Ok(predictions
            .as_slice()
            .iter()
            .map(|&p| f64::from(p))
            .collect())
    }
}
