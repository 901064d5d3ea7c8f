//! Regression capability used by the imputer and the forecaster.
//!
//! Any model that can `fit(x, y)` and `predict(x)` over dense `f64` feature
//! rows plugs in here. The pipeline asks a [`RegressorFactory`] for a fresh
//! model per stage per run.

use crate::error::PipelineError;

pub trait Regressor: Send {
    /// Short name used in log events.
    fn name(&self) -> &'static str;

    /// Fit the model to `x` (one row per sample) and targets `y`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::EmptyDataset`] for zero rows, or
    /// [`PipelineError::FeatureShape`] / [`PipelineError::Model`] when `x`
    /// and `y` are inconsistent.
    fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<(), PipelineError>;

    /// Predict one value per row of `x`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::ModelNotFitted`] before a successful `fit`,
    /// or [`PipelineError::FeatureShape`] if a row has the wrong width.
    fn predict(&self, x: &[Vec<f64>]) -> Result<Vec<f64>, PipelineError>;
}

/// Builds untrained models on demand.
pub trait RegressorFactory: Send + Sync {
    fn build(&self) -> Box<dyn Regressor>;
}

impl<F> RegressorFactory for F
where
    F: Fn() -> Box<dyn Regressor> + Send + Sync,
{
    fn build(&self) -> Box<dyn Regressor> {
        self()
    }
}

/// Check a training set and return its feature count.
pub(crate) fn validate_training_set(
    stage: &'static str,
    x: &[Vec<f64>],
    y: &[f64],
) -> Result<usize, PipelineError> {
    if x.is_empty() {
        return Err(PipelineError::EmptyDataset { stage });
    }
    if x.len() != y.len() {
        return Err(PipelineError::Model(format!(
            "{stage}: {} feature rows but {} targets",
            x.len(),
            y.len()
        )));
    }
    let width = x[0].len();
    validate_width(x, width)?;
    if y.iter().any(|v| !v.is_finite()) {
        return Err(PipelineError::Model(format!(
            "{stage}: training targets must be finite"
        )));
    }
    Ok(width)
}

pub(crate) fn validate_width(x: &[Vec<f64>], expected: usize) -> Result<(), PipelineError> {
    match x.iter().find(|row| row.len() != expected) {
        Some(row) => Err(PipelineError::FeatureShape {
            expected,
            got: row.len(),
        }),
        None => Ok(()),
    }
}

/// Predicts a single constant.
///
/// [`ConstantRegressor::mean`] learns the target mean on `fit`;
/// [`ConstantRegressor::fixed`] is ready to predict immediately and ignores
/// training data.
#[derive(Debug, Clone)]
pub struct ConstantRegressor {
    value: Option<f64>,
    learns: bool,
}

impl ConstantRegressor {
    #[must_use]
    pub fn mean() -> Self {
        Self {
            value: None,
            learns: true,
        }
    }

    #[must_use]
    pub fn fixed(value: f64) -> Self {
        Self {
            value: Some(value),
            learns: false,
        }
    }

    #[must_use]
    pub fn value(&self) -> Option<f64> {
        self.value
    }
}

impl Regressor for ConstantRegressor {
    fn name(&self) -> &'static str {
        "constant"
    }

    fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<(), PipelineError> {
        if !self.learns {
            return Ok(());
        }
        validate_training_set("constant regressor", x, y)?;
        #[allow(clippy::cast_precision_loss)]
        let mean = y.iter().sum::<f64>() / y.len() as f64;
        self.value = Some(mean);
        Ok(())
    }

    fn predict(&self, x: &[Vec<f64>]) -> Result<Vec<f64>, PipelineError> {
        let value = self.value.ok_or(PipelineError::ModelNotFitted {
            stage: "constant regressor",
        })?;
        Ok(vec![value; x.len()])
    }
}
