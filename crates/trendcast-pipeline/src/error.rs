use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// A stage that fits a model received zero rows.
    #[error("{stage}: cannot train on an empty dataset")]
    EmptyDataset { stage: &'static str },

    /// A stage asked a row for a score column it does not carry.
    #[error("missing column: {column}")]
    MissingColumn { column: &'static str },

    #[error("{stage}: model used before it was trained")]
    ModelNotFitted { stage: &'static str },

    #[error("feature shape mismatch: expected {expected} columns, got {got}")]
    FeatureShape { expected: usize, got: usize },

    #[error("model error: {0}")]
    Model(String),

    #[error("invalid pipeline configuration: {0}")]
    InvalidConfig(String),
}
