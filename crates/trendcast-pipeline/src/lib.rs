//! Trend-scoring pipeline for trendcast.
//!
//! Fills missing popularity scores with a regression model trained on
//! engagement and content features, forecasts a next-step score per post from
//! lag and rolling-window features, labels each row and each trend as
//! up/down/stable, and merges everything into dashboard-ready tables.
//!
//! Every stage is a transform from one table to a new one. Models are built
//! fresh per run through a [`RegressorFactory`]; nothing is cached between runs.

pub mod config;
pub mod direction;
pub mod error;
pub mod features;
pub mod forecaster;
pub mod forest;
pub mod history;
pub mod imputer;
pub mod jitter;
pub mod merge;
pub mod pipeline;
pub mod regression;
pub mod summary;
pub mod table;
pub mod timeseries;

pub use config::PipelineConfig;
pub use direction::{DirectedRow, DirectionClassifier, DirectionConfig, TrendOverview};
pub use error::PipelineError;
pub use features::{build_features, ContentFeatures};
pub use forecaster::{ForecastRecord, Forecaster};
pub use forest::{ForestConfig, RandomForestRegressor};
pub use history::{parse_trend_filter, popularity_over_time, PopularityPoint};
pub use imputer::{ImputerConfig, ScoreImputer};
pub use jitter::jitter_observed_scores;
pub use merge::{merge_forecasts, TrendRecord};
pub use pipeline::{forecast_scores, predict_scores, run_trend_pipeline, PipelineOutput};
pub use regression::{ConstantRegressor, Regressor, RegressorFactory};
pub use summary::{build_trend_summary, summarize_trends, TrendSummary};
pub use table::{ScoreColumn, ScoredPost, TrendRow};
pub use timeseries::{Expanded, SeriesFeatureExpander, SeriesFeatures, WindowConfig};
