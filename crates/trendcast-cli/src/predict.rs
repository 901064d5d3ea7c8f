use std::path::Path;

use anyhow::Context;
use trendcast_core::{AppConfig, PostRecord};
use trendcast_pipeline::{
    build_trend_summary, parse_trend_filter, popularity_over_time, run_trend_pipeline,
    PipelineConfig,
};

use crate::View;

const POPULARITY_DEFAULT_LIMIT: i64 = 500;

pub(crate) async fn run_predict(
    config: &AppConfig,
    input: Option<&Path>,
    limit: Option<i64>,
    view: View,
) -> anyhow::Result<()> {
    let limit = limit.unwrap_or(config.fetch_limit);
    let posts = match input {
        Some(path) => most_recent(read_posts_file(path)?, limit),
        None => {
            let pool = trendcast_db::connect_pool_from_config(config).await?;
            trendcast_db::fetch_posts(&pool, limit).await?
        }
    };

    let pipeline = PipelineConfig::from_app_config(config);
    let rendered = render_view(posts, &pipeline, view)?;
    println!("{}", serde_json::to_string_pretty(&rendered)?);
    Ok(())
}

pub(crate) async fn run_popularity(
    config: &AppConfig,
    input: Option<&Path>,
    trends: Option<&str>,
    limit: Option<i64>,
) -> anyhow::Result<()> {
    let filter = parse_trend_filter(trends);
    let limit = limit.unwrap_or(POPULARITY_DEFAULT_LIMIT);
    let posts = match input {
        Some(path) => most_recent(read_posts_file(path)?, limit),
        None => {
            let pool = trendcast_db::connect_pool_from_config(config).await?;
            trendcast_db::fetch_trend_history(&pool, filter.as_deref(), limit).await?
        }
    };

    let points = popularity_over_time(&posts, filter.as_deref());
    println!("{}", serde_json::to_string_pretty(&points)?);
    Ok(())
}

/// Run the pipeline and pick the table `view` asks for.
pub(crate) fn render_view(
    posts: Vec<PostRecord>,
    pipeline: &PipelineConfig,
    view: View,
) -> anyhow::Result<serde_json::Value> {
    let value = match view {
        View::Rows => {
            serde_json::to_value(run_trend_pipeline(posts, pipeline, &pipeline.forest)?.rows)?
        }
        View::Overview => {
            serde_json::to_value(run_trend_pipeline(posts, pipeline, &pipeline.forest)?.overview)?
        }
        View::Summary => {
            serde_json::to_value(build_trend_summary(posts, pipeline, &pipeline.forest)?)?
        }
    };
    Ok(value)
}

pub(crate) fn read_posts_file(path: &Path) -> anyhow::Result<Vec<PostRecord>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read posts file {}", path.display()))?;
    let posts: Vec<PostRecord> = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse posts file {}", path.display()))?;
    tracing::info!(path = %path.display(), rows = posts.len(), "loaded posts");
    Ok(posts)
}

/// Keep the `limit` newest posts, newest first, like the database fetch.
pub(crate) fn most_recent(mut posts: Vec<PostRecord>, limit: i64) -> Vec<PostRecord> {
    posts.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    posts.truncate(usize::try_from(limit.max(0)).unwrap_or(usize::MAX));
    posts
}
