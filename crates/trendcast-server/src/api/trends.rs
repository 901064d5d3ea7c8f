use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::Deserialize;
use trendcast_pipeline::{
    build_trend_summary, parse_trend_filter, popularity_over_time, run_trend_pipeline,
    PipelineError, PipelineOutput, PopularityPoint, TrendSummary,
};

use crate::middleware::RequestId;

use super::{
    map_db_error, map_pipeline_error, normalize_limit, ApiError, ApiResponse, AppState,
    ResponseMeta,
};

const POPULARITY_DEFAULT_LIMIT: i64 = 500;

#[derive(Debug, Deserialize)]
pub(super) struct TrendsQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(super) struct PopularityQuery {
    /// Comma-separated trend names.
    pub trend_names: Option<String>,
    pub limit: Option<i64>,
}

pub(super) async fn list_predictions(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<TrendsQuery>,
) -> Result<Json<ApiResponse<PipelineOutput>>, ApiError> {
    let limit = normalize_limit(query.limit, state.fetch_limit);
    let posts = trendcast_db::fetch_posts(&state.pool, limit)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let config = state.pipeline;
    let data = run_blocking(req_id.0.clone(), move || {
        run_trend_pipeline(posts, &config, &config.forest)
    })
    .await?;

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn list_summary(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<TrendsQuery>,
) -> Result<Json<ApiResponse<Vec<TrendSummary>>>, ApiError> {
    let limit = normalize_limit(query.limit, state.fetch_limit);
    let posts = trendcast_db::fetch_posts(&state.pool, limit)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let config = state.pipeline;
    let data = run_blocking(req_id.0.clone(), move || {
        build_trend_summary(posts, &config, &config.forest)
    })
    .await?;

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn list_popularity(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<PopularityQuery>,
) -> Result<Json<ApiResponse<Vec<PopularityPoint>>>, ApiError> {
    let filter = parse_trend_filter(query.trend_names.as_deref());
    let limit = normalize_limit(query.limit, POPULARITY_DEFAULT_LIMIT);
    let posts = trendcast_db::fetch_trend_history(&state.pool, filter.as_deref(), limit)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: popularity_over_time(&posts, filter.as_deref()),
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// Run a pipeline job on the blocking pool so model training never stalls
/// the async workers.
async fn run_blocking<T, F>(request_id: String, job: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, PipelineError> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(job).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(map_pipeline_error(request_id, &e)),
        Err(e) => {
            tracing::error!(error = %e, "pipeline task did not complete");
            Err(ApiError::new(
                request_id,
                "internal_error",
                "pipeline task failed",
            ))
        }
    }
}
