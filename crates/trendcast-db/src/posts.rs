//! Database operations for the `fashion_posts` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use trendcast_core::PostRecord;

use crate::DbError;

/// A row from the `fashion_posts` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FashionPostRow {
    pub id: i64,
    pub trend_name: String,
    pub content: Option<String>,
    pub hashtags: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub timestamp: DateTime<Utc>,
    pub likes: i64,
    pub shares: i64,
    pub comments: i64,
    pub trend_score: Option<f64>,
}

impl From<FashionPostRow> for PostRecord {
    fn from(row: FashionPostRow) -> Self {
        Self {
            trend_name: row.trend_name,
            content: row.content.unwrap_or_default(),
            hashtags: row.hashtags.unwrap_or_default(),
            tags: row.tags.unwrap_or_default(),
            timestamp: row.timestamp,
            likes: non_negative(row.likes),
            shares: non_negative(row.shares),
            comments: non_negative(row.comments),
            trend_score: row.trend_score,
        }
    }
}

fn non_negative(count: i64) -> u64 {
    u64::try_from(count).unwrap_or(0)
}

fn check_limit(limit: i64) -> Result<(), DbError> {
    if limit < 1 {
        return Err(DbError::InvalidLimit(limit));
    }
    Ok(())
}

/// Returns the `limit` most recent posts, newest first.
///
/// `hashtags`, `tags` and `content` are never null in the result.
///
/// # Errors
///
/// Returns [`DbError::InvalidLimit`] for `limit < 1`, or [`DbError::Sqlx`] if
/// the query fails.
pub async fn fetch_posts(pool: &PgPool, limit: i64) -> Result<Vec<PostRecord>, DbError> {
    check_limit(limit)?;
    let rows = sqlx::query_as::<_, FashionPostRow>(
        "SELECT id, trend_name, content, hashtags, tags, timestamp, \
                likes, shares, comments, trend_score \
         FROM fashion_posts \
         ORDER BY timestamp DESC, id DESC \
         LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    tracing::debug!(limit, rows = rows.len(), "fetched fashion posts");
    Ok(rows.into_iter().map(PostRecord::from).collect())
}

/// Returns the `limit` most recent posts for charting, optionally restricted
/// to `trend_names`, ordered by trend name then timestamp.
///
/// # Errors
///
/// Returns [`DbError::InvalidLimit`] for `limit < 1`, or [`DbError::Sqlx`] if
/// the query fails.
pub async fn fetch_trend_history(
    pool: &PgPool,
    trend_names: Option<&[String]>,
    limit: i64,
) -> Result<Vec<PostRecord>, DbError> {
    check_limit(limit)?;
    let rows = sqlx::query_as::<_, FashionPostRow>(
        "SELECT * FROM ( \
             SELECT id, trend_name, content, hashtags, tags, timestamp, \
                    likes, shares, comments, trend_score \
             FROM fashion_posts \
             WHERE $1::text[] IS NULL OR trend_name = ANY($1) \
             ORDER BY timestamp DESC, id DESC \
             LIMIT $2 \
         ) recent \
         ORDER BY trend_name, timestamp",
    )
    .bind(trend_names)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(PostRecord::from).collect())
}

/// Inserts one post and returns its generated `id`.
///
/// # Errors
///
/// Returns [`DbError::CountOutOfRange`] if an engagement count exceeds
/// `i64::MAX`, or [`DbError::Sqlx`] if the insert fails (including a score
/// outside `[0, 1]`).
pub async fn insert_post(pool: &PgPool, post: &PostRecord) -> Result<i64, DbError> {
    let count = |v: u64| i64::try_from(v).map_err(|_| DbError::CountOutOfRange(v));
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO fashion_posts \
             (trend_name, content, hashtags, tags, timestamp, likes, shares, comments, trend_score) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
         RETURNING id",
    )
    .bind(&post.trend_name)
    .bind(&post.content)
    .bind(&post.hashtags)
    .bind(&post.tags)
    .bind(post.timestamp)
    .bind(count(post.likes)?)
    .bind(count(post.shares)?)
    .bind(count(post.comments)?)
    .bind(post.trend_score)
    .fetch_one(pool)
    .await?;

    Ok(id)
}
