//! Live integration tests for trendcast-db using `#[sqlx::test]`.
//!
//! Each test gets a fresh, fully-migrated Postgres database spun up by the
//! sqlx test harness. Run with `DATABASE_URL` set and `--ignored`.

use chrono::{Duration, TimeZone, Utc};
use trendcast_core::PostRecord;
use trendcast_db::{fetch_posts, fetch_trend_history, health_check, insert_post, DbError};

fn post(trend: &str, hour: i64, score: Option<f64>) -> PostRecord {
    PostRecord {
        trend_name: trend.to_string(),
        content: format!("{trend} post {hour}"),
        hashtags: Vec::new(),
        tags: vec!["street".to_string()],
        timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap() + Duration::hours(hour),
        likes: 100,
        shares: 10,
        comments: 5,
        trend_score: score,
    }
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn fetch_posts_returns_most_recent_first(pool: sqlx::PgPool) {
    for hour in 0..5 {
        insert_post(&pool, &post("bucket hat", hour, Some(0.5)))
            .await
            .unwrap();
    }

    let posts = fetch_posts(&pool, 3).await.unwrap();
    let hours: Vec<_> = posts.iter().map(|p| p.timestamp).collect();
    assert_eq!(posts.len(), 3);
    assert!(hours.windows(2).all(|w| w[0] > w[1]));
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn null_arrays_come_back_empty(pool: sqlx::PgPool) {
    sqlx::query(
        "INSERT INTO fashion_posts (trend_name, timestamp, likes, shares, comments) \
         VALUES ('neon colors', NOW(), 1, 1, 1)",
    )
    .execute(&pool)
    .await
    .unwrap();

    let posts = fetch_posts(&pool, 10).await.unwrap();
    assert_eq!(posts.len(), 1);
    assert!(posts[0].hashtags.is_empty());
    assert!(posts[0].tags.is_empty());
    assert_eq!(posts[0].content, "");
    assert_eq!(posts[0].trend_score, None);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn trend_history_filters_and_orders(pool: sqlx::PgPool) {
    insert_post(&pool, &post("neon colors", 1, Some(0.2))).await.unwrap();
    insert_post(&pool, &post("bucket hat", 2, Some(0.4))).await.unwrap();
    insert_post(&pool, &post("bucket hat", 0, None)).await.unwrap();
    insert_post(&pool, &post("wide jeans", 3, Some(0.9))).await.unwrap();

    let names = vec!["bucket hat".to_string(), "neon colors".to_string()];
    let history = fetch_trend_history(&pool, Some(names.as_slice()), 100).await.unwrap();
    let keys: Vec<(&str, Option<f64>)> = history
        .iter()
        .map(|p| (p.trend_name.as_str(), p.trend_score))
        .collect();
    assert_eq!(
        keys,
        vec![("bucket hat", None), ("bucket hat", Some(0.4)), ("neon colors", Some(0.2))]
    );

    let everything = fetch_trend_history(&pool, None, 100).await.unwrap();
    assert_eq!(everything.len(), 4);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn zero_limit_is_rejected(pool: sqlx::PgPool) {
    assert!(matches!(
        fetch_posts(&pool, 0).await,
        Err(DbError::InvalidLimit(0))
    ));
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn health_check_succeeds(pool: sqlx::PgPool) {
    health_check(&pool).await.unwrap();
}
