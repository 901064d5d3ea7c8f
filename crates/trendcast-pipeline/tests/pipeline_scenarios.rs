//! End-to-end scenarios over the public pipeline API.

use chrono::{DateTime, Duration, TimeZone, Utc};
use trendcast_core::{OverallDirectionPolicy, PostRecord, TrendDirection};
use trendcast_pipeline::{
    merge_forecasts, parse_trend_filter, popularity_over_time, run_trend_pipeline,
    DirectedRow, DirectionClassifier, DirectionConfig, ForecastRecord, ForestConfig,
    PipelineConfig, ScoreColumn, ScoredPost, SeriesFeatureExpander, TrendRecord, WindowConfig,
};

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 9, 1, 9, 0, 0).unwrap()
}

fn post(trend: &str, step: i64, score: Option<f64>, likes: u64) -> PostRecord {
    PostRecord {
        trend_name: trend.to_string(),
        content: format!("{trend} outfit {step}"),
        hashtags: vec![format!("#{}", trend.replace(' ', ""))],
        tags: vec!["ootd".to_string(), "style".to_string()],
        timestamp: start() + Duration::days(step),
        likes,
        shares: likes / 10,
        comments: likes / 20,
        trend_score: score,
    }
}

fn forest() -> ForestConfig {
    ForestConfig {
        n_estimators: 20,
        ..ForestConfig::default()
    }
}

#[test]
fn bucket_hat_directions_through_the_full_pipeline() {
    let posts = vec![
        post("bucket hat", 2, Some(0.30), 300),
        post("bucket hat", 0, Some(0.20), 200),
        post("bucket hat", 1, Some(0.35), 350),
    ];
    let out = run_trend_pipeline(posts, &PipelineConfig::default(), &forest()).unwrap();

    let directions: Vec<TrendDirection> = out.rows.iter().map(|r| r.trend_direction).collect();
    assert_eq!(
        directions,
        vec![TrendDirection::Stable, TrendDirection::Up, TrendDirection::Down]
    );
    let predicted: Vec<f64> = out.rows.iter().map(|r| r.predicted_trend_score).collect();
    assert_eq!(predicted, vec![0.20, 0.35, 0.30]);

    assert_eq!(out.overview.len(), 1);
    assert_eq!(out.overview[0].baseline_score, 0.20);
    assert_eq!(out.overview[0].latest_score, 0.30);
    assert_eq!(out.overview[0].trend_direction, TrendDirection::Up);
}

#[test]
fn all_null_trend_is_filled_within_bounds() {
    let mut posts = Vec::new();
    for step in 0..5 {
        posts.push(post("cargo pants", step, None, 100 + 40 * u64::try_from(step).unwrap()));
        posts.push(post(
            "bucket hat",
            step,
            Some(0.1 + 0.15 * f64::from(u8::try_from(step).unwrap())),
            120 + 35 * u64::try_from(step).unwrap(),
        ));
    }
    let out = run_trend_pipeline(posts, &PipelineConfig::default(), &forest()).unwrap();

    let cargo: Vec<&TrendRecord> = out
        .rows
        .iter()
        .filter(|r| r.post.trend_name == "cargo pants")
        .collect();
    assert_eq!(cargo.len(), 5);
    for row in cargo {
        let filled = row.post.trend_score.expect("imputed");
        assert!(filled.is_finite());
        assert!((0.0..=1.0).contains(&filled));
        assert_eq!(filled, row.predicted_trend_score);
    }
}

#[test]
fn dataset_without_any_observed_score_uses_fallback() {
    let posts = vec![
        post("ballet flats", 0, None, 50),
        post("ballet flats", 1, None, 80),
    ];
    let out = run_trend_pipeline(posts, &PipelineConfig::default(), &forest()).unwrap();
    assert!(out.rows.iter().all(|r| r.predicted_trend_score == 0.0));
    assert!(out
        .rows
        .iter()
        .all(|r| r.trend_direction == TrendDirection::Stable));
}

#[test]
fn neon_colors_overall_direction_is_up() {
    let rows: Vec<TrendRecord> = [(0, 0.1, 0.3), (1, 0.2, 0.3), (2, 0.3, 0.3)]
        .into_iter()
        .map(|(step, predicted, forecasted)| TrendRecord {
            post: post("neon colors", step, Some(predicted), 100),
            predicted_trend_score: predicted,
            forecasted_trend_score: forecasted,
            prev_score: None,
            score_change: None,
            trend_direction: TrendDirection::Stable,
        })
        .collect();

    let first_last = DirectionClassifier::new(DirectionConfig::default()).unwrap();
    let overview = first_last
        .compute_overall_direction(&rows, ScoreColumn::PredictedTrendScore)
        .unwrap();
    assert_eq!(overview[0].trend_direction, TrendDirection::Up);
    assert!((overview[0].score_change - 0.2).abs() < 1e-12);

    let means = DirectionClassifier::new(DirectionConfig {
        overall_policy: OverallDirectionPolicy::PredictedToForecast,
        ..DirectionConfig::default()
    })
    .unwrap();
    let overview = means
        .compute_overall_direction(&rows, ScoreColumn::PredictedTrendScore)
        .unwrap();
    assert_eq!(overview[0].trend_direction, TrendDirection::Up);
}

#[test]
fn merge_replicates_forecast_and_zero_fills_unmatched() {
    let rows: Vec<DirectedRow<ScoredPost>> = [("bucket hat", 0), ("bucket hat", 1), ("wide jeans", 0)]
        .into_iter()
        .map(|(trend, step)| DirectedRow {
            row: ScoredPost {
                post: post(trend, step, Some(0.4), 100),
                predicted_trend_score: 0.4,
            },
            prev_score: None,
            score_change: None,
            trend_direction: TrendDirection::Stable,
        })
        .collect();
    let forecasts = vec![ForecastRecord {
        trend_name: "bucket hat".to_string(),
        forecasted_trend_score: 0.55,
    }];

    let merged = merge_forecasts(rows, &forecasts);
    let scores: Vec<f64> = merged.iter().map(|r| r.forecasted_trend_score).collect();
    assert_eq!(scores, vec![0.55, 0.55, 0.0]);
}

#[test]
fn lag_and_rolling_properties_hold_per_series() {
    let scores = [0.2, 0.5, 0.4, 0.9, 0.7];
    let mut posts: Vec<PostRecord> = scores
        .iter()
        .enumerate()
        .map(|(i, s)| post("bucket hat", i64::try_from(i).unwrap(), Some(*s), 100))
        .collect();
    posts.push(post("neon colors", 0, Some(0.95), 100));

    let expander = SeriesFeatureExpander::new(WindowConfig::default()).unwrap();
    let expanded = expander.expand(&posts, ScoreColumn::TrendScore).unwrap();

    for (i, row) in expanded.iter().take(scores.len()).enumerate() {
        let expected_prev = if i == 0 { 0.0 } else { scores[i - 1] };
        assert!((row.features.prev_score - expected_prev).abs() < 1e-12);
        let window = &scores[i.saturating_sub(2)..=i];
        #[allow(clippy::cast_precision_loss)]
        let mean = window.iter().sum::<f64>() / window.len() as f64;
        assert!((row.features.rolling_mean - mean).abs() < 1e-12);
    }
    let neon = &expanded[scores.len()];
    assert_eq!(neon.row.trend_name, "neon colors");
    assert_eq!(neon.features.prev_score, 0.0);
}

#[test]
fn popularity_view_filters_and_orders() {
    let posts = vec![
        post("wide jeans", 1, Some(0.6), 100),
        post("bucket hat", 1, Some(0.4), 100),
        post("bucket hat", 0, Some(0.3), 100),
    ];
    let filter = parse_trend_filter(Some("bucket hat"));
    let points = popularity_over_time(&posts, filter.as_deref());
    assert_eq!(points.len(), 2);
    assert!(points[0].post.timestamp < points[1].post.timestamp);
}

#[test]
fn pipeline_runs_are_reproducible() {
    let posts: Vec<PostRecord> = (0..6)
        .map(|step| {
            let score = if step % 2 == 0 { None } else { Some(0.5) };
            post("quiet luxury", step, score, 90 + 20 * u64::try_from(step).unwrap())
        })
        .collect();
    let config = PipelineConfig::default();
    let a = run_trend_pipeline(posts.clone(), &config, &forest()).unwrap();
    let b = run_trend_pipeline(posts, &config, &forest()).unwrap();
    assert_eq!(a, b);
}
