//! Integration tests for the trend-weather pipeline
//!
//! Drives join -> aggregate -> report on synthetic data, without touching
//! either upstream API.

use chrono::NaiveDate;
use tempfile::tempdir;

use trend_weather::analysis::{aggregate, join};
use trend_weather::config::ClassificationConfig;
use trend_weather::models::{DailyTrendRecord, DailyWeatherRecord, WeatherCategory};
use trend_weather::{MissingDataPolicy, report};

fn trend(date: &str, keyword: &str, interest: f64) -> DailyTrendRecord {
    DailyTrendRecord {
        date: date.parse().unwrap(),
        keyword: keyword.to_string(),
        interest,
    }
}

fn weather(date: &str, rain_sum: f64, snowfall_sum: f64) -> DailyWeatherRecord {
    DailyWeatherRecord {
        date: date.parse().unwrap(),
        precipitation_sum: rain_sum + snowfall_sum,
        rain_sum,
        snowfall_sum,
    }
}

/// A small year fragment with every weather category for two keywords
fn test_inputs() -> (Vec<DailyTrendRecord>, Vec<DailyWeatherRecord>) {
    let trends = vec![
        trend("2024-01-15", "골프 예약", 18.0),
        trend("2024-02-10", "골프 예약", 22.0),
        trend("2024-03-01", "골프 예약", 25.0),
        trend("2024-06-01", "골프 예약", 40.0),
        trend("2024-01-15", "골프장", 30.0),
        trend("2024-02-10", "골프장", 35.0),
        trend("2024-03-01", "골프장", 45.0),
        trend("2024-06-01", "골프장", 60.0),
    ];
    let weather_days = vec![
        weather("2024-01-15", 0.0, 3.0),
        weather("2024-02-10", 1.5, 1.2),
        weather("2024-03-01", 2.0, 0.0),
        weather("2024-06-01", 0.3, 0.0),
    ];
    (trends, weather_days)
}

#[test]
fn test_full_pipeline_produces_all_outputs() {
    let (trends, weather_days) = test_inputs();

    let outcome = join(
        &trends,
        &weather_days,
        &ClassificationConfig::default(),
        MissingDataPolicy::Drop,
    )
    .unwrap();
    assert_eq!(outcome.records.len(), 8);
    assert_eq!(outcome.dropped_pairs, 0);

    let summaries = aggregate(&outcome.records);
    // Two keywords, four categories each.
    assert_eq!(summaries.len(), 8);

    let dir = tempdir().unwrap();
    let daily_path = dir.path().join("daily.csv");
    let summary_path = dir.path().join("summary.csv");
    let chart_path = dir.path().join("chart.html");

    report::write_daily_csv(&daily_path, &outcome.records).unwrap();
    report::write_summary_csv(&summary_path, &summaries).unwrap();
    report::render_chart(&chart_path, &summaries).unwrap();

    let daily = std::fs::read_to_string(&daily_path).unwrap();
    assert_eq!(daily.lines().count(), 9);
    assert!(daily.contains("2024-01-15,골프 예약,18.0,0.0,3.0,snow"));
    assert!(daily.contains("2024-02-10,골프장,35.0,1.5,1.2,mixed"));
    assert!(daily.contains("2024-03-01,골프장,45.0,2.0,0.0,rain"));
    assert!(daily.contains("2024-06-01,골프장,60.0,0.3,0.0,dry"));

    let summary = std::fs::read_to_string(&summary_path).unwrap();
    assert_eq!(summary.lines().count(), 9);
    // The dry row is its own baseline.
    assert!(summary.contains("골프장,dry,60.0,0.0"));
    assert!(summary.contains("골프장,rain,45.0,-15.0"));

    assert!(chart_path.exists());
}

#[test]
fn test_pipeline_classification_matches_date_scenarios() {
    let (trends, weather_days) = test_inputs();
    let outcome = join(
        &trends,
        &weather_days,
        &ClassificationConfig::default(),
        MissingDataPolicy::Drop,
    )
    .unwrap();

    let category_of = |date: &str| {
        let date: NaiveDate = date.parse().unwrap();
        outcome
            .records
            .iter()
            .find(|r| r.date == date)
            .map(|r| r.category)
            .unwrap()
    };

    assert_eq!(category_of("2024-01-15"), WeatherCategory::Snow);
    assert_eq!(category_of("2024-02-10"), WeatherCategory::Mixed);
    assert_eq!(category_of("2024-03-01"), WeatherCategory::Rain);
    assert_eq!(category_of("2024-06-01"), WeatherCategory::Dry);
}

#[test]
fn test_pipeline_drops_and_counts_alignment_gaps() {
    let (mut trends, weather_days) = test_inputs();
    // Remove one trend row: its weather day is still present, so the
    // (date, keyword) pair is dropped and counted.
    trends.retain(|t| !(t.keyword == "골프장" && t.date == "2024-03-01".parse().unwrap()));

    let outcome = join(
        &trends,
        &weather_days,
        &ClassificationConfig::default(),
        MissingDataPolicy::Drop,
    )
    .unwrap();

    assert_eq!(outcome.records.len(), 7);
    assert_eq!(outcome.dropped_pairs, 1);

    // Aggregation still covers the untouched keyword in full.
    let summaries = aggregate(&outcome.records);
    let total_for_keyword: usize = outcome
        .records
        .iter()
        .filter(|r| r.keyword == "골프 예약")
        .count();
    assert_eq!(total_for_keyword, 4);
    assert!(summaries.iter().any(|s| s.keyword == "골프장"));
}

#[test]
fn test_pipeline_fail_policy_rejects_gaps() {
    let (trends, mut weather_days) = test_inputs();
    weather_days.pop();

    let result = join(
        &trends,
        &weather_days,
        &ClassificationConfig::default(),
        MissingDataPolicy::Fail,
    );

    assert!(result.is_err());
}
