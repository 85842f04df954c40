//! Join, classification and aggregation of the trend and weather series
//!
//! The trend series and the weather series are inner-joined on calendar
//! date, every joined row gets a precipitation category, and the joined
//! table is reduced to mean interest per (keyword, category) with a delta
//! against the keyword's dry-day baseline.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use anyhow::Result;
use chrono::NaiveDate;
use tracing::warn;

use crate::config::{ClassificationConfig, MissingDataPolicy};
use crate::error::TrendWeatherError;
use crate::models::{
    DailyTrendRecord, DailyWeatherRecord, JoinedRecord, SummaryRecord, WeatherCategory,
};

/// Joined table plus the count of (date, keyword) pairs dropped for
/// missing data on either side
#[derive(Debug, Clone, Default)]
pub struct JoinOutcome {
    pub records: Vec<JoinedRecord>,
    pub dropped_pairs: usize,
}

/// Classify one day by its precipitation sums. First match wins:
/// mixed, then snow, then rain, then dry.
#[must_use]
pub fn classify(
    rain_sum: f64,
    snowfall_sum: f64,
    config: &ClassificationConfig,
) -> WeatherCategory {
    if rain_sum >= config.rain_threshold_mm && snowfall_sum >= config.snow_threshold_mm {
        WeatherCategory::Mixed
    } else if snowfall_sum >= config.snow_threshold_mm {
        WeatherCategory::Snow
    } else if rain_sum >= config.rain_threshold_mm {
        WeatherCategory::Rain
    } else {
        WeatherCategory::Dry
    }
}

/// Inner-join the trend and weather series on date and classify each row.
///
/// A trend row without a weather record for its date is dropped, as is a
/// (weather date, keyword) pair the trend series never covered; both
/// directions count toward `dropped_pairs`. Under
/// [`MissingDataPolicy::Fail`] any dropped pair aborts the run instead.
pub fn join(
    trends: &[DailyTrendRecord],
    weather: &[DailyWeatherRecord],
    classification: &ClassificationConfig,
    policy: MissingDataPolicy,
) -> Result<JoinOutcome> {
    let weather_by_date: HashMap<NaiveDate, &DailyWeatherRecord> =
        weather.iter().map(|record| (record.date, record)).collect();

    let mut records = Vec::with_capacity(trends.len());
    let mut dropped_pairs = 0usize;
    let mut covered: HashSet<(NaiveDate, &str)> = HashSet::with_capacity(trends.len());

    for trend in trends {
        covered.insert((trend.date, trend.keyword.as_str()));

        let Some(day) = weather_by_date.get(&trend.date) else {
            dropped_pairs += 1;
            continue;
        };

        records.push(JoinedRecord {
            date: trend.date,
            keyword: trend.keyword.clone(),
            interest: trend.interest,
            rain_sum: day.rain_sum,
            snowfall_sum: day.snowfall_sum,
            category: classify(day.rain_sum, day.snowfall_sum, classification),
        });
    }

    // The other direction: weather days the trend series never covered
    // for some keyword.
    let keywords: BTreeSet<&str> = trends.iter().map(|t| t.keyword.as_str()).collect();
    for day in weather {
        for keyword in &keywords {
            if !covered.contains(&(day.date, *keyword)) {
                dropped_pairs += 1;
            }
        }
    }

    if dropped_pairs > 0 {
        warn!(
            "Dropped {} (date, keyword) pairs with missing trend or weather data",
            dropped_pairs
        );
        if policy == MissingDataPolicy::Fail {
            return Err(TrendWeatherError::validation(format!(
                "{dropped_pairs} (date, keyword) pairs are missing data and missing_data = \"fail\""
            ))
            .into());
        }
    }

    Ok(JoinOutcome {
        records,
        dropped_pairs,
    })
}

/// Reduce the joined table to one row per (keyword, category): arithmetic
/// mean of interest plus the delta against the keyword's dry-day mean.
///
/// A keyword without dry observations gets `delta_vs_dry = None` on every
/// row instead of failing the aggregation.
#[must_use]
pub fn aggregate(records: &[JoinedRecord]) -> Vec<SummaryRecord> {
    let mut groups: BTreeMap<(String, WeatherCategory), (f64, usize)> = BTreeMap::new();
    for record in records {
        let entry = groups
            .entry((record.keyword.clone(), record.category))
            .or_insert((0.0, 0));
        entry.0 += record.interest;
        entry.1 += 1;
    }

    let dry_means: HashMap<&str, f64> = groups
        .iter()
        .filter(|((_, category), _)| *category == WeatherCategory::Dry)
        .map(|((keyword, _), (sum, count))| (keyword.as_str(), sum / *count as f64))
        .collect();

    let mut missing_baseline: BTreeSet<&str> = BTreeSet::new();
    let mut summaries = Vec::with_capacity(groups.len());

    for ((keyword, category), (sum, count)) in &groups {
        let mean_interest = sum / *count as f64;
        let delta_vs_dry = match dry_means.get(keyword.as_str()) {
            Some(dry_mean) => Some(mean_interest - dry_mean),
            None => {
                missing_baseline.insert(keyword.as_str());
                None
            }
        };

        summaries.push(SummaryRecord {
            keyword: keyword.clone(),
            category: *category,
            mean_interest,
            delta_vs_dry,
        });
    }

    for keyword in missing_baseline {
        warn!(
            "Keyword '{}' has no dry-day observations; delta_vs_dry is unavailable",
            keyword
        );
    }

    summaries
}
