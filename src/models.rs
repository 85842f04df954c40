//! Core data records flowing through the pipeline

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Relative search interest for one keyword on one day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyTrendRecord {
    /// Calendar date of the observation
    pub date: NaiveDate,
    /// Keyword group display name
    pub keyword: String,
    /// Relative search ratio in [0, 100]; not an absolute count
    pub interest: f64,
}

/// Daily precipitation observations for the configured coordinate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyWeatherRecord {
    /// Calendar date of the observation
    pub date: NaiveDate,
    /// Total precipitation in mm
    pub precipitation_sum: f64,
    /// Rain portion in mm
    pub rain_sum: f64,
    /// Snowfall portion in mm
    pub snowfall_sum: f64,
}

/// Precipitation class assigned to one calendar day
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum WeatherCategory {
    /// Below both precipitation thresholds; the comparison baseline
    Dry,
    /// Rain at or above threshold, snowfall below
    Rain,
    /// Snowfall at or above threshold, rain below
    Snow,
    /// Rain and snowfall both at or above their thresholds
    Mixed,
}

impl WeatherCategory {
    /// All categories in reporting order
    pub const ALL: [WeatherCategory; 4] = [
        WeatherCategory::Dry,
        WeatherCategory::Rain,
        WeatherCategory::Snow,
        WeatherCategory::Mixed,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            WeatherCategory::Dry => "dry",
            WeatherCategory::Rain => "rain",
            WeatherCategory::Snow => "snow",
            WeatherCategory::Mixed => "mixed",
        }
    }
}

impl fmt::Display for WeatherCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One (date, keyword) row after joining the trend and weather series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinedRecord {
    pub date: NaiveDate,
    pub keyword: String,
    #[serde(rename = "interest_ratio")]
    pub interest: f64,
    #[serde(rename = "rain_sum_mm")]
    pub rain_sum: f64,
    #[serde(rename = "snowfall_sum_mm")]
    pub snowfall_sum: f64,
    #[serde(rename = "weather_category")]
    pub category: WeatherCategory,
}

/// Mean search interest for one (keyword, category) group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRecord {
    pub keyword: String,
    #[serde(rename = "weather_category")]
    pub category: WeatherCategory,
    pub mean_interest: f64,
    /// Mean interest minus the keyword's dry-day mean; `None` when the
    /// keyword has no dry observations to compare against
    pub delta_vs_dry: Option<f64>,
}
