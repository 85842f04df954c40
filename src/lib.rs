//! trend-weather - search-trend vs. daily-weather analysis pipeline
//!
//! This library fetches relative search interest from the Naver DataLab
//! Search Trend API and daily precipitation history from the Open-Meteo
//! archive API, joins the two series by calendar date, classifies each day
//! by precipitation type and reports mean interest per weather category.

pub mod analysis;
pub mod config;
pub mod error;
pub mod http;
pub mod models;
pub mod report;
pub mod trend;
pub mod weather;

// Re-export core types for public API
pub use analysis::{JoinOutcome, aggregate, classify, join};
pub use config::{KeywordGroup, MissingDataPolicy, TrendWeatherConfig};
pub use error::TrendWeatherError;
pub use models::{
    DailyTrendRecord, DailyWeatherRecord, JoinedRecord, SummaryRecord, WeatherCategory,
};
pub use trend::TrendClient;
pub use weather::WeatherClient;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, TrendWeatherError>;
