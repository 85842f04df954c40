//! Open-Meteo historical weather client
//!
//! One GET per run fetches the daily precipitation, rain and snowfall sums
//! for the configured coordinate and date range.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use reqwest_middleware::ClientWithMiddleware;
use tracing::{debug, error, info};

use crate::error::TrendWeatherError;
use crate::models::DailyWeatherRecord;

const ARCHIVE_URL: &str = "https://archive-api.open-meteo.com/v1/archive";
const DAILY_VARIABLES: &str = "precipitation_sum,rain_sum,snowfall_sum";

/// Client for the Open-Meteo Historical Weather API
pub struct WeatherClient {
    client: ClientWithMiddleware,
    base_url: String,
}

impl WeatherClient {
    pub fn new(client: ClientWithMiddleware) -> Self {
        Self {
            client,
            base_url: ARCHIVE_URL.to_string(),
        }
    }

    /// Override the endpoint, for tests against a local server
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Fetch one weather record per date in the inclusive range
    pub async fn fetch_daily(
        &self,
        latitude: f64,
        longitude: f64,
        start_date: NaiveDate,
        end_date: NaiveDate,
        timezone: &str,
    ) -> Result<Vec<DailyWeatherRecord>> {
        info!(
            "Fetching daily weather for ({:.4}, {:.4}) ({} - {})",
            latitude, longitude, start_date, end_date
        );

        let start = start_date.format("%Y-%m-%d").to_string();
        let end = end_date.format("%Y-%m-%d").to_string();
        debug!("Open-Meteo archive request URL: {}", self.base_url);

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("latitude", latitude.to_string()),
                ("longitude", longitude.to_string()),
                ("start_date", start),
                ("end_date", end),
                ("daily", DAILY_VARIABLES.to_string()),
                ("timezone", timezone.to_string()),
            ])
            .send()
            .await
            .map_err(|e| {
                error!("Open-Meteo request failed: {}", e);
                TrendWeatherError::api(format!("Open-Meteo request failed: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            error!("Open-Meteo request returned HTTP {}", status);
            return Err(TrendWeatherError::api(format!(
                "Open-Meteo request failed with status: {} - {}",
                status,
                status.canonical_reason().unwrap_or("Unknown error")
            ))
            .into());
        }

        let archive_response: openmeteo::ArchiveResponse = response
            .json()
            .await
            .with_context(|| "Failed to parse Open-Meteo archive response")
            .map_err(|e| {
                error!("Failed to parse Open-Meteo response: {}", e);
                TrendWeatherError::api("Invalid weather data received from the Open-Meteo API")
            })?;

        let records = openmeteo::into_records(archive_response)?;
        info!("Fetched {} weather days", records.len());

        Ok(records)
    }
}

/// Open-Meteo API response structures and conversion utilities
mod openmeteo {
    use super::{DailyWeatherRecord, NaiveDate, Result, TrendWeatherError};
    use serde::Deserialize;

    /// Archive response from the Open-Meteo API
    #[derive(Debug, Deserialize)]
    pub struct ArchiveResponse {
        pub daily: Option<DailyBlock>,
    }

    /// Column-oriented daily series; entries can be null for gap days
    #[derive(Debug, Deserialize)]
    pub struct DailyBlock {
        pub time: Vec<String>,
        #[serde(default)]
        pub precipitation_sum: Vec<Option<f64>>,
        #[serde(default)]
        pub rain_sum: Vec<Option<f64>>,
        #[serde(default)]
        pub snowfall_sum: Vec<Option<f64>>,
    }

    /// Zip the column-oriented block into one record per date.
    /// Null observations count as 0.0 mm.
    pub fn into_records(response: ArchiveResponse) -> Result<Vec<DailyWeatherRecord>> {
        let Some(daily) = response.daily else {
            return Err(
                TrendWeatherError::api("No daily block in the Open-Meteo archive response").into(),
            );
        };

        let mut records = Vec::with_capacity(daily.time.len());

        for (i, time) in daily.time.iter().enumerate() {
            let date = NaiveDate::parse_from_str(time, "%Y-%m-%d").map_err(|_| {
                TrendWeatherError::api(format!("Invalid date '{time}' in Open-Meteo daily series"))
            })?;

            records.push(DailyWeatherRecord {
                date,
                precipitation_sum: value_at(&daily.precipitation_sum, i),
                rain_sum: value_at(&daily.rain_sum, i),
                snowfall_sum: value_at(&daily.snowfall_sum, i),
            });
        }

        Ok(records)
    }

    fn value_at(values: &[Option<f64>], index: usize) -> f64 {
        values.get(index).copied().flatten().unwrap_or(0.0)
    }

}
