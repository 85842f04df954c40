//! Configuration management for the trend-weather pipeline
//!
//! Handles loading configuration from files and environment variables,
//! and provides validation for all configuration settings.

use crate::TrendWeatherError;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Environment variables holding the Naver DataLab credentials
pub const CLIENT_ID_VAR: &str = "NAVER_CLIENT_ID";
pub const CLIENT_SECRET_VAR: &str = "NAVER_CLIENT_SECRET";

/// Root configuration structure for the trend-weather pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendWeatherConfig {
    /// Naver DataLab API credentials
    #[serde(default)]
    pub credentials: CredentialsConfig,
    /// Date range, coordinate and keyword groups to query
    #[serde(default)]
    pub query: QueryConfig,
    /// Precipitation thresholds for day classification
    #[serde(default)]
    pub classification: ClassificationConfig,
    /// Join behavior for partially missing data
    #[serde(default)]
    pub join: JoinConfig,
    /// Outbound HTTP settings
    #[serde(default)]
    pub http: HttpConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Output file locations
    #[serde(default)]
    pub output: OutputConfig,
}

/// Naver DataLab credentials; resolved from config layers or environment
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CredentialsConfig {
    /// Client identifier; falls back to `NAVER_CLIENT_ID`
    pub client_id: Option<String>,
    /// Client secret; falls back to `NAVER_CLIENT_SECRET`
    pub client_secret: Option<String>,
}

/// Resolved, non-empty credential pair
#[derive(Debug, Clone)]
pub struct ResolvedCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl CredentialsConfig {
    /// Resolve the credential pair, preferring config values over the
    /// environment. Fails before any network call when either is absent.
    pub fn resolve(&self) -> Result<ResolvedCredentials, TrendWeatherError> {
        let client_id = resolve_credential(self.client_id.as_deref(), CLIENT_ID_VAR)?;
        let client_secret = resolve_credential(self.client_secret.as_deref(), CLIENT_SECRET_VAR)?;
        Ok(ResolvedCredentials {
            client_id,
            client_secret,
        })
    }
}

fn resolve_credential(
    configured: Option<&str>,
    var: &str,
) -> Result<String, TrendWeatherError> {
    match configured {
        Some(value) if !value.trim().is_empty() => Ok(value.to_string()),
        _ => match env::var(var) {
            Ok(value) if !value.trim().is_empty() => Ok(value),
            _ => Err(TrendWeatherError::missing_credential(var)),
        },
    }
}

/// One named keyword group queried against the trend API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordGroup {
    /// Display name; also the `keyword` column of the output tables
    pub name: String,
    /// Literal keywords aggregated into the group (at least one)
    pub keywords: Vec<String>,
}

/// Query settings: date range, coordinate and keyword groups
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    /// First date of the range (inclusive)
    #[serde(default = "default_start_date")]
    pub start_date: NaiveDate,
    /// Last date of the range (inclusive)
    #[serde(default = "default_end_date")]
    pub end_date: NaiveDate,
    /// Latitude of the weather query point
    #[serde(default = "default_latitude")]
    pub latitude: f64,
    /// Longitude of the weather query point
    #[serde(default = "default_longitude")]
    pub longitude: f64,
    /// IANA timezone passed to the weather API
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Keyword groups queried against the trend API
    #[serde(default = "default_keyword_groups")]
    pub keyword_groups: Vec<KeywordGroup>,
}

/// Precipitation thresholds (mm) for day classification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationConfig {
    #[serde(default = "default_rain_threshold")]
    pub rain_threshold_mm: f64,
    #[serde(default = "default_snow_threshold")]
    pub snow_threshold_mm: f64,
}

/// Policy for (date, keyword) pairs missing one side of the join
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingDataPolicy {
    /// Drop the pair from the joined table and count it in the warning summary
    Drop,
    /// Fail the run when any pair is missing
    Fail,
}

/// Join behavior settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinConfig {
    #[serde(default = "default_missing_data")]
    pub missing_data: MissingDataPolicy,
}

/// Outbound HTTP settings shared by both API clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds
    #[serde(default = "default_http_timeout")]
    pub timeout_seconds: u64,
    /// Maximum number of retries for failed requests
    #[serde(default = "default_http_max_retries")]
    pub max_retries: u32,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

/// Output file locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Row-per-(date, keyword) joined table
    #[serde(default = "default_daily_csv")]
    pub daily_csv: String,
    /// Row-per-(keyword, category) summary table
    #[serde(default = "default_summary_csv")]
    pub summary_csv: String,
    /// Grouped bar chart of mean interest
    #[serde(default = "default_chart_html")]
    pub chart_html: String,
}

// Default value functions
fn default_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

fn default_end_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 12, 31).unwrap()
}

// Seoul as a proxy for the KR nationwide search audience
fn default_latitude() -> f64 {
    37.5665
}

fn default_longitude() -> f64 {
    126.978
}

fn default_timezone() -> String {
    "Asia/Seoul".to_string()
}

fn default_keyword_groups() -> Vec<KeywordGroup> {
    [
        ("라운딩", vec!["라운딩"]),
        ("골프 예약", vec!["골프 예약"]),
        ("골프 부킹", vec!["골프 부킹"]),
        ("골프장", vec!["골프장"]),
    ]
    .into_iter()
    .map(|(name, keywords)| KeywordGroup {
        name: name.to_string(),
        keywords: keywords.into_iter().map(str::to_string).collect(),
    })
    .collect()
}

fn default_rain_threshold() -> f64 {
    1.0
}

fn default_snow_threshold() -> f64 {
    1.0
}

fn default_missing_data() -> MissingDataPolicy {
    MissingDataPolicy::Drop
}

fn default_http_timeout() -> u64 {
    60
}

fn default_http_max_retries() -> u32 {
    3
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_daily_csv() -> String {
    "trend_weather_daily.csv".to_string()
}

fn default_summary_csv() -> String {
    "trend_weather_summary.csv".to_string()
}

fn default_chart_html() -> String {
    "trend_weather_by_category.html".to_string()
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            start_date: default_start_date(),
            end_date: default_end_date(),
            latitude: default_latitude(),
            longitude: default_longitude(),
            timezone: default_timezone(),
            keyword_groups: default_keyword_groups(),
        }
    }
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            rain_threshold_mm: default_rain_threshold(),
            snow_threshold_mm: default_snow_threshold(),
        }
    }
}

impl Default for JoinConfig {
    fn default() -> Self {
        Self {
            missing_data: default_missing_data(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_http_timeout(),
            max_retries: default_http_max_retries(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            daily_csv: default_daily_csv(),
            summary_csv: default_summary_csv(),
            chart_html: default_chart_html(),
        }
    }
}

impl Default for TrendWeatherConfig {
    fn default() -> Self {
        Self {
            credentials: CredentialsConfig::default(),
            query: QueryConfig::default(),
            classification: ClassificationConfig::default(),
            join: JoinConfig::default(),
            http: HttpConfig::default(),
            logging: LoggingConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl TrendWeatherConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Environment overrides, e.g. TREND_WEATHER_QUERY__LATITUDE
        builder = builder.add_source(
            Environment::with_prefix("TREND_WEATHER")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let config: TrendWeatherConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("trend-weather").join("config.toml"))
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_query()?;
        self.validate_numeric_ranges()?;
        self.validate_logging()?;
        Ok(())
    }

    fn validate_query(&self) -> Result<()> {
        if self.query.start_date > self.query.end_date {
            return Err(TrendWeatherError::config(format!(
                "start_date {} is after end_date {}",
                self.query.start_date, self.query.end_date
            ))
            .into());
        }

        if !(-90.0..=90.0).contains(&self.query.latitude) {
            return Err(TrendWeatherError::config(format!(
                "Latitude must be between -90 and 90, got: {}",
                self.query.latitude
            ))
            .into());
        }

        if !(-180.0..=180.0).contains(&self.query.longitude) {
            return Err(TrendWeatherError::config(format!(
                "Longitude must be between -180 and 180, got: {}",
                self.query.longitude
            ))
            .into());
        }

        if self.query.timezone.is_empty() {
            return Err(TrendWeatherError::config("Timezone cannot be empty").into());
        }

        if self.query.keyword_groups.is_empty() {
            return Err(
                TrendWeatherError::config("At least one keyword group is required").into(),
            );
        }

        for group in &self.query.keyword_groups {
            if group.name.trim().is_empty() {
                return Err(
                    TrendWeatherError::config("Keyword group name cannot be empty").into(),
                );
            }
            if group.keywords.is_empty() {
                return Err(TrendWeatherError::config(format!(
                    "Keyword group '{}' must contain at least one keyword",
                    group.name
                ))
                .into());
            }
        }

        Ok(())
    }

    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.classification.rain_threshold_mm < 0.0
            || self.classification.snow_threshold_mm < 0.0
        {
            return Err(
                TrendWeatherError::config("Precipitation thresholds cannot be negative").into(),
            );
        }

        if self.http.timeout_seconds == 0 || self.http.timeout_seconds > 300 {
            return Err(TrendWeatherError::config(
                "HTTP timeout must be between 1 and 300 seconds",
            )
            .into());
        }

        if self.http.max_retries > 10 {
            return Err(TrendWeatherError::config("HTTP max retries cannot exceed 10").into());
        }

        Ok(())
    }

    fn validate_logging(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(TrendWeatherError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(TrendWeatherError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TrendWeatherConfig::default();
        assert_eq!(config.query.timezone, "Asia/Seoul");
        assert_eq!(config.query.keyword_groups.len(), 4);
        assert_eq!(config.classification.rain_threshold_mm, 1.0);
        assert_eq!(config.classification.snow_threshold_mm, 1.0);
        assert_eq!(config.join.missing_data, MissingDataPolicy::Drop);
        assert_eq!(config.http.timeout_seconds, 60);
        assert_eq!(config.logging.level, "info");
        assert!(config.credentials.client_id.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_inverted_date_range() {
        let mut config = TrendWeatherConfig::default();
        config.query.start_date = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        config.query.end_date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("after end_date"));
    }

    #[test]
    fn test_config_validation_coordinates() {
        let mut config = TrendWeatherConfig::default();
        config.query.latitude = 91.0;
        assert!(config.validate().is_err());

        config.query.latitude = 37.5665;
        config.query.longitude = -200.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_empty_keyword_group() {
        let mut config = TrendWeatherConfig::default();
        config.query.keyword_groups = vec![KeywordGroup {
            name: "골프장".to_string(),
            keywords: vec![],
        }];
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("at least one keyword"));
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = TrendWeatherConfig::default();
        config.logging.level = "invalid".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_numeric_ranges() {
        let mut config = TrendWeatherConfig::default();
        config.http.timeout_seconds = 500;
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("timeout"));

        config.http.timeout_seconds = 60;
        config.classification.rain_threshold_mm = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_credentials_prefer_config_over_environment() {
        let credentials = CredentialsConfig {
            client_id: Some("configured_id".to_string()),
            client_secret: Some("configured_secret".to_string()),
        };

        let resolved = credentials.resolve().unwrap();
        assert_eq!(resolved.client_id, "configured_id");
        assert_eq!(resolved.client_secret, "configured_secret");
    }

    #[test]
    fn test_credentials_missing_is_an_error() {
        // SAFETY: Test environment, clearing test variables only
        unsafe {
            env::remove_var(CLIENT_ID_VAR);
            env::remove_var(CLIENT_SECRET_VAR);
        }

        let credentials = CredentialsConfig::default();
        let result = credentials.resolve();
        assert!(matches!(
            result,
            Err(TrendWeatherError::MissingCredential { .. })
        ));
    }

    #[test]
    fn test_config_path_generation() {
        let path = TrendWeatherConfig::get_config_path();
        assert!(path.is_some());
        let path = path.unwrap();
        assert!(path.to_string_lossy().contains("trend-weather"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }
}
