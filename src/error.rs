//! Error types and handling for the trend-weather pipeline

use thiserror::Error;

/// Main error type for the trend-weather pipeline
#[derive(Error, Debug)]
pub enum TrendWeatherError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// A required API credential is absent from the environment or config
    #[error("Missing credential: {name} is not set")]
    MissingCredential { name: String },

    /// Upstream API communication errors
    #[error("API error: {message}")]
    Api { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl TrendWeatherError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new missing-credential error
    pub fn missing_credential<S: Into<String>>(name: S) -> Self {
        Self::MissingCredential { name: name.into() }
    }

    /// Create a new API error
    pub fn api<S: Into<String>>(message: S) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            TrendWeatherError::Config { .. } => {
                "Configuration error. Please check your config file.".to_string()
            }
            TrendWeatherError::MissingCredential { name } => {
                format!("Credential {name} is not set. Export it before running.")
            }
            TrendWeatherError::Api { .. } => {
                "Unable to fetch data from the upstream APIs. Please check your internet connection."
                    .to_string()
            }
            TrendWeatherError::Validation { message } => {
                format!("Invalid input: {message}")
            }
            TrendWeatherError::Io { .. } => {
                "File operation failed. Please check output paths and permissions.".to_string()
            }
        }
    }
}
