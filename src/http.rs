//! Shared HTTP client construction for both API fetchers
//!
//! Every outbound call goes through the same client: bounded timeout,
//! bounded retries with exponential backoff on transient failures.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::RetryTransientMiddleware;
use reqwest_retry::policies::ExponentialBackoff;

use crate::config::HttpConfig;

/// Build the retrying HTTP client used by the trend and weather fetchers
pub fn build_client(http: &HttpConfig) -> Result<ClientWithMiddleware> {
    let inner = reqwest::Client::builder()
        .timeout(Duration::from_secs(http.timeout_seconds))
        .user_agent(concat!("trend-weather/", env!("CARGO_PKG_VERSION")))
        .build()
        .with_context(|| "Failed to create HTTP client")?;

    let retry_policy = ExponentialBackoff::builder().build_with_max_retries(http.max_retries);

    Ok(ClientBuilder::new(inner)
        .with(RetryTransientMiddleware::new_with_policy(retry_policy))
        .build())
}
