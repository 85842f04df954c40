use std::path::Path;

use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use trend_weather::analysis;
use trend_weather::config::{LoggingConfig, TrendWeatherConfig};
use trend_weather::http;
use trend_weather::report;
use trend_weather::trend::TrendClient;
use trend_weather::weather::WeatherClient;

#[tokio::main]
async fn main() -> Result<()> {
    let config = TrendWeatherConfig::load()?;
    init_tracing(&config.logging);

    // Credentials are checked before any network call.
    let credentials = config.credentials.resolve()?;

    let client = http::build_client(&config.http)?;
    let trend_client = TrendClient::new(client.clone(), credentials);
    let weather_client = WeatherClient::new(client);

    info!(
        "Collecting search trends and weather for {} keyword groups ({} - {})",
        config.query.keyword_groups.len(),
        config.query.start_date,
        config.query.end_date
    );

    // The two fetches are independent; both must succeed before the join.
    let (trends, weather) = tokio::try_join!(
        trend_client.fetch_daily(
            &config.query.keyword_groups,
            config.query.start_date,
            config.query.end_date,
        ),
        weather_client.fetch_daily(
            config.query.latitude,
            config.query.longitude,
            config.query.start_date,
            config.query.end_date,
            &config.query.timezone,
        ),
    )?;

    info!("Merging and classifying {} trend rows", trends.len());
    let outcome = analysis::join(
        &trends,
        &weather,
        &config.classification,
        config.join.missing_data,
    )?;
    if outcome.records.is_empty() {
        warn!("Joined table is empty; nothing to aggregate");
    }

    let summaries = analysis::aggregate(&outcome.records);

    info!("Saving outputs");
    report::write_daily_csv(Path::new(&config.output.daily_csv), &outcome.records)?;
    report::write_summary_csv(Path::new(&config.output.summary_csv), &summaries)?;
    report::render_chart(Path::new(&config.output.chart_html), &summaries)?;

    info!("Daily merged table: {}", config.output.daily_csv);
    info!("Summary table:      {}", config.output.summary_csv);
    info!("Chart:              {}", config.output.chart_html);

    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    if logging.format == "json" {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
