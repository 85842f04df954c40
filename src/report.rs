//! Output sinks: CSV tables and the summary chart
//!
//! Pure side-effecting writers; all analytical work happens upstream in
//! [`crate::analysis`].

use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use plotlars::{BarPlot, Legend, Plot, Text};
use polars::prelude::*;
use tracing::info;

use crate::models::{JoinedRecord, SummaryRecord};

// BOM so spreadsheet tools decode the Korean keyword column as UTF-8
const UTF8_BOM: &[u8] = b"\xef\xbb\xbf";

/// Write the row-per-(date, keyword) joined table
pub fn write_daily_csv(path: &Path, records: &[JoinedRecord]) -> Result<()> {
    let mut writer = csv_writer(path)?;
    for record in records {
        writer
            .serialize(record)
            .with_context(|| format!("Failed to write daily row to {}", path.display()))?;
    }
    writer.flush()?;

    info!("Wrote {} daily rows to {}", records.len(), path.display());
    Ok(())
}

/// Write the row-per-(keyword, category) summary table
pub fn write_summary_csv(path: &Path, summaries: &[SummaryRecord]) -> Result<()> {
    let mut writer = csv_writer(path)?;
    for summary in summaries {
        writer
            .serialize(summary)
            .with_context(|| format!("Failed to write summary row to {}", path.display()))?;
    }
    writer.flush()?;

    info!(
        "Wrote {} summary rows to {}",
        summaries.len(),
        path.display()
    );
    Ok(())
}

fn csv_writer(path: &Path) -> Result<csv::Writer<File>> {
    let mut file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    file.write_all(UTF8_BOM)?;
    Ok(csv::Writer::from_writer(file))
}

/// Render the grouped bar chart of mean interest by keyword and category
pub fn render_chart(path: &Path, summaries: &[SummaryRecord]) -> Result<()> {
    let keywords: Vec<&str> = summaries.iter().map(|s| s.keyword.as_str()).collect();
    let categories: Vec<&str> = summaries.iter().map(|s| s.category.as_str()).collect();
    let means: Vec<f64> = summaries.iter().map(|s| s.mean_interest).collect();

    let frame = df!(
        "keyword" => keywords,
        "weather" => categories,
        "mean_interest" => means,
    )
    .with_context(|| "Failed to assemble chart data frame")?;

    BarPlot::builder()
        .data(&frame)
        .labels("keyword")
        .values("mean_interest")
        .group("weather")
        .plot_title(
            Text::from("Mean search interest by weather category")
                .font("Arial")
                .size(18),
        )
        .x_title("keyword")
        .y_title("mean search interest")
        .legend(&Legend::new().x(0.05).y(0.9))
        .build()
        .write_html(path.display().to_string());

    info!("Wrote chart to {}", path.display());
    Ok(())
}
