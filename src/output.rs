//! Output formatting for series summaries.
//!
//! Supports a structured log line, pretty-printing and JSON serialization.

use anyhow::Result;
use tracing::info;

use crate::stats::SeriesSummary;

/// Logs the headline numbers of a summary as structured fields.
pub fn log_summary(name: &str, units: &str, summary: &SeriesSummary) {
    info!(
        sensor = name,
        units,
        count = summary.count,
        mean = summary.mean,
        std = summary.std,
        min = summary.min,
        p25 = summary.p25,
        p50 = summary.p50,
        p75 = summary.p75,
        max = summary.max,
        first = ?summary.first,
        median_timestamp = ?summary.timestamp_p50,
        last = ?summary.last,
        "Sensor statistics"
    );
}

/// Logs a summary using Rust's debug pretty-print format.
pub fn print_pretty(summary: &SeriesSummary) {
    info!("{:#?}", summary);
}

/// Logs a summary as pretty-printed JSON.
///
/// NaN values serialize as `null`.
pub fn print_json(summary: &SeriesSummary) -> Result<()> {
    info!("{}", to_json(summary)?);
    Ok(())
}

pub fn to_json(summary: &SeriesSummary) -> Result<String> {
    Ok(serde_json::to_string_pretty(summary)?)
}
