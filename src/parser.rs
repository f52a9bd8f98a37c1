//! Parser for semicolon-delimited sensor files.
//!
//! Each line holds `timestamp;value` with no header row.

use anyhow::{Context, Result, bail};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

use crate::aggregation::types::Sample;

/// Layouts tried in order after RFC 3339.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

#[derive(Debug, Deserialize)]
struct Row {
    #[serde(deserialize_with = "deserialize_timestamp")]
    timestamp: NaiveDateTime,
    // empty cell: missing reading
    value: Option<f64>,
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> std::result::Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp {raw:?}")))
}

/// Parses a timestamp in any of the supported layouts.
///
/// Offsets in RFC 3339 input are normalized to UTC before the zone is
/// dropped. A bare date resolves to midnight.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Reads all samples from `reader`, in file order.
///
/// # Errors
///
/// Returns an error on the first row with a malformed timestamp, a
/// non-numeric value or a column count other than two. An empty value cell
/// is not an error; it is read as NaN.
pub fn read_samples<R: Read>(reader: R) -> Result<Vec<Sample>> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut samples = Vec::new();
    let mut record = csv::StringRecord::new();
    let mut line = 0usize;

    while rdr.read_record(&mut record)? {
        line += 1;
        if record.len() != 2 {
            bail!("row {line}: expected 2 columns, found {}", record.len());
        }
        let row: Row = record
            .deserialize(None)
            .with_context(|| format!("malformed row {line}"))?;
        samples.push(Sample::new(row.timestamp, row.value.unwrap_or(f64::NAN)));
    }

    Ok(samples)
}

/// Loads all samples from the file at `path`.
pub fn load_samples(path: impl AsRef<Path>) -> Result<Vec<Sample>> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let samples =
        read_samples(file).with_context(|| format!("failed to parse {}", path.display()))?;

    debug!(path = %path.display(), rows = samples.len(), "Sensor file loaded");
    Ok(samples)
}
