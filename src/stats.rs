use chrono::{DateTime, NaiveDateTime};
use serde::Serialize;

use crate::aggregation::types::Sample;
use crate::aggregation::utility::{max, mean, min, quantile, stddev};

/// Descriptive statistics of one series, in the spirit of a dataframe
/// `describe()` over both columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesSummary {
    pub count: usize,

    // value column
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub max: f64,

    // timestamp column
    pub first: Option<NaiveDateTime>,
    pub last: Option<NaiveDateTime>,
    pub mean_timestamp: Option<NaiveDateTime>,
    pub timestamp_p25: Option<NaiveDateTime>,
    pub timestamp_p50: Option<NaiveDateTime>,
    pub timestamp_p75: Option<NaiveDateTime>,
}

impl SeriesSummary {
    pub fn from_samples(samples: &[Sample]) -> Self {
        let values: Vec<f64> = samples.iter().map(|s| s.value).collect();
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
        sorted.sort_by(f64::total_cmp);

        let avg = mean(&sorted);

        let mut millis: Vec<f64> = samples.iter().map(|s| to_millis(s.timestamp) as f64).collect();
        millis.sort_by(f64::total_cmp);

        SeriesSummary {
            count: sorted.len(),
            mean: avg,
            std: stddev(&sorted, avg),
            min: min(&values),
            p25: quantile(&sorted, 0.25),
            p50: quantile(&sorted, 0.50),
            p75: quantile(&sorted, 0.75),
            max: max(&values),
            first: samples.iter().map(|s| s.timestamp).min(),
            last: samples.iter().map(|s| s.timestamp).max(),
            mean_timestamp: mean_timestamp(samples),
            timestamp_p25: from_millis(quantile(&millis, 0.25)),
            timestamp_p50: from_millis(quantile(&millis, 0.50)),
            timestamp_p75: from_millis(quantile(&millis, 0.75)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Average of the timestamps, computed on milliseconds since the epoch.
fn mean_timestamp(samples: &[Sample]) -> Option<NaiveDateTime> {
    if samples.is_empty() {
        return None;
    }
    let total: i128 = samples.iter().map(|s| to_millis(s.timestamp) as i128).sum();
    let avg = (total / samples.len() as i128) as i64;

    DateTime::from_timestamp_millis(avg).map(|dt| dt.naive_utc())
}

fn to_millis(timestamp: NaiveDateTime) -> i64 {
    timestamp.and_utc().timestamp_millis()
}

// NaN (empty series) maps to None.
fn from_millis(millis: f64) -> Option<NaiveDateTime> {
    if millis.is_nan() {
        return None;
    }
    DateTime::from_timestamp_millis(millis.round() as i64).map(|dt| dt.naive_utc())
}
