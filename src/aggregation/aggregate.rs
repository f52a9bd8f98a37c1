use crate::aggregation::types::{AggregateKind, Sample};
use crate::aggregation::utility::{max, mean, min};
use chrono::{NaiveDateTime, TimeDelta};

/// Builds the bucket edges for `samples`: the earliest timestamp, then one
/// edge every `width`, for as long as the edge is strictly before the latest
/// timestamp.
///
/// The latest timestamp itself is never appended, so the final stretch of
/// the series (from the last edge to the end) does not form a bucket.
/// Returns no edges for an empty series or a non-positive width.
pub fn bucket_edges(samples: &[Sample], width: TimeDelta) -> Vec<NaiveDateTime> {
    let mut edges = Vec::new();
    if width <= TimeDelta::zero() {
        return edges;
    }

    let Some(start) = samples.iter().map(|s| s.timestamp).min() else {
        return edges;
    };
    let Some(end) = samples.iter().map(|s| s.timestamp).max() else {
        return edges;
    };

    let mut current = start;
    while current < end {
        edges.push(current);
        match current.checked_add_signed(width) {
            Some(next) => current = next,
            None => break,
        }
    }

    edges
}

/// Reduces `values` with the given aggregate kind.
pub fn reduce(kind: AggregateKind, values: &[f64]) -> f64 {
    match kind {
        AggregateKind::Avg => mean(values),
        AggregateKind::Min => min(values),
        AggregateKind::Max => max(values),
    }
}

/// Aggregates `samples` into fixed-width buckets.
///
/// Every pair of consecutive edges from [`bucket_edges`] produces one row
/// keyed by the bucket start, holding the aggregate of all samples with
/// `start <= timestamp < end`. NaN readings are ignored; a bucket without
/// any other sample yields NaN.
pub fn aggregate_buckets(samples: &[Sample], kind: AggregateKind, width: TimeDelta) -> Vec<Sample> {
    let edges = bucket_edges(samples, width);

    edges
        .windows(2)
        .map(|pair| {
            let (lo, hi) = (pair[0], pair[1]);
            let values: Vec<f64> = samples
                .iter()
                .filter(|s| s.timestamp >= lo && s.timestamp < hi)
                .map(|s| s.value)
                .collect();

            Sample::new(lo, reduce(kind, &values))
        })
        .collect()
}
