//! Small numeric helpers over `f64` slices.
//!
//! Empty input yields `NaN` rather than a default, so an empty bucket
//! stays distinguishable from a bucket whose mean happens to be zero.

/// Computes the arithmetic mean of a slice of values, ignoring NaN.
/// Returns NaN when no value remains.
pub fn mean(values: &[f64]) -> f64 {
    let (sum, count) = values
        .iter()
        .filter(|v| !v.is_nan())
        .fold((0.0_f64, 0usize), |(sum, count), v| (sum + v, count + 1));

    if count == 0 {
        return f64::NAN;
    }
    sum / count as f64
}

/// Smallest value, ignoring NaN. Returns NaN for empty input.
pub fn min(values: &[f64]) -> f64 {
    values
        .iter()
        .copied()
        .filter(|v| !v.is_nan())
        .reduce(f64::min)
        .unwrap_or(f64::NAN)
}

/// Largest value, ignoring NaN. Returns NaN for empty input.
pub fn max(values: &[f64]) -> f64 {
    values
        .iter()
        .copied()
        .filter(|v| !v.is_nan())
        .reduce(f64::max)
        .unwrap_or(f64::NAN)
}

/// Computes the sample standard deviation (n - 1) given a pre-computed mean.
/// Returns NaN for fewer than two values.
pub fn stddev(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;

    variance.sqrt()
}

/// Quantile `q` (0.0–1.0) of an ascending slice, linearly interpolated
/// between the two closest ranks. Returns NaN for empty input.
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let rank = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let frac = rank - lower as f64;

    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}
