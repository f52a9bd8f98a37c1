//! Line-chart rendering to SVG files.
//!
//! Timestamps are drawn as seconds since the epoch on a linear axis and
//! formatted back to wall-clock time for the tick labels. NaN values (empty
//! aggregation buckets) break a line into separate segments.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime};
use plotters::prelude::*;
use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::aggregation::types::Sample;

const CHART_SIZE: (u32, u32) = (1280, 720);
const TICK_FORMAT: &str = "%Y-%m-%d %H:%M";

/// One labelled series on a chart.
#[derive(Debug, Clone, Copy)]
pub struct Line<'a> {
    pub label: &'a str,
    pub samples: &'a [Sample],
}

impl<'a> Line<'a> {
    pub fn new(label: &'a str, samples: &'a [Sample]) -> Self {
        Self { label, samples }
    }
}

/// Builds `<dir>/<name>.svg`, replacing anything but ASCII alphanumerics,
/// `-` and `_` in `name` with `_`.
pub fn plot_path(dir: &Path, name: &str) -> PathBuf {
    let stem: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let stem = if stem.is_empty() { "chart".to_string() } else { stem };

    dir.join(format!("{stem}.svg"))
}

/// Renders `lines` into one chart at `path`, creating parent directories.
///
/// A legend is drawn when there is more than one line.
#[tracing::instrument(skip(path, lines), fields(path = %path.display(), lines = lines.len()))]
pub fn render_chart(path: &Path, title: &str, y_desc: &str, lines: &[Line<'_>]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create plot directory {}", parent.display()))?;
    }

    let series: Vec<(&str, Vec<Vec<(f64, f64)>>)> = lines
        .iter()
        .map(|line| (line.label, segments(line.samples)))
        .collect();
    let (x_range, y_range) = bounds(series.iter().flat_map(|(_, segs)| segs.iter().flatten()));

    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 28))
        .margin(16)
        .x_label_area_size(60)
        .y_label_area_size(70)
        .build_cartesian_2d(x_range, y_range)?;

    chart
        .configure_mesh()
        .x_labels(8)
        .x_label_formatter(&format_tick)
        .x_desc("timestamp")
        .y_desc(y_desc)
        .draw()?;

    for (idx, (label, segs)) in series.iter().enumerate() {
        let style = Palette99::pick(idx).stroke_width(1);
        let mut labelled = false;

        for seg in segs {
            let anno = chart.draw_series(LineSeries::new(seg.iter().copied(), style))?;
            if !labelled {
                anno.label(*label)
                    .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], style));
                labelled = true;
            }
        }
    }

    if lines.len() > 1 {
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
    }

    root.present()?;
    info!("Chart rendered");
    Ok(())
}

fn to_x(timestamp: NaiveDateTime) -> f64 {
    timestamp.and_utc().timestamp_millis() as f64 / 1000.0
}

fn format_tick(x: &f64) -> String {
    DateTime::from_timestamp_millis((*x * 1000.0).round() as i64)
        .map(|dt| dt.naive_utc().format(TICK_FORMAT).to_string())
        .unwrap_or_default()
}

/// Sorts the samples by time and splits them into runs of finite values.
fn segments(samples: &[Sample]) -> Vec<Vec<(f64, f64)>> {
    let mut sorted: Vec<&Sample> = samples.iter().collect();
    sorted.sort_by_key(|s| s.timestamp);

    let mut out = Vec::new();
    let mut current = Vec::new();
    for sample in sorted {
        if sample.value.is_finite() {
            current.push((to_x(sample.timestamp), sample.value));
        } else if !current.is_empty() {
            out.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        out.push(current);
    }

    out
}

fn bounds<'a>(points: impl Iterator<Item = &'a (f64, f64)>) -> (Range<f64>, Range<f64>) {
    let mut x = (f64::INFINITY, f64::NEG_INFINITY);
    let mut y = (f64::INFINITY, f64::NEG_INFINITY);

    for &(px, py) in points {
        x = (x.0.min(px), x.1.max(px));
        y = (y.0.min(py), y.1.max(py));
    }

    (pad(x, 60.0), pad(y, 1.0))
}

// Empty input gets `0..default_span`, a single value gets centered in it.
fn pad((lo, hi): (f64, f64), default_span: f64) -> Range<f64> {
    if !lo.is_finite() || !hi.is_finite() {
        return 0.0..default_span;
    }
    if lo == hi {
        return (lo - default_span / 2.0)..(hi + default_span / 2.0);
    }
    let margin = (hi - lo) * 0.05;
    (lo - margin)..(hi + margin)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeDelta};
    use std::env;

    fn ts(secs: i64) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2021, 3, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            + TimeDelta::seconds(secs)
    }

    fn temp_dir(name: &str) -> PathBuf {
        env::temp_dir().join(name)
    }

    #[test]
    fn test_plot_path_sanitizes_name() {
        let path = plot_path(Path::new("plots"), "Vypekaci pec 1/Teplota");
        assert_eq!(path, Path::new("plots").join("Vypekaci_pec_1_Teplota.svg"));
        assert_eq!(plot_path(Path::new("p"), ""), Path::new("p").join("chart.svg"));
    }

    #[test]
    fn test_segments_split_on_nan_and_sort() {
        let samples = vec![
            Sample::new(ts(120), 3.0),
            Sample::new(ts(0), 1.0),
            Sample::new(ts(60), f64::NAN),
            Sample::new(ts(180), 4.0),
        ];
        let segs = segments(&samples);

        assert_eq!(segs.len(), 2);
        assert_eq!(segs[0].len(), 1);
        assert_eq!(segs[1].len(), 2);
        assert_eq!(segs[1][0].1, 3.0);
    }

    #[test]
    fn test_pad_handles_empty_and_flat() {
        assert_eq!(pad((f64::INFINITY, f64::NEG_INFINITY), 1.0), 0.0..1.0);
        assert_eq!(pad((5.0, 5.0), 2.0), 4.0..6.0);
        assert_eq!(pad((0.0, 10.0), 1.0), -0.5..10.5);
    }

    #[test]
    fn test_format_tick_round_trips_timestamp() {
        assert_eq!(format_tick(&to_x(ts(90))), "2021-03-01 00:01");
    }

    #[test]
    fn test_render_chart_writes_svg() {
        let dir = temp_dir("sensor_series_plot_test");
        let _ = fs::remove_dir_all(&dir);
        let path = plot_path(&dir, "two_lines");

        let a = vec![Sample::new(ts(0), 1.0), Sample::new(ts(60), 2.0)];
        let b = vec![Sample::new(ts(0), 5.0), Sample::new(ts(60), f64::NAN)];
        render_chart(&path, "test", "C", &[Line::new("a", &a), Line::new("b", &b)]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("<svg"));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_render_chart_empty_series() {
        let dir = temp_dir("sensor_series_plot_empty_test");
        let _ = fs::remove_dir_all(&dir);
        let path = plot_path(&dir, "empty");

        render_chart(&path, "empty", "unknown", &[Line::new("none", &[])]).unwrap();
        assert!(path.exists());

        fs::remove_dir_all(&dir).unwrap();
    }
}
