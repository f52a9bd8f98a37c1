//! A sensor that also keeps named, bucketed aggregates of its series.

use anyhow::Result;
use chrono::TimeDelta;
use std::collections::BTreeMap;
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::aggregation::aggregate::aggregate_buckets;
use crate::aggregation::types::{AggregateKind, Sample};
use crate::plot::{Line, plot_path, render_chart};
use crate::sensor::Sensor;

#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedSensor {
    sensor: Sensor,
    aggregated_data: BTreeMap<String, Vec<Sample>>,
}

impl AggregatedSensor {
    pub fn new(name: impl Into<String>) -> Self {
        Self::from_sensor(Sensor::new(name))
    }

    pub fn with_units(name: impl Into<String>, units: impl Into<String>) -> Self {
        Self::from_sensor(Sensor::with_units(name, units))
    }

    pub fn from_sensor(sensor: Sensor) -> Self {
        AggregatedSensor {
            sensor,
            aggregated_data: BTreeMap::new(),
        }
    }

    pub fn sensor(&self) -> &Sensor {
        &self.sensor
    }

    /// Drops the aggregates and hands back the plain sensor.
    pub fn into_sensor(self) -> Sensor {
        self.sensor
    }

    /// All stored aggregates, keyed by calculation name.
    pub fn aggregated_data(&self) -> &BTreeMap<String, Vec<Sample>> {
        &self.aggregated_data
    }

    pub fn aggregate(&self, calculation_name: &str) -> Option<&[Sample]> {
        self.aggregated_data.get(calculation_name).map(Vec::as_slice)
    }

    /// Computes `aggregate_name` (`AVG`, `MIN` or `MAX`) over buckets of
    /// `window` and stores the rows under `calculation_name`, replacing any
    /// earlier calculation with that name.
    ///
    /// An unknown aggregate name or a non-positive window is logged and
    /// leaves the stored aggregates untouched; `None` is returned then.
    #[tracing::instrument(skip(self), fields(sensor = %self.sensor.name))]
    pub fn calculate_aggregate(
        &mut self,
        calculation_name: &str,
        aggregate_name: &str,
        window: TimeDelta,
    ) -> Option<&[Sample]> {
        let kind = match aggregate_name.parse::<AggregateKind>() {
            Ok(kind) => kind,
            Err(e) => {
                warn!("{e}");
                return None;
            }
        };

        self.calculate(calculation_name, kind, window)
    }

    /// Typed variant of [`calculate_aggregate`](Self::calculate_aggregate).
    pub fn calculate(
        &mut self,
        calculation_name: &str,
        kind: AggregateKind,
        window: TimeDelta,
    ) -> Option<&[Sample]> {
        if window <= TimeDelta::zero() {
            warn!(window_secs = window.num_seconds(), "aggregation window must be positive");
            return None;
        }

        let rows = aggregate_buckets(&self.sensor.data, kind, window);
        info!(
            calculation = calculation_name,
            kind = %kind,
            window_secs = window.num_seconds(),
            buckets = rows.len(),
            "Aggregate calculated"
        );

        self.aggregated_data.insert(calculation_name.to_string(), rows);
        self.aggregate(calculation_name)
    }

    /// Renders the aggregate stored under `name`.
    ///
    /// Returns `Ok(None)` without rendering when no such aggregate exists.
    pub fn visualize_specific_aggregate(&self, name: &str, dir: &Path) -> Result<Option<PathBuf>> {
        let Some(rows) = self.aggregated_data.get(name) else {
            warn!("aggregate with name {name} has not been created");
            return Ok(None);
        };

        let title = format!("{} / {}", self.sensor.name, name);
        let path = plot_path(dir, &format!("{}_{}", self.sensor.name, name));
        render_chart(&path, &title, &self.sensor.units, &[Line::new(name, rows)])?;
        Ok(Some(path))
    }

    /// Renders every stored aggregate on one chart.
    ///
    /// Returns `Ok(None)` without rendering when nothing has been calculated.
    pub fn visualize_all_aggregates(&self, dir: &Path) -> Result<Option<PathBuf>> {
        if self.aggregated_data.is_empty() {
            warn!(sensor = %self.sensor.name, "no aggregates have been created");
            return Ok(None);
        }

        let lines: Vec<Line<'_>> = self
            .aggregated_data
            .iter()
            .map(|(name, rows)| Line::new(name, rows))
            .collect();

        let path = plot_path(dir, &format!("{}_aggregates", self.sensor.name));
        render_chart(&path, &self.sensor.name, &self.sensor.units, &lines)?;
        Ok(Some(path))
    }
}

impl Deref for AggregatedSensor {
    type Target = Sensor;

    fn deref(&self) -> &Sensor {
        &self.sensor
    }
}

impl DerefMut for AggregatedSensor {
    fn deref_mut(&mut self) -> &mut Sensor {
        &mut self.sensor
    }
}

impl From<Sensor> for AggregatedSensor {
    fn from(sensor: Sensor) -> Self {
        Self::from_sensor(sensor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::read_samples;
    use crate::test_support::capture_logs;
    use chrono::{NaiveDate, NaiveDateTime};
    use std::env;
    use std::fs;
    use tracing::Level;

    fn ts(secs: i64) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2021, 3, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            + TimeDelta::seconds(secs)
    }

    fn sensor_with(points: &[(i64, f64)]) -> AggregatedSensor {
        let mut sensor = AggregatedSensor::with_units("Teplota", "C");
        sensor.data = points.iter().map(|&(s, v)| Sample::new(ts(s), v)).collect();
        sensor
    }

    #[test]
    fn test_calculate_stores_under_name() {
        let mut sensor = sensor_with(&[(0, 1.0), (10, 2.0), (20, 3.0), (90, 9.0)]);
        let rows = sensor
            .calculate_aggregate("avg_1m", "AVG", TimeDelta::seconds(60))
            .unwrap()
            .to_vec();

        assert_eq!(rows, vec![Sample::new(ts(0), 2.0)]);
        assert_eq!(sensor.aggregate("avg_1m"), Some(rows.as_slice()));
    }

    #[test]
    fn test_invalid_kind_leaves_mapping_unchanged() {
        let mut sensor = sensor_with(&[(0, 1.0), (120, 2.0)]);
        sensor.calculate_aggregate("max", "MAX", TimeDelta::seconds(60));
        let before = sensor.aggregated_data().clone();

        assert!(sensor.calculate_aggregate("sum", "SUM", TimeDelta::seconds(60)).is_none());
        assert!(sensor.calculate_aggregate("max", "SUM", TimeDelta::seconds(60)).is_none());
        assert_eq!(sensor.aggregated_data(), &before);
    }

    #[test]
    fn test_invalid_kind_logs_warning() {
        let mut sensor = sensor_with(&[(0, 1.0), (120, 2.0)]);
        let (rows, logs) = capture_logs(Level::WARN, || {
            sensor
                .calculate_aggregate("sum", "SUM", TimeDelta::seconds(60))
                .map(<[Sample]>::to_vec)
        });

        assert!(rows.is_none());
        assert!(logs.contains("WARN"));
        assert!(logs.contains("aggregate SUM is not valid"));
    }

    #[test]
    fn test_unknown_aggregate_lookup_logs_warning() {
        let dir = env::temp_dir().join("sensor_series_unknown_lookup_log_test");
        let _ = fs::remove_dir_all(&dir);

        let sensor = sensor_with(&[(0, 1.0), (120, 2.0)]);
        let (path, logs) =
            capture_logs(Level::WARN, || sensor.visualize_specific_aggregate("nope", &dir).unwrap());

        assert_eq!(path, None);
        assert!(logs.contains("aggregate with name nope has not been created"));
        assert!(!dir.exists());
    }

    #[test]
    fn test_loaded_nan_reading_does_not_poison_average() {
        let input = "2021-03-01 00:00:00;1.0\n2021-03-01 00:00:10;NaN\n2021-03-01 00:00:20;3.0\n2021-03-01 00:05:00;0\n";
        let mut sensor = AggregatedSensor::new("Teplota");
        sensor.data = read_samples(input.as_bytes()).unwrap();

        let avg = sensor.calculate_aggregate("avg", "AVG", TimeDelta::seconds(60)).unwrap()[0].value;
        let min = sensor.calculate_aggregate("min", "MIN", TimeDelta::seconds(60)).unwrap()[0].value;

        assert_eq!(avg, 2.0);
        assert_eq!(min, 1.0);
    }

    #[test]
    fn test_non_positive_window_is_rejected() {
        let mut sensor = sensor_with(&[(0, 1.0), (120, 2.0)]);
        assert!(sensor.calculate_aggregate("avg", "AVG", TimeDelta::zero()).is_none());
        assert!(sensor.aggregated_data().is_empty());
    }

    #[test]
    fn test_same_name_overwrites() {
        let mut sensor = sensor_with(&[(0, 1.0), (10, 5.0), (200, 2.0)]);
        sensor.calculate_aggregate("calc", "MIN", TimeDelta::seconds(60));
        assert_eq!(sensor.aggregate("calc").unwrap()[0].value, 1.0);

        sensor.calculate_aggregate("calc", "MAX", TimeDelta::seconds(100));
        let rows = sensor.aggregate("calc").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].value, 5.0);
        assert_eq!(sensor.aggregated_data().len(), 1);
    }

    #[test]
    fn test_empty_series_stores_empty_aggregate() {
        let mut sensor = AggregatedSensor::new("empty");
        let rows = sensor.calculate_aggregate("avg", "AVG", TimeDelta::seconds(60));
        assert_eq!(rows, Some(&[][..]));
        assert!(sensor.aggregated_data().contains_key("avg"));
    }

    #[test]
    fn test_visualize_unknown_aggregate_renders_nothing() {
        let dir = env::temp_dir().join("sensor_series_unknown_aggregate_test");
        let _ = fs::remove_dir_all(&dir);

        let sensor = sensor_with(&[(0, 1.0), (120, 2.0)]);
        assert_eq!(sensor.visualize_specific_aggregate("nope", &dir).unwrap(), None);
        assert_eq!(sensor.visualize_all_aggregates(&dir).unwrap(), None);
        assert!(!dir.exists());
    }

    #[test]
    fn test_visualize_specific_and_all_aggregates() {
        let dir = env::temp_dir().join("sensor_series_aggregate_plot_test");
        let _ = fs::remove_dir_all(&dir);

        let mut sensor = sensor_with(&[(0, 1.0), (30, 4.0), (200, 2.0)]);
        sensor.calculate_aggregate("avg", "AVG", TimeDelta::seconds(60));
        sensor.calculate_aggregate("max", "MAX", TimeDelta::seconds(60));

        let one = sensor.visualize_specific_aggregate("avg", &dir).unwrap().unwrap();
        assert_eq!(one, dir.join("Teplota_avg.svg"));
        assert!(one.exists());

        let all = sensor.visualize_all_aggregates(&dir).unwrap().unwrap();
        assert_eq!(all, dir.join("Teplota_aggregates.svg"));
        assert!(all.exists());

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_into_sensor_keeps_series() {
        let sensor = sensor_with(&[(0, 1.0)]);
        let plain = sensor.into_sensor();
        assert_eq!(plain.name, "Teplota");
        assert_eq!(plain.len(), 1);
    }
}
