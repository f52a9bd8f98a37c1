use anyhow::Result;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::plot::{Line, plot_path, render_chart};
use crate::sensor::{DEFAULT_UNITS, Sensor};

/// A named asset owning an ordered set of sensors.
#[derive(Debug, Clone, PartialEq)]
pub struct Equipment {
    pub name: String,
    pub vendor: String,
    sensors: Vec<Sensor>,
}

impl Equipment {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_vendor(name, "unknown")
    }

    pub fn with_vendor(name: impl Into<String>, vendor: impl Into<String>) -> Self {
        Equipment {
            name: name.into(),
            vendor: vendor.into(),
            sensors: Vec::new(),
        }
    }

    /// Appends `sensor`; sensors keep the order they were added in.
    pub fn add_sensor(&mut self, sensor: Sensor) {
        self.sensors.push(sensor);
    }

    pub fn sensors(&self) -> &[Sensor] {
        &self.sensors
    }

    /// First sensor named `name`, if any.
    pub fn sensor(&self, name: &str) -> Option<&Sensor> {
        self.sensors.iter().find(|s| s.name == name)
    }

    pub fn len(&self) -> usize {
        self.sensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty()
    }

    /// Renders every sensor on one chart with a legend of sensor names.
    ///
    /// The y axis carries the shared unit when all sensors agree on one,
    /// otherwise it is left as `unknown`.
    pub fn visualize_all_sensors(&self, dir: &Path) -> Result<PathBuf> {
        let lines: Vec<Line<'_>> = self
            .sensors
            .iter()
            .map(|s| Line::new(&s.name, &s.data))
            .collect();

        let units = match self.sensors.first() {
            Some(first) if self.sensors.iter().all(|s| s.units == first.units) => first.units.as_str(),
            _ => DEFAULT_UNITS,
        };

        let path = plot_path(dir, &self.name);
        render_chart(&path, &self.name, units, &lines)?;
        Ok(path)
    }
}

impl fmt::Display for Equipment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} with {} sensors", self.name, self.sensors.len())
    }
}
