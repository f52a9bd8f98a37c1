use anyhow::Result;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::aggregation::types::Sample;
use crate::output::log_summary;
use crate::parser::load_samples;
use crate::plot::{Line, plot_path, render_chart};
use crate::stats::SeriesSummary;

pub const DEFAULT_UNITS: &str = "unknown";

/// A named time series read from one file.
#[derive(Debug, Clone, PartialEq)]
pub struct Sensor {
    pub name: String,
    pub units: String,
    /// Samples in file order; not necessarily sorted by time.
    pub data: Vec<Sample>,
    /// Path of the file the series came from, without its extension.
    pub source: Option<String>,
}

impl Sensor {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_units(name, DEFAULT_UNITS)
    }

    pub fn with_units(name: impl Into<String>, units: impl Into<String>) -> Self {
        Sensor {
            name: name.into(),
            units: units.into(),
            data: Vec::new(),
            source: None,
        }
    }

    /// Replaces the series with the contents of the file at `path`.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or any row is malformed; the
    /// current series is kept in that case.
    #[tracing::instrument(skip(self, path), fields(sensor = %self.name, path = %path.as_ref().display()))]
    pub fn load_data(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.data = load_samples(path)?;
        self.source = Some(path.with_extension("").to_string_lossy().into_owned());
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn statistics(&self) -> SeriesSummary {
        SeriesSummary::from_samples(&self.data)
    }

    /// Computes the summary and logs it.
    pub fn show_statistics(&self) -> SeriesSummary {
        let summary = self.statistics();
        log_summary(&self.name, &self.units, &summary);
        summary
    }

    /// Renders the series as a line chart into `dir`, returning the file written.
    pub fn visualize(&self, dir: &Path) -> Result<PathBuf> {
        let path = plot_path(dir, &self.name);
        render_chart(&path, &self.name, &self.units, &[Line::new(&self.name, &self.data)])?;
        Ok(path)
    }
}

impl fmt::Display for Sensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
