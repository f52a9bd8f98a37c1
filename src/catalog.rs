//! Builds the equipment map from a folder of sensor files.
//!
//! Files are named `<Equipment>_<Sensor>.csv`; every file becomes one sensor
//! of the equipment named by its prefix.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::equipment::Equipment;
use crate::sensor::Sensor;

/// Splits a file name into `(equipment, sensor)`.
///
/// The equipment ends at the first `_`, the sensor at the first `.` after
/// it. Returns `None` when there is no `_` or either part is empty.
pub fn split_file_name(file_name: &str) -> Option<(&str, &str)> {
    let (equipment, rest) = file_name.split_once('_')?;
    let sensor = rest.split('.').next().unwrap_or(rest);

    if equipment.is_empty() || sensor.is_empty() {
        return None;
    }
    Some((equipment, sensor))
}

/// Lists the `*.csv` files in `dir`, sorted by name.
pub fn list_sensor_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in fs::read_dir(dir).with_context(|| format!("failed to read {}", dir.display()))? {
        let entry = entry?;
        let path = entry.path();

        if entry.file_type()?.is_file() && path.extension().and_then(|e| e.to_str()) == Some("csv") {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

/// Loads every sensor file in `dir` into its equipment.
///
/// # Errors
///
/// Fails if the folder cannot be listed or any sensor file fails to load.
#[tracing::instrument(skip(dir), fields(dir = %dir.display()))]
pub fn load_equipment(dir: &Path) -> Result<BTreeMap<String, Equipment>> {
    let mut equipment: BTreeMap<String, Equipment> = BTreeMap::new();

    for path in list_sensor_files(dir)? {
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Some((equipment_name, sensor_name)) = split_file_name(file_name) else {
            debug!(file = file_name, "Skipping file without equipment prefix");
            continue;
        };

        let mut sensor = Sensor::new(sensor_name);
        sensor.load_data(&path)?;

        equipment
            .entry(equipment_name.to_string())
            .or_insert_with(|| Equipment::new(equipment_name))
            .add_sensor(sensor);
    }

    info!(equipment = equipment.len(), "Catalog loaded");
    Ok(equipment)
}
