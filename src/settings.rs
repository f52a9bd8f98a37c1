use std::env;
use std::path::PathBuf;

pub const DEFAULT_DATA_FOLDER: &str = "data";
pub const DEFAULT_PLOT_DIR: &str = "plots";
pub const DEFAULT_LOG_FILE: &str = "logs/sensor_series.log";

/// Folder locations read from the environment (after `.env` is loaded).
///
/// | Variable        | Default                  |
/// |-----------------|--------------------------|
/// | `DATA_FOLDER`   | `data`                   |
/// | `PLOT_DIR`      | `plots`                  |
/// | `LOG_FILE_PATH` | `logs/sensor_series.log` |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub data_folder: PathBuf,
    pub plot_dir: PathBuf,
    pub log_file_path: PathBuf,
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds settings from an arbitrary variable lookup; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| {
            PathBuf::from(
                lookup(key)
                    .filter(|v| !v.trim().is_empty())
                    .unwrap_or_else(|| default.to_string()),
            )
        };

        Settings {
            data_folder: get("DATA_FOLDER", DEFAULT_DATA_FOLDER),
            plot_dir: get("PLOT_DIR", DEFAULT_PLOT_DIR),
            log_file_path: get("LOG_FILE_PATH", DEFAULT_LOG_FILE),
        }
    }
}
