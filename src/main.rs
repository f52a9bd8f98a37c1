//! CLI entry point for the sensor series tool.
//!
//! Provides subcommands for cataloguing a data folder, summarizing and
//! plotting single sensors, plotting whole equipment, and computing
//! time-bucket aggregates.

use anyhow::{Context, Result, bail};
use chrono::TimeDelta;
use clap::{Parser, Subcommand};
use sensor_series::catalog::load_equipment;
use sensor_series::output::{print_json, print_pretty};
use sensor_series::settings::Settings;
use sensor_series::{AggregatedSensor, Sensor};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "sensor_series")]
#[command(about = "Load, aggregate and plot equipment sensor readings", long_about = None)]
struct Cli {
    /// Directory charts are written to (overrides PLOT_DIR)
    #[arg(long, global = true)]
    plot_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every equipment and its sensors found in the data folder
    List {
        /// Folder of <Equipment>_<Sensor>.csv files (overrides DATA_FOLDER)
        #[arg(short = 'd', long)]
        data_dir: Option<PathBuf>,
    },
    /// Print descriptive statistics for one sensor file
    Stats {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Sensor name (defaults to the file stem)
        #[arg(short, long)]
        name: Option<String>,

        /// Measurement units
        #[arg(short, long, default_value = "unknown")]
        units: String,

        /// Print the summary as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Plot one sensor file as a line chart
    Plot {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Sensor name (defaults to the file stem)
        #[arg(short, long)]
        name: Option<String>,

        /// Measurement units
        #[arg(short, long, default_value = "unknown")]
        units: String,
    },
    /// Plot all sensors of one equipment from the data folder
    PlotEquipment {
        #[arg(value_name = "EQUIPMENT")]
        equipment: String,

        /// Folder of <Equipment>_<Sensor>.csv files (overrides DATA_FOLDER)
        #[arg(short = 'd', long)]
        data_dir: Option<PathBuf>,
    },
    /// Compute time-bucket aggregates for one sensor file and plot them
    Aggregate {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Aggregate kind: AVG, MIN or MAX (repeatable)
        #[arg(short, long = "kind", required = true)]
        kinds: Vec<String>,

        /// Bucket width in seconds
        #[arg(short, long, value_parser = clap::value_parser!(i64).range(1..))]
        window: i64,

        /// Calculation name; suffixed with the kind when several kinds are given
        #[arg(short, long)]
        calculation: Option<String>,

        /// Sensor name (defaults to the file stem)
        #[arg(short, long)]
        name: Option<String>,

        /// Measurement units
        #[arg(short, long, default_value = "unknown")]
        units: String,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    let settings = Settings::from_env();
    let _file_guard = init_tracing(&settings.log_file_path)?;

    let cli = Cli::parse();
    let plot_dir = cli.plot_dir.unwrap_or(settings.plot_dir);

    match cli.command {
        Commands::List { data_dir } => {
            let data_dir = data_dir.unwrap_or(settings.data_folder);
            let equipment = load_equipment(&data_dir)?;

            for eq in equipment.values() {
                info!(equipment = %eq, vendor = %eq.vendor, "Equipment");
                for sensor in eq.sensors() {
                    info!(
                        equipment = %eq.name,
                        sensor = %sensor.name,
                        samples = sensor.len(),
                        "Sensor"
                    );
                }
            }
        }
        Commands::Stats {
            file,
            name,
            units,
            json,
        } => {
            let sensor = load_sensor(&file, name, units)?;
            let summary = sensor.show_statistics();

            if json {
                print_json(&summary)?;
            } else {
                print_pretty(&summary);
            }
        }
        Commands::Plot { file, name, units } => {
            let sensor = load_sensor(&file, name, units)?;
            let path = sensor.visualize(&plot_dir)?;
            info!(path = %path.display(), "Sensor chart written");
        }
        Commands::PlotEquipment {
            equipment,
            data_dir,
        } => {
            let data_dir = data_dir.unwrap_or(settings.data_folder);
            let catalog = load_equipment(&data_dir)?;

            let Some(eq) = catalog.get(&equipment) else {
                bail!(
                    "equipment {equipment} not found in {} (known: {:?})",
                    data_dir.display(),
                    catalog.keys().collect::<Vec<_>>()
                );
            };

            let path = eq.visualize_all_sensors(&plot_dir)?;
            info!(equipment = %eq, path = %path.display(), "Equipment chart written");
        }
        Commands::Aggregate {
            file,
            kinds,
            window,
            calculation,
            name,
            units,
        } => {
            let window = TimeDelta::try_seconds(window).context("aggregation window out of range")?;
            let mut sensor = AggregatedSensor::from_sensor(load_sensor(&file, name, units)?);

            let mut computed = Vec::new();
            for kind in &kinds {
                let calculation_name = match &calculation {
                    Some(base) if kinds.len() > 1 => format!("{base}_{kind}"),
                    Some(base) => base.clone(),
                    None => kind.clone(),
                };

                if let Some(rows) = sensor.calculate_aggregate(&calculation_name, kind, window) {
                    let empty = rows.iter().filter(|r| r.value.is_nan()).count();
                    info!(
                        calculation = %calculation_name,
                        buckets = rows.len(),
                        empty_buckets = empty,
                        "Aggregate ready"
                    );
                    computed.push(calculation_name);
                }
            }

            if computed.is_empty() {
                warn!("No aggregate was calculated");
                return Ok(());
            }

            for calculation_name in &computed {
                if let Some(path) = sensor.visualize_specific_aggregate(calculation_name, &plot_dir)? {
                    info!(calculation = %calculation_name, path = %path.display(), "Aggregate chart written");
                }
            }

            if computed.len() > 1 {
                if let Some(path) = sensor.visualize_all_aggregates(&plot_dir)? {
                    info!(path = %path.display(), "Combined aggregate chart written");
                }
            }
        }
    }

    Ok(())
}

/// Logging setup: colored stderr + JSON rolling log file.
fn init_tracing(log_file_path: &Path) -> Result<WorkerGuard> {
    let log_dir = log_file_path.parent().unwrap_or(Path::new("logs"));
    let log_file_name = log_file_path
        .file_name()
        .unwrap_or(OsStr::new("sensor_series.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    Ok(file_guard)
}

/// Loads `file` into a sensor named `name`, or after the file stem.
fn load_sensor(file: &Path, name: Option<String>, units: String) -> Result<Sensor> {
    let name = name.unwrap_or_else(|| {
        file.file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "sensor".to_string())
    });

    let mut sensor = Sensor::with_units(name, units);
    sensor.load_data(file)?;
    Ok(sensor)
}
