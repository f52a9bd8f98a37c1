pub mod aggregated_sensor;
pub mod aggregation;
pub mod catalog;
pub mod equipment;
pub mod output;
pub mod parser;
pub mod plot;
pub mod sensor;
pub mod settings;
pub mod stats;

#[cfg(test)]
mod test_support;

pub use aggregated_sensor::AggregatedSensor;
pub use aggregation::types::{AggregateKind, Sample, UnknownAggregate};
pub use equipment::Equipment;
pub use sensor::Sensor;
