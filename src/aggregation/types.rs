//! Data types used by the aggregation pipeline.

use chrono::NaiveDateTime;
use std::fmt;
use std::str::FromStr;

/// A single reading: when it was taken and what was measured.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub timestamp: NaiveDateTime,
    pub value: f64,
}

impl Sample {
    pub fn new(timestamp: NaiveDateTime, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// Reduction applied to the values of one bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregateKind {
    Avg,
    Min,
    Max,
}

impl AggregateKind {
    pub const ALL: [AggregateKind; 3] = [AggregateKind::Avg, AggregateKind::Min, AggregateKind::Max];

    pub fn as_str(&self) -> &'static str {
        match self {
            AggregateKind::Avg => "AVG",
            AggregateKind::Min => "MIN",
            AggregateKind::Max => "MAX",
        }
    }
}

impl fmt::Display for AggregateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when an aggregate name is not one of `AVG`, `MIN` or `MAX`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("aggregate {0} is not valid")]
pub struct UnknownAggregate(pub String);

impl FromStr for AggregateKind {
    type Err = UnknownAggregate;

    /// Names are matched exactly; `"avg"` is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AggregateKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownAggregate(s.to_string()))
    }
}
