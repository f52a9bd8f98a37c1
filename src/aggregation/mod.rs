//! Fixed-width time-bucket aggregation.
//!
//! This module splits a series into consecutive buckets starting at its
//! earliest timestamp and reduces each bucket to a single value (mean,
//! minimum or maximum).

pub mod aggregate;
pub mod types;
pub mod utility;
