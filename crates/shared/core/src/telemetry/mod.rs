//! Typed telemetry records
//!
//! Each record is built from a loosely-typed service record through the
//! coercion helpers; missing or unparseable fields become `None`.

mod laps;
mod pit;
mod race_control;
mod samples;

pub use laps::{LAP_DURATION_FIELDS, LapRecord, StintRecord};
pub use pit::{PIT_DURATION_FIELDS, PitStopRecord};
pub use race_control::RaceControlEvent;
pub use samples::{IntervalSample, PositionSample, WeatherSample};

use crate::values::{DriverNumber, RawRecord, Timestamp};

/// A timestamped observation, optionally keyed by driver
pub trait Sample {
    /// `None` when the timestamp was missing or unparseable
    fn timestamp(&self) -> Option<Timestamp>;

    /// `None` for session-global streams
    fn driver(&self) -> Option<DriverNumber>;
}

/// Convert a batch of raw records with an infallible constructor
pub fn parse_all<T>(records: &[RawRecord], parse: impl Fn(&RawRecord) -> T) -> Vec<T> {
    records.iter().map(parse).collect()
}

/// Convert a batch of raw records, skipping those that cannot be typed
pub fn parse_valid<T>(records: &[RawRecord], parse: impl Fn(&RawRecord) -> Option<T>) -> Vec<T> {
    records.iter().filter_map(parse).collect()
}
