mod coerce;
mod stats;

use chrono::{DateTime, DurationRound, TimeDelta, Utc};

pub use coerce::{
    field_bool, field_f64, field_i64, field_str, field_timestamp, field_u32, first_f64,
    parse_timestamp,
};
pub use stats::median;

/// Timestamp in UTC
pub type Timestamp = DateTime<Utc>;

/// Car number, unique per driver within a session
pub type DriverNumber = u32;

/// Loosely-typed record as returned by the telemetry service
///
/// Field presence varies by source; typed records are built from these
/// through the coercion helpers and never fail on a missing column.
pub type RawRecord = serde_json::Map<String, serde_json::Value>;

/// Truncate a timestamp to the start of its minute
pub fn floor_to_minute(ts: Timestamp) -> Timestamp {
    ts.duration_trunc(TimeDelta::minutes(1)).unwrap_or(ts)
}
