//! Pitwall Ports
//!
//! Port definitions (traits) for the Pitwall race strategy pipeline.
//! These define the boundary between the pure pipeline and the telemetry
//! service it reads from.

mod error;
mod query;
mod source;

pub use error::{FetchError, FetchResult};
pub use query::{SessionQuery, TimeRange};
pub use source::TelemetrySource;
