//! Pitwall Core Domain
//!
//! Pure domain types for the Pitwall race strategy pipeline.
//! This crate contains no async, no I/O, and is 100% unit testable.

pub mod entities;
pub mod telemetry;
pub mod values;

// Re-export commonly used types at crate root
pub use entities::{
    // Verdicts
    Advice,
    Decision,
    // Session & participants
    Driver,
    // Aligned state
    DriverContext,
    DriverMinuteState,
    FlagState,
    FlagTimeline,
    MeetingMeta,
    PitLossPolicy,
    RACE_SESSION_TYPE,
    SessionMeta,
};
pub use telemetry::{
    IntervalSample, LapRecord, PitStopRecord, PositionSample, RaceControlEvent, Sample,
    StintRecord, WeatherSample,
};
pub use values::{DriverNumber, RawRecord, Timestamp, floor_to_minute, median};
