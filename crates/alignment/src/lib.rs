//! Pitwall Alignment
//!
//! Puts asynchronously sampled race telemetry on one time axis:
//! - Actual-start detection from race control, laps and positions
//! - A fixed minute grid capped at three hours from the start
//! - Step-and-hold resampling, per driver or session-global
//! - Per-minute flag aggregation
//! - The (minute x driver) frame of aligned rows
//!
//! ## Pipeline
//!
//! ```text
//! race control ─┐
//! laps ─────────┼─► detect_actual_start ─► MinuteGrid ─┐
//! positions ────┘                                      │
//!                                                      ▼
//! positions, intervals, weather ─────────────────► Aligner ─► SessionFrame
//! race control ─► aggregate_flags ──────────────────────┘
//! ```
//!
//! Everything here is synchronous and side-effect free.

pub mod error;
pub mod flags;
pub mod frame;
pub mod grid;
pub mod resample;
pub mod start;

pub use error::{AlignmentError, Result};
pub use flags::aggregate_flags;
pub use frame::{FrameBuilder, SessionFrame, resolve_drivers};
pub use grid::{MinuteGrid, RACE_HORIZON_HOURS, race_horizon};
pub use resample::{
    Aligner, Carry, DriverSeries, GapState, PositionState, WeatherState,
};
pub use start::{StartResolution, StartSource, detect_actual_start};
