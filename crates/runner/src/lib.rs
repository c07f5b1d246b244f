//! Pitwall Runner - race strategy orchestration
//!
//! Wires a telemetry source to the alignment and strategy crates:
//!
//! - **Session data**: fetch every stream of a session, restricted to the race window
//! - **Pipeline**: start, grid, frame, pit loss; snapshots on demand
//! - **Discovery**: meetings-first race lookup with fallbacks
//! - **Minute selection**: last minute, absolute time, T+offset or lap start
//! - **Summary**: one row per race of a season, failures captured per row
//! - **Live**: fixed-interval re-run of the whole pipeline
//!
//! ## Architecture
//!
//! ```text
//!            ┌──────────────────────┐
//!            │   TelemetrySource    │
//!            │ (OpenF1 / replay)    │
//!            └──────────┬───────────┘
//!                       │ raw records
//!                       ▼
//!            ┌──────────────────────┐
//!            │     SessionData      │ start detection, window
//!            └──────────┬───────────┘
//!                       ▼
//!  ┌─────────────────────────────────────────────┐
//!  │               SessionPipeline               │
//!  │  MinuteGrid ─► FrameBuilder ─► SessionFrame │
//!  │  pace/tyre contexts, pit-loss estimate      │
//!  └────────────────────┬────────────────────────┘
//!                       │ rows at minute
//!                       ▼
//!            ┌──────────────────────┐
//!            │   SnapshotService    │ scorer + decision engine
//!            └──────────┬───────────┘
//!                       ▼
//!        SessionReport / SummaryRow (JSON)
//! ```

pub mod discovery;
pub mod error;
pub mod live;
pub mod minute;
pub mod pipeline;
pub mod report;
pub mod session_data;
pub mod summary;

// Re-export main types
pub use discovery::{SessionSelector, iter_year_races, meeting_races, resolve_session};
pub use error::{Result, RunnerError};
pub use live::{DEFAULT_POLL, MIN_POLL, RunConfig, run_cycle, watch};
pub use minute::{MinuteSelector, minute_from_lap, parse_tplus};
pub use pipeline::{SessionAnalysis, SessionPipeline};
pub use report::{SessionReport, Suggestions};
pub use session_data::{
    FETCH_MARGIN_MINUTES, SessionData, fetch_window, lap_starts, restrict_carrying, restrict_to,
};
pub use summary::{SummaryOutcome, SummaryRow, season_summary};
