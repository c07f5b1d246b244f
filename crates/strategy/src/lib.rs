//! Pitwall Strategy
//!
//! Turns aligned race state into pit-stop advice:
//! - Pace and tyre context from clean laps and stints
//! - Session pit-loss estimate with SC/VSC discounts
//! - Undercut / overcut scoring behind the `PitScorer` seam
//! - A stateless, priority-ordered decision engine
//! - Per-minute snapshots with each driver's target ahead
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pitwall_strategy::{DecisionEngine, HeuristicScorer, SnapshotService, StrategyParams};
//!
//! let params = StrategyParams::default();
//! let service = SnapshotService::new(
//!     Box::new(HeuristicScorer::new(params.clone())),
//!     DecisionEngine::new(params),
//! );
//! let advice = service.snapshot(frame.rows_at(minute), &roster);
//! ```

pub mod config;
pub mod decision;
pub mod pace;
pub mod pit_loss;
pub mod scoring;
pub mod snapshot;
pub mod tyre;

// Re-export main types
pub use config::{ConfigError, StrategyParams};
pub use decision::DecisionEngine;
pub use pace::{is_clean_lap, resolve_driver_contexts};
pub use pit_loss::{PitLossEstimate, estimate_pit_loss};
pub use scoring::{HeuristicScorer, PitScorer, PitScores};
pub use snapshot::{DriverAdvice, FlagBits, SnapshotService, resolve_targets};
pub use tyre::{MAX_STINT_LAPS, TyreContext, TyreMap};
