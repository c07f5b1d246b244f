use serde::{Deserialize, Serialize};

use super::flags::FlagState;
use crate::values::{DriverNumber, Timestamp};

/// Per-driver context resolved once for the whole window
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DriverContext {
    /// Smoothed lap pace in seconds
    pub pace_estimate_s: Option<f64>,
    /// Compound on the last clean lap
    pub compound: Option<String>,
    /// Tyre age in laps on the last clean lap
    pub tyre_age_laps: Option<u32>,
}

/// Session pit-loss base and its neutralization discounts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PitLossPolicy {
    /// Representative pit-stop cost under green flag (seconds)
    pub base_s: f64,
    /// Multiplier while the safety car is out
    pub sc_factor: f64,
    /// Multiplier under a virtual safety car
    pub vsc_factor: f64,
}

impl PitLossPolicy {
    pub fn new(base_s: f64, sc_factor: f64, vsc_factor: f64) -> Self {
        Self {
            base_s,
            sc_factor,
            vsc_factor,
        }
    }

    /// Pit loss for a minute given its flag state
    ///
    /// Safety car takes precedence over a concurrent VSC observation.
    pub fn adjusted(&self, flags: &FlagState) -> f64 {
        if flags.is_sc {
            self.base_s * self.sc_factor
        } else if flags.is_vsc {
            self.base_s * self.vsc_factor
        } else {
            self.base_s
        }
    }
}

impl Default for PitLossPolicy {
    fn default() -> Self {
        Self::new(20.0, 0.65, 0.75)
    }
}

/// Aligned state of one driver at one grid minute
///
/// Keyed by (minute, driver_number). `None` means "not yet observed";
/// values are never fabricated. Scores and target are left empty by row
/// construction and filled on an annotated copy by the decision layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverMinuteState {
    pub minute: Timestamp,
    pub driver_number: DriverNumber,
    pub position: Option<u32>,
    /// Gap to the car directly ahead (seconds)
    pub gap_ahead_s: Option<f64>,
    /// Gap to the race leader (seconds)
    pub gap_leader_s: Option<f64>,
    pub pace_estimate_s: Option<f64>,
    pub compound: Option<String>,
    pub tyre_age_laps: Option<u32>,
    pub flags: FlagState,
    pub pit_loss_s: Option<f64>,
    pub undercut_score: Option<f64>,
    pub overcut_score: Option<f64>,
    pub target_driver: Option<DriverNumber>,
}

impl DriverMinuteState {
    /// Empty row: every observation unknown, no flags
    pub fn new(minute: Timestamp, driver_number: DriverNumber) -> Self {
        Self {
            minute,
            driver_number,
            position: None,
            gap_ahead_s: None,
            gap_leader_s: None,
            pace_estimate_s: None,
            compound: None,
            tyre_age_laps: None,
            flags: FlagState::CLEAR,
            pit_loss_s: None,
            undercut_score: None,
            overcut_score: None,
            target_driver: None,
        }
    }
}
