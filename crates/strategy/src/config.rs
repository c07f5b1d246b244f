//! Tunable strategy constants
//!
//! The scoring and decision thresholds are hand-tuned, not learned. They
//! live here so a JSON file can override any of them without a rebuild.

use std::path::Path;

use pitwall_core::PitLossPolicy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read params file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse params: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid params: {0}")]
    Invalid(String),
}

/// Strategy parameters
///
/// Missing keys in a params file take the defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyParams {
    /// Time lost on the out-lap after a stop (seconds)
    pub outlap_penalty_s: f64,
    /// Pace advantage of fresh tyres (seconds per lap)
    pub new_tyre_delta_s: f64,
    /// Extra slowdown of the rival on old tyres (seconds per lap)
    pub front_old_slowdown_s: f64,
    /// Fresh-tyre warm-up loss (seconds)
    pub warmup_loss_s: f64,
    /// Safety margin subtracted from both scores (seconds)
    pub score_margin_s: f64,

    /// Under SC/VSC, box when the undercut score exceeds this
    pub sc_box_score_floor: f64,
    /// Under SC/VSC, box when gap ahead < this fraction of pit loss
    pub sc_gap_fraction: f64,
    /// Undercut only when the gap ahead is below this (seconds)
    pub undercut_max_gap_s: f64,
    /// Box next lap when the undercut score exceeds this
    pub box_soon_score_floor: f64,
    /// ... and the gap ahead is below this fraction of pit loss
    pub box_soon_gap_fraction: f64,

    /// Pit loss used when the session gives no plausible estimate
    pub pit_loss_default_s: f64,
    pub pit_loss_min_s: f64,
    pub pit_loss_max_s: f64,
    /// Pit-loss multiplier under safety car
    pub sc_pit_factor: f64,
    /// Pit-loss multiplier under virtual safety car
    pub vsc_pit_factor: f64,

    /// Clean laps in the trailing pace median
    pub pace_window_laps: usize,
}

impl Default for StrategyParams {
    fn default() -> Self {
        Self {
            outlap_penalty_s: 2.5,
            new_tyre_delta_s: 0.35,
            front_old_slowdown_s: 0.20,
            warmup_loss_s: 0.15,
            score_margin_s: 0.5,
            sc_box_score_floor: -2.0,
            sc_gap_fraction: 0.5,
            undercut_max_gap_s: 12.0,
            box_soon_score_floor: -0.5,
            box_soon_gap_fraction: 0.7,
            pit_loss_default_s: 20.0,
            pit_loss_min_s: 5.0,
            pit_loss_max_s: 40.0,
            sc_pit_factor: 0.65,
            vsc_pit_factor: 0.75,
            pace_window_laps: 3,
        }
    }
}

impl StrategyParams {
    /// Load from a JSON file and validate
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Parse from a JSON string and validate
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let params: StrategyParams = serde_json::from_str(json)?;
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let values = [
            ("outlap_penalty_s", self.outlap_penalty_s),
            ("new_tyre_delta_s", self.new_tyre_delta_s),
            ("front_old_slowdown_s", self.front_old_slowdown_s),
            ("warmup_loss_s", self.warmup_loss_s),
            ("score_margin_s", self.score_margin_s),
            ("sc_box_score_floor", self.sc_box_score_floor),
            ("sc_gap_fraction", self.sc_gap_fraction),
            ("undercut_max_gap_s", self.undercut_max_gap_s),
            ("box_soon_score_floor", self.box_soon_score_floor),
            ("box_soon_gap_fraction", self.box_soon_gap_fraction),
            ("pit_loss_default_s", self.pit_loss_default_s),
            ("pit_loss_min_s", self.pit_loss_min_s),
            ("pit_loss_max_s", self.pit_loss_max_s),
            ("sc_pit_factor", self.sc_pit_factor),
            ("vsc_pit_factor", self.vsc_pit_factor),
        ];
        if let Some((name, _)) = values.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ConfigError::Invalid(format!("{} must be finite", name)));
        }

        if self.pit_loss_min_s > self.pit_loss_max_s {
            return Err(ConfigError::Invalid(format!(
                "pit loss bound is empty: [{}, {}]",
                self.pit_loss_min_s, self.pit_loss_max_s
            )));
        }
        if !self.plausible_pit_loss(self.pit_loss_default_s) {
            return Err(ConfigError::Invalid(format!(
                "default pit loss {} outside [{}, {}]",
                self.pit_loss_default_s, self.pit_loss_min_s, self.pit_loss_max_s
            )));
        }
        if self.pace_window_laps == 0 {
            return Err(ConfigError::Invalid(
                "pace_window_laps must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn plausible_pit_loss(&self, seconds: f64) -> bool {
        (self.pit_loss_min_s..=self.pit_loss_max_s).contains(&seconds)
    }

    /// Flag-dependent pit-loss policy around a session base
    pub fn pit_loss_policy(&self, base_s: f64) -> PitLossPolicy {
        PitLossPolicy::new(base_s, self.sc_pit_factor, self.vsc_pit_factor)
    }
}
