//! Undercut / overcut scoring
//!
//! ```text
//! front_old_pace = pace + front_old_slowdown
//! our_new_pace   = max(0, pace - new_tyre_delta)
//! gain_2laps     = 2 * (front_old_pace - our_new_pace) - outlap_penalty - pit_loss
//! undercut       = gain_2laps - gap_ahead - margin
//! overcut        = (outlap_penalty + warmup_loss) - front_old_slowdown - gap_ahead - margin
//! ```

use pitwall_core::DriverMinuteState;

use crate::config::StrategyParams;

/// Scores for one row; `None` when the inputs are not known
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PitScores {
    pub undercut: Option<f64>,
    pub overcut: Option<f64>,
}

/// Scores pit timing for one aligned row
///
/// The heuristic scorer is the only implementation; a learned model
/// would plug in here.
pub trait PitScorer: Send + Sync {
    fn score(&self, row: &DriverMinuteState) -> PitScores;

    fn name(&self) -> &str;
}

/// Hand-tuned two-lap undercut model
#[derive(Debug, Clone, Default)]
pub struct HeuristicScorer {
    params: StrategyParams,
}

impl HeuristicScorer {
    pub fn new(params: StrategyParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &StrategyParams {
        &self.params
    }

    /// Rival's pace on worn tyres
    pub fn front_old_pace(&self, pace: f64) -> f64 {
        pace + self.params.front_old_slowdown_s
    }

    /// Our pace on fresh tyres
    pub fn our_new_pace(&self, pace: f64) -> f64 {
        (pace - self.params.new_tyre_delta_s).max(0.0)
    }

    /// Net time gained over two laps by stopping now
    pub fn gain_2laps(&self, pace: f64, pit_loss: f64) -> f64 {
        2.0 * (self.front_old_pace(pace) - self.our_new_pace(pace))
            - self.params.outlap_penalty_s
            - pit_loss
    }

    pub fn undercut_score(&self, pace: f64, gap_ahead: f64, pit_loss: f64) -> f64 {
        self.gain_2laps(pace, pit_loss) - gap_ahead - self.params.score_margin_s
    }

    /// One-lap gain from staying out while the rival does the out-lap
    pub fn overcut_gain(&self) -> f64 {
        (self.params.outlap_penalty_s + self.params.warmup_loss_s) - self.params.front_old_slowdown_s
    }

    pub fn overcut_score(&self, gap_ahead: f64) -> f64 {
        self.overcut_gain() - gap_ahead - self.params.score_margin_s
    }
}

impl PitScorer for HeuristicScorer {
    fn score(&self, row: &DriverMinuteState) -> PitScores {
        let undercut = match (row.pace_estimate_s, row.gap_ahead_s, row.pit_loss_s) {
            (Some(pace), Some(gap), Some(loss)) => Some(self.undercut_score(pace, gap, loss)),
            _ => None,
        };
        let overcut = row.gap_ahead_s.map(|gap| self.overcut_score(gap));

        PitScores { undercut, overcut }
    }

    fn name(&self) -> &str {
        "HeuristicScorer"
    }
}
