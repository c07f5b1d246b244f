//! Decision engine
//!
//! Stateless: every row is judged on its own fields. Rules are checked
//! in priority order and the first match wins:
//! 1. Red flag -> `NO_ACTION`
//! 2. SC or VSC -> `BOX_NOW_SC` / `HOLD_SC`
//! 3. Green -> `BOX_NOW_UNDERCUT`, `BOX_SOON_1LAP`, `STAY_OUT_OVERCUT`
//! 4. Otherwise `STAY_OUT`
//!
//! An unknown score or gap never satisfies a comparison.

use pitwall_core::{Advice, Decision, DriverMinuteState};

use crate::config::StrategyParams;

/// `value > threshold`, false when unknown
fn above(value: Option<f64>, threshold: f64) -> bool {
    value.is_some_and(|v| v > threshold)
}

/// `value < fraction * reference`, false when either is unknown
fn below_fraction(value: Option<f64>, fraction: f64, reference: Option<f64>) -> bool {
    match (value, reference) {
        (Some(v), Some(r)) => v < fraction * r,
        _ => false,
    }
}

#[derive(Debug, Clone, Default)]
pub struct DecisionEngine {
    params: StrategyParams,
}

impl DecisionEngine {
    pub fn new(params: StrategyParams) -> Self {
        Self { params }
    }

    /// Verdict for one scored row
    pub fn decide(&self, row: &DriverMinuteState) -> Decision {
        let p = &self.params;
        let score = row.undercut_score;
        let over = row.overcut_score;
        let gap = row.gap_ahead_s;
        let pit_loss = row.pit_loss_s;
        let flags = &row.flags;

        if flags.is_red {
            return Decision::new(
                Advice::NoAction,
                "Red flag: pit stops are handled outside normal strategy.",
            );
        }

        if flags.is_sc || flags.is_vsc {
            if above(score, p.sc_box_score_floor)
                || below_fraction(gap, p.sc_gap_fraction, pit_loss)
            {
                return Decision::new(Advice::BoxNowSc, "Pit loss reduced under SC/VSC.");
            }
            return Decision::new(
                Advice::HoldSc,
                "Under SC/VSC but the window is not optimal yet.",
            );
        }

        if flags.is_green_effective() {
            if above(score, 0.0) && gap.is_some_and(|g| g < p.undercut_max_gap_s) {
                return Decision::new(
                    Advice::BoxNowUndercut,
                    format!("UndercutScore={:.2} > 0, small gap.", score.unwrap_or_default()),
                );
            }
            if above(score, p.box_soon_score_floor)
                && below_fraction(gap, p.box_soon_gap_fraction, pit_loss)
            {
                return Decision::new(
                    Advice::BoxSoon1Lap,
                    format!(
                        "Gap < {}*PitLoss; window approaching.",
                        p.box_soon_gap_fraction
                    ),
                );
            }
            let clean_air = match (row.gap_leader_s, pit_loss) {
                (Some(leader), Some(loss)) => leader > loss,
                _ => false,
            };
            if above(over, 0.0) && clean_air {
                return Decision::new(
                    Advice::StayOutOvercut,
                    format!("OvercutScore={:.2} > 0 and clean air.", over.unwrap_or_default()),
                );
            }
        }

        self.stay_out(score, gap, pit_loss)
    }

    /// Fallback verdict, explaining which conditions failed
    fn stay_out(&self, score: Option<f64>, gap: Option<f64>, pit_loss: Option<f64>) -> Decision {
        let mut why = Vec::new();
        if !above(score, 0.0) {
            why.push("Undercut gain below gap.");
        }
        if let (Some(g), Some(loss)) = (gap, pit_loss) {
            if g >= self.params.box_soon_gap_fraction * loss {
                why.push("Gap too large vs pit loss.");
            }
        }
        if why.is_empty() {
            why.push("Unfavorable context now.");
        }
        Decision::new(Advice::StayOut, why.join(" "))
    }
}
