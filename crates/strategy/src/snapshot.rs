//! Snapshot / target service
//!
//! For one minute: order the rows by position, point every driver at the
//! car directly ahead, score, decide, and shape the per-driver payload.

use std::collections::{BTreeMap, HashMap};

use pitwall_core::{Advice, Driver, DriverMinuteState, DriverNumber, FlagState};
use serde::{Deserialize, Serialize};

use crate::decision::DecisionEngine;
use crate::scoring::PitScorer;

/// Round to two decimals
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Neutralization flags as 0/1 bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagBits {
    #[serde(rename = "SC")]
    pub sc: u8,
    #[serde(rename = "VSC")]
    pub vsc: u8,
    #[serde(rename = "RED")]
    pub red: u8,
}

impl From<&FlagState> for FlagBits {
    fn from(flags: &FlagState) -> Self {
        Self {
            sc: u8::from(flags.is_sc),
            vsc: u8::from(flags.is_vsc),
            red: u8::from(flags.is_red),
        }
    }
}

/// Per-driver advice payload; unknown values serialize as `null`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverAdvice {
    pub driver_number: DriverNumber,
    pub driver_name: Option<String>,
    pub team: Option<String>,
    pub position: Option<u32>,
    pub target_driver: Option<DriverNumber>,
    pub gap_ahead: Option<f64>,
    pub gap_leader: Option<f64>,
    pub compound: Option<String>,
    pub tyre_age_laps: Option<u32>,
    pub undercut_score: Option<f64>,
    pub overcut_score: Option<f64>,
    pub pit_loss: Option<f64>,
    pub advice: Advice,
    pub why: String,
    pub flags: FlagBits,
}

/// Copy the rows of one minute, ordered by position with unknown last,
/// and fill in each driver's target
///
/// The target of the driver at position `p > 1` is whoever holds `p - 1`
/// at the same minute. The leader, drivers with no known position, and
/// drivers with nobody at `p - 1` get no target.
pub fn resolve_targets(rows: &[DriverMinuteState]) -> Vec<DriverMinuteState> {
    let mut sorted: Vec<DriverMinuteState> = rows.to_vec();
    sorted.sort_by_key(|r| (r.position.is_none(), r.position));

    let by_position: HashMap<u32, DriverNumber> = rows
        .iter()
        .filter_map(|r| r.position.map(|p| (p, r.driver_number)))
        .collect();

    for row in &mut sorted {
        row.target_driver = row
            .position
            .filter(|p| *p > 1)
            .and_then(|p| by_position.get(&(p - 1)).copied());
    }
    sorted
}

/// Scores and decides every driver at one minute
pub struct SnapshotService {
    scorer: Box<dyn PitScorer>,
    engine: DecisionEngine,
}

impl SnapshotService {
    pub fn new(scorer: Box<dyn PitScorer>, engine: DecisionEngine) -> Self {
        Self { scorer, engine }
    }

    pub fn scorer_name(&self) -> &str {
        self.scorer.name()
    }

    /// Annotated copies of the rows: targets and scores filled in
    pub fn annotate(&self, rows: &[DriverMinuteState]) -> Vec<DriverMinuteState> {
        let mut annotated = resolve_targets(rows);
        for row in &mut annotated {
            let scores = self.scorer.score(row);
            row.undercut_score = scores.undercut;
            row.overcut_score = scores.overcut;
        }
        annotated
    }

    /// Advice for every driver at one minute, in position order
    ///
    /// `rows` are the frame rows of that minute; an empty slice (e.g. an
    /// off-grid minute) gives an empty list.
    pub fn snapshot(
        &self,
        rows: &[DriverMinuteState],
        roster: &BTreeMap<DriverNumber, Driver>,
    ) -> Vec<DriverAdvice> {
        self.annotate(rows)
            .into_iter()
            .map(|row| {
                let decision = self.engine.decide(&row);
                let driver = roster.get(&row.driver_number);
                DriverAdvice {
                    driver_number: row.driver_number,
                    driver_name: driver.map(|d| d.display_name.clone()),
                    team: driver.and_then(|d| d.team.clone()),
                    position: row.position,
                    target_driver: row.target_driver,
                    gap_ahead: row.gap_ahead_s,
                    gap_leader: row.gap_leader_s,
                    compound: row.compound,
                    tyre_age_laps: row.tyre_age_laps,
                    undercut_score: row.undercut_score.map(round2),
                    overcut_score: row.overcut_score.map(round2),
                    pit_loss: row.pit_loss_s,
                    advice: decision.advice,
                    why: decision.why,
                    flags: FlagBits::from(&row.flags),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::HeuristicScorer;
    use chrono::{TimeZone, Utc};

    fn rows(positions: &[(DriverNumber, Option<u32>)]) -> Vec<DriverMinuteState> {
        let minute = Utc.with_ymd_and_hms(2024, 5, 5, 15, 0, 0).unwrap();
        positions
            .iter()
            .map(|(driver, position)| {
                let mut row = DriverMinuteState::new(minute, *driver);
                row.position = *position;
                row
            })
            .collect()
    }

    fn service() -> SnapshotService {
        SnapshotService::new(Box::new(HeuristicScorer::default()), DecisionEngine::default())
    }

    #[test]
    fn test_targets_point_at_car_ahead() {
        // A=1, B=44, C=16 at positions 1, 2, 3, given out of order
        let annotated = resolve_targets(&rows(&[(16, Some(3)), (1, Some(1)), (44, Some(2))]));

        let order: Vec<_> = annotated.iter().map(|r| r.driver_number).collect();
        assert_eq!(order, vec![1, 44, 16]);
        assert_eq!(annotated[0].target_driver, None);
        assert_eq!(annotated[1].target_driver, Some(1));
        assert_eq!(annotated[2].target_driver, Some(44));
    }

    #[test]
    fn test_unknown_positions_last_without_target() {
        let annotated = resolve_targets(&rows(&[(81, None), (4, Some(3)), (1, Some(1))]));

        assert_eq!(annotated.last().unwrap().driver_number, 81);
        assert_eq!(annotated.last().unwrap().target_driver, None);
        // Nobody at P2
        assert_eq!(annotated[1].target_driver, None);
    }

    #[test]
    fn test_snapshot_payload() {
        let mut input = rows(&[(1, Some(1)), (44, Some(2))]);
        input[1].pace_estimate_s = Some(95.0);
        input[1].gap_ahead_s = Some(2.0);
        input[1].gap_leader_s = Some(2.0);
        input[1].pit_loss_s = Some(20.0);

        let mut roster = BTreeMap::new();
        roster.insert(44, Driver::new(44, "Lewis HAMILTON").with_team("Mercedes"));

        let advice = service().snapshot(&input, &roster);
        assert_eq!(advice.len(), 2);

        let leader = &advice[0];
        assert!(leader.driver_name.is_none());
        assert!(leader.undercut_score.is_none());
        assert_eq!(leader.advice, Advice::StayOut);

        let chaser = &advice[1];
        assert_eq!(chaser.driver_name.as_deref(), Some("Lewis HAMILTON"));
        assert_eq!(chaser.team.as_deref(), Some("Mercedes"));
        assert_eq!(chaser.target_driver, Some(1));
        assert_eq!(chaser.undercut_score, Some(-23.9));
        assert_eq!(chaser.overcut_score, Some(-0.05));
        assert_eq!(chaser.advice, Advice::StayOut);
    }

    #[test]
    fn test_payload_serialization() {
        let mut input = rows(&[(1, Some(1))]);
        input[0].flags = FlagState {
            is_sc: true,
            ..Default::default()
        };

        let advice = service().snapshot(&input, &BTreeMap::new());
        let json = serde_json::to_value(&advice[0]).unwrap();

        assert_eq!(json["advice"], "HOLD_SC");
        assert_eq!(json["flags"], serde_json::json!({"SC": 1, "VSC": 0, "RED": 0}));
        assert!(json["gap_ahead"].is_null());
        assert!(json["undercut_score"].is_null());
        assert!(json["target_driver"].is_null());
    }

    #[test]
    fn test_empty_minute() {
        assert!(service().snapshot(&[], &BTreeMap::new()).is_empty());
    }
}
