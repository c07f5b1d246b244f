//! Actual-start detector
//!
//! The scheduled start is often minutes off the real green flag (formation
//! laps, delays, aborted starts). The detector collects the earliest
//! instant each independent signal puts forward and keeps the minimum.

use log::debug;
use pitwall_core::{LapRecord, PositionSample, RaceControlEvent, Timestamp};
use serde::Serialize;

/// Which signal the resolved start came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StartSource {
    RaceControl,
    FirstLap,
    FirstPosition,
    Scheduled,
}

/// Resolved green-flag instant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StartResolution {
    pub actual_start: Timestamp,
    pub source: StartSource,
}

/// Earliest race-control event matching a start pattern
fn race_control_candidate(events: &[RaceControlEvent]) -> Option<Timestamp> {
    events
        .iter()
        .filter(|e| e.is_start_signal())
        .filter_map(|e| e.date)
        .min()
}

/// Earliest start of lap 1, or of any lap when no lap 1 is on record
fn lap_candidate(laps: &[LapRecord]) -> Option<Timestamp> {
    let has_lap_one = laps.iter().any(|l| l.lap_number == Some(1));
    laps.iter()
        .filter(|l| !has_lap_one || l.lap_number == Some(1))
        .filter_map(|l| l.date_start)
        .min()
}

fn position_candidate(positions: &[PositionSample]) -> Option<Timestamp> {
    positions.iter().filter_map(|p| p.date).min()
}

/// Resolve the actual start of a session
///
/// Takes the minimum over whichever candidates exist; a single signal is
/// enough. Falls back to `scheduled_start` when no signal yields a time,
/// and returns `None` only when that is missing too. On equal candidates
/// the earlier-listed source is reported.
pub fn detect_actual_start(
    race_control: &[RaceControlEvent],
    laps: &[LapRecord],
    positions: &[PositionSample],
    scheduled_start: Option<Timestamp>,
) -> Option<StartResolution> {
    let candidates = [
        (StartSource::RaceControl, race_control_candidate(race_control)),
        (StartSource::FirstLap, lap_candidate(laps)),
        (StartSource::FirstPosition, position_candidate(positions)),
    ];

    let detected = candidates
        .iter()
        .filter_map(|(source, ts)| ts.map(|t| (t, *source)))
        .min_by_key(|(t, _)| *t);

    match detected {
        Some((actual_start, source)) => {
            debug!(
                "[StartDetector] Actual start {} via {:?} (scheduled: {:?})",
                actual_start, source, scheduled_start
            );
            Some(StartResolution {
                actual_start,
                source,
            })
        }
        None => scheduled_start.map(|actual_start| {
            debug!(
                "[StartDetector] No start signal, using scheduled start {}",
                actual_start
            );
            StartResolution {
                actual_start,
                source: StartSource::Scheduled,
            }
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn at(h: u32, m: u32, s: u32) -> Timestamp {
        Utc.with_ymd_and_hms(2024, 5, 5, h, m, s).unwrap()
    }

    fn lap(lap_number: Option<u32>, start: Timestamp) -> LapRecord {
        LapRecord {
            driver_number: Some(1),
            lap_number,
            date_start: Some(start),
            lap_duration_s: None,
            is_pit_out_lap: false,
        }
    }

    fn position(date: Timestamp) -> PositionSample {
        PositionSample {
            date: Some(date),
            driver_number: Some(1),
            position: Some(1),
        }
    }

    fn green(date: Timestamp) -> RaceControlEvent {
        RaceControlEvent {
            date: Some(date),
            category: Some("Flag".to_string()),
            flag: Some("GREEN".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_minimum_of_all_signals() {
        let resolution = detect_actual_start(
            &[green(at(14, 3, 10))],
            &[lap(Some(1), at(14, 4, 0)), lap(Some(2), at(14, 5, 40))],
            &[position(at(14, 2, 55))],
            Some(at(14, 0, 0)),
        )
        .unwrap();

        assert_eq!(resolution.actual_start, at(14, 2, 55));
        assert_eq!(resolution.source, StartSource::FirstPosition);
    }

    #[test]
    fn test_partial_signals_suffice() {
        let resolution =
            detect_actual_start(&[], &[lap(Some(1), at(14, 4, 0))], &[], Some(at(14, 0, 0)))
                .unwrap();

        assert_eq!(resolution.actual_start, at(14, 4, 0));
        assert_eq!(resolution.source, StartSource::FirstLap);
    }

    #[test]
    fn test_lap_one_preferred_over_earlier_laps() {
        // Lap 1 exists, so an earlier stray lap 0 record is not a candidate
        let laps = [lap(Some(0), at(13, 50, 0)), lap(Some(1), at(14, 4, 0))];
        assert_eq!(lap_candidate(&laps), Some(at(14, 4, 0)));

        // Without lap numbering the earliest lap wins
        let laps = [lap(None, at(14, 6, 0)), lap(None, at(14, 4, 30))];
        assert_eq!(lap_candidate(&laps), Some(at(14, 4, 30)));
    }

    #[test]
    fn test_non_start_events_ignored() {
        let yellow = RaceControlEvent {
            date: Some(at(13, 30, 0)),
            category: Some("Flag".to_string()),
            flag: Some("YELLOW".to_string()),
            message: Some("YELLOW IN TRACK SECTOR 3".to_string()),
            driver_number: None,
        };
        let resolution =
            detect_actual_start(&[yellow, green(at(14, 1, 0))], &[], &[], None).unwrap();

        assert_eq!(resolution.actual_start, at(14, 1, 0));
        assert_eq!(resolution.source, StartSource::RaceControl);
    }

    #[test]
    fn test_scheduled_fallback() {
        let resolution = detect_actual_start(&[], &[], &[], Some(at(14, 0, 0))).unwrap();
        assert_eq!(resolution.actual_start, at(14, 0, 0));
        assert_eq!(resolution.source, StartSource::Scheduled);

        assert!(detect_actual_start(&[], &[], &[], None).is_none());
    }

    #[test]
    fn test_tie_reports_first_source() {
        let resolution = detect_actual_start(
            &[green(at(14, 0, 0))],
            &[],
            &[position(at(14, 0, 0))],
            None,
        )
        .unwrap();
        assert_eq!(resolution.source, StartSource::RaceControl);
    }
}
