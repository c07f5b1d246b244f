//! Minute grid builder
//!
//! The grid is the time axis every per-minute record keys against: one
//! entry per minute from the floor of the actual start to the floor of the
//! effective end, where the effective end is the scheduled end capped at
//! three hours after the start.

use chrono::TimeDelta;
use pitwall_core::{Timestamp, floor_to_minute};

use crate::error::{AlignmentError, Result};

/// Longest span a race window may cover, in hours
pub const RACE_HORIZON_HOURS: i64 = 3;

pub fn race_horizon() -> TimeDelta {
    TimeDelta::hours(RACE_HORIZON_HOURS)
}

/// Strictly increasing minute timestamps spaced exactly 60 s apart
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinuteGrid {
    minutes: Vec<Timestamp>,
}

impl MinuteGrid {
    /// Build the grid for a session window
    ///
    /// Fails with `InvalidWindow` when the start is unknown or the
    /// effective end precedes it.
    pub fn build(actual_start: Option<Timestamp>, scheduled_end: Option<Timestamp>) -> Result<Self> {
        let start = actual_start.ok_or_else(|| {
            AlignmentError::InvalidWindow("actual start could not be resolved".to_string())
        })?;

        let horizon = start + race_horizon();
        let end = match scheduled_end {
            Some(end) if end <= horizon => end,
            _ => horizon,
        };

        let first = floor_to_minute(start);
        let last = floor_to_minute(end);
        if last < first {
            return Err(AlignmentError::InvalidWindow(format!(
                "scheduled end {} precedes start {}",
                end.to_rfc3339(),
                start.to_rfc3339()
            )));
        }

        let count = (last - first).num_minutes() + 1;
        let minutes = (0..count).map(|i| first + TimeDelta::minutes(i)).collect();

        Ok(Self { minutes })
    }

    pub fn minutes(&self) -> &[Timestamp] {
        &self.minutes
    }

    pub fn len(&self) -> usize {
        self.minutes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.minutes.is_empty()
    }

    pub fn first(&self) -> Option<Timestamp> {
        self.minutes.first().copied()
    }

    pub fn last(&self) -> Option<Timestamp> {
        self.minutes.last().copied()
    }

    /// Position of a minute on the grid
    ///
    /// Only exact minute boundaries match.
    pub fn index_of(&self, minute: Timestamp) -> Option<usize> {
        self.minutes.binary_search(&minute).ok()
    }

    pub fn contains(&self, minute: Timestamp) -> bool {
        self.index_of(minute).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = Timestamp> + '_ {
        self.minutes.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn at(h: u32, m: u32, s: u32) -> Timestamp {
        Utc.with_ymd_and_hms(2024, 5, 5, h, m, s).unwrap()
    }

    #[test]
    fn test_open_ended_grid_spans_three_hours() {
        let grid = MinuteGrid::build(Some(at(14, 0, 0)), None).unwrap();

        assert_eq!(grid.len(), 181);
        assert_eq!(grid.first(), Some(at(14, 0, 0)));
        assert_eq!(grid.last(), Some(at(17, 0, 0)));
    }

    #[test]
    fn test_unaligned_start_is_floored() {
        let grid = MinuteGrid::build(Some(at(14, 3, 27)), None).unwrap();

        assert_eq!(grid.first(), Some(at(14, 3, 0)));
        assert_eq!(grid.last(), Some(at(17, 3, 0)));
        assert_eq!(grid.len(), 181);
    }

    #[test]
    fn test_scheduled_end_caps_grid() {
        let grid = MinuteGrid::build(Some(at(14, 0, 0)), Some(at(15, 45, 30))).unwrap();

        assert_eq!(grid.last(), Some(at(15, 45, 0)));
        assert_eq!(grid.len(), 106);
    }

    #[test]
    fn test_late_scheduled_end_is_ignored() {
        let grid = MinuteGrid::build(Some(at(14, 0, 0)), Some(at(18, 30, 0))).unwrap();
        assert_eq!(grid.last(), Some(at(17, 0, 0)));
    }

    #[test]
    fn test_spacing_is_one_minute() {
        let grid = MinuteGrid::build(Some(at(14, 0, 0)), Some(at(14, 30, 0))).unwrap();
        for pair in grid.minutes().windows(2) {
            assert_eq!(pair[1] - pair[0], TimeDelta::minutes(1));
        }
    }

    #[test]
    fn test_invalid_window() {
        let err = MinuteGrid::build(None, None).unwrap_err();
        assert!(matches!(err, AlignmentError::InvalidWindow(_)));

        let err = MinuteGrid::build(Some(at(14, 0, 0)), Some(at(13, 0, 0))).unwrap_err();
        assert!(matches!(err, AlignmentError::InvalidWindow(_)));
    }

    #[test]
    fn test_index_of() {
        let grid = MinuteGrid::build(Some(at(14, 0, 0)), None).unwrap();

        assert_eq!(grid.index_of(at(14, 0, 0)), Some(0));
        assert_eq!(grid.index_of(at(14, 10, 0)), Some(10));
        assert_eq!(grid.index_of(at(14, 10, 5)), None);
        assert!(!grid.contains(at(17, 1, 0)));
    }
}
