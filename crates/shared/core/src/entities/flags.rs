use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::values::Timestamp;

/// Session-global track status for one minute
///
/// Each bit is set when at least one race-control event of that kind
/// occurred within the minute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagState {
    pub is_sc: bool,
    pub is_vsc: bool,
    pub is_red: bool,
    pub is_green: bool,
}

impl FlagState {
    pub const CLEAR: FlagState = FlagState {
        is_sc: false,
        is_vsc: false,
        is_red: false,
        is_green: false,
    };

    /// Safety car, virtual safety car or red flag
    pub fn is_neutralized(&self) -> bool {
        self.is_sc || self.is_vsc || self.is_red
    }

    /// Racing under normal conditions (no SC, VSC or red flag)
    pub fn is_green_effective(&self) -> bool {
        !self.is_neutralized()
    }

    /// Combine two observations of the same minute
    pub fn merge(self, other: FlagState) -> FlagState {
        FlagState {
            is_sc: self.is_sc || other.is_sc,
            is_vsc: self.is_vsc || other.is_vsc,
            is_red: self.is_red || other.is_red,
            is_green: self.is_green || other.is_green,
        }
    }
}

/// Sparse per-minute flag record
///
/// Minutes without any race-control event read as [`FlagState::CLEAR`].
/// Flags are deliberately not carried forward between minutes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlagTimeline {
    minutes: BTreeMap<Timestamp, FlagState>,
}

impl FlagTimeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// OR an observation into the given minute
    pub fn record(&mut self, minute: Timestamp, state: FlagState) {
        let slot = self.minutes.entry(minute).or_default();
        *slot = slot.merge(state);
    }

    /// Flag state at a minute boundary
    pub fn at(&self, minute: Timestamp) -> FlagState {
        self.minutes.get(&minute).copied().unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.minutes.is_empty()
    }

    /// Minutes carrying at least one flag bit
    pub fn len(&self) -> usize {
        self.minutes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_green_effective() {
        assert!(FlagState::CLEAR.is_green_effective());

        let vsc = FlagState {
            is_vsc: true,
            ..Default::default()
        };
        assert!(vsc.is_neutralized());
        assert!(!vsc.is_green_effective());
    }

    #[test]
    fn test_timeline_merges_and_defaults() {
        let m1 = Utc.with_ymd_and_hms(2024, 5, 5, 20, 10, 0).unwrap();
        let m2 = Utc.with_ymd_and_hms(2024, 5, 5, 20, 11, 0).unwrap();

        let mut timeline = FlagTimeline::new();
        timeline.record(
            m1,
            FlagState {
                is_sc: true,
                ..Default::default()
            },
        );
        timeline.record(
            m1,
            FlagState {
                is_green: true,
                ..Default::default()
            },
        );

        let state = timeline.at(m1);
        assert!(state.is_sc && state.is_green);
        assert!(!state.is_red);

        // Not forward-filled
        assert_eq!(timeline.at(m2), FlagState::CLEAR);
        assert_eq!(timeline.len(), 1);
    }
}
