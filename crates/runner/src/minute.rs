//! Snapshot minute selection

use chrono::TimeDelta;
use pitwall_core::values::parse_timestamp;
use pitwall_core::{Timestamp, floor_to_minute};

use crate::error::{Result, RunnerError};
use crate::pipeline::SessionAnalysis;

/// How to pick the minute to advise on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MinuteSelector {
    /// Last grid minute
    #[default]
    Last,
    /// Absolute UTC time
    At(Timestamp),
    /// Offset from the actual start
    TPlus(TimeDelta),
    /// Start of a lap, by the earliest driver to begin it
    Lap(u32),
}

impl MinuteSelector {
    /// Parse `--minute`
    pub fn at(raw: &str) -> Result<Self> {
        parse_timestamp(raw)
            .map(MinuteSelector::At)
            .ok_or_else(|| RunnerError::InvalidArgument(format!("unparseable minute '{raw}'")))
    }

    /// Parse `--tplus`
    pub fn tplus(raw: &str) -> Result<Self> {
        parse_tplus(raw).map(MinuteSelector::TPlus)
    }

    /// Resolve against an analysed session
    ///
    /// An unknown lap falls back to the last grid minute. The result may
    /// lie off the grid; snapshots there are simply empty. An offset past
    /// the representable time range is an error.
    pub fn resolve(&self, analysis: &SessionAnalysis) -> Result<Option<Timestamp>> {
        let minute = match self {
            MinuteSelector::Last => analysis.last_minute(),
            MinuteSelector::At(ts) => Some(floor_to_minute(*ts)),
            MinuteSelector::TPlus(offset) => {
                let ts = analysis
                    .actual_start()
                    .checked_add_signed(*offset)
                    .ok_or_else(|| {
                        RunnerError::InvalidArgument(format!(
                            "offset of {} hours is out of range",
                            offset.num_hours()
                        ))
                    })?;
                Some(floor_to_minute(ts))
            }
            MinuteSelector::Lap(lap) => minute_from_lap(analysis, *lap).or_else(|| analysis.last_minute()),
        };
        Ok(minute)
    }
}

/// Floored start of lap `lap`, if any driver has started it
pub fn minute_from_lap(analysis: &SessionAnalysis, lap: u32) -> Option<Timestamp> {
    analysis.lap_starts.get(&lap).copied().map(floor_to_minute)
}

/// Parse `HH:MM[:SS]` into an offset
pub fn parse_tplus(raw: &str) -> Result<TimeDelta> {
    let invalid = || RunnerError::InvalidArgument(format!("expected HH:MM[:SS], got '{raw}'"));

    let parts: Vec<&str> = raw.trim().split(':').collect();
    if !(2..=3).contains(&parts.len()) {
        return Err(invalid());
    }
    let mut fields = [0i64; 3];
    for (slot, part) in fields.iter_mut().zip(&parts) {
        *slot = part.parse::<u32>().map_err(|_| invalid())?.into();
    }
    let [hours, minutes, seconds] = fields;
    if minutes >= 60 || seconds >= 60 {
        return Err(invalid());
    }

    Ok(TimeDelta::hours(hours) + TimeDelta::minutes(minutes) + TimeDelta::seconds(seconds))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tplus() {
        assert_eq!(parse_tplus("00:35").unwrap(), TimeDelta::minutes(35));
        assert_eq!(
            parse_tplus("01:02:03").unwrap(),
            TimeDelta::seconds(3600 + 120 + 3)
        );
        assert!(parse_tplus("35").is_err());
        assert!(parse_tplus("00:75").is_err());
        assert!(parse_tplus("a:b").is_err());
        assert!(parse_tplus("-1:00").is_err());
    }

    #[test]
    fn test_minute_selector_parsing() {
        let selector = MinuteSelector::at("2024-05-05T20:30:45Z").unwrap();
        assert!(matches!(selector, MinuteSelector::At(_)));
        assert!(MinuteSelector::at("yesterday").is_err());
        assert_eq!(
            MinuteSelector::tplus("00:10").unwrap(),
            MinuteSelector::TPlus(TimeDelta::minutes(10))
        );
    }
}
