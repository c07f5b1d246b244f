//! Session data bundle
//!
//! Everything the synchronous pipeline needs, fetched up front through the
//! telemetry port. Start detection runs here because it decides the time
//! window the remaining streams are restricted to.

use std::collections::{BTreeMap, HashMap};

use chrono::TimeDelta;
use log::{debug, info};
use pitwall_alignment::{StartResolution, detect_actual_start, race_horizon};
use pitwall_core::telemetry::{parse_all, parse_valid};
use pitwall_core::{
    Driver, DriverNumber, IntervalSample, LapRecord, PitStopRecord, PositionSample,
    RaceControlEvent, Sample, SessionMeta, StintRecord, Timestamp, WeatherSample,
};
use pitwall_ports::{TelemetrySource, TimeRange};

use crate::error::Result;

/// Slack around the race window when restricting streams
pub const FETCH_MARGIN_MINUTES: i64 = 10;

/// `[start - margin, start + horizon + margin]`
pub fn fetch_window(actual_start: Timestamp) -> TimeRange {
    let margin = TimeDelta::minutes(FETCH_MARGIN_MINUTES);
    TimeRange::new(
        actual_start - margin,
        actual_start + race_horizon() + margin,
    )
}

/// Keep samples inside `range`
///
/// A stream where no sample carries a time has nothing to filter on and is
/// kept whole; otherwise untimed samples are dropped.
pub fn restrict_to<T: Sample>(samples: Vec<T>, range: &TimeRange) -> Vec<T> {
    if samples.iter().all(|s| s.timestamp().is_none()) {
        return samples;
    }
    samples
        .into_iter()
        .filter(|s| range.admits(s.timestamp()))
        .collect()
}

/// Keep samples inside `range` plus the last one before it
///
/// For each driver (or once for a session-global stream) the latest sample
/// strictly before `range.start` survives, so step-and-hold has a value to
/// carry into the first minutes of the window. On equal timestamps the
/// later sample in stream order is the one kept.
pub fn restrict_carrying<T: Sample>(samples: Vec<T>, range: &TimeRange) -> Vec<T> {
    if samples.iter().all(|s| s.timestamp().is_none()) {
        return samples;
    }

    let mut carried: HashMap<Option<DriverNumber>, (usize, Timestamp)> = HashMap::new();
    for (index, sample) in samples.iter().enumerate() {
        let Some(ts) = sample.timestamp() else {
            continue;
        };
        if ts >= range.start {
            continue;
        }
        carried
            .entry(sample.driver())
            .and_modify(|slot| {
                if ts >= slot.1 {
                    *slot = (index, ts);
                }
            })
            .or_insert((index, ts));
    }
    let carried: Vec<usize> = carried.into_values().map(|(index, _)| index).collect();

    samples
        .into_iter()
        .enumerate()
        .filter(|(index, s)| range.admits(s.timestamp()) || carried.contains(index))
        .map(|(_, s)| s)
        .collect()
}

/// Earliest recorded start of each lap number
pub fn lap_starts(laps: &[LapRecord]) -> BTreeMap<u32, Timestamp> {
    let mut starts: BTreeMap<u32, Timestamp> = BTreeMap::new();
    for lap in laps {
        if let (Some(number), Some(start)) = (lap.lap_number, lap.date_start) {
            starts
                .entry(number)
                .and_modify(|t| *t = (*t).min(start))
                .or_insert(start);
        }
    }
    starts
}

/// Typed telemetry of one session
#[derive(Debug, Clone)]
pub struct SessionData {
    pub meta: SessionMeta,
    pub start: Option<StartResolution>,
    pub drivers: Vec<Driver>,
    pub race_control: Vec<RaceControlEvent>,
    pub laps: Vec<LapRecord>,
    /// Lap starts over every lap on record, not only the windowed ones
    pub lap_starts: BTreeMap<u32, Timestamp>,
    pub positions: Vec<PositionSample>,
    pub intervals: Vec<IntervalSample>,
    pub stints: Vec<StintRecord>,
    pub pit: Vec<PitStopRecord>,
    pub weather: Vec<WeatherSample>,
}

impl SessionData {
    /// Fetch and type every stream of a session
    ///
    /// Race control, laps and positions are fetched whole since they feed
    /// start detection, then restricted locally. Intervals are fetched with
    /// the window once the start is known. Positions and weather keep their
    /// last pre-window sample for the forward fill.
    pub async fn fetch(source: &dyn TelemetrySource, meta: SessionMeta) -> Result<Self> {
        let key = meta.session_key;
        debug!("[SessionData] Fetching session {} via {}", key, source.name());

        let race_control = parse_all(
            &source.fetch_race_control(key).await?,
            RaceControlEvent::from_raw,
        );
        let laps = parse_all(&source.fetch_laps(key, None).await?, LapRecord::from_raw);
        let positions = parse_all(
            &source.fetch_positions(key, None).await?,
            PositionSample::from_raw,
        );

        let lap_starts = lap_starts(&laps);
        let start = detect_actual_start(&race_control, &laps, &positions, meta.scheduled_start);
        let window = start.map(|s| fetch_window(s.actual_start));

        let (race_control, laps, positions) = match &window {
            Some(range) => (
                restrict_to(race_control, range),
                restrict_to(laps, range),
                restrict_carrying(positions, range),
            ),
            None => (race_control, laps, positions),
        };

        let intervals = parse_all(
            &source.fetch_intervals(key, window).await?,
            IntervalSample::from_raw,
        );
        let drivers = parse_valid(&source.fetch_drivers(key).await?, Driver::from_raw);
        let stints = parse_valid(&source.fetch_stints(key).await?, StintRecord::from_raw);
        let pit = parse_all(&source.fetch_pit(key).await?, PitStopRecord::from_raw);
        let weather = parse_all(&source.fetch_weather(key).await?, WeatherSample::from_raw);
        let weather = match &window {
            Some(range) => restrict_carrying(weather, range),
            None => weather,
        };

        info!(
            "[SessionData] Session {}: {} drivers, {} positions, {} intervals, {} laps, {} stints, {} pit, {} weather, {} race control",
            key,
            drivers.len(),
            positions.len(),
            intervals.len(),
            laps.len(),
            stints.len(),
            pit.len(),
            weather.len(),
            race_control.len()
        );

        Ok(Self {
            meta,
            start,
            drivers,
            race_control,
            laps,
            lap_starts,
            positions,
            intervals,
            stints,
            pit,
            weather,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn position(date: Option<Timestamp>) -> PositionSample {
        driver_position(1, date, 1)
    }

    fn driver_position(driver: u32, date: Option<Timestamp>, position: u32) -> PositionSample {
        PositionSample {
            date,
            driver_number: Some(driver),
            position: Some(position),
        }
    }

    #[test]
    fn test_fetch_window_margins() {
        let start = Utc.with_ymd_and_hms(2024, 3, 2, 15, 3, 0).unwrap();
        let window = fetch_window(start);

        assert_eq!(window.start, Utc.with_ymd_and_hms(2024, 3, 2, 14, 53, 0).unwrap());
        assert_eq!(window.end, Utc.with_ymd_and_hms(2024, 3, 2, 18, 13, 0).unwrap());
    }

    #[test]
    fn test_restrict_drops_out_of_window_and_untimed() {
        let start = Utc.with_ymd_and_hms(2024, 3, 2, 15, 0, 0).unwrap();
        let window = fetch_window(start);
        let samples = vec![
            position(Some(start - TimeDelta::hours(1))),
            position(Some(start)),
            position(None),
            position(Some(start + TimeDelta::hours(2))),
        ];

        assert_eq!(restrict_to(samples, &window).len(), 2);
    }

    #[test]
    fn test_restrict_keeps_untimed_stream() {
        let window = fetch_window(Utc.with_ymd_and_hms(2024, 3, 2, 15, 0, 0).unwrap());
        let samples = vec![position(None), position(None)];

        assert_eq!(restrict_to(samples, &window).len(), 2);
    }

    #[test]
    fn test_restrict_carrying_keeps_last_sample_per_driver() {
        let start = Utc.with_ymd_and_hms(2024, 3, 2, 15, 0, 0).unwrap();
        let window = fetch_window(start);
        let samples = vec![
            driver_position(1, Some(start - TimeDelta::minutes(40)), 3),
            driver_position(1, Some(start - TimeDelta::minutes(30)), 2),
            driver_position(44, Some(start - TimeDelta::minutes(50)), 5),
            driver_position(1, Some(start + TimeDelta::minutes(5)), 1),
            driver_position(1, Some(start + TimeDelta::hours(4)), 1),
            driver_position(1, None, 9),
        ];

        let kept = restrict_carrying(samples, &window);
        let positions: Vec<(Option<u32>, Option<u32>)> =
            kept.iter().map(|p| (p.driver_number, p.position)).collect();
        assert_eq!(
            positions,
            vec![(Some(1), Some(2)), (Some(44), Some(5)), (Some(1), Some(1))]
        );
    }

    #[test]
    fn test_restrict_carrying_tie_keeps_later_arrival() {
        let start = Utc.with_ymd_and_hms(2024, 3, 2, 15, 0, 0).unwrap();
        let before = Some(start - TimeDelta::hours(1));
        let samples = vec![driver_position(1, before, 4), driver_position(1, before, 6)];

        let kept = restrict_carrying(samples, &fetch_window(start));
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].position, Some(6));
    }

    #[test]
    fn test_lap_starts_keep_earliest() {
        let lap = |lap_number: Option<u32>, minute: u32| LapRecord {
            driver_number: Some(1),
            lap_number,
            date_start: Some(Utc.with_ymd_and_hms(2024, 3, 2, 15, minute, 0).unwrap()),
            lap_duration_s: Some(95.0),
            is_pit_out_lap: false,
        };
        let starts = lap_starts(&[lap(Some(2), 6), lap(Some(2), 5), lap(Some(1), 3), lap(None, 1)]);

        assert_eq!(starts.len(), 2);
        assert_eq!(starts[&2], Utc.with_ymd_and_hms(2024, 3, 2, 15, 5, 0).unwrap());
    }
}
