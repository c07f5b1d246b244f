//! Multi-source aligner
//!
//! Resamples irregular streams onto the minute grid with step-and-hold
//! semantics: the value at minute `m` is built from the samples with
//! timestamp `<= m`, field by field, so a sample that only carries one
//! field never erases the others. Before the first sample every field is
//! unknown; nothing is back-filled.

use std::collections::BTreeMap;

use pitwall_core::{DriverNumber, IntervalSample, PositionSample, Timestamp, WeatherSample};
use serde::Serialize;

use crate::grid::MinuteGrid;

/// State that can absorb a newer observation field by field
pub trait Carry: Default + Clone {
    /// Overlay every known field of `newer` onto `self`
    fn carry(&mut self, newer: &Self);
}

/// Overlay helper for optional fields
fn hold<T: Clone>(slot: &mut Option<T>, newer: &Option<T>) {
    if newer.is_some() {
        slot.clone_from(newer);
    }
}

/// Running order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PositionState {
    pub position: Option<u32>,
}

impl Carry for PositionState {
    fn carry(&mut self, newer: &Self) {
        hold(&mut self.position, &newer.position);
    }
}

impl From<&PositionSample> for PositionState {
    fn from(sample: &PositionSample) -> Self {
        Self {
            position: sample.position,
        }
    }
}

/// Gaps to the leader and to the car ahead, in seconds
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct GapState {
    pub gap_leader_s: Option<f64>,
    pub gap_ahead_s: Option<f64>,
}

impl Carry for GapState {
    fn carry(&mut self, newer: &Self) {
        hold(&mut self.gap_leader_s, &newer.gap_leader_s);
        hold(&mut self.gap_ahead_s, &newer.gap_ahead_s);
    }
}

impl From<&IntervalSample> for GapState {
    fn from(sample: &IntervalSample) -> Self {
        Self {
            gap_leader_s: sample.gap_to_leader,
            gap_ahead_s: sample.interval,
        }
    }
}

/// Track conditions
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct WeatherState {
    pub air_temperature: Option<f64>,
    pub track_temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub pressure: Option<f64>,
    pub rainfall: Option<bool>,
    pub wind_speed: Option<f64>,
    pub wind_direction: Option<f64>,
}

impl Carry for WeatherState {
    fn carry(&mut self, newer: &Self) {
        hold(&mut self.air_temperature, &newer.air_temperature);
        hold(&mut self.track_temperature, &newer.track_temperature);
        hold(&mut self.humidity, &newer.humidity);
        hold(&mut self.pressure, &newer.pressure);
        hold(&mut self.rainfall, &newer.rainfall);
        hold(&mut self.wind_speed, &newer.wind_speed);
        hold(&mut self.wind_direction, &newer.wind_direction);
    }
}

impl From<&WeatherSample> for WeatherState {
    fn from(sample: &WeatherSample) -> Self {
        Self {
            air_temperature: sample.air_temperature,
            track_temperature: sample.track_temperature,
            humidity: sample.humidity,
            pressure: sample.pressure,
            rainfall: sample.rainfall,
            wind_speed: sample.wind_speed,
            wind_direction: sample.wind_direction,
        }
    }
}

/// Per-driver resampled values, one entry per grid minute
#[derive(Debug, Clone, PartialEq)]
pub struct DriverSeries<T> {
    series: BTreeMap<DriverNumber, Vec<T>>,
}

impl<T> DriverSeries<T> {
    /// Value for a driver at a grid index
    pub fn get(&self, driver: DriverNumber, index: usize) -> Option<&T> {
        self.series.get(&driver).and_then(|s| s.get(index))
    }

    pub fn drivers(&self) -> impl Iterator<Item = DriverNumber> + '_ {
        self.series.keys().copied()
    }

    /// Full series of one driver
    pub fn of(&self, driver: DriverNumber) -> Option<&[T]> {
        self.series.get(&driver).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

/// Resamples streams onto one grid
pub struct Aligner<'g> {
    grid: &'g MinuteGrid,
}

impl<'g> Aligner<'g> {
    pub fn new(grid: &'g MinuteGrid) -> Self {
        Self { grid }
    }

    pub fn grid(&self) -> &MinuteGrid {
        self.grid
    }

    /// Step-and-hold one stream that is already in arrival order
    fn step_hold<T: Carry>(&self, mut samples: Vec<(Timestamp, T)>) -> Vec<T> {
        // Stable: equal timestamps keep arrival order, so the later one wins
        samples.sort_by_key(|(ts, _)| *ts);

        let mut state = T::default();
        let mut cursor = samples.iter().peekable();
        let mut out = Vec::with_capacity(self.grid.len());

        for minute in self.grid.iter() {
            while let Some((_, value)) = cursor.next_if(|(ts, _)| *ts <= minute) {
                state.carry(value);
            }
            out.push(state.clone());
        }
        out
    }

    /// Resample a session-global stream
    ///
    /// Samples without a timestamp are dropped.
    pub fn global<T: Carry>(
        &self,
        samples: impl IntoIterator<Item = (Option<Timestamp>, T)>,
    ) -> Vec<T> {
        let timed = samples
            .into_iter()
            .filter_map(|(ts, value)| ts.map(|t| (t, value)))
            .collect();
        self.step_hold(timed)
    }

    /// Resample a driver-keyed stream onto the (minute x driver) rectangle
    ///
    /// Every driver in `drivers` gets a full series, all `Default` when it
    /// has no samples. Samples for drivers outside the set, or lacking a
    /// timestamp or driver, are dropped.
    pub fn per_driver<T: Carry>(
        &self,
        samples: impl IntoIterator<Item = (Option<Timestamp>, Option<DriverNumber>, T)>,
        drivers: &[DriverNumber],
    ) -> DriverSeries<T> {
        let mut grouped: BTreeMap<DriverNumber, Vec<(Timestamp, T)>> =
            drivers.iter().map(|d| (*d, Vec::new())).collect();

        for (ts, driver, value) in samples {
            let (Some(ts), Some(driver)) = (ts, driver) else {
                continue;
            };
            if let Some(stream) = grouped.get_mut(&driver) {
                stream.push((ts, value));
            }
        }

        let series = grouped
            .into_iter()
            .map(|(driver, stream)| (driver, self.step_hold(stream)))
            .collect();

        DriverSeries { series }
    }

    pub fn positions(
        &self,
        samples: &[PositionSample],
        drivers: &[DriverNumber],
    ) -> DriverSeries<PositionState> {
        self.per_driver(
            samples
                .iter()
                .map(|s| (s.date, s.driver_number, PositionState::from(s))),
            drivers,
        )
    }

    pub fn gaps(&self, samples: &[IntervalSample], drivers: &[DriverNumber]) -> DriverSeries<GapState> {
        self.per_driver(
            samples
                .iter()
                .map(|s| (s.date, s.driver_number, GapState::from(s))),
            drivers,
        )
    }

    pub fn weather(&self, samples: &[WeatherSample]) -> Vec<WeatherState> {
        self.global(samples.iter().map(|s| (s.date, WeatherState::from(s))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn at(m: u32, s: u32) -> Timestamp {
        Utc.with_ymd_and_hms(2024, 5, 5, 14, m, s).unwrap()
    }

    fn grid(minutes: u32) -> MinuteGrid {
        MinuteGrid::build(Some(at(0, 0)), Some(at(minutes, 0))).unwrap()
    }

    fn gap(m: u32, s: u32, driver: u32, leader: Option<f64>, ahead: Option<f64>) -> IntervalSample {
        IntervalSample {
            date: Some(at(m, s)),
            driver_number: Some(driver),
            gap_to_leader: leader,
            interval: ahead,
        }
    }

    #[test]
    fn test_forward_fill_without_backfill() {
        let grid = grid(4);
        let aligner = Aligner::new(&grid);

        let samples = [gap(1, 30, 44, Some(3.0), Some(1.2)), gap(3, 0, 44, Some(4.0), None)];
        let series = aligner.gaps(&samples, &[44]);
        let s = series.of(44).unwrap();

        // Before the first sample
        assert_eq!(s[0], GapState::default());
        assert_eq!(s[1], GapState::default());
        // 14:01:30 becomes visible at 14:02
        assert_eq!(s[2].gap_leader_s, Some(3.0));
        // Exact-minute sample is visible at its own minute; missing field holds
        assert_eq!(s[3].gap_leader_s, Some(4.0));
        assert_eq!(s[3].gap_ahead_s, Some(1.2));
        assert_eq!(s[4], s[3]);
    }

    #[test]
    fn test_rectangle_for_silent_drivers() {
        let grid = grid(2);
        let aligner = Aligner::new(&grid);

        let series = aligner.gaps(&[gap(0, 0, 1, Some(0.0), None)], &[1, 16, 55]);

        assert_eq!(series.len(), 3);
        for driver in [16, 55] {
            let s = series.of(driver).unwrap();
            assert_eq!(s.len(), grid.len());
            assert!(s.iter().all(|g| *g == GapState::default()));
        }
    }

    #[test]
    fn test_unknown_driver_and_untimed_samples_dropped() {
        let grid = grid(1);
        let aligner = Aligner::new(&grid);

        let mut untimed = gap(0, 0, 1, Some(9.0), None);
        untimed.date = None;
        let series = aligner.gaps(&[untimed, gap(0, 0, 99, Some(1.0), None)], &[1]);

        assert_eq!(series.len(), 1);
        assert_eq!(series.get(1, 1), Some(&GapState::default()));
        assert!(series.get(99, 0).is_none());
    }

    #[test]
    fn test_tie_goes_to_later_arrival() {
        let grid = grid(1);
        let aligner = Aligner::new(&grid);

        let samples = [
            PositionSample {
                date: Some(at(0, 10)),
                driver_number: Some(4),
                position: Some(3),
            },
            PositionSample {
                date: Some(at(0, 10)),
                driver_number: Some(4),
                position: Some(2),
            },
        ];
        let series = aligner.positions(&samples, &[4]);
        assert_eq!(series.get(4, 1).unwrap().position, Some(2));
    }

    #[test]
    fn test_unordered_input() {
        let grid = grid(3);
        let aligner = Aligner::new(&grid);

        let samples = [gap(2, 0, 1, Some(2.0), None), gap(0, 0, 1, Some(1.0), None)];
        let series = aligner.gaps(&samples, &[1]);
        let leader: Vec<_> = series.of(1).unwrap().iter().map(|g| g.gap_leader_s).collect();

        assert_eq!(leader, vec![Some(1.0), Some(1.0), Some(2.0), Some(2.0)]);
    }

    #[test]
    fn test_global_weather() {
        let grid = grid(2);
        let aligner = Aligner::new(&grid);

        let samples = [
            WeatherSample {
                date: Some(at(0, 20)),
                air_temperature: Some(24.5),
                rainfall: Some(false),
                ..Default::default()
            },
            WeatherSample {
                date: Some(at(1, 0)),
                track_temperature: Some(41.0),
                ..Default::default()
            },
        ];
        let weather = aligner.weather(&samples);

        assert_eq!(weather.len(), 3);
        assert_eq!(weather[0], WeatherState::default());
        assert_eq!(weather[1].air_temperature, Some(24.5));
        assert_eq!(weather[1].track_temperature, Some(41.0));
        assert_eq!(weather[2].rainfall, Some(false));

        assert_eq!(aligner.weather(&[]), vec![WeatherState::default(); 3]);
    }
}
