//! Session frame: the (minute x driver) rectangle of aligned state
//!
//! The frame owns row construction. Rows are laid out minute-major with
//! drivers in ascending number order, so the rows of one minute form a
//! contiguous slice.

use std::collections::{BTreeMap, BTreeSet};

use log::{debug, info};
use pitwall_core::{
    DriverContext, DriverMinuteState, DriverNumber, FlagTimeline, IntervalSample, PitLossPolicy,
    PositionSample, Timestamp, WeatherSample, median,
};

use crate::grid::MinuteGrid;
use crate::resample::{Aligner, GapState, WeatherState};

/// Drivers the frame is built for
///
/// The session's driver list when known, otherwise every driver seen in
/// the position or interval streams.
pub fn resolve_drivers(
    known: &[DriverNumber],
    positions: &[PositionSample],
    intervals: &[IntervalSample],
) -> Vec<DriverNumber> {
    let set: BTreeSet<DriverNumber> = if known.is_empty() {
        positions
            .iter()
            .filter_map(|p| p.driver_number)
            .chain(intervals.iter().filter_map(|i| i.driver_number))
            .collect()
    } else {
        known.iter().copied().collect()
    };
    set.into_iter().collect()
}

/// Aligned state of a whole session window
#[derive(Debug, Clone)]
pub struct SessionFrame {
    grid: MinuteGrid,
    drivers: Vec<DriverNumber>,
    rows: Vec<DriverMinuteState>,
    weather: Vec<WeatherState>,
}

impl SessionFrame {
    pub fn grid(&self) -> &MinuteGrid {
        &self.grid
    }

    pub fn drivers(&self) -> &[DriverNumber] {
        &self.drivers
    }

    pub fn rows(&self) -> &[DriverMinuteState] {
        &self.rows
    }

    /// All driver rows at one minute; empty when the minute is off-grid
    pub fn rows_at(&self, minute: Timestamp) -> &[DriverMinuteState] {
        match self.grid.index_of(minute) {
            Some(index) => {
                let width = self.drivers.len();
                &self.rows[index * width..(index + 1) * width]
            }
            None => &[],
        }
    }

    pub fn row(&self, minute: Timestamp, driver: DriverNumber) -> Option<&DriverMinuteState> {
        self.rows_at(minute)
            .iter()
            .find(|r| r.driver_number == driver)
    }

    pub fn weather_at(&self, minute: Timestamp) -> Option<&WeatherState> {
        self.grid.index_of(minute).and_then(|i| self.weather.get(i))
    }

    pub fn first_minute(&self) -> Option<Timestamp> {
        self.grid.first()
    }

    pub fn last_minute(&self) -> Option<Timestamp> {
        self.grid.last()
    }
}

/// Assembles a [`SessionFrame`] from typed streams and resolved context
pub struct FrameBuilder<'a> {
    grid: MinuteGrid,
    drivers: Vec<DriverNumber>,
    positions: &'a [PositionSample],
    intervals: &'a [IntervalSample],
    weather: &'a [WeatherSample],
    flags: FlagTimeline,
    contexts: BTreeMap<DriverNumber, DriverContext>,
    pit_loss: PitLossPolicy,
}

impl<'a> FrameBuilder<'a> {
    pub fn new(grid: MinuteGrid, drivers: Vec<DriverNumber>) -> Self {
        Self {
            grid,
            drivers,
            positions: &[],
            intervals: &[],
            weather: &[],
            flags: FlagTimeline::new(),
            contexts: BTreeMap::new(),
            pit_loss: PitLossPolicy::default(),
        }
    }

    pub fn positions(mut self, positions: &'a [PositionSample]) -> Self {
        self.positions = positions;
        self
    }

    pub fn intervals(mut self, intervals: &'a [IntervalSample]) -> Self {
        self.intervals = intervals;
        self
    }

    pub fn weather(mut self, weather: &'a [WeatherSample]) -> Self {
        self.weather = weather;
        self
    }

    pub fn flags(mut self, flags: FlagTimeline) -> Self {
        self.flags = flags;
        self
    }

    /// Per-driver pace and tyre context, constant over the window
    pub fn contexts(mut self, contexts: BTreeMap<DriverNumber, DriverContext>) -> Self {
        self.contexts = contexts;
        self
    }

    pub fn pit_loss(mut self, policy: PitLossPolicy) -> Self {
        self.pit_loss = policy;
        self
    }

    pub fn build(self) -> SessionFrame {
        let mut drivers = self.drivers;
        drivers.sort_unstable();
        drivers.dedup();

        let aligner = Aligner::new(&self.grid);
        let positions = aligner.positions(self.positions, &drivers);
        let gaps = aligner.gaps(self.intervals, &drivers);
        let weather = aligner.weather(self.weather);

        debug!(
            "[Aligner] Samples: {} positions, {} intervals, {} weather",
            self.positions.len(),
            self.intervals.len(),
            self.weather.len()
        );

        // Drivers without clean laps fall back to their median gap to the
        // leader. Rough, but keeps the scorer fed.
        let contexts: BTreeMap<DriverNumber, DriverContext> = drivers
            .iter()
            .map(|&driver| {
                let mut ctx = self.contexts.get(&driver).cloned().unwrap_or_default();
                if ctx.pace_estimate_s.is_none() {
                    ctx.pace_estimate_s = gaps
                        .of(driver)
                        .and_then(|s| median(s.iter().filter_map(|g| g.gap_leader_s)));
                    if ctx.pace_estimate_s.is_some() {
                        debug!("[Aligner] Driver {} pace imputed from gap to leader", driver);
                    }
                }
                (driver, ctx)
            })
            .collect();

        let empty_gap = GapState::default();
        let mut rows = Vec::with_capacity(self.grid.len() * drivers.len());

        for (index, minute) in self.grid.iter().enumerate() {
            let flags = self.flags.at(minute);
            let pit_loss_s = self.pit_loss.adjusted(&flags);

            for &driver in &drivers {
                let gap = gaps.get(driver, index).unwrap_or(&empty_gap);
                let ctx = &contexts[&driver];

                let mut row = DriverMinuteState::new(minute, driver);
                row.position = positions.get(driver, index).and_then(|p| p.position);
                row.gap_ahead_s = gap.gap_ahead_s;
                row.gap_leader_s = gap.gap_leader_s;
                row.pace_estimate_s = ctx.pace_estimate_s;
                row.compound = ctx.compound.clone();
                row.tyre_age_laps = ctx.tyre_age_laps;
                row.flags = flags;
                row.pit_loss_s = Some(pit_loss_s);
                rows.push(row);
            }
        }

        info!(
            "[Aligner] Frame built: {} minutes x {} drivers",
            self.grid.len(),
            drivers.len()
        );

        SessionFrame {
            grid: self.grid,
            drivers,
            rows,
            weather,
        }
    }
}
