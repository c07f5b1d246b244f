//! Pace & tyre resolver
//!
//! One context per driver for the whole window: the trailing median of
//! the last few clean laps, plus the tyres of the last clean lap. A clean
//! lap has a duration, is not an out-lap, and did not start in a minute
//! with SC, VSC or a red flag.

use std::collections::BTreeMap;

use log::debug;
use pitwall_core::{
    DriverContext, DriverNumber, FlagTimeline, LapRecord, StintRecord, floor_to_minute, median,
};

use crate::tyre::TyreMap;

/// Is this lap usable for pace estimation?
///
/// Laps without a start time cannot be checked against flags and count
/// as clean.
pub fn is_clean_lap(lap: &LapRecord, flags: &FlagTimeline) -> bool {
    if lap.is_pit_out_lap || lap.lap_duration_s.is_none() {
        return false;
    }
    match lap.date_start {
        Some(start) => !flags.at(floor_to_minute(start)).is_neutralized(),
        None => true,
    }
}

/// Resolve pace and tyre context for every driver with clean laps
///
/// Drivers without any clean lap are absent from the result.
pub fn resolve_driver_contexts(
    laps: &[LapRecord],
    stints: &[StintRecord],
    flags: &FlagTimeline,
    window: usize,
) -> BTreeMap<DriverNumber, DriverContext> {
    let tyres = TyreMap::from_stints(stints);

    let mut clean: BTreeMap<DriverNumber, Vec<&LapRecord>> = BTreeMap::new();
    for lap in laps.iter().filter(|l| is_clean_lap(l, flags)) {
        if let Some(driver) = lap.driver_number {
            clean.entry(driver).or_default().push(lap);
        }
    }

    let window = window.max(1);
    let contexts: BTreeMap<DriverNumber, DriverContext> = clean
        .into_iter()
        .filter_map(|(driver, mut driver_laps)| {
            // Numbered laps in order, unnumbered ones last
            driver_laps.sort_by_key(|l| (l.lap_number.is_none(), l.lap_number));
            let last = *driver_laps.last()?;

            let recent = driver_laps.iter().rev().take(window);
            let pace = median(recent.filter_map(|l| l.lap_duration_s));
            let tyre = last.lap_number.and_then(|n| tyres.get(driver, n));

            Some((
                driver,
                DriverContext {
                    pace_estimate_s: pace,
                    compound: tyre.and_then(|t| t.compound.clone()),
                    tyre_age_laps: tyre.map(|t| t.tyre_age_laps),
                },
            ))
        })
        .collect();

    debug!(
        "[PaceResolver] {} laps, {} stints -> {} drivers with clean pace",
        laps.len(),
        stints.len(),
        contexts.len()
    );
    contexts
}
