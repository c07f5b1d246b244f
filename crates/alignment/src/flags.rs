use log::debug;
use pitwall_core::{FlagState, FlagTimeline, RaceControlEvent, floor_to_minute};

/// Bucket race-control events into per-minute flag states
///
/// A bit is set for a minute when any event inside it carries that flag.
/// Untimed events and events without flag meaning are skipped.
pub fn aggregate_flags(events: &[RaceControlEvent]) -> FlagTimeline {
    let mut timeline = FlagTimeline::new();

    for event in events {
        let Some(date) = event.date else {
            continue;
        };
        let bits = event.flag_bits();
        if bits != FlagState::CLEAR {
            timeline.record(floor_to_minute(date), bits);
        }
    }

    debug!(
        "[Aligner] {} race-control events -> {} flagged minutes",
        events.len(),
        timeline.len()
    );
    timeline
}
