use std::collections::HashMap;

use log::debug;
use pitwall_core::{DriverNumber, StintRecord};

/// Most laps a stint may cover; no race runs longer
pub const MAX_STINT_LAPS: u32 = 100;

/// Compound and age of the tyres on one lap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TyreContext {
    pub compound: Option<String>,
    pub tyre_age_laps: u32,
}

/// Stints expanded to one entry per (driver, lap)
#[derive(Debug, Clone, Default)]
pub struct TyreMap {
    laps: HashMap<(DriverNumber, u32), TyreContext>,
}

impl TyreMap {
    /// Expand stints lap by lap, ageing from `tyre_age_at_start`
    ///
    /// Where stints overlap the later record wins. Stints whose end
    /// precedes their start, or that cover more than [`MAX_STINT_LAPS`]
    /// laps, contribute nothing. Ages saturate instead of overflowing.
    pub fn from_stints(stints: &[StintRecord]) -> Self {
        let mut laps = HashMap::new();
        for stint in stints {
            let span = stint.lap_end.checked_sub(stint.lap_start);
            if span.is_none_or(|span| span >= MAX_STINT_LAPS) {
                debug!(
                    "[TyreMap] Skipping stint of driver {}: laps {}..={}",
                    stint.driver_number, stint.lap_start, stint.lap_end
                );
                continue;
            }
            for lap in stint.lap_start..=stint.lap_end {
                laps.insert(
                    (stint.driver_number, lap),
                    TyreContext {
                        compound: stint.compound.clone(),
                        tyre_age_laps: stint.tyre_age_at_start.saturating_add(lap - stint.lap_start),
                    },
                );
            }
        }
        Self { laps }
    }

    pub fn get(&self, driver: DriverNumber, lap: u32) -> Option<&TyreContext> {
        self.laps.get(&(driver, lap))
    }

    pub fn len(&self) -> usize {
        self.laps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.laps.is_empty()
    }
}
