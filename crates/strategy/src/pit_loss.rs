use log::debug;
use pitwall_core::{PitStopRecord, median};
use serde::Serialize;

use crate::config::StrategyParams;

/// Session-wide pit-stop cost
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PitLossEstimate {
    /// Representative green-flag pit loss (seconds)
    pub base_s: f64,
    /// Stops that carried a usable duration
    pub samples: usize,
    /// True when `base_s` is the configured default
    pub is_default: bool,
}

/// Median pit-stop duration of the session
///
/// Falls back to the default when no stop carries a duration or the
/// median lies outside the plausible bound. The result is therefore
/// always inside the bound.
pub fn estimate_pit_loss(stops: &[PitStopRecord], params: &StrategyParams) -> PitLossEstimate {
    let durations: Vec<f64> = stops.iter().filter_map(|s| s.duration_s).collect();
    let samples = durations.len();

    match median(durations) {
        Some(m) if params.plausible_pit_loss(m) => {
            debug!("[PitLoss] Median {:.2}s over {} stops", m, samples);
            PitLossEstimate {
                base_s: m,
                samples,
                is_default: false,
            }
        }
        other => {
            debug!(
                "[PitLoss] No plausible median ({:?} over {} stops), using default {:.1}s",
                other, samples, params.pit_loss_default_s
            );
            PitLossEstimate {
                base_s: params.pit_loss_default_s,
                samples,
                is_default: true,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn stop(duration: Option<f64>) -> PitStopRecord {
        PitStopRecord {
            date: None,
            driver_number: Some(1),
            lap_number: None,
            duration_s: duration,
        }
    }

    #[test]
    fn test_median_of_stops() {
        let stops = [stop(Some(22.1)), stop(Some(23.4)), stop(None), stop(Some(21.7))];
        let estimate = estimate_pit_loss(&stops, &StrategyParams::default());

        assert_relative_eq!(estimate.base_s, 22.1);
        assert_eq!(estimate.samples, 3);
        assert!(!estimate.is_default);
    }

    #[test]
    fn test_default_when_empty_or_implausible() {
        let params = StrategyParams::default();

        let estimate = estimate_pit_loss(&[], &params);
        assert_eq!(estimate.base_s, 20.0);
        assert!(estimate.is_default);

        // Stationary times only (2-3 s) are not a lane loss
        let estimate = estimate_pit_loss(&[stop(Some(2.4)), stop(Some(2.9))], &params);
        assert_eq!(estimate.base_s, 20.0);

        let estimate = estimate_pit_loss(&[stop(Some(55.0))], &params);
        assert_eq!(estimate.base_s, 20.0);
    }

    #[test]
    fn test_estimate_always_within_bound() {
        let params = StrategyParams::default();
        for d in [0.0, 4.99, 5.0, 17.3, 40.0, 40.01, 300.0] {
            let estimate = estimate_pit_loss(&[stop(Some(d))], &params);
            assert!((5.0..=40.0).contains(&estimate.base_s));
        }
    }
}
