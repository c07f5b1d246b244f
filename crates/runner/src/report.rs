//! JSON payloads printed by the CLI

use pitwall_alignment::StartSource;
use pitwall_core::Timestamp;
use pitwall_strategy::DriverAdvice;
use serde::Serialize;

use crate::error::Result;
use crate::minute::MinuteSelector;
use crate::pipeline::{SessionAnalysis, SessionPipeline};

/// All drivers, or only the first in running order
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Suggestions {
    Suggestions(Vec<DriverAdvice>),
    Suggestion(Option<DriverAdvice>),
}

/// Advice for one session at one minute
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionReport {
    pub meeting_key: i64,
    pub session_key: i64,
    pub actual_start: Timestamp,
    pub start_source: StartSource,
    pub minute: Option<Timestamp>,
    pub pit_loss_base: f64,
    pub race_laps_est: Option<u32>,
    #[serde(flatten)]
    pub advice: Suggestions,
}

impl SessionReport {
    pub fn build(
        pipeline: &SessionPipeline,
        analysis: &SessionAnalysis,
        selector: &MinuteSelector,
        all_drivers: bool,
    ) -> Result<Self> {
        let minute = selector.resolve(analysis)?;
        let advice = minute
            .map(|m| pipeline.advise(analysis, m))
            .unwrap_or_default();

        let advice = if all_drivers {
            Suggestions::Suggestions(advice)
        } else {
            Suggestions::Suggestion(advice.into_iter().next())
        };

        Ok(Self {
            meeting_key: analysis.meta.meeting_key,
            session_key: analysis.meta.session_key,
            actual_start: analysis.actual_start(),
            start_source: analysis.start.source,
            minute,
            pit_loss_base: analysis.pit_loss.base_s,
            race_laps_est: analysis.race_laps_est,
            advice,
        })
    }

    /// Number of drivers advised
    pub fn len(&self) -> usize {
        match &self.advice {
            Suggestions::Suggestions(all) => all.len(),
            Suggestions::Suggestion(one) => usize::from(one.is_some()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
