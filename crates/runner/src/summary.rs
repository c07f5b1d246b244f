//! Season summary
//!
//! One row per race of a season, advising on each race's last grid
//! minute. A session that cannot be analysed gets an `error` row and the
//! batch moves on.

use log::{info, warn};
use pitwall_core::{SessionMeta, Timestamp};
use pitwall_ports::TelemetrySource;
use pitwall_strategy::DriverAdvice;
use serde::Serialize;

use crate::discovery::iter_year_races;
use crate::error::{Result, RunnerError};
use crate::pipeline::SessionPipeline;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SummaryOutcome {
    Analysed {
        actual_start: Timestamp,
        last_minute: Timestamp,
        pit_loss_base: f64,
        suggestions: Vec<DriverAdvice>,
    },
    Failed {
        error: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub year: i32,
    pub meeting_key: i64,
    pub session_key: i64,
    pub session_name: String,
    pub circuit_key: i64,
    #[serde(flatten)]
    pub outcome: SummaryOutcome,
}

impl SummaryRow {
    pub fn is_error(&self) -> bool {
        matches!(self.outcome, SummaryOutcome::Failed { .. })
    }
}

async fn summarize(
    source: &dyn TelemetrySource,
    pipeline: &SessionPipeline,
    meta: SessionMeta,
) -> Result<SummaryOutcome> {
    let analysis = pipeline.run(source, meta).await?;
    let last_minute = analysis.last_minute().ok_or(RunnerError::EmptyFrame)?;

    Ok(SummaryOutcome::Analysed {
        actual_start: analysis.actual_start(),
        last_minute,
        pit_loss_base: analysis.pit_loss.base_s,
        suggestions: pipeline.advise(&analysis, last_minute),
    })
}

/// Summarise every race of `year`
///
/// Only discovery failures end the run; per-session failures become rows.
pub async fn season_summary(
    source: &dyn TelemetrySource,
    pipeline: &SessionPipeline,
    year: i32,
) -> Result<Vec<SummaryRow>> {
    let races = iter_year_races(source, year).await?;
    info!("[Summary] {} sessions to analyse for {}", races.len(), year);

    let mut rows = Vec::with_capacity(races.len());
    for meta in races {
        let header = (
            meta.meeting_key,
            meta.session_key,
            meta.session_name.clone(),
            meta.circuit_key,
        );
        let outcome = match summarize(source, pipeline, meta).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("[Summary] Session {} failed: {}", header.1, e);
                SummaryOutcome::Failed {
                    error: e.to_string(),
                }
            }
        };

        let (meeting_key, session_key, session_name, circuit_key) = header;
        rows.push(SummaryRow {
            year,
            meeting_key,
            session_key,
            session_name,
            circuit_key,
            outcome,
        });
    }
    Ok(rows)
}
