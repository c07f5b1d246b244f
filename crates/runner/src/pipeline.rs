//! Session pipeline
//!
//! fetch -> start -> grid -> align -> contexts -> pit loss -> frame, then
//! per-minute snapshots on demand. Everything after the fetch is
//! synchronous.

use std::collections::BTreeMap;

use log::{info, warn};
use pitwall_alignment::{
    AlignmentError, FrameBuilder, MinuteGrid, SessionFrame, StartResolution, aggregate_flags,
    resolve_drivers,
};
use pitwall_core::{Driver, DriverNumber, SessionMeta, Timestamp};
use pitwall_ports::TelemetrySource;
use pitwall_strategy::{
    DecisionEngine, DriverAdvice, HeuristicScorer, PitLossEstimate, SnapshotService,
    StrategyParams, estimate_pit_loss, resolve_driver_contexts,
};

use crate::error::Result;
use crate::session_data::SessionData;

/// Aligned, scored-on-demand view of one session
#[derive(Debug, Clone)]
pub struct SessionAnalysis {
    pub meta: SessionMeta,
    pub start: StartResolution,
    pub pit_loss: PitLossEstimate,
    /// Highest lap number on record
    pub race_laps_est: Option<u32>,
    /// Earliest start of each lap, over every lap of the session
    pub lap_starts: BTreeMap<u32, Timestamp>,
    pub frame: SessionFrame,
    pub roster: BTreeMap<DriverNumber, Driver>,
}

impl SessionAnalysis {
    pub fn actual_start(&self) -> Timestamp {
        self.start.actual_start
    }

    pub fn last_minute(&self) -> Option<Timestamp> {
        self.frame.last_minute()
    }
}

/// Strategy parameters plus the snapshot service built from them
pub struct SessionPipeline {
    params: StrategyParams,
    service: SnapshotService,
}

impl SessionPipeline {
    pub fn new(params: StrategyParams) -> Self {
        let service = SnapshotService::new(
            Box::new(HeuristicScorer::new(params.clone())),
            DecisionEngine::new(params.clone()),
        );
        Self { params, service }
    }

    pub fn params(&self) -> &StrategyParams {
        &self.params
    }

    /// Fetch a session and build its frame
    pub async fn run(
        &self,
        source: &dyn TelemetrySource,
        meta: SessionMeta,
    ) -> Result<SessionAnalysis> {
        let data = SessionData::fetch(source, meta).await?;
        self.analyze(data)
    }

    /// Build the minute frame from fetched data
    ///
    /// A session with no known drivers still gets its minute skeleton, with
    /// no driver rows.
    pub fn analyze(&self, data: SessionData) -> Result<SessionAnalysis> {
        let key = data.meta.session_key;
        let Some(start) = data.start else {
            return Err(AlignmentError::InvalidWindow(format!(
                "session {key}: no start signal and no scheduled start"
            ))
            .into());
        };
        info!(
            "[Pipeline] Session {} actual start {} ({:?})",
            key, start.actual_start, start.source
        );

        let grid = MinuteGrid::build(Some(start.actual_start), data.meta.scheduled_end)?;
        let flags = aggregate_flags(&data.race_control);
        let contexts = resolve_driver_contexts(
            &data.laps,
            &data.stints,
            &flags,
            self.params.pace_window_laps,
        );
        let pit_loss = estimate_pit_loss(&data.pit, &self.params);

        let known: Vec<DriverNumber> = data.drivers.iter().map(|d| d.driver_number).collect();
        let drivers = resolve_drivers(&known, &data.positions, &data.intervals);
        if drivers.is_empty() {
            warn!("[Pipeline] Session {} has no drivers, frame has no rows", key);
        }

        let frame = FrameBuilder::new(grid, drivers)
            .positions(&data.positions)
            .intervals(&data.intervals)
            .weather(&data.weather)
            .flags(flags)
            .contexts(contexts)
            .pit_loss(self.params.pit_loss_policy(pit_loss.base_s))
            .build();

        let race_laps_est = data.laps.iter().filter_map(|l| l.lap_number).max();
        let roster = data
            .drivers
            .into_iter()
            .map(|d| (d.driver_number, d))
            .collect();

        Ok(SessionAnalysis {
            meta: data.meta,
            start,
            pit_loss,
            race_laps_est,
            lap_starts: data.lap_starts,
            frame,
            roster,
        })
    }

    /// Advice for every driver at `minute`, leader first
    pub fn advise(&self, analysis: &SessionAnalysis, minute: Timestamp) -> Vec<DriverAdvice> {
        self.service
            .snapshot(analysis.frame.rows_at(minute), &analysis.roster)
    }
}

impl Default for SessionPipeline {
    fn default() -> Self {
        Self::new(StrategyParams::default())
    }
}
