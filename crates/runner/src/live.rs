//! Live watch loop
//!
//! Re-runs the whole pipeline on a fixed interval. Nothing carries over
//! between cycles except the source's rate limiter.

use std::time::Duration;

use log::{info, warn};
use pitwall_core::SessionMeta;
use pitwall_ports::TelemetrySource;

use crate::error::Result;
use crate::minute::MinuteSelector;
use crate::pipeline::SessionPipeline;
use crate::report::SessionReport;

/// Floor on the polling interval
pub const MIN_POLL: Duration = Duration::from_secs(9);
pub const DEFAULT_POLL: Duration = Duration::from_secs(12);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Sleep between the end of one cycle and the start of the next
    pub poll: Duration,
    /// Stop after this many cycles; `None` runs forever
    pub max_cycles: Option<usize>,
    /// Report every driver instead of the leader only
    pub all_drivers: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            poll: DEFAULT_POLL,
            max_cycles: None,
            all_drivers: false,
        }
    }
}

impl RunConfig {
    /// Poll interval in seconds, clamped to [`MIN_POLL`]
    pub fn with_poll_secs(mut self, secs: u64) -> Self {
        self.poll = Duration::from_secs(secs).max(MIN_POLL);
        self
    }

    pub fn with_max_cycles(mut self, cycles: usize) -> Self {
        self.max_cycles = Some(cycles);
        self
    }

    pub fn with_all_drivers(mut self, all: bool) -> Self {
        self.all_drivers = all;
        self
    }
}

/// One fetch -> align -> decide pass
pub async fn run_cycle(
    source: &dyn TelemetrySource,
    pipeline: &SessionPipeline,
    meta: &SessionMeta,
    selector: &MinuteSelector,
    all_drivers: bool,
) -> Result<SessionReport> {
    let analysis = pipeline.run(source, meta.clone()).await?;
    SessionReport::build(pipeline, &analysis, selector, all_drivers)
}

/// Watch a session, handing each cycle's report to `emit`
///
/// A failed cycle is logged and the loop continues. Returns the number of
/// cycles run, which only happens when a cycle cap is set.
pub async fn watch<F>(
    source: &dyn TelemetrySource,
    pipeline: &SessionPipeline,
    meta: &SessionMeta,
    selector: &MinuteSelector,
    config: &RunConfig,
    mut emit: F,
) -> usize
where
    F: FnMut(SessionReport),
{
    info!(
        "[LiveWatch] Watching session {} every {:?}",
        meta.session_key, config.poll
    );

    let mut cycles = 0;
    loop {
        match run_cycle(source, pipeline, meta, selector, config.all_drivers).await {
            Ok(report) => emit(report),
            Err(e) => warn!("[LiveWatch] Cycle {} failed: {}", cycles + 1, e),
        }
        cycles += 1;

        if config.max_cycles.is_some_and(|max| cycles >= max) {
            info!("[LiveWatch] Stopping after {} cycles", cycles);
            return cycles;
        }
        tokio::time::sleep(config.poll).await;
    }
}
