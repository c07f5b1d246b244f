use async_trait::async_trait;
use pitwall_core::RawRecord;

use crate::error::FetchResult;
use crate::query::{SessionQuery, TimeRange};

/// Port for the read-only telemetry service
///
/// Every operation returns loosely-typed records exactly as delivered;
/// typing happens in the domain. An empty stream is `Ok(vec![])`, not an
/// error. Implementations own their own pacing (rate limiting) so callers
/// can issue calls back to back.
#[async_trait]
pub trait TelemetrySource: Send + Sync {
    async fn fetch_meetings(&self, year: i32) -> FetchResult<Vec<RawRecord>>;

    async fn fetch_sessions(&self, query: &SessionQuery) -> FetchResult<Vec<RawRecord>>;

    async fn fetch_drivers(&self, session_key: i64) -> FetchResult<Vec<RawRecord>>;

    async fn fetch_positions(
        &self,
        session_key: i64,
        range: Option<TimeRange>,
    ) -> FetchResult<Vec<RawRecord>>;

    async fn fetch_intervals(
        &self,
        session_key: i64,
        range: Option<TimeRange>,
    ) -> FetchResult<Vec<RawRecord>>;

    async fn fetch_laps(
        &self,
        session_key: i64,
        range: Option<TimeRange>,
    ) -> FetchResult<Vec<RawRecord>>;

    async fn fetch_stints(&self, session_key: i64) -> FetchResult<Vec<RawRecord>>;

    async fn fetch_pit(&self, session_key: i64) -> FetchResult<Vec<RawRecord>>;

    async fn fetch_weather(&self, session_key: i64) -> FetchResult<Vec<RawRecord>>;

    async fn fetch_race_control(&self, session_key: i64) -> FetchResult<Vec<RawRecord>>;

    /// Source name for logging
    fn name(&self) -> &str {
        "TelemetrySource"
    }
}
