//! In-memory telemetry source
//!
//! Holds whole endpoint dumps and answers port calls by filtering them the
//! way the service would. Used by tests and by the replay source.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;
use pitwall_core::RawRecord;
use pitwall_ports::{FetchResult, SessionQuery, TelemetrySource, TimeRange};

use super::filter::{self, endpoints};

#[derive(Default)]
pub struct MemorySource {
    records: RwLock<HashMap<String, Vec<RawRecord>>>,
    calls: AtomicUsize,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style: set all records of one endpoint
    pub fn with_records(self, endpoint: &str, records: Vec<RawRecord>) -> Self {
        self.insert(endpoint, records);
        self
    }

    /// Replace all records of one endpoint
    pub fn insert(&self, endpoint: &str, records: Vec<RawRecord>) {
        self.records.write().insert(endpoint.to_string(), records);
    }

    /// Append one record, e.g. to simulate a live stream growing
    pub fn push(&self, endpoint: &str, record: RawRecord) {
        self.records
            .write()
            .entry(endpoint.to_string())
            .or_default()
            .push(record);
    }

    /// Number of port calls served so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    fn all(&self, endpoint: &str) -> Vec<RawRecord> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.records.read().get(endpoint).cloned().unwrap_or_default()
    }

    fn session_records(&self, endpoint: &str, session_key: i64) -> Vec<RawRecord> {
        filter::for_session(self.all(endpoint), session_key)
    }

    fn ranged_records(
        &self,
        endpoint: &str,
        session_key: i64,
        range: Option<TimeRange>,
    ) -> Vec<RawRecord> {
        let records = self.session_records(endpoint, session_key);
        match range {
            Some(range) => filter::within_range(records, filter::time_field(endpoint), &range),
            None => records,
        }
    }
}

#[async_trait]
impl TelemetrySource for MemorySource {
    async fn fetch_meetings(&self, year: i32) -> FetchResult<Vec<RawRecord>> {
        Ok(filter::meetings_in_year(self.all(endpoints::MEETINGS), year))
    }

    async fn fetch_sessions(&self, query: &SessionQuery) -> FetchResult<Vec<RawRecord>> {
        Ok(filter::sessions_matching(self.all(endpoints::SESSIONS), query))
    }

    async fn fetch_drivers(&self, session_key: i64) -> FetchResult<Vec<RawRecord>> {
        Ok(self.session_records(endpoints::DRIVERS, session_key))
    }

    async fn fetch_positions(
        &self,
        session_key: i64,
        range: Option<TimeRange>,
    ) -> FetchResult<Vec<RawRecord>> {
        Ok(self.ranged_records(endpoints::POSITION, session_key, range))
    }

    async fn fetch_intervals(
        &self,
        session_key: i64,
        range: Option<TimeRange>,
    ) -> FetchResult<Vec<RawRecord>> {
        Ok(self.ranged_records(endpoints::INTERVALS, session_key, range))
    }

    async fn fetch_laps(
        &self,
        session_key: i64,
        range: Option<TimeRange>,
    ) -> FetchResult<Vec<RawRecord>> {
        Ok(self.ranged_records(endpoints::LAPS, session_key, range))
    }

    async fn fetch_stints(&self, session_key: i64) -> FetchResult<Vec<RawRecord>> {
        Ok(self.session_records(endpoints::STINTS, session_key))
    }

    async fn fetch_pit(&self, session_key: i64) -> FetchResult<Vec<RawRecord>> {
        Ok(self.session_records(endpoints::PIT, session_key))
    }

    async fn fetch_weather(&self, session_key: i64) -> FetchResult<Vec<RawRecord>> {
        Ok(self.session_records(endpoints::WEATHER, session_key))
    }

    async fn fetch_race_control(&self, session_key: i64) -> FetchResult<Vec<RawRecord>> {
        Ok(self.session_records(endpoints::RACE_CONTROL, session_key))
    }

    fn name(&self) -> &str {
        "MemorySource"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn record(value: serde_json::Value) -> RawRecord {
        value.as_object().unwrap().clone()
    }

    #[tokio::test]
    async fn test_unknown_endpoint_is_empty() {
        let source = MemorySource::new();
        assert!(source.fetch_pit(9158).await.unwrap().is_empty());
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_ranged_laps_use_date_start() {
        let source = MemorySource::new().with_records(
            endpoints::LAPS,
            vec![
                record(json!({"session_key": 9158, "lap_number": 1, "date_start": "2024-03-02T15:03:00Z"})),
                record(json!({"session_key": 9158, "lap_number": 30, "date_start": "2024-03-02T15:50:00Z"})),
                record(json!({"session_key": 9999, "lap_number": 1, "date_start": "2024-03-02T15:03:00Z"})),
            ],
        );
        let range = TimeRange::new(
            Utc.with_ymd_and_hms(2024, 3, 2, 15, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 2, 15, 30, 0).unwrap(),
        );

        assert_eq!(source.fetch_laps(9158, None).await.unwrap().len(), 2);
        assert_eq!(source.fetch_laps(9158, Some(range)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_push_grows_stream() {
        let source = MemorySource::new();
        source.push(endpoints::RACE_CONTROL, record(json!({"session_key": 1, "flag": "RED"})));
        source.push(endpoints::RACE_CONTROL, record(json!({"session_key": 1, "flag": "GREEN"})));

        assert_eq!(source.fetch_race_control(1).await.unwrap().len(), 2);
    }
}
