//! File-backed replay source
//!
//! Reads `<dir>/<endpoint>.json` (a JSON array of records, as the service
//! returns it) on every call, so files may be appended to between polls
//! to replay a race minute by minute.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use log::debug;
use pitwall_core::RawRecord;
use pitwall_ports::{FetchResult, SessionQuery, TelemetrySource, TimeRange};

use super::filter::endpoints;
use super::memory::MemorySource;
use crate::error::ReplayError;

pub struct FileSource {
    dir: PathBuf,
}

impl FileSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Records of one endpoint; a missing file is an empty stream
    async fn read(&self, endpoint: &str) -> Result<Vec<RawRecord>, ReplayError> {
        let path = self.dir.join(format!("{endpoint}.json"));
        let display = path.display().to_string();

        let text = match tokio::fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("[Replay] {} not found, treating as empty", display);
                return Ok(Vec::new());
            }
            Err(source) => return Err(ReplayError::Io { path: display, source }),
        };
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let records: Vec<RawRecord> = serde_json::from_str(&text)
            .map_err(|source| ReplayError::Parse { path: display.clone(), source })?;
        debug!("[Replay] {} -> {} records", display, records.len());
        Ok(records)
    }

    /// Snapshot one endpoint into a memory source that does the filtering
    async fn load(&self, endpoint: &str) -> FetchResult<MemorySource> {
        let records = self.read(endpoint).await?;
        Ok(MemorySource::new().with_records(endpoint, records))
    }
}

#[async_trait]
impl TelemetrySource for FileSource {
    async fn fetch_meetings(&self, year: i32) -> FetchResult<Vec<RawRecord>> {
        self.load(endpoints::MEETINGS).await?.fetch_meetings(year).await
    }

    async fn fetch_sessions(&self, query: &SessionQuery) -> FetchResult<Vec<RawRecord>> {
        self.load(endpoints::SESSIONS).await?.fetch_sessions(query).await
    }

    async fn fetch_drivers(&self, session_key: i64) -> FetchResult<Vec<RawRecord>> {
        self.load(endpoints::DRIVERS).await?.fetch_drivers(session_key).await
    }

    async fn fetch_positions(
        &self,
        session_key: i64,
        range: Option<TimeRange>,
    ) -> FetchResult<Vec<RawRecord>> {
        self.load(endpoints::POSITION)
            .await?
            .fetch_positions(session_key, range)
            .await
    }

    async fn fetch_intervals(
        &self,
        session_key: i64,
        range: Option<TimeRange>,
    ) -> FetchResult<Vec<RawRecord>> {
        self.load(endpoints::INTERVALS)
            .await?
            .fetch_intervals(session_key, range)
            .await
    }

    async fn fetch_laps(
        &self,
        session_key: i64,
        range: Option<TimeRange>,
    ) -> FetchResult<Vec<RawRecord>> {
        self.load(endpoints::LAPS).await?.fetch_laps(session_key, range).await
    }

    async fn fetch_stints(&self, session_key: i64) -> FetchResult<Vec<RawRecord>> {
        self.load(endpoints::STINTS).await?.fetch_stints(session_key).await
    }

    async fn fetch_pit(&self, session_key: i64) -> FetchResult<Vec<RawRecord>> {
        self.load(endpoints::PIT).await?.fetch_pit(session_key).await
    }

    async fn fetch_weather(&self, session_key: i64) -> FetchResult<Vec<RawRecord>> {
        self.load(endpoints::WEATHER).await?.fetch_weather(session_key).await
    }

    async fn fetch_race_control(&self, session_key: i64) -> FetchResult<Vec<RawRecord>> {
        self.load(endpoints::RACE_CONTROL)
            .await?
            .fetch_race_control(session_key)
            .await
    }

    fn name(&self) -> &str {
        "FileSource"
    }
}
