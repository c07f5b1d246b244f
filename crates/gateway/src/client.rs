//! Rate-limited OpenF1 REST client
//!
//! Every request goes through the shared [`RateLimiter`]. Empty or
//! non-JSON bodies are treated as empty record lists; non-success statuses
//! become [`RestError::Status`].

use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, warn};
use pitwall_core::{RawRecord, Timestamp};
use pitwall_ports::{FetchResult, SessionQuery, TelemetrySource, TimeRange};
use reqwest::Client;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};

use crate::config::GatewayConfig;
use crate::error::RestError;
use crate::rate_limiter::RateLimiter;
use crate::source::filter::{self, endpoints};

/// Longest error body kept in a status error
const MAX_ERROR_BODY: usize = 300;

type Params = Vec<(String, String)>;

fn param(key: &str, value: impl ToString) -> (String, String) {
    (key.to_string(), value.to_string())
}

/// Service time format for range filters
fn format_time(ts: Timestamp) -> String {
    ts.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

fn truncate(body: &str) -> String {
    body.chars().take(MAX_ERROR_BODY).collect()
}

/// Decode a body into records; anything but a JSON array is empty
fn parse_records(endpoint: &str, text: &str) -> Vec<RawRecord> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    match serde_json::from_str::<serde_json::Value>(text) {
        Ok(serde_json::Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                serde_json::Value::Object(map) => Some(map),
                _ => None,
            })
            .collect(),
        Ok(_) => {
            debug!("[OpenF1] {} returned a non-array body", endpoint);
            Vec::new()
        }
        Err(e) => {
            warn!("[OpenF1] {} returned invalid JSON: {}", endpoint, e);
            Vec::new()
        }
    }
}

/// OpenF1 client; clones share the HTTP pool and the rate limiter
#[derive(Clone)]
pub struct OpenF1Client {
    client: Client,
    config: GatewayConfig,
    limiter: Arc<RateLimiter>,
}

impl OpenF1Client {
    pub fn new(config: GatewayConfig) -> Result<Self, RestError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;
        let limiter = Arc::new(RateLimiter::per_interval(config.min_request_interval));

        Ok(Self {
            client,
            config,
            limiter,
        })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// GET one endpoint with query parameters
    pub async fn get_records(
        &self,
        endpoint: &str,
        params: &[(String, String)],
    ) -> Result<Vec<RawRecord>, RestError> {
        self.limiter.acquire().await;

        let url = self.config.endpoint_url(endpoint);
        debug!("[OpenF1] GET {} {:?}", url, params);

        let resp = self.client.get(&url).query(params).send().await?;
        let status = resp.status();
        let text = resp.text().await?;
        debug!("[OpenF1] {} -> {} ({} bytes)", endpoint, status, text.len());

        if !status.is_success() {
            return Err(RestError::Status {
                code: status.as_u16(),
                body: truncate(&text),
            });
        }
        Ok(parse_records(endpoint, &text))
    }

    async fn session_records(
        &self,
        endpoint: &str,
        session_key: i64,
    ) -> FetchResult<Vec<RawRecord>> {
        Ok(self
            .get_records(endpoint, &[param("session_key", session_key)])
            .await?)
    }

    /// Ranged fetch with the service's `>=`/`<=` filters
    ///
    /// Some sessions answer range queries with nothing; then the whole
    /// stream is fetched and narrowed locally.
    async fn ranged_records(
        &self,
        endpoint: &str,
        session_key: i64,
        range: Option<TimeRange>,
    ) -> FetchResult<Vec<RawRecord>> {
        let Some(range) = range else {
            return self.session_records(endpoint, session_key).await;
        };

        let field = filter::time_field(endpoint);
        let params: Params = vec![
            param("session_key", session_key),
            param(&format!("{field}>="), format_time(range.start)),
            param(&format!("{field}<="), format_time(range.end)),
        ];
        let records = self.get_records(endpoint, &params).await?;
        if !records.is_empty() {
            return Ok(records);
        }

        debug!(
            "[OpenF1] Ranged {} empty for session {}, filtering locally",
            endpoint, session_key
        );
        let all = self.session_records(endpoint, session_key).await?;
        Ok(filter::within_range(all, field, &range))
    }
}

#[async_trait]
impl TelemetrySource for OpenF1Client {
    async fn fetch_meetings(&self, year: i32) -> FetchResult<Vec<RawRecord>> {
        let records = self
            .get_records(endpoints::MEETINGS, &[param("year", year)])
            .await?;
        if !records.is_empty() {
            return Ok(records);
        }

        debug!("[OpenF1] No meetings by year {}, trying date range", year);
        let params: Params = vec![
            param("date_start>=", format!("{year}-01-01")),
            param("date_end<=", format!("{year}-12-31")),
        ];
        let records = self.get_records(endpoints::MEETINGS, &params).await?;
        Ok(filter::meetings_in_year(records, year))
    }

    async fn fetch_sessions(&self, query: &SessionQuery) -> FetchResult<Vec<RawRecord>> {
        match query {
            SessionQuery::ByMeeting(meeting_key) => Ok(self
                .get_records(endpoints::SESSIONS, &[param("meeting_key", meeting_key)])
                .await?),
            SessionQuery::ByKey(key) => Ok(self
                .get_records(endpoints::SESSIONS, &[param("session_key", key)])
                .await?),
            SessionQuery::ByYear { year, session_type } => {
                let type_param = session_type.as_ref().map(|t| param("session_type", t));

                let mut params: Params = vec![param("year", year)];
                params.extend(type_param.clone());
                let records = self.get_records(endpoints::SESSIONS, &params).await?;
                if !records.is_empty() {
                    return Ok(records);
                }

                debug!("[OpenF1] No sessions by year {}, trying date range", year);
                let mut params: Params = vec![
                    param("date_start>=", format!("{year}-01-01")),
                    param("date_end<=", format!("{year}-12-31")),
                ];
                params.extend(type_param);
                let records = self.get_records(endpoints::SESSIONS, &params).await?;
                Ok(filter::sessions_matching(records, query))
            }
        }
    }

    async fn fetch_drivers(&self, session_key: i64) -> FetchResult<Vec<RawRecord>> {
        self.session_records(endpoints::DRIVERS, session_key).await
    }

    async fn fetch_positions(
        &self,
        session_key: i64,
        range: Option<TimeRange>,
    ) -> FetchResult<Vec<RawRecord>> {
        self.ranged_records(endpoints::POSITION, session_key, range).await
    }

    async fn fetch_intervals(
        &self,
        session_key: i64,
        range: Option<TimeRange>,
    ) -> FetchResult<Vec<RawRecord>> {
        self.ranged_records(endpoints::INTERVALS, session_key, range).await
    }

    async fn fetch_laps(
        &self,
        session_key: i64,
        range: Option<TimeRange>,
    ) -> FetchResult<Vec<RawRecord>> {
        self.ranged_records(endpoints::LAPS, session_key, range).await
    }

    async fn fetch_stints(&self, session_key: i64) -> FetchResult<Vec<RawRecord>> {
        self.session_records(endpoints::STINTS, session_key).await
    }

    async fn fetch_pit(&self, session_key: i64) -> FetchResult<Vec<RawRecord>> {
        self.session_records(endpoints::PIT, session_key).await
    }

    async fn fetch_weather(&self, session_key: i64) -> FetchResult<Vec<RawRecord>> {
        self.session_records(endpoints::WEATHER, session_key).await
    }

    async fn fetch_race_control(&self, session_key: i64) -> FetchResult<Vec<RawRecord>> {
        self.session_records(endpoints::RACE_CONTROL, session_key).await
    }

    fn name(&self) -> &str {
        "OpenF1Client"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_parse_records_tolerates_bad_bodies() {
        assert!(parse_records("laps", "").is_empty());
        assert!(parse_records("laps", "   \n").is_empty());
        assert!(parse_records("laps", "<html>502</html>").is_empty());
        assert!(parse_records("laps", r#"{"detail": "not found"}"#).is_empty());

        let records = parse_records("laps", r#"[{"lap_number": 1}, 7, {"lap_number": 2}]"#);
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_time_format() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 2, 15, 3, 7).unwrap();
        assert_eq!(format_time(ts), "2024-03-02T15:03:07Z");
    }

    #[test]
    fn test_error_body_truncated() {
        let body = "x".repeat(1000);
        assert_eq!(truncate(&body).len(), MAX_ERROR_BODY);
        assert_eq!(truncate("short"), "short");
    }

    #[test]
    fn test_client_builds_from_config() {
        let client = OpenF1Client::new(GatewayConfig::default().with_base_url("http://127.0.0.1:9/v1"));
        assert!(client.is_ok());
        assert_eq!(client.unwrap().name(), "OpenF1Client");
    }
}
