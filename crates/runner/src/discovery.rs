//! Race session discovery
//!
//! Meetings first, then season-wide session listings, then the service's
//! `latest` session. Each step only runs when the previous one found
//! nothing usable.

use log::{debug, info, warn};
use pitwall_core::telemetry::parse_valid;
use pitwall_core::{MeetingMeta, SessionMeta};
use pitwall_ports::{SessionQuery, TelemetrySource};

use crate::error::{Result, RunnerError};

/// Which session to analyse
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionSelector {
    /// Session key, or `latest`
    Key(String),
    /// Last race of a meeting
    Meeting(i64),
    /// Last race of a season
    Year(i32),
}

fn sort_by_start(sessions: &mut [SessionMeta]) {
    sessions.sort_by_key(|s| (s.scheduled_start.is_none(), s.scheduled_start));
}

async fn sessions_of(source: &dyn TelemetrySource, query: &SessionQuery) -> Result<Vec<SessionMeta>> {
    let records = source.fetch_sessions(query).await?;
    Ok(parse_valid(&records, SessionMeta::from_raw))
}

/// Race sessions of one meeting, in start order
pub async fn meeting_races(source: &dyn TelemetrySource, meeting_key: i64) -> Result<Vec<SessionMeta>> {
    let mut races: Vec<SessionMeta> = sessions_of(source, &SessionQuery::ByMeeting(meeting_key))
        .await?
        .into_iter()
        .filter(SessionMeta::is_race)
        .collect();
    sort_by_start(&mut races);
    Ok(races)
}

/// Every race of a season, in start order
///
/// Falls back to a season-wide session listing when meetings are missing
/// or undated, and to the `latest` session when that is empty too.
pub async fn iter_year_races(source: &dyn TelemetrySource, year: i32) -> Result<Vec<SessionMeta>> {
    let mut meetings = parse_valid(&source.fetch_meetings(year).await?, MeetingMeta::from_raw);

    if meetings.iter().any(|m| m.date_start.is_some()) {
        meetings.sort_by_key(|m| (m.date_start.is_none(), m.date_start));

        let mut races = Vec::new();
        for meeting in &meetings {
            races.extend(meeting_races(source, meeting.meeting_key).await?);
        }
        if !races.is_empty() {
            info!("[Discovery] {} races in {} from {} meetings", races.len(), year, meetings.len());
            return Ok(races);
        }
    }

    debug!("[Discovery] No dated meetings for {}, listing sessions by year", year);
    let mut races: Vec<SessionMeta> = sessions_of(source, &SessionQuery::races_of(year))
        .await?
        .into_iter()
        .filter(SessionMeta::is_race)
        .collect();
    if !races.is_empty() {
        sort_by_start(&mut races);
        info!("[Discovery] {} races in {} from session listing", races.len(), year);
        return Ok(races);
    }

    warn!("[Discovery] No races found for {}, using latest session", year);
    sessions_of(source, &SessionQuery::latest()).await
}

/// Resolve a single session
pub async fn resolve_session(
    source: &dyn TelemetrySource,
    selector: &SessionSelector,
) -> Result<SessionMeta> {
    let found = match selector {
        SessionSelector::Key(key) => sessions_of(source, &SessionQuery::ByKey(key.clone()))
            .await?
            .into_iter()
            .next(),
        SessionSelector::Meeting(meeting_key) => meeting_races(source, *meeting_key).await?.pop(),
        SessionSelector::Year(year) => iter_year_races(source, *year).await?.pop(),
    };

    found.ok_or_else(|| {
        RunnerError::SessionNotFound(match selector {
            SessionSelector::Key(key) => format!("no session with key {key}"),
            SessionSelector::Meeting(m) => format!("no race session in meeting {m}"),
            SessionSelector::Year(y) => format!("no race session in {y}"),
        })
    })
}
