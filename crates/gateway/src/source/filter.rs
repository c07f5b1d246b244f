//! Client-side record selection
//!
//! Sources that hold whole endpoint dumps (memory, replay) and the HTTP
//! client's unfiltered fallback narrow records here, mirroring what the
//! service does with query parameters.

use chrono::Datelike;
use pitwall_core::values::{field_i64, field_timestamp};
use pitwall_core::{MeetingMeta, RawRecord, SessionMeta, Timestamp};
use pitwall_ports::{SessionQuery, TimeRange};

/// Endpoint names, shared by the HTTP client and the replay layout
pub mod endpoints {
    pub const MEETINGS: &str = "meetings";
    pub const SESSIONS: &str = "sessions";
    pub const DRIVERS: &str = "drivers";
    pub const POSITION: &str = "position";
    pub const INTERVALS: &str = "intervals";
    pub const LAPS: &str = "laps";
    pub const STINTS: &str = "stints";
    pub const PIT: &str = "pit";
    pub const WEATHER: &str = "weather";
    pub const RACE_CONTROL: &str = "race_control";

    pub const ALL: [&str; 10] = [
        MEETINGS,
        SESSIONS,
        DRIVERS,
        POSITION,
        INTERVALS,
        LAPS,
        STINTS,
        PIT,
        WEATHER,
        RACE_CONTROL,
    ];
}

/// Timestamp field the service filters on for ranged endpoints
pub fn time_field(endpoint: &str) -> &'static str {
    if endpoint == endpoints::LAPS {
        "date_start"
    } else {
        "date"
    }
}

/// Keep records of one session; records without a session key are kept
pub fn for_session(records: Vec<RawRecord>, session_key: i64) -> Vec<RawRecord> {
    records
        .into_iter()
        .filter(|r| field_i64(r, "session_key").is_none_or(|k| k == session_key))
        .collect()
}

/// Keep records whose `field` lies inside `range`
///
/// When no record carries the field at all the input is returned as is;
/// otherwise records with a missing or unparseable time are dropped.
pub fn within_range(records: Vec<RawRecord>, field: &str, range: &TimeRange) -> Vec<RawRecord> {
    if !records.iter().any(|r| r.contains_key(field)) {
        return records;
    }
    records
        .into_iter()
        .filter(|r| range.admits(field_timestamp(r, field)))
        .collect()
}

fn year_of(record: &RawRecord, start: Option<Timestamp>) -> Option<i32> {
    field_i64(record, "year")
        .and_then(|y| i32::try_from(y).ok())
        .or_else(|| start.map(|s| s.year()))
}

/// Meetings held in `year`; records with no year information are kept
pub fn meetings_in_year(records: Vec<RawRecord>, year: i32) -> Vec<RawRecord> {
    records
        .into_iter()
        .filter(|r| {
            let start = MeetingMeta::from_raw(r).and_then(|m| m.date_start);
            year_of(r, start).is_none_or(|y| y == year)
        })
        .collect()
}

/// Sessions matching a query
///
/// `latest` selects the session with the most recent start, or the last
/// record when none has a start.
pub fn sessions_matching(records: Vec<RawRecord>, query: &SessionQuery) -> Vec<RawRecord> {
    match query {
        SessionQuery::ByMeeting(meeting_key) => records
            .into_iter()
            .filter(|r| field_i64(r, "meeting_key") == Some(*meeting_key))
            .collect(),
        SessionQuery::ByYear { year, session_type } => records
            .into_iter()
            .filter(|r| {
                let Some(meta) = SessionMeta::from_raw(r) else {
                    return false;
                };
                let in_year = year_of(r, meta.scheduled_start).is_none_or(|y| y == *year);
                let of_type = session_type
                    .as_deref()
                    .is_none_or(|t| meta.session_type == t);
                in_year && of_type
            })
            .collect(),
        SessionQuery::ByKey(key) if key == "latest" => {
            let latest = records
                .iter()
                .enumerate()
                .max_by_key(|(i, r)| {
                    let start = SessionMeta::from_raw(r).and_then(|m| m.scheduled_start);
                    (start, *i)
                })
                .map(|(i, _)| i);
            match latest {
                Some(i) => records.into_iter().skip(i).take(1).collect(),
                None => Vec::new(),
            }
        }
        SessionQuery::ByKey(key) => match key.parse::<i64>() {
            Ok(session_key) => records
                .into_iter()
                .filter(|r| field_i64(r, "session_key") == Some(session_key))
                .collect(),
            Err(_) => Vec::new(),
        },
    }
}
