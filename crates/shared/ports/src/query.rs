use pitwall_core::Timestamp;
use serde::{Deserialize, Serialize};

/// Which sessions to list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionQuery {
    /// All sessions of one meeting
    ByMeeting(i64),
    /// Sessions of a season, optionally narrowed to one session type
    ByYear {
        year: i32,
        session_type: Option<String>,
    },
    /// A single session by key; the service also accepts `latest`
    ByKey(String),
}

impl SessionQuery {
    pub fn latest() -> Self {
        SessionQuery::ByKey("latest".to_string())
    }

    pub fn races_of(year: i32) -> Self {
        SessionQuery::ByYear {
            year,
            session_type: Some(pitwall_core::RACE_SESSION_TYPE.to_string()),
        }
    }
}

/// Closed time interval `[start, end]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl TimeRange {
    pub fn new(start: Timestamp, end: Timestamp) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, ts: Timestamp) -> bool {
        self.start <= ts && ts <= self.end
    }

    /// Keep `ts` only if it is known and inside the range
    pub fn admits(&self, ts: Option<Timestamp>) -> bool {
        ts.is_some_and(|t| self.contains(t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_range_is_closed() {
        let start = Utc.with_ymd_and_hms(2024, 5, 5, 19, 50, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 5, 5, 23, 10, 0).unwrap();
        let range = TimeRange::new(start, end);

        assert!(range.contains(start));
        assert!(range.contains(end));
        assert!(!range.contains(end + chrono::TimeDelta::seconds(1)));
        assert!(!range.admits(None));
    }

    #[test]
    fn test_races_of_year() {
        let query = SessionQuery::races_of(2024);
        assert_eq!(
            query,
            SessionQuery::ByYear {
                year: 2024,
                session_type: Some("Race".to_string())
            }
        );
    }
}
