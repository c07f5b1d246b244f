use serde::{Deserialize, Serialize};

use crate::values::{RawRecord, Timestamp, field_i64, field_str, field_timestamp};

/// Session type used for race discovery
pub const RACE_SESSION_TYPE: &str = "Race";

/// A timed session (race, qualifying, practice)
///
/// Immutable once resolved from the telemetry service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionMeta {
    pub meeting_key: i64,
    pub session_key: i64,
    pub session_type: String,
    pub session_name: String,
    /// -1 when the service does not report a circuit
    pub circuit_key: i64,
    pub scheduled_start: Option<Timestamp>,
    pub scheduled_end: Option<Timestamp>,
}

impl SessionMeta {
    /// Build from a loosely-typed session record
    ///
    /// Accepts the field aliases different service versions use
    /// (`type`, `name`, `start_time`, `startDate`, `end_time`, `endDate`).
    /// Returns `None` when the meeting or session key is missing.
    pub fn from_raw(record: &RawRecord) -> Option<Self> {
        let meeting_key = field_i64(record, "meeting_key")?;
        let session_key = field_i64(record, "session_key")?;

        let session_name = field_str(record, "session_name")
            .or_else(|| field_str(record, "name"))
            .unwrap_or_default();
        let session_type = field_str(record, "session_type")
            .or_else(|| field_str(record, "type"))
            .unwrap_or_else(|| session_name.clone());

        let scheduled_start = ["date_start", "start_time", "startDate"]
            .iter()
            .find_map(|k| field_timestamp(record, k));
        let scheduled_end = ["date_end", "end_time", "endDate"]
            .iter()
            .find_map(|k| field_timestamp(record, k));

        Some(Self {
            meeting_key,
            session_key,
            session_type,
            session_name,
            circuit_key: field_i64(record, "circuit_key").unwrap_or(-1),
            scheduled_start,
            scheduled_end,
        })
    }

    pub fn is_race(&self) -> bool {
        self.session_type == RACE_SESSION_TYPE
    }
}

/// A race weekend grouping several sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeetingMeta {
    pub meeting_key: i64,
    pub meeting_name: Option<String>,
    pub date_start: Option<Timestamp>,
}

impl MeetingMeta {
    pub fn from_raw(record: &RawRecord) -> Option<Self> {
        let meeting_key = field_i64(record, "meeting_key")?;
        let date_start = ["date_start", "start_time", "startDate"]
            .iter()
            .find_map(|k| field_timestamp(record, k));

        Some(Self {
            meeting_key,
            meeting_name: field_str(record, "meeting_name"),
            date_start,
        })
    }
}
