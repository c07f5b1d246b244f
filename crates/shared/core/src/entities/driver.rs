use serde::{Deserialize, Serialize};

use crate::values::{DriverNumber, RawRecord, field_str, field_u32};

/// A driver entered in the session
///
/// The driver set is fixed for the session's duration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Driver {
    pub driver_number: DriverNumber,
    pub display_name: String,
    pub team: Option<String>,
    pub acronym: Option<String>,
}

impl Driver {
    pub fn new(driver_number: DriverNumber, display_name: impl Into<String>) -> Self {
        Self {
            driver_number,
            display_name: display_name.into(),
            team: None,
            acronym: None,
        }
    }

    /// Builder: Set team
    pub fn with_team(mut self, team: impl Into<String>) -> Self {
        self.team = Some(team.into());
        self
    }

    /// Build from a loosely-typed driver record
    ///
    /// Display name prefers `full_name`, then `broadcast_name`, then the
    /// acronym, then `#<number>`.
    pub fn from_raw(record: &RawRecord) -> Option<Self> {
        let driver_number = field_u32(record, "driver_number")?;
        let acronym = field_str(record, "name_acronym");
        let display_name = field_str(record, "full_name")
            .or_else(|| field_str(record, "broadcast_name"))
            .or_else(|| acronym.clone())
            .unwrap_or_else(|| format!("#{}", driver_number));

        Some(Self {
            driver_number,
            display_name,
            team: field_str(record, "team_name").or_else(|| field_str(record, "team")),
            acronym,
        })
    }
}
