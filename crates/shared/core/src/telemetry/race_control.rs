use serde::{Deserialize, Serialize};

use super::Sample;
use crate::entities::FlagState;
use crate::values::{DriverNumber, RawRecord, Timestamp, field_str, field_timestamp, field_u32};

const SAFETY_CAR_CATEGORY: &str = "SafetyCar";
const VIRTUAL_SAFETY_CAR_CATEGORY: &str = "VirtualSafetyCar";

const START_MESSAGE_TOKENS: [&str; 3] = ["START", "GREEN FLAG", "RACE START"];
const START_CATEGORY_TOKENS: [&str; 2] = ["SESSIONSTART", "START"];

/// Race-control message (flags, safety car, incidents)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RaceControlEvent {
    pub date: Option<Timestamp>,
    pub category: Option<String>,
    pub flag: Option<String>,
    pub message: Option<String>,
    pub driver_number: Option<DriverNumber>,
}

impl RaceControlEvent {
    pub fn from_raw(record: &RawRecord) -> Self {
        Self {
            date: field_timestamp(record, "date"),
            category: field_str(record, "category"),
            flag: field_str(record, "flag"),
            message: field_str(record, "message"),
            driver_number: field_u32(record, "driver_number"),
        }
    }

    /// Does this event look like the green-flag / start-of-session signal?
    pub fn is_start_signal(&self) -> bool {
        let upper = |s: &Option<String>| s.as_deref().map(str::to_uppercase);

        if upper(&self.flag).is_some_and(|f| f.contains("GREEN")) {
            return true;
        }
        if upper(&self.message)
            .is_some_and(|m| START_MESSAGE_TOKENS.iter().any(|t| m.contains(t)))
        {
            return true;
        }
        upper(&self.category).is_some_and(|c| START_CATEGORY_TOKENS.iter().any(|t| c.contains(t)))
    }

    /// Flag bits this single event contributes to its minute
    pub fn flag_bits(&self) -> FlagState {
        let category = self.category.as_deref();
        let flag = self.flag.as_deref();
        FlagState {
            is_sc: category == Some(SAFETY_CAR_CATEGORY),
            is_vsc: category == Some(VIRTUAL_SAFETY_CAR_CATEGORY),
            is_red: flag == Some("RED"),
            is_green: flag == Some("GREEN"),
        }
    }
}

impl Sample for RaceControlEvent {
    fn timestamp(&self) -> Option<Timestamp> {
        self.date
    }

    fn driver(&self) -> Option<DriverNumber> {
        self.driver_number
    }
}
