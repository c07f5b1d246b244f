use serde::{Deserialize, Serialize};

use super::Sample;
use crate::values::{DriverNumber, RawRecord, Timestamp, field_timestamp, field_u32, first_f64};

/// Pit-stop cost fields, in priority order
///
/// `pit_duration` is what the live service reports; the rest cover
/// archived exports that name the column differently. A record carrying
/// none of these has no usable duration.
pub const PIT_DURATION_FIELDS: [&str; 7] = [
    "pit_duration",
    "stop_duration",
    "duration",
    "lane_duration",
    "pit_time",
    "time_loss",
    "pit_loss",
];

/// One pit stop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PitStopRecord {
    pub date: Option<Timestamp>,
    pub driver_number: Option<DriverNumber>,
    pub lap_number: Option<u32>,
    /// Time cost of the stop in seconds
    pub duration_s: Option<f64>,
}

impl PitStopRecord {
    pub fn from_raw(record: &RawRecord) -> Self {
        Self {
            date: field_timestamp(record, "date"),
            driver_number: field_u32(record, "driver_number"),
            lap_number: field_u32(record, "lap_number"),
            duration_s: first_f64(record, &PIT_DURATION_FIELDS),
        }
    }
}

impl Sample for PitStopRecord {
    fn timestamp(&self) -> Option<Timestamp> {
        self.date
    }

    fn driver(&self) -> Option<DriverNumber> {
        self.driver_number
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pit_duration_priority() {
        let raw = json!({"driver_number": 4, "lap_number": 21, "pit_duration": 22.8, "duration": 2.4});
        let stop = PitStopRecord::from_raw(raw.as_object().unwrap());
        assert_eq!(stop.duration_s, Some(22.8));

        let raw = json!({"driver_number": 4, "lane_duration": "19.9"});
        let stop = PitStopRecord::from_raw(raw.as_object().unwrap());
        assert_eq!(stop.duration_s, Some(19.9));

        let raw = json!({"driver_number": 4, "date": "2024-05-05T20:40:00Z"});
        let stop = PitStopRecord::from_raw(raw.as_object().unwrap());
        assert!(stop.duration_s.is_none());
    }
}
