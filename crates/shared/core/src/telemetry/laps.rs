use serde::{Deserialize, Serialize};

use super::Sample;
use crate::values::{
    DriverNumber, RawRecord, Timestamp, field_bool, field_str, field_timestamp, field_u32,
    first_f64,
};

/// Lap duration fields, in priority order
pub const LAP_DURATION_FIELDS: [&str; 4] = ["lap_duration", "duration", "lap_time", "time"];

/// One completed (or started) lap
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LapRecord {
    pub driver_number: Option<DriverNumber>,
    pub lap_number: Option<u32>,
    pub date_start: Option<Timestamp>,
    pub lap_duration_s: Option<f64>,
    pub is_pit_out_lap: bool,
}

impl LapRecord {
    pub fn from_raw(record: &RawRecord) -> Self {
        Self {
            driver_number: field_u32(record, "driver_number"),
            lap_number: field_u32(record, "lap_number"),
            date_start: field_timestamp(record, "date_start"),
            lap_duration_s: first_f64(record, &LAP_DURATION_FIELDS),
            is_pit_out_lap: field_bool(record, "is_pit_out_lap").unwrap_or(false),
        }
    }
}

impl Sample for LapRecord {
    fn timestamp(&self) -> Option<Timestamp> {
        self.date_start
    }

    fn driver(&self) -> Option<DriverNumber> {
        self.driver_number
    }
}

/// A run on one set of tyres, spanning `lap_start..=lap_end`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StintRecord {
    pub driver_number: DriverNumber,
    pub compound: Option<String>,
    pub lap_start: u32,
    pub lap_end: u32,
    /// Tyre age when the stint began
    pub tyre_age_at_start: u32,
}

impl StintRecord {
    /// Build from a loosely-typed stint record
    ///
    /// Returns `None` when the driver or lap bounds are missing.
    pub fn from_raw(record: &RawRecord) -> Option<Self> {
        Some(Self {
            driver_number: field_u32(record, "driver_number")?,
            compound: field_str(record, "compound"),
            lap_start: field_u32(record, "lap_start")?,
            lap_end: field_u32(record, "lap_end")?,
            tyre_age_at_start: field_u32(record, "tyre_age_at_start").unwrap_or(0),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lap_duration_candidates() {
        let raw = json!({
            "driver_number": 1,
            "lap_number": 12,
            "date_start": "2024-05-05T20:20:00Z",
            "lap_time": "91.402",
            "is_pit_out_lap": null
        });
        let lap = LapRecord::from_raw(raw.as_object().unwrap());
        assert_eq!(lap.lap_number, Some(12));
        assert_eq!(lap.lap_duration_s, Some(91.402));
        assert!(!lap.is_pit_out_lap);
    }

    #[test]
    fn test_stint_requires_bounds() {
        let raw = json!({"driver_number": 1, "compound": "MEDIUM", "lap_start": 1});
        assert!(StintRecord::from_raw(raw.as_object().unwrap()).is_none());

        let raw = json!({"driver_number": 1, "compound": "HARD", "lap_start": 20, "lap_end": 57});
        let stint = StintRecord::from_raw(raw.as_object().unwrap()).unwrap();
        assert_eq!(stint.tyre_age_at_start, 0);
        assert_eq!(stint.compound.as_deref(), Some("HARD"));
    }
}
