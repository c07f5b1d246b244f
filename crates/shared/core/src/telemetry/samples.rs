use serde::{Deserialize, Serialize};

use super::Sample;
use crate::values::{
    DriverNumber, RawRecord, Timestamp, field_bool, field_f64, field_timestamp, field_u32,
};

/// Running order observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionSample {
    pub date: Option<Timestamp>,
    pub driver_number: Option<DriverNumber>,
    pub position: Option<u32>,
}

impl PositionSample {
    pub fn from_raw(record: &RawRecord) -> Self {
        Self {
            date: field_timestamp(record, "date"),
            driver_number: field_u32(record, "driver_number"),
            position: field_u32(record, "position"),
        }
    }
}

impl Sample for PositionSample {
    fn timestamp(&self) -> Option<Timestamp> {
        self.date
    }

    fn driver(&self) -> Option<DriverNumber> {
        self.driver_number
    }
}

/// Timing gap observation
///
/// Lapped cars report textual gaps ("+1 LAP"), which coerce to `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntervalSample {
    pub date: Option<Timestamp>,
    pub driver_number: Option<DriverNumber>,
    pub gap_to_leader: Option<f64>,
    /// Gap to the car directly ahead
    pub interval: Option<f64>,
}

impl IntervalSample {
    pub fn from_raw(record: &RawRecord) -> Self {
        Self {
            date: field_timestamp(record, "date"),
            driver_number: field_u32(record, "driver_number"),
            gap_to_leader: field_f64(record, "gap_to_leader"),
            interval: field_f64(record, "interval"),
        }
    }
}

impl Sample for IntervalSample {
    fn timestamp(&self) -> Option<Timestamp> {
        self.date
    }

    fn driver(&self) -> Option<DriverNumber> {
        self.driver_number
    }
}

/// Session-global weather observation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherSample {
    pub date: Option<Timestamp>,
    pub air_temperature: Option<f64>,
    pub track_temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub pressure: Option<f64>,
    pub rainfall: Option<bool>,
    pub wind_speed: Option<f64>,
    pub wind_direction: Option<f64>,
}

impl WeatherSample {
    pub fn from_raw(record: &RawRecord) -> Self {
        Self {
            date: field_timestamp(record, "date"),
            air_temperature: field_f64(record, "air_temperature"),
            track_temperature: field_f64(record, "track_temperature"),
            humidity: field_f64(record, "humidity"),
            pressure: field_f64(record, "pressure"),
            rainfall: field_bool(record, "rainfall"),
            wind_speed: field_f64(record, "wind_speed"),
            wind_direction: field_f64(record, "wind_direction"),
        }
    }
}

impl Sample for WeatherSample {
    fn timestamp(&self) -> Option<Timestamp> {
        self.date
    }

    fn driver(&self) -> Option<DriverNumber> {
        None
    }
}
