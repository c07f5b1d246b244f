use serde::{Deserialize, Serialize};
use std::fmt;

/// Strategic verdict for one driver at one minute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Advice {
    /// Red flag: pit work is handled outside normal strategy
    #[serde(rename = "NO_ACTION")]
    NoAction,
    /// Pit now, the SC/VSC discount makes the stop cheap
    #[serde(rename = "BOX_NOW_SC")]
    BoxNowSc,
    /// Neutralized but the window is not right yet
    #[serde(rename = "HOLD_SC")]
    HoldSc,
    /// Pit now to undercut the car ahead
    #[serde(rename = "BOX_NOW_UNDERCUT")]
    BoxNowUndercut,
    /// Undercut window opens within a lap
    #[serde(rename = "BOX_SOON_1LAP")]
    BoxSoon1Lap,
    /// Stay out and let the car ahead pit first
    #[serde(rename = "STAY_OUT_OVERCUT")]
    StayOutOvercut,
    /// No favourable move
    #[serde(rename = "STAY_OUT")]
    StayOut,
}

impl Advice {
    pub fn as_str(&self) -> &'static str {
        match self {
            Advice::NoAction => "NO_ACTION",
            Advice::BoxNowSc => "BOX_NOW_SC",
            Advice::HoldSc => "HOLD_SC",
            Advice::BoxNowUndercut => "BOX_NOW_UNDERCUT",
            Advice::BoxSoon1Lap => "BOX_SOON_1LAP",
            Advice::StayOutOvercut => "STAY_OUT_OVERCUT",
            Advice::StayOut => "STAY_OUT",
        }
    }
}

impl fmt::Display for Advice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verdict plus a human-readable rationale
///
/// Only meaningful for the minute it was computed for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub advice: Advice,
    pub why: String,
}

impl Decision {
    pub fn new(advice: Advice, why: impl Into<String>) -> Self {
        Self {
            advice,
            why: why.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advice_wire_names() {
        assert_eq!(
            serde_json::to_string(&Advice::BoxSoon1Lap).unwrap(),
            "\"BOX_SOON_1LAP\""
        );
        assert_eq!(
            serde_json::to_string(&Advice::StayOutOvercut).unwrap(),
            "\"STAY_OUT_OVERCUT\""
        );
        for advice in [
            Advice::NoAction,
            Advice::BoxNowSc,
            Advice::HoldSc,
            Advice::BoxNowUndercut,
            Advice::BoxSoon1Lap,
            Advice::StayOutOvercut,
            Advice::StayOut,
        ] {
            let wire = serde_json::to_string(&advice).unwrap();
            assert_eq!(wire, format!("\"{}\"", advice));
        }
    }
}
