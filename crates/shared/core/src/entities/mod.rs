mod decision;
mod driver;
mod flags;
mod session;
mod state;

pub use decision::{Advice, Decision};
pub use driver::Driver;
pub use flags::{FlagState, FlagTimeline};
pub use session::{MeetingMeta, RACE_SESSION_TYPE, SessionMeta};
pub use state::{DriverContext, DriverMinuteState, PitLossPolicy};
