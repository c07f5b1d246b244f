//! Telemetry sources other than the live HTTP client

pub mod filter;
pub mod memory;
pub mod replay;

pub use filter::endpoints;
pub use memory::MemorySource;
pub use replay::FileSource;
