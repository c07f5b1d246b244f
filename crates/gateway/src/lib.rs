//! Pitwall Gateway
//!
//! Telemetry sources implementing the `TelemetrySource` port:
//! - `OpenF1Client`: rate-limited HTTP client for the OpenF1 REST service
//! - `MemorySource`: in-memory endpoint dumps for tests
//! - `FileSource`: replays endpoint dumps from a directory
//!
//! ## Architecture
//!
//! ```text
//!   OpenF1 REST        replay dir/*.json
//!        │                    │
//!  ┌─────▼──────┐      ┌──────▼─────┐
//!  │ OpenF1     │      │ FileSource │
//!  │ Client     │      └──────┬─────┘
//!  │ (1 req/s)  │      ┌──────▼──────┐
//!  └─────┬──────┘      │MemorySource │
//!        │             └──────┬──────┘
//!        └───────┬────────────┘
//!                │ TelemetrySource (raw records)
//!           ┌────▼────┐
//!           │ Runner  │
//!           └─────────┘
//! ```
//!
//! Sources that hold whole dumps narrow them client-side with the same
//! session, time-range and year filters the service applies.

pub mod client;
pub mod config;
pub mod error;
pub mod rate_limiter;
pub mod source;

// Re-export commonly used types
pub use client::OpenF1Client;
pub use config::{BASE_URL_ENV, DEFAULT_BASE_URL, GatewayConfig};
pub use error::{ReplayError, RestError};
pub use rate_limiter::RateLimiter;
pub use source::{FileSource, MemorySource, endpoints};
