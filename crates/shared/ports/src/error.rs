use thiserror::Error;

/// Errors raised by a telemetry collaborator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP {code}: {body}")]
    Status { code: u16, body: String },

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("I/O error: {0}")]
    Io(String),
}

pub type FetchResult<T> = std::result::Result<T, FetchError>;
