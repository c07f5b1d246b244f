//! Error types for the gateway crate

use pitwall_ports::FetchError;
use thiserror::Error;

/// HTTP-level errors of the OpenF1 client
#[derive(Error, Debug)]
pub enum RestError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP {code}: {body}")]
    Status { code: u16, body: String },
}

/// Convert infrastructure RestError to the port's FetchError
impl From<RestError> for FetchError {
    fn from(err: RestError) -> Self {
        match err {
            RestError::Http(e) if e.is_decode() => FetchError::Decode(e.to_string()),
            RestError::Http(e) => FetchError::Network(e.to_string()),
            RestError::Status { code, body } => FetchError::Status { code, body },
        }
    }
}

/// Errors of the file-backed replay source
#[derive(Error, Debug)]
pub enum ReplayError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl From<ReplayError> for FetchError {
    fn from(err: ReplayError) -> Self {
        match err {
            ReplayError::Io { .. } => FetchError::Io(err.to_string()),
            ReplayError::Parse { .. } => FetchError::Decode(err.to_string()),
        }
    }
}
