//! Error types for the runner crate

use pitwall_alignment::AlignmentError;
use pitwall_ports::FetchError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Alignment(#[from] AlignmentError),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Frame has no rows")]
    EmptyFrame,
}

pub type Result<T> = std::result::Result<T, RunnerError>;
