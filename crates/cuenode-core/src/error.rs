//! Error types for the cue node

use thiserror::Error;

/// Core cue node errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CueError {
    // Remote store errors
    #[error("Remote store error: {0}")]
    Store(String),

    #[error("Malformed remote record: {0}")]
    Decode(String),

    // State machine errors
    #[error("No transition table entry for cue state {0:?}")]
    UnknownCueState(String),

    // Hardware errors
    #[error("Invalid color: {0}")]
    InvalidColor(String),

    #[error("Hardware error: {0}")]
    Hardware(String),

    // Local persistence
    #[error("Error log failure: {0}")]
    ErrorLog(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for CueError {
    fn from(err: serde_json::Error) -> Self {
        CueError::Decode(err.to_string())
    }
}

/// Result type for cue node operations
pub type CueResult<T> = Result<T, CueError>;
