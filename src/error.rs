use std::io;
use thiserror::Error;

/// Custom error type for the fleetmon application
#[derive(Error, Debug)]
pub enum FleetError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Malformed snapshot: {0}")]
    MalformedSnapshot(String),

    #[error("Deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid feed URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Chart error: {0}")]
    Chart(String),

    #[error("TUI error: {0}")]
    Tui(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for the fleetmon application
pub type Result<T> = std::result::Result<T, FleetError>;

impl FleetError {
    /// Create a malformed snapshot error
    pub fn malformed<S: Into<String>>(msg: S) -> Self {
        FleetError::MalformedSnapshot(msg.into())
    }

    /// Create a transport error
    pub fn transport<S: Into<String>>(msg: S) -> Self {
        FleetError::Transport(msg.into())
    }

    /// Create a chart error
    pub fn chart<S: Into<String>>(msg: S) -> Self {
        FleetError::Chart(msg.into())
    }

    pub fn tui<S: Into<String>>(msg: S) -> Self {
        FleetError::Tui(msg.into())
    }

    pub fn other<S: Into<String>>(msg: S) -> Self {
        FleetError::Other(msg.into())
    }
}
