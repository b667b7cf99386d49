// src/domain/errors.rs
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Command rejected by engine: {0}")]
    CommandFailure(String),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Request error: {0}")]
    Request(String),

    #[error("HTTP error: {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Request to {0} timed out")]
    Timeout(String),

    #[error("Invalid URI: {0}")]
    InvalidUri(String),
}

impl From<hyper::Error> for TransportError {
    fn from(err: hyper::Error) -> Self {
        TransportError::Request(err.to_string())
    }
}

impl From<hyper::Error> for DashboardError {
    fn from(err: hyper::Error) -> Self {
        DashboardError::Transport(err.into())
    }
}

// Result type alias for convenience
pub type DashboardResult<T> = Result<T, DashboardError>;
pub type TransportResult<T> = Result<T, TransportError>;
