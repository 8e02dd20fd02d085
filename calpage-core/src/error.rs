//! Error types for the calpage pipeline.

use thiserror::Error;

/// Errors that can occur while loading settings or building page data.
#[derive(Error, Debug)]
pub enum CalPageError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Event source error: {0}")]
    Source(String),

    #[error("Event data error: {0}")]
    Event(String),

    #[error("No image file extension known for mime type '{0}'")]
    UnknownMime(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for calpage operations.
pub type CalPageResult<T> = Result<T, CalPageError>;
