//! Error types for webcam-capture-core

use std::io;
use thiserror::Error;

/// Result type alias using CaptureError
pub type Result<T> = std::result::Result<T, CaptureError>;

/// Capture error types
///
/// All errors that can occur while running a capture session. The session
/// maps these onto the coarse [`ResultCode`](crate::session::ResultCode)
/// values delivered to the completion callback; the enum keeps the
/// underlying detail.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The host environment cannot provide a camera stream or a binary
    /// form payload
    #[error("Host environment is not supported")]
    UnsupportedHost,

    /// Invalid or missing session option
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Camera stream acquisition failed
    #[error("Cannot access webcam: {0}")]
    Acquisition(String),

    /// The media stream misbehaved after acquisition
    #[error("Stream error: {0}")]
    Stream(String),

    /// Presentation chrome could not be mounted or shown
    #[error("Presentation error: {0}")]
    Presentation(String),

    /// Frame encoding failed
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// The caller's pre-submit hook reported an error
    #[error("{0}")]
    Callback(String),

    /// Submitting the encoded image failed
    #[error("Save failed: {0}")]
    Transport(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl CaptureError {
    /// Create a Config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an Acquisition error
    pub fn acquisition(msg: impl Into<String>) -> Self {
        Self::Acquisition(msg.into())
    }

    /// Create a Stream error
    pub fn stream(msg: impl Into<String>) -> Self {
        Self::Stream(msg.into())
    }

    /// Create a Presentation error
    pub fn presentation(msg: impl Into<String>) -> Self {
        Self::Presentation(msg.into())
    }

    /// Create an Encoding error
    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::Encoding(msg.into())
    }

    /// Create a Transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create an Other error
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}

impl From<reqwest::Error> for CaptureError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

impl From<url::ParseError> for CaptureError {
    fn from(err: url::ParseError) -> Self {
        Self::Config(err.to_string())
    }
}
