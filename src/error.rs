//! # Error Types
//!
//! Custom error types for GroundLink using `thiserror`.

use thiserror::Error;

/// Main error type for GroundLink
#[derive(Debug, Error)]
pub enum GroundLinkError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON payload errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Stream transport errors (connect, read, write)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Malformed inbound event
    #[error("Event decode error: {0}")]
    Decode(String),

    /// Command uplink errors (request could not be completed)
    #[error("Command error: {0}")]
    Command(String),

    /// Telemetry recorder errors
    #[error("Recorder error: {0}")]
    Recorder(String),
}

/// Result type alias for GroundLink
pub type Result<T> = std::result::Result<T, GroundLinkError>;
