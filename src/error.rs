//! Error types for tonearm.

use thiserror::Error;

use crate::auth::AuthError;

/// Primary error type for proxy operations.
#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Non-success response from the playback API, passed through with
    /// the original status and body.
    #[error("Upstream error (status {status}): {body}")]
    Upstream { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, PlayerError>;
