//! Client error types

use scribe_core::{CoreError, ValidationError};
use thiserror::Error;

/// Client error types
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network or request error
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service answered with an error status
    #[error("Server error {status}: {message}")]
    Api { status: u16, message: String },

    /// Refresh failed after an expired access token; the session is gone
    #[error("Session expired. Please log in again.")]
    SessionExpired,

    /// Input rejected before any request was made
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Response body did not match the envelope contract
    #[error("Malformed response body: {0}")]
    Body(#[from] serde_json::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Durable session storage failed
    #[error("Session store error: {0}")]
    Store(#[from] CoreError),
}

impl ClientError {
    /// True when the session was invalidated and the user must sign in again
    pub fn is_session_expired(&self) -> bool {
        matches!(self, Self::SessionExpired)
    }
}
