//! Error types for the mediq-link client library.

use thiserror::Error;

/// Errors produced by mediq-link operations.
///
/// REST operations return these directly. The realtime session never
/// returns errors from its public operations — session failures surface
/// through the `error` / `disconnect` listener channels instead.
#[derive(Debug, Error)]
pub enum MediqLinkError {
    /// Invalid client or session configuration (bad URL, missing base URL, ...)
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// HTTP transport failure (connect, timeout, body read)
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    /// WebSocket connect or frame-level failure
    #[error("WebSocket error: {0}")]
    WebSocketError(String),

    /// Credential problems (rejected token, malformed header value)
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// JSON encode/decode failure at the wire boundary
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// An operation exceeded its configured deadline
    #[error("Timeout: {0}")]
    TimeoutError(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, MediqLinkError>;
