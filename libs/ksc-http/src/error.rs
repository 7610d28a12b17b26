use std::time::Duration;
use thiserror::Error;

/// Transport error types
///
/// Everything here means "no usable response arrived". HTTP error statuses
/// are not transport errors; they come back inside [`crate::ApiResponse`].
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum TransportError {
    /// Invalid URL (failed to parse or cannot carry a path)
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUri { url: String, reason: String },

    /// URL scheme rejected by the transport security settings
    #[error("URL scheme '{scheme}' not allowed: {reason}")]
    InvalidScheme { scheme: String, reason: String },

    /// Request building failed
    #[error("Failed to build request: {0}")]
    RequestBuild(#[from] http::Error),

    /// Invalid header value
    #[error("Invalid header value: {0}")]
    InvalidHeaderValue(#[from] http::header::InvalidHeaderValue),

    /// Request (including body download) timed out
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Transport error (network, connection, etc)
    #[error("Transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// TLS setup error
    #[error("TLS error: {0}")]
    Tls(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Response body exceeded size limit
    #[error("Response body too large: limit {limit} bytes")]
    BodyTooLarge { limit: usize },

    /// The token provider could not supply a credential
    #[error("Auth token unavailable: {0}")]
    Token(String),

    /// Request body serialization failed
    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<hyper_util::client::legacy::Error> for TransportError {
    fn from(err: hyper_util::client::legacy::Error) -> Self {
        TransportError::Transport(Box::new(err))
    }
}
