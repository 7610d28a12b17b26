//! Error types for the identity client.

use ksc_pager::PagerError;
use std::fmt;
use thiserror::Error;

/// Remote collection an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    User,
    Tenant,
    Role,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::User => "user",
            Self::Tenant => "tenant",
            Self::Role => "role",
        })
    }
}

/// Why a remote call produced no usable answer.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request never got a response (connect, TLS, timeout, ...).
    #[error("transport failure: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The service rejected the credentials or the caller's rights.
    #[error("not authorized (HTTP {status}): {message}")]
    Unauthorized { status: u16, message: String },

    /// Any other non-success status.
    #[error("unexpected HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The body did not have the expected shape.
    #[error("malformed response: {0}")]
    Decode(String),

    /// The server broke the continuation-marker protocol.
    #[error("pagination protocol violated: {0}")]
    Pagination(String),
}

/// Errors that can occur when using the identity facades.
///
/// Every variant is recoverable; nothing here is retried by the client.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// A point lookup matched nothing. Never produced by `delete`.
    #[error("{kind} not found: {key}")]
    NotFound { kind: ResourceKind, key: String },

    /// A remote call failed; ends any iteration in progress.
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// The service returned data that breaks a required invariant.
    #[error("validation failed: {0}")]
    Validation(String),
}

impl IdentityError {
    #[must_use]
    pub fn not_found(kind: ResourceKind, key: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            key: key.into(),
        }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<PagerError<IdentityError>> for IdentityError {
    fn from(err: PagerError<IdentityError>) -> Self {
        match err {
            PagerError::Fetch(e) => e,
            PagerError::RepeatedMarker(marker) => Self::Fetch(FetchError::Pagination(format!(
                "server handed out marker '{marker}' twice in one listing"
            ))),
        }
    }
}
