//! Credential seam.
//!
//! Token issuance, caching and renewal belong to a session manager outside
//! this crate. The transport only asks for the current token per request.

use async_trait::async_trait;

use crate::error::TransportError;
use crate::secret::SecretString;

/// Header carrying the Keystone admin token.
pub const AUTH_TOKEN_HEADER: &str = "x-auth-token";

/// Source of the token attached to every request.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Current token, or `None` to send the request unauthenticated.
    ///
    /// # Errors
    ///
    /// `TransportError::Token` when no credential can be obtained.
    async fn token(&self) -> Result<Option<SecretString>, TransportError>;
}

/// A fixed, preconfigured token.
#[derive(Debug, Clone)]
pub struct StaticToken(SecretString);

impl StaticToken {
    #[must_use]
    pub fn new(token: SecretString) -> Self {
        Self(token)
    }
}

#[async_trait]
impl TokenProvider for StaticToken {
    async fn token(&self) -> Result<Option<SecretString>, TransportError> {
        Ok(Some(self.0.clone()))
    }
}

/// Sends requests without an auth header.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoToken;

#[async_trait]
impl TokenProvider for NoToken {
    async fn token(&self) -> Result<Option<SecretString>, TransportError> {
        Ok(None)
    }
}
