#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Authenticated JSON transport for the Keystone client
//!
//! This crate is the outbound edge of the identity facades:
//!
//! - [`Transport`] - the seam the facades call; one request in, one response out
//! - [`HttpTransport`] - hyper-based implementation (rustls, HTTPS only by default)
//! - [`TokenProvider`] - the seam to whatever manages credentials and sessions
//!
//! Non-2xx statuses are *returned*, not raised: whether a 404 means "not
//! found" or "already deleted" is decided by the caller. Transport failures
//! (connect, TLS, timeout, oversized body) are [`TransportError`]s.
//!
//! No retries happen at this layer.
//!
//! # Example
//!
//! ```ignore
//! use ksc_http::{ApiRequest, HttpTransport, Transport, TransportConfig};
//!
//! let transport = HttpTransport::from_config(&TransportConfig {
//!     endpoint: "https://keystone.example.com:35357/v2.0/".to_owned(),
//!     ..Default::default()
//! })?;
//!
//! let response = transport
//!     .execute(ApiRequest::get(["users"]).query("limit", "50"))
//!     .await?;
//! ```

mod config;
mod error;
mod request;
mod secret;
mod tls;
mod token;
mod transport;

pub use config::{DEFAULT_USER_AGENT, TransportConfig};
pub use error::TransportError;
pub use request::{ApiRequest, ApiResponse};
pub use secret::SecretString;
pub use token::{AUTH_TOKEN_HEADER, NoToken, StaticToken, TokenProvider};
pub use transport::{HttpTransport, Transport};

pub use http::{Method, StatusCode};
