use crate::secret::SecretString;
use serde::Deserialize;
use std::time::Duration;

/// Default User-Agent string for identity requests
pub const DEFAULT_USER_AGENT: &str = concat!("ksc-http/", env!("CARGO_PKG_VERSION"));

/// Transport configuration.
///
/// Durations use humantime notation (`"30s"`, `"1m 30s"`).
///
/// ```yaml
/// transport:
///   endpoint: "https://keystone.example.com:35357/v2.0/"
///   auth_token: "..."
///   request_timeout: 30s
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TransportConfig {
    /// Base URL of the identity admin API; resource paths are appended to it.
    pub endpoint: String,

    /// Static admin token sent as `X-Auth-Token`. Leave unset when a
    /// [`TokenProvider`](crate::TokenProvider) is supplied separately.
    pub auth_token: Option<SecretString>,

    /// Deadline for one request including the body download (default: 30s)
    #[serde(with = "humantime_duration")]
    pub request_timeout: Duration,

    /// User-Agent header value
    pub user_agent: String,

    /// Maximum response body size in bytes (default: 10 MiB)
    pub max_body_size: usize,

    /// Accept `http://` endpoints. Only for tests against mock servers.
    pub allow_insecure_http: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://localhost:35357/v2.0/".to_owned(),
            auth_token: None,
            request_timeout: Duration::from_secs(30),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            max_body_size: 10 * 1024 * 1024,
            allow_insecure_http: false,
        }
    }
}

mod humantime_duration {
    use serde::{Deserialize, Deserializer};
    use std::time::Duration;

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(deserializer)?;
        humantime::parse_duration(&raw).map_err(serde::de::Error::custom)
    }
}
