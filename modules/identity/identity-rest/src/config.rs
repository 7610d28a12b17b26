//! Configuration for the identity client.
//!
//! Values are layered with figment: built-in defaults, then an optional YAML
//! file, then `KSC_`-prefixed environment variables (`__` separates nested
//! keys, e.g. `KSC_TRANSPORT__ENDPOINT`). Only variables naming a known key
//! are read, so unrelated `KSC_*` variables in the process are ignored.

use figment::Figment;
use figment::providers::{Env, Format, Yaml};
use ksc_http::{TransportConfig, TransportError};
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Prefix of environment overrides.
pub const ENV_PREFIX: &str = "KSC_";

/// Keys that may be overridden from the environment, after `__` splitting.
const ENV_KEYS: &[&str] = &[
    "page_size",
    "grant_scan_concurrency",
    "transport.endpoint",
    "transport.auth_token",
    "transport.request_timeout",
    "transport.user_agent",
    "transport.max_body_size",
    "transport.allow_insecure_http",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[source] Box<figment::Error>),

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("failed to build transport: {0}")]
    Transport(#[from] TransportError),
}

/// Client configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IdentityClientConfig {
    /// Endpoint, credentials and limits of the HTTP transport.
    pub transport: TransportConfig,

    /// `limit` sent with list requests. `None` leaves page sizing to the
    /// server.
    pub page_size: Option<u32>,

    /// Maximum concurrent per-pair lookups during a grant scan.
    pub grant_scan_concurrency: usize,
}

impl Default for IdentityClientConfig {
    fn default() -> Self {
        Self {
            transport: TransportConfig::default(),
            page_size: None,
            grant_scan_concurrency: 4,
        }
    }
}

impl IdentityClientConfig {
    /// Defaults, then `path` (if any), then the environment.
    ///
    /// # Errors
    ///
    /// `ConfigError::Load` when a source cannot be read or parsed,
    /// `ConfigError::Invalid` when values are out of range.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::new();
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }
        let env = Env::prefixed(ENV_PREFIX).split("__").filter(|key| {
            ENV_KEYS
                .iter()
                .any(|known| key.as_str().eq_ignore_ascii_case(known))
        });
        figment = figment.merge(env);
        Self::from_figment(&figment)
    }

    /// Extract from an already assembled figment.
    ///
    /// # Errors
    ///
    /// Same as [`load`](Self::load).
    pub fn from_figment(figment: &Figment) -> Result<Self, ConfigError> {
        let config: Self = figment
            .extract()
            .map_err(|e| ConfigError::Load(Box::new(e)))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == Some(0) {
            return Err(ConfigError::Invalid("page_size must be positive".to_owned()));
        }
        if self.grant_scan_concurrency == 0 {
            return Err(ConfigError::Invalid(
                "grant_scan_concurrency must be positive".to_owned(),
            ));
        }
        if self.transport.endpoint.trim().is_empty() {
            return Err(ConfigError::Invalid("transport.endpoint is empty".to_owned()));
        }
        Ok(())
    }
}
