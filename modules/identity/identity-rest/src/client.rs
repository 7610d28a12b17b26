use identity_sdk::{Grant, IdentityError, RoleLookup, RoleQuery, scan_grants};
use ksc_http::{HttpTransport, Transport};
use std::collections::HashSet;
use std::sync::Arc;

use crate::config::{ConfigError, IdentityClientConfig};
use crate::roles::RestRoleLookup;
use crate::tenants::RestTenantFacade;
use crate::users::RestUserFacade;

/// Entry point: the user, tenant and role facades over one transport.
///
/// Cloning is cheap and clones share the transport.
#[derive(Clone)]
pub struct IdentityClient {
    users: RestUserFacade,
    tenants: RestTenantFacade,
    role_lookup: Arc<RestRoleLookup>,
    grant_scan_concurrency: usize,
}

impl IdentityClient {
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, config: &IdentityClientConfig) -> Self {
        let page_size = config.page_size;
        Self {
            users: RestUserFacade::new(Arc::clone(&transport), page_size),
            tenants: RestTenantFacade::new(Arc::clone(&transport), page_size),
            role_lookup: Arc::new(RestRoleLookup::new(transport, page_size)),
            grant_scan_concurrency: config.grant_scan_concurrency,
        }
    }

    /// Build the HTTP transport described by `config.transport`.
    ///
    /// # Errors
    ///
    /// `ConfigError::Transport` for an unusable endpoint or TLS setup.
    pub fn from_config(config: &IdentityClientConfig) -> Result<Self, ConfigError> {
        let transport = HttpTransport::from_config(&config.transport)?;
        tracing::info!(
            endpoint = %transport.endpoint(),
            page_size = config.page_size,
            "identity client ready"
        );
        Ok(Self::new(Arc::new(transport), config))
    }

    #[must_use]
    pub fn users(&self) -> &RestUserFacade {
        &self.users
    }

    #[must_use]
    pub fn tenants(&self) -> &RestTenantFacade {
        &self.tenants
    }

    #[must_use]
    pub fn role_lookup(&self) -> Arc<dyn RoleLookup> {
        self.role_lookup.clone()
    }

    #[must_use]
    pub fn roles(&self) -> RoleQuery {
        RoleQuery::new(self.role_lookup())
    }

    /// Every (user, tenant, role) grant on the service.
    ///
    /// # Errors
    ///
    /// The first failure of any listing or lookup.
    pub async fn scan_grants(&self) -> Result<HashSet<Grant>, IdentityError> {
        scan_grants(
            &self.users,
            &self.tenants,
            &self.roles(),
            self.grant_scan_concurrency,
        )
        .await
    }
}
