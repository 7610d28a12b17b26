use async_trait::async_trait;
use identity_sdk::{
    DeleteOutcome, IdentityError, IdentityStream, NewTenant, ResourceFacade, ResourceKind, Tenant,
};
use ksc_http::{ApiRequest, Transport};
use ksc_pager::{Page, PageRequest};
use serde_json::json;
use std::sync::Arc;

use crate::keystone::{Collection, KeystoneApi, require_id, require_key};

/// `/tenants` on a Keystone v2 admin endpoint.
#[derive(Clone)]
pub struct RestTenantFacade {
    api: KeystoneApi,
}

impl RestTenantFacade {
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, page_size: Option<u32>) -> Self {
        Self {
            api: KeystoneApi::new(transport, page_size),
        }
    }

    fn collection() -> Collection {
        Collection::new(ResourceKind::Tenant, ["tenants"], "tenants")
    }
}

#[async_trait]
impl ResourceFacade<Tenant> for RestTenantFacade {
    type NewResource = NewTenant;

    fn kind(&self) -> ResourceKind {
        ResourceKind::Tenant
    }

    fn list(&self) -> IdentityStream<Tenant> {
        self.api.paged(Self::collection())
    }

    async fn list_page(&self, request: PageRequest) -> Result<Page<Tenant>, IdentityError> {
        self.api.fetch_page(&Self::collection(), request).await
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn get(&self, id: &str) -> Result<Tenant, IdentityError> {
        require_key(ResourceKind::Tenant, id)?;
        self.api
            .entity(ApiRequest::get(["tenants", id]), "tenant", ResourceKind::Tenant, id)
            .await
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn get_by_name(&self, name: &str) -> Result<Tenant, IdentityError> {
        require_key(ResourceKind::Tenant, name)?;
        let tenant: Tenant = self
            .api
            .entity(
                ApiRequest::get(["tenants"]).query("name", name),
                "tenant",
                ResourceKind::Tenant,
                name,
            )
            .await?;
        if tenant.name != name {
            return Err(IdentityError::Validation(format!(
                "lookup of tenant '{name}' answered with '{}'",
                tenant.name
            )));
        }
        Ok(tenant)
    }

    #[tracing::instrument(level = "debug", skip(self), fields(name = %new.name))]
    async fn create(&self, new: NewTenant) -> Result<Tenant, IdentityError> {
        let name = new.name.clone();
        let tenant: Tenant = self
            .api
            .entity(
                ApiRequest::post(["tenants"], json!({ "tenant": new })),
                "tenant",
                ResourceKind::Tenant,
                &name,
            )
            .await?;
        require_id(ResourceKind::Tenant, &tenant.id)?;
        tracing::info!(id = %tenant.id, name = %tenant.name, "tenant created");
        Ok(tenant)
    }

    async fn remove(&self, id: &str) -> Result<DeleteOutcome, IdentityError> {
        self.api.remove(["tenants", id], ResourceKind::Tenant).await
    }
}
