use async_trait::async_trait;
use identity_sdk::{
    DeleteOutcome, IdentityError, IdentityStream, NewUser, ResourceFacade, ResourceKind, User,
    UserFacade, UserUpdate,
};
use ksc_http::{ApiRequest, Transport};
use ksc_pager::{Page, PageRequest};
use serde_json::json;
use std::sync::Arc;

use crate::keystone::{Collection, KeystoneApi, require_id, require_key};

/// `/users` on a Keystone v2 admin endpoint.
#[derive(Clone)]
pub struct RestUserFacade {
    api: KeystoneApi,
}

impl RestUserFacade {
    /// `page_size` is sent as `limit` on every list request; `None` lets the
    /// server choose.
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, page_size: Option<u32>) -> Self {
        Self {
            api: KeystoneApi::new(transport, page_size),
        }
    }

    fn collection() -> Collection {
        Collection::new(ResourceKind::User, ["users"], "users")
    }
}

#[async_trait]
impl ResourceFacade<User> for RestUserFacade {
    type NewResource = NewUser;

    fn kind(&self) -> ResourceKind {
        ResourceKind::User
    }

    fn list(&self) -> IdentityStream<User> {
        self.api.paged(Self::collection())
    }

    async fn list_page(&self, request: PageRequest) -> Result<Page<User>, IdentityError> {
        self.api.fetch_page(&Self::collection(), request).await
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn get(&self, id: &str) -> Result<User, IdentityError> {
        require_key(ResourceKind::User, id)?;
        self.api
            .entity(ApiRequest::get(["users", id]), "user", ResourceKind::User, id)
            .await
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn get_by_name(&self, name: &str) -> Result<User, IdentityError> {
        require_key(ResourceKind::User, name)?;
        let user: User = self
            .api
            .entity(
                ApiRequest::get(["users"]).query("name", name),
                "user",
                ResourceKind::User,
                name,
            )
            .await?;
        if user.name != name {
            return Err(IdentityError::Validation(format!(
                "lookup of user '{name}' answered with '{}'",
                user.name
            )));
        }
        Ok(user)
    }

    #[tracing::instrument(level = "debug", skip(self), fields(name = %new.name))]
    async fn create(&self, new: NewUser) -> Result<User, IdentityError> {
        let name = new.name.clone();
        let user: User = self
            .api
            .entity(
                ApiRequest::post(["users"], json!({ "user": new })),
                "user",
                ResourceKind::User,
                &name,
            )
            .await?;
        require_id(ResourceKind::User, &user.id)?;
        tracing::info!(id = %user.id, name = %user.name, "user created");
        Ok(user)
    }

    async fn remove(&self, id: &str) -> Result<DeleteOutcome, IdentityError> {
        self.api.remove(["users", id], ResourceKind::User).await
    }
}

#[async_trait]
impl UserFacade for RestUserFacade {
    #[tracing::instrument(level = "debug", skip(self))]
    async fn update(&self, id: &str, update: UserUpdate) -> Result<User, IdentityError> {
        require_key(ResourceKind::User, id)?;
        if update.is_empty() {
            return self.get(id).await;
        }
        let user: User = self
            .api
            .entity(
                ApiRequest::put(["users", id], json!({ "user": update })),
                "user",
                ResourceKind::User,
                id,
            )
            .await?;
        require_id(ResourceKind::User, &user.id)?;
        Ok(user)
    }
}
