use futures::stream;
use identity_sdk::{IdentityError, IdentityStream, ResourceKind, Role, RoleLookup};
use ksc_http::Transport;
use std::sync::Arc;

use crate::keystone::{Collection, KeystoneApi, is_blank};

/// Role-grant listings of the Keystone v2 admin API.
///
/// A 404 on either path means the user (or tenant) does not exist and is
/// reported as `NotFound` of kind `Role`, keyed by the request path. Blank
/// ids get the same answer without a request.
#[derive(Clone)]
pub struct RestRoleLookup {
    api: KeystoneApi,
}

impl RestRoleLookup {
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, page_size: Option<u32>) -> Self {
        Self {
            api: KeystoneApi::new(transport, page_size),
        }
    }

    fn roles_at<const N: usize>(&self, ids: &[&str], path: [&str; N]) -> IdentityStream<Role> {
        let collection = Collection::new(ResourceKind::Role, path, "roles").owned_by_entity();
        if ids.iter().any(|id| is_blank(id)) {
            let err = IdentityError::not_found(ResourceKind::Role, collection.path.join("/"));
            return Box::pin(stream::once(async move { Err::<Role, _>(err) }));
        }
        self.api.paged(collection)
    }
}

impl RoleLookup for RestRoleLookup {
    fn roles_of_user(&self, user_id: &str) -> IdentityStream<Role> {
        self.roles_at(&[user_id], ["users", user_id, "roles"])
    }

    fn roles_of_user_on_tenant(&self, user_id: &str, tenant_id: &str) -> IdentityStream<Role> {
        self.roles_at(
            &[user_id, tenant_id],
            ["tenants", tenant_id, "users", user_id, "roles"],
        )
    }
}
