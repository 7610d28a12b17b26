//! Role queries.
//!
//! Role grants are looked up per user or per (user, tenant) pair. The
//! results are small snapshots returned as sets, but the lookups still go
//! through the paged stream so paginated responses are handled.

use futures::{StreamExt, TryStreamExt, future, stream};
use ksc_pager::PagedStreamExt;
use std::collections::HashSet;
use std::sync::Arc;

use crate::api::{IdentityStream, RoleLookup, TenantFacade, UserFacade};
use crate::error::IdentityError;
use crate::models::{Grant, Role};

/// Reject roles without an identifier.
///
/// # Errors
///
/// `IdentityError::Validation` when the id is empty or blank.
pub fn validate_role(role: Role) -> Result<Role, IdentityError> {
    if role.id.trim().is_empty() {
        return Err(IdentityError::Validation(format!(
            "role '{}' returned without an identifier",
            role.name
        )));
    }
    Ok(role)
}

/// Role-grant queries layered over a [`RoleLookup`].
#[derive(Clone)]
pub struct RoleQuery {
    lookup: Arc<dyn RoleLookup>,
}

impl RoleQuery {
    #[must_use]
    pub fn new(lookup: Arc<dyn RoleLookup>) -> Self {
        Self { lookup }
    }

    /// All roles granted to the user, collection-wide.
    ///
    /// # Errors
    ///
    /// `IdentityError::Fetch` on lookup failures, `IdentityError::Validation`
    /// if any role lacks an id.
    pub async fn list_roles_of_user(&self, user_id: &str) -> Result<HashSet<Role>, IdentityError> {
        collect_roles(self.lookup.roles_of_user(user_id)).await
    }

    /// Roles granted to the user on one tenant.
    ///
    /// # Errors
    ///
    /// Same as [`list_roles_of_user`](Self::list_roles_of_user).
    pub async fn list_roles_of_user_on_tenant(
        &self,
        user_id: &str,
        tenant_id: &str,
    ) -> Result<HashSet<Role>, IdentityError> {
        collect_roles(self.lookup.roles_of_user_on_tenant(user_id, tenant_id)).await
    }
}

async fn collect_roles(roles: IdentityStream<Role>) -> Result<HashSet<Role>, IdentityError> {
    roles
        .and_then(|role| future::ready(validate_role(role)))
        .concat_to_set()
        .await
}

/// Every (user, tenant, role) grant visible through the facades.
///
/// Users and tenants are materialized concurrently since neither listing
/// depends on the other. Per-pair lookups then run with at most
/// `concurrency` in flight. The first failure aborts the scan.
///
/// # Errors
///
/// Any listing or lookup error, including role validation failures.
pub async fn scan_grants<U, Tn>(
    users: &U,
    tenants: &Tn,
    roles: &RoleQuery,
    concurrency: usize,
) -> Result<HashSet<Grant>, IdentityError>
where
    U: UserFacade + ?Sized,
    Tn: TenantFacade + ?Sized,
{
    let (users, tenants) = futures::try_join!(
        users.list().concat_to_set(),
        tenants.list().concat_to_set()
    )?;

    tracing::debug!(
        users = users.len(),
        tenants = tenants.len(),
        "scanning role grants"
    );

    let pairs = users
        .iter()
        .flat_map(|user| tenants.iter().map(move |tenant| (user, tenant)));

    stream::iter(pairs)
        .map(|(user, tenant)| async move {
            let granted = roles
                .list_roles_of_user_on_tenant(&user.id, &tenant.id)
                .await?;
            Ok::<_, IdentityError>(
                granted
                    .into_iter()
                    .map(|role| Grant {
                        user_id: user.id.clone(),
                        tenant_id: tenant.id.clone(),
                        role,
                    })
                    .collect::<Vec<_>>(),
            )
        })
        .buffer_unordered(concurrency.max(1))
        .try_fold(HashSet::new(), |mut acc, grants| {
            acc.extend(grants);
            future::ready(Ok(acc))
        })
        .await
}
