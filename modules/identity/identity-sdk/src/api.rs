//! Facade traits.
//!
//! Each remote collection implements [`ResourceFacade`] on its own; there is
//! no shared base type. Role grants are not a collection of their own and
//! are reached through [`RoleLookup`].

use async_trait::async_trait;
use futures::Stream;
use ksc_pager::{Page, PageRequest};
use std::pin::Pin;

use crate::error::{IdentityError, ResourceKind};
use crate::models::{NewTenant, NewUser, Role, Tenant, User, UserUpdate};

/// Boxed lazy stream returned by `list()` and the role lookups.
///
/// Nothing is fetched until the stream is first polled. A stream is a single
/// traversal; call `list()` again for a fresh view of the collection.
pub type IdentityStream<T> = Pin<Box<dyn Stream<Item = Result<T, IdentityError>> + Send + 'static>>;

/// How a delete reached the "absent" state.
///
/// Both variants are success. Failures travel as `Err(IdentityError)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The resource existed and was removed by this call.
    Removed,
    /// The resource did not exist (never created, or already deleted).
    AlreadyAbsent,
}

/// Capability set for one remote collection of `T`.
///
/// Implementations hold only immutable configuration, so one instance can
/// serve any number of concurrent traversals.
#[async_trait]
pub trait ResourceFacade<T>: Send + Sync
where
    T: Send + 'static,
{
    /// Attributes accepted by [`create`](Self::create).
    type NewResource: Send + 'static;

    fn kind(&self) -> ResourceKind;

    /// The whole collection as a lazy stream. Performs no I/O by itself.
    fn list(&self) -> IdentityStream<T>;

    /// Fetch exactly one page.
    ///
    /// # Errors
    ///
    /// `IdentityError::Fetch` on transport or response failures.
    async fn list_page(&self, request: PageRequest) -> Result<Page<T>, IdentityError>;

    /// Point lookup by identifier.
    ///
    /// # Errors
    ///
    /// `IdentityError::NotFound` when no resource has this id,
    /// `IdentityError::Fetch` on transport or response failures.
    async fn get(&self, id: &str) -> Result<T, IdentityError>;

    /// Point lookup by the unique name.
    ///
    /// Name uniqueness is guaranteed by the service and not checked here.
    ///
    /// # Errors
    ///
    /// Same as [`get`](Self::get).
    async fn get_by_name(&self, name: &str) -> Result<T, IdentityError>;

    /// Create a resource and return it with its server-assigned id.
    ///
    /// # Errors
    ///
    /// `IdentityError::Fetch` on failures, `IdentityError::Validation` when
    /// the returned entity has no id.
    async fn create(&self, new: Self::NewResource) -> Result<T, IdentityError>;

    /// Ensure the resource is absent, reporting which way that happened.
    ///
    /// # Errors
    ///
    /// `IdentityError::Fetch` when the service could not be asked or refused.
    async fn remove(&self, id: &str) -> Result<DeleteOutcome, IdentityError>;

    /// Ensure the resource is absent.
    ///
    /// Returns `true` both when it was removed and when it did not exist, so
    /// repeated or racing deletes are safe without an existence check.
    ///
    /// # Errors
    ///
    /// Same as [`remove`](Self::remove).
    async fn delete(&self, id: &str) -> Result<bool, IdentityError> {
        let outcome = self.remove(id).await?;
        tracing::debug!(kind = %self.kind(), id, ?outcome, "delete completed");
        Ok(matches!(
            outcome,
            DeleteOutcome::Removed | DeleteOutcome::AlreadyAbsent
        ))
    }
}

/// Users facade.
#[async_trait]
pub trait UserFacade: ResourceFacade<User, NewResource = NewUser> {
    /// Change name, email or enabled flag; unset fields are untouched.
    ///
    /// # Errors
    ///
    /// `IdentityError::NotFound` for an unknown id, `IdentityError::Fetch` on
    /// failures.
    async fn update(&self, id: &str, update: UserUpdate) -> Result<User, IdentityError>;
}

/// Tenants facade.
pub trait TenantFacade: ResourceFacade<Tenant, NewResource = NewTenant> {}

impl<F> TenantFacade for F where F: ResourceFacade<Tenant, NewResource = NewTenant> + ?Sized {}

/// Remote role-grant lookups used by [`RoleQuery`](crate::RoleQuery).
///
/// Responses may be paginated; implementations return the same lazy stream
/// shape as `list()`.
pub trait RoleLookup: Send + Sync {
    /// All grants held by a user, across tenants.
    fn roles_of_user(&self, user_id: &str) -> IdentityStream<Role>;

    /// Grants held by a user on one tenant.
    fn roles_of_user_on_tenant(&self, user_id: &str, tenant_id: &str) -> IdentityStream<Role>;
}
