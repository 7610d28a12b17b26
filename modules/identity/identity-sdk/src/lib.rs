//! Identity SDK
//!
//! This crate provides the public contract of the identity client:
//!
//! - [`ResourceFacade`] - capability trait for one remote collection
//!   (list / get / get-by-name / create / delete)
//! - [`UserFacade`], [`TenantFacade`] - the concrete facade contracts
//! - [`RoleLookup`] and [`RoleQuery`] - role grants by user or user+tenant
//! - [`scan_grants`] - the users × tenants role scan
//! - [`User`], [`Tenant`], [`Role`], [`Grant`] - domain models
//! - [`IdentityError`] - error types
//!
//! ## Usage
//!
//! ```ignore
//! use identity_sdk::{PagedStreamExt, ResourceFacade, RoleQuery};
//!
//! // Lazy listing; nothing is fetched until the stream is polled
//! let users = client.users().list().concat_to_set().await?;
//!
//! for user in &users {
//!     assert_eq!(&client.users().get(&user.id).await?, user);
//! }
//!
//! // Delete is "ensure absent": true for existing and missing ids alike
//! assert!(client.users().delete("no-such-user").await?);
//!
//! let roles = RoleQuery::new(client.role_lookup())
//!     .list_roles_of_user(&user.id)
//!     .await?;
//! ```

pub mod api;
pub mod error;
pub mod models;
pub mod roles;

// Re-export main types at crate root
pub use api::{
    DeleteOutcome, IdentityStream, ResourceFacade, RoleLookup, TenantFacade, UserFacade,
};
pub use error::{FetchError, IdentityError, ResourceKind};
pub use models::{Grant, Identifier, NewTenant, NewUser, Role, Tenant, User, UserUpdate};
pub use roles::{RoleQuery, scan_grants, validate_role};

pub use ksc_pager::{Marker, Page, PageRequest, PagedStreamExt};
