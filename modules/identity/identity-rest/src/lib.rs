#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Keystone v2 REST implementation of the identity facades
//!
//! Binds the contracts of `identity_sdk` to the admin API:
//!
//! | Operation                         | Request                                     |
//! |-----------------------------------|---------------------------------------------|
//! | users `list`                      | `GET /users?limit=&marker=`                 |
//! | users `get` / `get_by_name`       | `GET /users/{id}`, `GET /users?name=`       |
//! | users `create` / `update`         | `POST /users`, `PUT /users/{id}`            |
//! | users `delete`                    | `DELETE /users/{id}` (404 = already absent) |
//! | tenants                           | same shapes under `/tenants`                |
//! | `roles_of_user`                   | `GET /users/{id}/roles`                     |
//! | `roles_of_user_on_tenant`         | `GET /tenants/{tid}/users/{uid}/roles`      |
//!
//! Paginated responses carry a `<key>_links` array; the `marker` parameter
//! of the `next` link continues the listing.
//!
//! ```ignore
//! use identity_rest::{IdentityClient, IdentityClientConfig};
//! use identity_sdk::{PagedStreamExt, ResourceFacade};
//!
//! let config = IdentityClientConfig::load(Some(Path::new("ksc.yaml")))?;
//! let client = IdentityClient::from_config(&config)?;
//! let tenants = client.tenants().list().concat_to_set().await?;
//! ```

mod client;
mod config;
mod keystone;
mod roles;
mod tenants;
mod users;
mod wire;

pub use client::IdentityClient;
pub use config::{ConfigError, ENV_PREFIX, IdentityClientConfig};
pub use roles::RestRoleLookup;
pub use tenants::RestTenantFacade;
pub use users::RestUserFacade;
