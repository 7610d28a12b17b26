//! Shared request plumbing for the REST facades.
//!
//! Every facade holds a [`KeystoneApi`] and describes what it wants in terms
//! of a [`Collection`]; status mapping and envelope decoding happen here.

use futures::TryStreamExt;
use identity_sdk::{DeleteOutcome, FetchError, IdentityError, IdentityStream, ResourceKind};
use ksc_http::{ApiRequest, ApiResponse, StatusCode, Transport, TransportError};
use ksc_pager::{Marker, Page, PageRequest, PagedSequence};
use serde::de::DeserializeOwned;
use std::sync::Arc;

use crate::wire;

/// A listable server collection, e.g. `users` or `tenants/{id}/users/{id}/roles`.
#[derive(Debug, Clone)]
pub struct Collection {
    pub kind: ResourceKind,
    pub path: Vec<String>,
    /// Envelope key holding the items (`users`, `tenants`, `roles`).
    pub key: &'static str,
    /// A 404 means the owning user or tenant is unknown, not a broken page.
    pub owned: bool,
}

impl Collection {
    #[must_use]
    pub fn new<I, S>(kind: ResourceKind, path: I, key: &'static str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind,
            path: path.into_iter().map(Into::into).collect(),
            key,
            owned: false,
        }
    }

    /// Sub-collection of one entity, e.g. the roles of a user.
    #[must_use]
    pub fn owned_by_entity(mut self) -> Self {
        self.owned = true;
        self
    }

    fn display_path(&self) -> String {
        self.path.join("/")
    }
}

#[must_use]
pub fn transport_error(err: TransportError) -> IdentityError {
    IdentityError::Fetch(FetchError::Transport(Box::new(err)))
}

/// Error for a non-success status that has no resource-specific meaning.
#[must_use]
pub fn status_error(response: &ApiResponse) -> IdentityError {
    let status = response.status.as_u16();
    let message = response.body_preview();
    let err = match response.status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            FetchError::Unauthorized { status, message }
        }
        _ => FetchError::Status { status, message },
    };
    IdentityError::Fetch(err)
}

#[derive(Clone)]
pub struct KeystoneApi {
    transport: Arc<dyn Transport>,
    page_size: Option<u32>,
}

impl KeystoneApi {
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, page_size: Option<u32>) -> Self {
        Self {
            transport,
            page_size,
        }
    }

    async fn call(&self, request: ApiRequest) -> Result<ApiResponse, IdentityError> {
        self.transport.execute(request).await.map_err(transport_error)
    }

    /// Fetch one page of `collection`.
    pub async fn fetch_page<T: DeserializeOwned>(
        &self,
        collection: &Collection,
        request: PageRequest,
    ) -> Result<Page<T>, IdentityError> {
        let mut api_request = ApiRequest::get(collection.path.iter().cloned());
        if let Some(limit) = request.limit {
            api_request = api_request.query("limit", limit.to_string());
        }
        if let Some(marker) = &request.marker {
            api_request = api_request.query("marker", marker.as_str());
        }

        let response = self.call(api_request).await?;
        if response.status == StatusCode::NOT_FOUND && collection.owned {
            return Err(IdentityError::not_found(
                collection.kind,
                collection.display_path(),
            ));
        }
        if !response.is_success() {
            return Err(status_error(&response));
        }

        let page: Page<T> = wire::decode_page(&response, collection.key).inspect_err(|e| {
            tracing::warn!(collection = %collection.display_path(), error = %e, "malformed page");
        })?;
        tracing::debug!(
            collection = %collection.display_path(),
            marker = request.marker.as_ref().map(Marker::as_str),
            items = page.items.len(),
            has_next = page.next_marker.is_some(),
            "fetched page"
        );
        Ok(page)
    }

    /// Lazy stream over every item of `collection`.
    pub fn paged<T>(&self, collection: Collection) -> IdentityStream<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let api = self.clone();
        let sequence = PagedSequence::new(move |marker: Option<Marker>| {
            let api = api.clone();
            let collection = collection.clone();
            async move {
                let request = PageRequest {
                    marker,
                    limit: api.page_size,
                };
                api.fetch_page::<T>(&collection, request).await
            }
        });
        Box::pin(sequence.map_err(IdentityError::from))
    }

    /// Call that answers with one entity; 404 becomes `NotFound { kind, key }`.
    pub async fn entity<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
        envelope: &str,
        kind: ResourceKind,
        key: &str,
    ) -> Result<T, IdentityError> {
        let response = self.call(request).await?;
        if response.status == StatusCode::NOT_FOUND {
            return Err(IdentityError::not_found(kind, key));
        }
        if !response.is_success() {
            return Err(status_error(&response));
        }
        Ok(wire::decode_entity(&response, envelope)?)
    }

    /// DELETE; 404 is success.
    pub async fn remove(
        &self,
        path: [&str; 2],
        kind: ResourceKind,
    ) -> Result<DeleteOutcome, IdentityError> {
        if is_blank(path[1]) {
            // `users/` would address the collection itself
            tracing::debug!(%kind, "remove of blank id skipped");
            return Ok(DeleteOutcome::AlreadyAbsent);
        }
        let response = self.call(ApiRequest::delete(path)).await?;
        let outcome = match response.status {
            status if status.is_success() => DeleteOutcome::Removed,
            StatusCode::NOT_FOUND => DeleteOutcome::AlreadyAbsent,
            _ => return Err(status_error(&response)),
        };
        tracing::debug!(%kind, id = path[1], ?outcome, "remove answered");
        Ok(outcome)
    }
}

/// Ids and names that cannot address a single entity.
#[must_use]
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Point lookups of a blank id or name never reach the server.
pub fn require_key(kind: ResourceKind, key: &str) -> Result<(), IdentityError> {
    if is_blank(key) {
        return Err(IdentityError::not_found(kind, key));
    }
    Ok(())
}

/// Created or updated entities must carry an id.
pub fn require_id(kind: ResourceKind, id: &str) -> Result<(), IdentityError> {
    if is_blank(id) {
        return Err(IdentityError::Validation(format!(
            "{kind} returned by the service has no identifier"
        )));
    }
    Ok(())
}
