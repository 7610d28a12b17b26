//! Keystone v2 JSON envelopes.
//!
//! Collections arrive as `{"users": [...], "users_links": [...]}`, single
//! entities as `{"user": {...}}`. The continuation marker is the `marker`
//! query parameter of the `rel = "next"` link.

use identity_sdk::FetchError;
use ksc_http::ApiResponse;
use ksc_pager::{Marker, Page};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

#[derive(Debug, Deserialize)]
struct Link {
    href: String,
    #[serde(default)]
    rel: String,
}

fn decode_error(what: &str, err: &serde_json::Error) -> FetchError {
    FetchError::Decode(format!("{what}: {err}"))
}

fn body_json(response: &ApiResponse) -> Result<Value, FetchError> {
    response
        .json::<Value>()
        .map_err(|e| decode_error("response body is not JSON", &e))
}

/// Decode one page of the collection stored under `key`.
pub fn decode_page<T: DeserializeOwned>(
    response: &ApiResponse,
    key: &str,
) -> Result<Page<T>, FetchError> {
    let mut body = body_json(response)?;

    let items = body
        .get_mut(key)
        .map(Value::take)
        .ok_or_else(|| FetchError::Decode(format!("missing '{key}' collection")))?;
    let items: Vec<T> = serde_json::from_value(items)
        .map_err(|e| decode_error(&format!("invalid '{key}' item"), &e))?;

    let links_key = format!("{key}_links");
    let links: Vec<Link> = match body.get_mut(&links_key).map(Value::take) {
        None | Some(Value::Null) => Vec::new(),
        Some(raw) => serde_json::from_value(raw)
            .map_err(|e| decode_error(&format!("invalid '{links_key}'"), &e))?,
    };

    let next_marker = links
        .iter()
        .find(|link| link.rel == "next")
        .map(|link| marker_from_href(&link.href))
        .transpose()?;

    Ok(Page::new(items, next_marker))
}

/// Decode a single entity wrapped under `key`.
pub fn decode_entity<T: DeserializeOwned>(
    response: &ApiResponse,
    key: &str,
) -> Result<T, FetchError> {
    let mut body = body_json(response)?;
    let entity = body
        .get_mut(key)
        .map(Value::take)
        .ok_or_else(|| FetchError::Decode(format!("missing '{key}' object")))?;
    serde_json::from_value(entity).map_err(|e| decode_error(&format!("invalid '{key}'"), &e))
}

/// Pull the `marker` parameter out of a next link.
///
/// Relative links are resolved against a placeholder base; only the query
/// string matters.
fn marker_from_href(href: &str) -> Result<Marker, FetchError> {
    let url = Url::parse(href)
        .or_else(|_| Url::parse("http://placeholder.invalid/").and_then(|base| base.join(href)))
        .map_err(|e| FetchError::Decode(format!("invalid next link '{href}': {e}")))?;

    url.query_pairs()
        .find(|(name, _)| name == "marker")
        .map(|(_, value)| Marker::new(value.into_owned()))
        .filter(|marker| !marker.as_str().is_empty())
        .ok_or_else(|| FetchError::Decode(format!("next link '{href}' carries no marker")))
}
