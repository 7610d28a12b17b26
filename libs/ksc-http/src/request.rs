use bytes::Bytes;
use http::{Method, StatusCode};
use serde::de::DeserializeOwned;

/// One identity API call, relative to the configured endpoint.
///
/// Path segments are kept separate so identifiers are percent-encoded by the
/// transport instead of being spliced into a string.
///
/// ```ignore
/// let request = ApiRequest::get(["tenants", tenant_id, "users", user_id, "roles"]);
/// let request = ApiRequest::get(["users"]).query("marker", marker).query("limit", "50");
/// ```
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct ApiRequest {
    pub method: Method,
    pub path: Vec<String>,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    #[must_use]
    pub fn new<I, S>(method: Method, path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            method,
            path: path.into_iter().map(Into::into).collect(),
            query: Vec::new(),
            body: None,
        }
    }

    #[must_use]
    pub fn get<I, S>(path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Method::GET, path)
    }

    #[must_use]
    pub fn post<I, S>(path: I, body: serde_json::Value) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Method::POST, path).json(body)
    }

    #[must_use]
    pub fn put<I, S>(path: I, body: serde_json::Value) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Method::PUT, path).json(body)
    }

    #[must_use]
    pub fn delete<I, S>(path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Method::DELETE, path)
    }

    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    #[must_use]
    pub fn json(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    /// First value of a query parameter, if present.
    #[must_use]
    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Raw response: status plus the fully read body.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

impl ApiResponse {
    #[must_use]
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Convenience for canned JSON responses.
    #[must_use]
    pub fn json_value(status: StatusCode, value: &serde_json::Value) -> Self {
        Self::new(status, value.to_string())
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Decode the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns the decoder error if the body is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    /// Body as lossy UTF-8, truncated for log and error messages.
    #[must_use]
    pub fn body_preview(&self) -> String {
        const MAX_PREVIEW: usize = 256;
        let text = String::from_utf8_lossy(&self.body);
        if text.chars().count() > MAX_PREVIEW {
            let truncated: String = text.chars().take(MAX_PREVIEW).collect();
            format!("{truncated}...")
        } else {
            text.into_owned()
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builds_path_and_query() {
        let request = ApiRequest::get(["tenants", "t 1", "users", "u1", "roles"])
            .query("limit", "10")
            .query("marker", "abc");

        assert_eq!(request.method, Method::GET);
        assert_eq!(request.path, vec!["tenants", "t 1", "users", "u1", "roles"]);
        assert_eq!(request.query_param("marker"), Some("abc"));
        assert_eq!(request.query_param("name"), None);
        assert!(request.body.is_none());
    }

    #[test]
    fn post_carries_body() {
        let request = ApiRequest::post(["users"], json!({"user": {"name": "alice"}}));
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.body, Some(json!({"user": {"name": "alice"}})));
    }

    #[test]
    fn response_json_and_preview() {
        let response = ApiResponse::json_value(StatusCode::OK, &json!({"ok": true}));
        assert!(response.is_success());
        let value: serde_json::Value = response.json().unwrap();
        assert_eq!(value, json!({"ok": true}));

        let long = ApiResponse::new(StatusCode::BAD_GATEWAY, "x".repeat(1000));
        assert!(!long.is_success());
        assert_eq!(long.body_preview().len(), 259);
    }
}
