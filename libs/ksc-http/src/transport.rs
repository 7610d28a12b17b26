use crate::config::TransportConfig;
use crate::error::TransportError;
use crate::request::{ApiRequest, ApiResponse};
use crate::tls::build_https_connector;
use crate::token::{AUTH_TOKEN_HEADER, NoToken, StaticToken, TokenProvider};
use async_trait::async_trait;
use bytes::Bytes;
use http::header::{ACCEPT, CONTENT_TYPE, HeaderValue, USER_AGENT};
use http::{Request, Uri};
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

/// The outbound seam used by the identity facades.
///
/// Implementations perform one authenticated call and hand back the status
/// and body. They must not retry and must not turn HTTP error statuses into
/// errors.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Execute one request.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when no response could be obtained.
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, TransportError>;
}

/// Hyper-based [`Transport`].
///
/// `HttpTransport` is `Clone + Send + Sync`; clones share the connection pool.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client<HttpsConnector<HttpConnector>, Full<Bytes>>,
    endpoint: Url,
    token: Arc<dyn TokenProvider>,
    user_agent: HeaderValue,
    request_timeout: Duration,
    max_body_size: usize,
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("endpoint", &self.endpoint.as_str())
            .field("request_timeout", &self.request_timeout)
            .field("max_body_size", &self.max_body_size)
            .finish_non_exhaustive()
    }
}

impl HttpTransport {
    /// Build a transport using the token from the configuration, if any.
    ///
    /// # Errors
    ///
    /// Fails on an unparsable endpoint, a disallowed scheme or TLS setup errors.
    pub fn from_config(config: &TransportConfig) -> Result<Self, TransportError> {
        let token: Arc<dyn TokenProvider> = match &config.auth_token {
            Some(token) => Arc::new(StaticToken::new(token.clone())),
            None => Arc::new(NoToken),
        };
        Self::new(config, token)
    }

    /// Build a transport with an external token provider.
    ///
    /// # Errors
    ///
    /// Fails on an unparsable endpoint, a disallowed scheme or TLS setup errors.
    pub fn new(
        config: &TransportConfig,
        token: Arc<dyn TokenProvider>,
    ) -> Result<Self, TransportError> {
        let endpoint = parse_endpoint(&config.endpoint, config.allow_insecure_http)?;

        if config.allow_insecure_http {
            tracing::warn!(
                endpoint = %endpoint,
                "insecure HTTP enabled for identity transport; use only for testing"
            );
        }

        let connector = build_https_connector(config.allow_insecure_http)?;
        let client = Client::builder(TokioExecutor::new()).build(connector);

        Ok(Self {
            client,
            endpoint,
            token,
            user_agent: HeaderValue::from_str(&config.user_agent)?,
            request_timeout: config.request_timeout,
            max_body_size: config.max_body_size,
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Absolute URL for a request: endpoint + encoded path segments + query.
    fn url_for(&self, request: &ApiRequest) -> Result<Url, TransportError> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|()| TransportError::InvalidUri {
                url: self.endpoint.to_string(),
                reason: "endpoint cannot carry a path".to_owned(),
            })?
            .pop_if_empty()
            .extend(&request.path);

        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&request.query);
        }
        Ok(url)
    }

    async fn send(&self, request: Request<Full<Bytes>>) -> Result<ApiResponse, TransportError> {
        let response = self.client.request(request).await?;
        let (parts, body) = response.into_parts();

        let collected = Limited::new(body, self.max_body_size)
            .collect()
            .await
            .map_err(|e| {
                if e.downcast_ref::<LengthLimitError>().is_some() {
                    TransportError::BodyTooLarge {
                        limit: self.max_body_size,
                    }
                } else {
                    TransportError::Transport(e)
                }
            })?;

        Ok(ApiResponse::new(parts.status, collected.to_bytes()))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let url = self.url_for(&request)?;
        let uri: Uri = url
            .as_str()
            .parse()
            .map_err(|e: http::uri::InvalidUri| TransportError::InvalidUri {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        let mut builder = Request::builder()
            .method(request.method.clone())
            .uri(uri)
            .header(USER_AGENT, self.user_agent.clone())
            .header(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(token) = self.token.token().await? {
            let mut value = HeaderValue::from_str(token.expose())?;
            value.set_sensitive(true);
            builder = builder.header(AUTH_TOKEN_HEADER, value);
        }

        let body = match &request.body {
            Some(json) => {
                let json_type = HeaderValue::from_static("application/json");
                builder = builder.header(CONTENT_TYPE, json_type);
                Bytes::from(serde_json::to_vec(json)?)
            }
            None => Bytes::new(),
        };
        let http_request = builder.body(Full::new(body))?;

        let started = Instant::now();
        let response = tokio::time::timeout(self.request_timeout, self.send(http_request))
            .await
            .map_err(|_| TransportError::Timeout(self.request_timeout))??;

        tracing::debug!(
            method = %request.method,
            path = url.path(),
            status = response.status.as_u16(),
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "identity request completed"
        );

        Ok(response)
    }
}

fn parse_endpoint(raw: &str, allow_insecure_http: bool) -> Result<Url, TransportError> {
    let endpoint = Url::parse(raw).map_err(|e| TransportError::InvalidUri {
        url: raw.to_owned(),
        reason: e.to_string(),
    })?;

    match endpoint.scheme() {
        "https" => {}
        "http" if allow_insecure_http => {}
        "http" => {
            return Err(TransportError::InvalidScheme {
                scheme: "http".to_owned(),
                reason: "plain HTTP requires allow_insecure_http".to_owned(),
            });
        }
        other => {
            return Err(TransportError::InvalidScheme {
                scheme: other.to_owned(),
                reason: "only http and https are supported".to_owned(),
            });
        }
    }

    if endpoint.cannot_be_a_base() {
        return Err(TransportError::InvalidUri {
            url: raw.to_owned(),
            reason: "endpoint cannot carry a path".to_owned(),
        });
    }

    Ok(endpoint)
}
