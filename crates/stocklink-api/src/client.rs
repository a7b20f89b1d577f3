// AIStockLink HTTP client
//
// Wraps `reqwest::Client` with base-URL joining, bearer injection from
// durable storage, per-call deadlines, and envelope parsing. Endpoint
// functions live in `crate::endpoints` as inherent methods so this module
// stays focused on transport mechanics.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::auth::{self, BearerToken};
use crate::error::Error;
use crate::models::{self, Payload, preview};
use crate::storage::KeyValueStore;
use crate::transport::TransportConfig;

/// Per-call overrides.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestOptions {
    /// Replaces the client's default deadline for this call.
    pub timeout: Option<Duration>,
}

impl RequestOptions {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
        }
    }
}

/// HTTP client for the AIStockLink REST backend.
///
/// Holds the durable store by reference: the credential is read from it on
/// every request, and a 401 removes the credential and cached profile from
/// it. Navigation after a 401 is the caller's business.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    timeout: Duration,
    storage: Arc<dyn KeyValueStore>,
}

impl ApiClient {
    /// Create a client from a `TransportConfig`.
    ///
    /// A cookie jar is always attached so backend-issued cookies are sent
    /// with later requests.
    pub fn new(transport: &TransportConfig, storage: Arc<dyn KeyValueStore>) -> Result<Self, Error> {
        let config = if transport.cookie_jar.is_some() {
            transport.clone()
        } else {
            transport.clone().with_cookie_jar()
        };
        let http = config.build_client()?;
        Ok(Self {
            http,
            base_url: config.base_url,
            timeout: config.timeout,
            storage,
        })
    }

    /// Create a client around a pre-built `reqwest::Client`.
    pub fn with_client(
        http: reqwest::Client,
        base_url: Url,
        timeout: Duration,
        storage: Arc<dyn KeyValueStore>,
    ) -> Self {
        Self {
            http,
            base_url,
            timeout,
            storage,
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn default_timeout(&self) -> Duration {
        self.timeout
    }

    pub fn storage(&self) -> &Arc<dyn KeyValueStore> {
        &self.storage
    }

    /// Whether a credential is currently persisted.
    pub fn has_credential(&self) -> bool {
        BearerToken::from_storage(self.storage.as_ref()).is_some()
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// `{base}{path}`, keeping any path prefix on the base URL.
    pub(crate) fn url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Issue a request and return the transported body.
    ///
    /// Domain failures come back as `Ok`; inspect [`Payload::code`].
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<Value>,
        options: RequestOptions,
    ) -> Result<Payload, Error> {
        let url = self.url(path)?;
        let timeout = options.timeout.unwrap_or(self.timeout);
        debug!(%method, path, timeout_secs = timeout.as_secs(), "request");

        let mut builder = self.http.request(method, url);
        if !query.is_empty() {
            builder = builder.query(query);
        }
        if let Some(token) = BearerToken::from_storage(self.storage.as_ref()) {
            builder = builder.bearer_auth(token.expose());
        }
        if let Some(body) = body {
            builder = builder.json(&body);
        }

        let exchange = async {
            let resp = builder.send().await?;
            let status = resp.status();
            let text = resp.text().await?;
            Ok::<_, Error>((status, text))
        };

        let (status, text) = tokio::time::timeout(timeout, exchange)
            .await
            .map_err(|_| Error::Timeout {
                timeout_secs: timeout.as_secs(),
            })??;

        self.parse_payload(status, &text)
    }

    pub(crate) async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Payload, Error> {
        self.request(Method::GET, path, query, None, RequestOptions::default())
            .await
    }

    pub(crate) async fn get_with(
        &self,
        path: &str,
        query: &[(&str, String)],
        options: RequestOptions,
    ) -> Result<Payload, Error> {
        self.request(Method::GET, path, query, None, options).await
    }

    pub(crate) async fn post(
        &self,
        path: &str,
        body: Option<&(impl Serialize + Sync)>,
    ) -> Result<Payload, Error> {
        let body = body
            .map(serde_json::to_value)
            .transpose()
            .map_err(|e| Error::Deserialization {
                message: format!("failed to encode request body: {e}"),
                body: String::new(),
            })?;
        self.request(Method::POST, path, &[], body, RequestOptions::default())
            .await
    }

    /// Map the transport status and body to a `Payload` or an error.
    fn parse_payload(&self, status: StatusCode, text: &str) -> Result<Payload, Error> {
        if status == StatusCode::UNAUTHORIZED {
            warn!("backend rejected credential; clearing persisted session keys");
            auth::forget_rejected_credential(self.storage.as_ref());
            return Err(Error::Unauthorized);
        }

        if !status.is_success() {
            let message = serde_json::from_str::<Value>(text)
                .ok()
                .and_then(|v| models::message_of(&v).map(String::from))
                .unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("unexpected status")
                        .to_owned()
                });
            return Err(Error::Http {
                status: status.as_u16(),
                message,
            });
        }

        let body: Value = serde_json::from_str(text).map_err(|e| Error::MalformedEnvelope {
            message: e.to_string(),
            body: preview(text),
        })?;
        Payload::from_body(body)
    }
}

/// Reject blank identifiers before any request is made.
pub(crate) fn require_non_blank<'a>(field: &'static str, value: &'a str) -> Result<&'a str, Error> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::Validation {
            field,
            reason: "must not be blank".into(),
        });
    }
    Ok(trimmed)
}
