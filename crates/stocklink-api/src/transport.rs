// Transport configuration for building the shared reqwest::Client.
//
// Base URL, deadline, user agent, and cookie jar live here so the API
// client constructor stays focused on request mechanics.

use std::sync::Arc;
use std::time::Duration;

use reqwest::cookie::Jar;
use url::Url;

use crate::error::Error;

/// Production backend.
pub const DEFAULT_BASE_URL: &str = "https://api.aistocklink.cn";

/// Deadline applied to every request unless overridden per call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(180);

const DEFAULT_USER_AGENT: &str = concat!("stocklink/", env!("CARGO_PKG_VERSION"));

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub base_url: Url,
    pub timeout: Duration,
    pub user_agent: String,
    /// Cookie store shared across requests so credential cookies set by
    /// the backend ride along on later cross-origin calls.
    pub cookie_jar: Option<Arc<Jar>>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            cookie_jar: None,
        }
    }
}

impl TransportConfig {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Create a config with a fresh cookie jar.
    pub fn with_cookie_jar(mut self) -> Self {
        self.cookie_jar = Some(Arc::new(Jar::default()));
        self
    }

    /// Build a `reqwest::Client` from this config.
    ///
    /// No client-level timeout is set: deadlines are enforced per request
    /// by [`ApiClient`](crate::ApiClient) so callers can override them.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder().user_agent(self.user_agent.as_str());

        if let Some(ref jar) = self.cookie_jar {
            builder = builder.cookie_provider(Arc::clone(jar));
        }

        builder.build().map_err(Error::Transport)
    }
}
