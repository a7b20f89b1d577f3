// ── Runtime client configuration ──
//
// These types describe *how* to talk to the backend and which build is
// running. They never touch disk: the CLI (via stocklink-config)
// constructs a `ClientConfig` and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use stocklink_api::TransportConfig;
use stocklink_api::transport::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use url::Url;

use crate::cache::BuildVersion;

/// Where durable storage lives.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StorageLocation {
    /// JSON document at this path.
    File(PathBuf),
    /// Process-local only; nothing survives exit.
    #[default]
    Memory,
}

/// Configuration for one client process.
///
/// Built by the CLI, passed to [`AppContext`](crate::AppContext).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend root (e.g., `https://api.aistocklink.cn`).
    pub base_url: Url,
    /// Default per-request deadline.
    pub timeout: Duration,
    /// Overrides the default `stocklink/<version>` user agent.
    pub user_agent: Option<String>,
    pub storage: StorageLocation,
    /// Token identifying the running build for cache reconciliation.
    pub build_version: BuildVersion,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
            timeout: DEFAULT_TIMEOUT,
            user_agent: None,
            storage: StorageLocation::default(),
            build_version: BuildVersion::resolve(None),
        }
    }
}

impl ClientConfig {
    pub fn transport(&self) -> TransportConfig {
        let transport = TransportConfig::new(self.base_url.clone())
            .with_timeout(self.timeout)
            .with_cookie_jar();
        match &self.user_agent {
            Some(agent) => transport.with_user_agent(agent.clone()),
            None => transport,
        }
    }
}
