// ── Version-gated cache lifecycle ──
//
// Persisted storage outlives client upgrades. On a build change every
// persisted key except the session allow-list is dropped, along with all
// session-scoped storage and response caches, before the new build token
// is written. Logout purges everything.

use std::fmt;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use dashmap::DashMap;
use stocklink_api::KeyValueStore;
use stocklink_api::storage::keys;
use tracing::{debug, info, warn};

use crate::error::CoreError;

/// Persisted keys that survive a version change.
pub const PRESERVED_KEYS: [&str; 3] = [keys::TOKEN, keys::USER, keys::FAVORITES];

/// Pause between a version purge and the reload callback.
pub const RELOAD_DELAY: Duration = Duration::from_secs(1);

// ── Build version ────────────────────────────────────────────────────

/// Where the running build's token came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum VersionSource {
    /// Supplied explicitly by configuration.
    Configured,
    /// Baked in at compile time via `STOCKLINK_BUILD_VERSION`.
    BuildTime,
    /// Process start time. Differs on every run, so each start purges.
    ProcessStart,
}

/// Token identifying the running build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildVersion {
    pub token: String,
    pub source: VersionSource,
}

impl BuildVersion {
    pub fn new(token: impl Into<String>, source: VersionSource) -> Self {
        Self {
            token: token.into(),
            source,
        }
    }

    /// Resolve the running build's token: explicit configuration, then the
    /// compile-time `STOCKLINK_BUILD_VERSION`, then the process start time.
    pub fn resolve(configured: Option<&str>) -> Self {
        if let Some(token) = configured.map(str::trim).filter(|t| !t.is_empty()) {
            return Self::new(token, VersionSource::Configured);
        }
        if let Some(token) = option_env!("STOCKLINK_BUILD_VERSION").filter(|t| !t.is_empty()) {
            return Self::new(token, VersionSource::BuildTime);
        }
        let token = process_start_millis().to_string();
        warn!(
            token,
            "no build version configured; falling back to process start time"
        );
        Self::new(token, VersionSource::ProcessStart)
    }
}

impl fmt::Display for BuildVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.token, self.source)
    }
}

fn process_start_millis() -> i64 {
    static STARTED: OnceLock<i64> = OnceLock::new();
    *STARTED.get_or_init(|| chrono::Utc::now().timestamp_millis())
}

// ── Response caches ──────────────────────────────────────────────────

/// Named HTTP response caches that a purge must drop.
pub trait ResponseCaches: Send + Sync + fmt::Debug {
    fn names(&self) -> Vec<String>;

    /// Drop one cache. Returns whether it existed.
    fn delete(&self, name: &str) -> bool;
}

/// In-process response caches keyed by cache name, then request key.
#[derive(Debug, Default)]
pub struct MemoryResponseCaches {
    caches: DashMap<String, DashMap<String, Vec<u8>>>,
}

impl MemoryResponseCaches {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, cache: &str, key: &str, body: Vec<u8>) {
        self.caches
            .entry(cache.to_owned())
            .or_default()
            .insert(key.to_owned(), body);
    }

    pub fn lookup(&self, cache: &str, key: &str) -> Option<Vec<u8>> {
        self.caches.get(cache)?.get(key).map(|v| v.value().clone())
    }
}

impl ResponseCaches for MemoryResponseCaches {
    fn names(&self) -> Vec<String> {
        self.caches.iter().map(|r| r.key().clone()).collect()
    }

    fn delete(&self, name: &str) -> bool {
        self.caches.remove(name).is_some()
    }
}

// ── Cache manager ────────────────────────────────────────────────────

/// Reconciles persisted storage with the running build.
///
/// Constructed once at start-up and shared by reference. Holds no state
/// of its own between calls.
#[derive(Debug)]
pub struct CacheManager {
    storage: Arc<dyn KeyValueStore>,
    session_storage: Arc<dyn KeyValueStore>,
    caches: Arc<dyn ResponseCaches>,
    version: BuildVersion,
}

impl CacheManager {
    pub fn new(
        storage: Arc<dyn KeyValueStore>,
        session_storage: Arc<dyn KeyValueStore>,
        caches: Arc<dyn ResponseCaches>,
        version: BuildVersion,
    ) -> Self {
        Self {
            storage,
            session_storage,
            caches,
            version,
        }
    }

    pub fn version(&self) -> &BuildVersion {
        &self.version
    }

    /// The token recorded by the last reconciliation, if any.
    pub fn stored_version(&self) -> Option<String> {
        self.storage.get(keys::APP_VERSION)
    }

    /// Purge stale caches if the running build differs from the recorded one.
    ///
    /// Returns `true` iff a purge happened. A second call with no build
    /// change in between is a no-op.
    pub fn reconcile_version(&self) -> Result<bool, CoreError> {
        let stored = self.stored_version();
        if stored.as_deref() == Some(self.version.token.as_str()) {
            debug!(version = %self.version.token, "cache version current");
            return Ok(false);
        }

        let mut removed = 0usize;
        for key in self.storage.keys() {
            if !PRESERVED_KEYS.contains(&key.as_str()) {
                self.storage.remove(&key)?;
                removed += 1;
            }
        }
        self.session_storage.clear()?;
        let caches = self.clear_response_caches();
        self.storage.set(keys::APP_VERSION, &self.version.token)?;

        info!(
            from = stored.as_deref().unwrap_or("<none>"),
            to = %self.version.token,
            removed,
            caches,
            "application version changed; stale caches purged"
        );
        Ok(true)
    }

    /// Clear all persisted and session storage plus response caches.
    /// Used on logout; safe to call repeatedly.
    pub fn purge_all(&self) -> Result<(), CoreError> {
        self.storage.clear()?;
        self.session_storage.clear()?;
        let caches = self.clear_response_caches();
        info!(caches, "all local caches purged");
        Ok(())
    }

    /// Reconcile, and if that purged anything, wait [`RELOAD_DELAY`] and
    /// invoke `reload`.
    pub async fn force_reload_if_stale<F>(&self, reload: F) -> Result<bool, CoreError>
    where
        F: FnOnce() + Send,
    {
        if !self.reconcile_version()? {
            return Ok(false);
        }
        tokio::time::sleep(RELOAD_DELAY).await;
        debug!("reloading after cache purge");
        reload();
        Ok(true)
    }

    fn clear_response_caches(&self) -> usize {
        self.caches
            .names()
            .iter()
            .filter(|name| self.caches.delete(name))
            .count()
    }
}
