#![allow(clippy::unwrap_used)]
// Cache version reconciliation and purge behavior.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use pretty_assertions::assert_eq;
use stocklink_api::storage::keys;
use stocklink_api::{KeyValueStore, MemoryStorage};
use stocklink_core::cache::RELOAD_DELAY;
use stocklink_core::{BuildVersion, CacheManager, MemoryResponseCaches, VersionSource};

struct Fixture {
    storage: Arc<MemoryStorage>,
    session: Arc<MemoryStorage>,
    caches: Arc<MemoryResponseCaches>,
}

impl Fixture {
    fn new() -> Self {
        Self {
            storage: Arc::new(MemoryStorage::new()),
            session: Arc::new(MemoryStorage::new()),
            caches: Arc::new(MemoryResponseCaches::new()),
        }
    }

    fn manager(&self, version: &str) -> CacheManager {
        CacheManager::new(
            self.storage.clone(),
            self.session.clone(),
            self.caches.clone(),
            BuildVersion::new(version, VersionSource::Configured),
        )
    }

    /// A client that last ran build `v1` with a signed-in session.
    fn seeded(self) -> Self {
        for (k, v) in [
            (keys::APP_VERSION, "v1"),
            (keys::TOKEN, "jwt"),
            (keys::USER, r#"{"id":1}"#),
            (keys::FAVORITES, "[]"),
            ("chart_prefs", r#"{"range":"1y"}"#),
            ("last_search", "茅台"),
        ] {
            self.storage.set(k, v).unwrap();
        }
        self.session.set("scroll", "420").unwrap();
        self.caches.put("api-v1", "/api/market/overview", b"{}".to_vec());
        self.caches.put("images", "logo.png", vec![0x89, 0x50]);
        self
    }
}

fn sorted_keys(store: &MemoryStorage) -> Vec<String> {
    let mut keys = store.keys();
    keys.sort();
    keys
}

#[test]
fn test_version_change_purges_everything_but_the_allow_list() {
    let fx = Fixture::new().seeded();
    let cache = fx.manager("v2");

    assert!(cache.reconcile_version().unwrap());

    assert_eq!(
        sorted_keys(&fx.storage),
        ["app_version", "favoriteStocks", "token", "user"]
    );
    assert_eq!(fx.storage.get(keys::TOKEN).as_deref(), Some("jwt"));
    assert_eq!(cache.stored_version().as_deref(), Some("v2"));
    assert!(fx.session.is_empty());
    assert!(fx.caches.lookup("api-v1", "/api/market/overview").is_none());
    assert!(fx.caches.lookup("images", "logo.png").is_none());
}

#[test]
fn test_reconcile_is_idempotent() {
    let fx = Fixture::new().seeded();
    let cache = fx.manager("v2");

    assert!(cache.reconcile_version().unwrap());
    fx.storage.set("chart_prefs", "{}").unwrap();
    assert!(!cache.reconcile_version().unwrap());
    assert_eq!(fx.storage.get("chart_prefs").as_deref(), Some("{}"));
}

#[test]
fn test_matching_version_touches_nothing() {
    let fx = Fixture::new().seeded();
    let before = sorted_keys(&fx.storage);

    assert!(!fx.manager("v1").reconcile_version().unwrap());
    assert_eq!(sorted_keys(&fx.storage), before);
    assert_eq!(fx.session.get("scroll").as_deref(), Some("420"));
    assert!(fx.caches.lookup("images", "logo.png").is_some());
}

#[test]
fn test_first_run_records_version() {
    let fx = Fixture::new();
    let cache = fx.manager("v1");

    assert_eq!(cache.stored_version(), None);
    assert!(cache.reconcile_version().unwrap());
    assert_eq!(cache.stored_version().as_deref(), Some("v1"));
}

#[test]
fn test_purge_all_clears_every_store() {
    let fx = Fixture::new().seeded();
    let cache = fx.manager("v1");

    cache.purge_all().unwrap();
    assert!(fx.storage.is_empty());
    assert!(fx.session.is_empty());
    assert!(fx.caches.lookup("api-v1", "/api/market/overview").is_none());

    cache.purge_all().unwrap();
    assert!(fx.storage.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_force_reload_waits_then_reloads() {
    let fx = Fixture::new().seeded();
    let cache = fx.manager("v2");
    let reloaded = Arc::new(AtomicBool::new(false));

    let start = tokio::time::Instant::now();
    let flag = reloaded.clone();
    let purged = cache
        .force_reload_if_stale(move || flag.store(true, Ordering::SeqCst))
        .await
        .unwrap();

    assert!(purged);
    assert!(reloaded.load(Ordering::SeqCst));
    assert!(start.elapsed() >= RELOAD_DELAY);
}

#[tokio::test(start_paused = true)]
async fn test_force_reload_skipped_when_current() {
    let fx = Fixture::new().seeded();
    let cache = fx.manager("v1");
    let reloaded = Arc::new(AtomicBool::new(false));

    let start = tokio::time::Instant::now();
    let flag = reloaded.clone();
    let purged = cache
        .force_reload_if_stale(move || flag.store(true, Ordering::SeqCst))
        .await
        .unwrap();

    assert!(!purged);
    assert!(!reloaded.load(Ordering::SeqCst));
    assert!(start.elapsed() < Duration::from_millis(1));
}
