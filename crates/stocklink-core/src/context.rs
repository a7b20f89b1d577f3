// ── Application context ──
//
// Wires storage, the API client, the cache manager, and the state store
// together once at start-up. Consumers receive the pieces by reference
// instead of reaching for globals.

use std::sync::Arc;

use stocklink_api::{ApiClient, FileStorage, KeyValueStore, MemoryStorage};
use tracing::{debug, info};

use crate::cache::{CacheManager, MemoryResponseCaches, ResponseCaches};
use crate::config::{ClientConfig, StorageLocation};
use crate::error::CoreError;
use crate::guard::NavigationGuard;
use crate::store::StateStore;

/// Everything a client process needs, constructed in start-up order.
pub struct AppContext {
    config: ClientConfig,
    storage: Arc<dyn KeyValueStore>,
    cache: CacheManager,
    store: Arc<StateStore>,
    purged_on_start: bool,
}

impl AppContext {
    /// Open durable storage per `config.storage` and start up.
    pub fn new(config: ClientConfig) -> Result<Self, CoreError> {
        let storage: Arc<dyn KeyValueStore> = match &config.storage {
            StorageLocation::File(path) => Arc::new(FileStorage::open(path)?),
            StorageLocation::Memory => Arc::new(MemoryStorage::new()),
        };
        Self::with_storage(
            config,
            storage,
            Arc::new(MemoryStorage::new()),
            Arc::new(MemoryResponseCaches::new()),
        )
    }

    /// Start up over caller-provided storage.
    ///
    /// The cache version is reconciled *before* the store hydrates, so a
    /// purge is never followed by a read of stale keys.
    pub fn with_storage(
        config: ClientConfig,
        storage: Arc<dyn KeyValueStore>,
        session_storage: Arc<dyn KeyValueStore>,
        caches: Arc<dyn ResponseCaches>,
    ) -> Result<Self, CoreError> {
        let cache = CacheManager::new(
            Arc::clone(&storage),
            Arc::clone(&session_storage),
            caches,
            config.build_version.clone(),
        );
        let purged_on_start = cache.reconcile_version()?;

        let api = Arc::new(ApiClient::new(&config.transport(), Arc::clone(&storage))?);
        let store = Arc::new(StateStore::new(api, Arc::clone(&storage), session_storage));
        debug!(
            base_url = %config.base_url,
            version = %config.build_version,
            authenticated = store.is_authenticated(),
            "client context ready"
        );

        Ok(Self {
            config,
            storage,
            cache,
            store,
            purged_on_start,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn storage(&self) -> &Arc<dyn KeyValueStore> {
        &self.storage
    }

    pub fn cache(&self) -> &CacheManager {
        &self.cache
    }

    pub fn store(&self) -> &Arc<StateStore> {
        &self.store
    }

    /// Whether start-up reconciliation purged stale caches.
    pub fn purged_on_start(&self) -> bool {
        self.purged_on_start
    }

    pub fn navigation_guard(&self) -> NavigationGuard {
        NavigationGuard::new(self.store.subscribe_session())
    }

    /// Sign out: clear the session in the store, then purge every local cache.
    pub fn logout(&self) -> Result<(), CoreError> {
        self.store.logout();
        self.cache.purge_all()?;
        info!("logged out");
        Ok(())
    }
}
