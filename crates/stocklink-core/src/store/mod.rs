// ── Central state store ──
//
// Session (credential + profile + watch list) and market overview live in
// `watch` channels. Every action follows one protocol: call the API, check
// the domain marker, normalize, then commit under the channel's write lock.
// Failures leave state untouched and come back as sentinels, except for
// the few actions documented to re-raise.

mod content;
mod favorites;
mod market;
mod session;

use std::sync::Arc;

use stocklink_api::storage::{self, keys};
use stocklink_api::{ApiClient, BearerToken, KeyValueStore};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::model::{FavoriteStock, MarketOverview, SessionState, UserProfile, dedup_by_code};
use crate::stream::StateStream;

pub use content::NEWS_DETAIL_DEADLINE;

/// Central state container and action protocols.
///
/// Cheap to share behind an `Arc`; all methods take `&self`. Concurrent
/// actions are last-commit-wins.
pub struct StateStore {
    api: Arc<ApiClient>,
    storage: Arc<dyn KeyValueStore>,
    session_storage: Arc<dyn KeyValueStore>,
    session: watch::Sender<Arc<SessionState>>,
    market: watch::Sender<Arc<MarketOverview>>,
}

impl StateStore {
    /// Build the store and hydrate it from durable storage.
    ///
    /// The persisted profile and watch list are only trusted when a
    /// credential is also present.
    pub fn new(
        api: Arc<ApiClient>,
        storage: Arc<dyn KeyValueStore>,
        session_storage: Arc<dyn KeyValueStore>,
    ) -> Self {
        let initial = Self::bootstrap(storage.as_ref());
        let (session, _) = watch::channel(Arc::new(initial));
        let (market, _) = watch::channel(Arc::new(MarketOverview::default()));
        Self {
            api,
            storage,
            session_storage,
            session,
            market,
        }
    }

    fn bootstrap(storage: &dyn KeyValueStore) -> SessionState {
        let Some(token) = BearerToken::from_storage(storage) else {
            if storage.contains(keys::USER) || storage.contains(keys::FAVORITES) {
                debug!("ignoring persisted profile without a credential");
            }
            return SessionState::signed_out();
        };
        let profile: Option<UserProfile> = storage::read_json(storage, keys::USER);
        let favorites: Vec<FavoriteStock> =
            storage::read_json(storage, keys::FAVORITES).unwrap_or_default();
        debug!(
            has_profile = profile.is_some(),
            favorites = favorites.len(),
            "session bootstrapped from storage"
        );
        SessionState::signed_in(token, profile, dedup_by_code(favorites))
    }

    pub fn api(&self) -> &Arc<ApiClient> {
        &self.api
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn session(&self) -> Arc<SessionState> {
        self.session.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.borrow().is_authenticated()
    }

    pub fn current_user(&self) -> Option<UserProfile> {
        self.session.borrow().profile().cloned()
    }

    pub fn favorites(&self) -> Arc<Vec<FavoriteStock>> {
        self.session.borrow().favorites().clone()
    }

    pub fn market_overview(&self) -> Arc<MarketOverview> {
        self.market.borrow().clone()
    }

    // ── Subscriptions ────────────────────────────────────────────────

    pub fn subscribe_session(&self) -> StateStream<SessionState> {
        StateStream::new(self.session.subscribe())
    }

    pub fn subscribe_market(&self) -> StateStream<MarketOverview> {
        StateStream::new(self.market.subscribe())
    }

    // ── Commits ──────────────────────────────────────────────────────

    /// Persist and commit a profile. Dropped when signed out.
    ///
    /// The token check, the storage write, and the commit happen under the
    /// channel's write lock, so a concurrent sign-out either runs first
    /// (and this is a no-op) or clears what this wrote.
    fn commit_profile(&self, profile: UserProfile) {
        self.session.send_if_modified(|state| {
            if !state.is_authenticated() {
                debug!("dropping profile for a signed-out session");
                return false;
            }
            if let Err(e) = storage::write_json(self.storage.as_ref(), keys::USER, &profile) {
                warn!(error = %e, "failed to persist profile");
            }
            *state = Arc::new(state.with_profile(profile));
            true
        });
    }

    /// Persist and commit a watch list. Dropped when signed out.
    fn commit_favorites(&self, favorites: Vec<FavoriteStock>) {
        let favorites = dedup_by_code(favorites);
        self.session.send_if_modified(|state| {
            if !state.is_authenticated() {
                debug!("dropping watch list for a signed-out session");
                return false;
            }
            if let Err(e) = storage::write_json(self.storage.as_ref(), keys::FAVORITES, &favorites)
            {
                warn!(error = %e, "failed to persist favorites");
            }
            *state = Arc::new(state.with_favorites(favorites));
            true
        });
    }

    fn commit_market(&self, overview: MarketOverview) -> Arc<MarketOverview> {
        let overview = Arc::new(overview);
        self.market.send_replace(Arc::clone(&overview));
        overview
    }

    /// Drop credential, profile, and watch list in one commit and remove
    /// their persisted keys.
    fn clear_session(&self, reason: &str) {
        self.session.send_modify(|state| {
            for key in [keys::USER, keys::TOKEN, keys::FAVORITES] {
                if let Err(e) = self.storage.remove(key) {
                    warn!(key, error = %e, "failed to remove persisted session key");
                }
            }
            *state = Arc::new(SessionState::signed_out());
        });
        info!(reason, "session cleared");
    }

    /// Pass a result through, clearing the session if the backend said 401.
    fn observe<T>(&self, result: Result<T, stocklink_api::Error>) -> Result<T, stocklink_api::Error> {
        if matches!(&result, Err(e) if e.is_unauthorized()) {
            self.clear_session("credential rejected by backend");
        }
        result
    }
}
