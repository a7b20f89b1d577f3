// Session actions: restore, login, logout, profile, QR-code login flow.

use std::sync::Arc;

use stocklink_api::BearerToken;
use stocklink_api::models::{ScanState, ScanTicket};
use stocklink_api::storage::{self, StorageError, keys};
use tracing::{debug, info, warn};

use super::StateStore;
use crate::error::CoreError;
use crate::model::{FavoriteStock, ScanLoginOutcome, SessionState, UserProfile};

impl StateStore {
    /// Re-validate the persisted credential and hydrate the profile.
    ///
    /// Returns `false` without a request when no credential is present.
    /// Any failure, transport or domain, clears the whole session.
    pub async fn restore_session(&self) -> bool {
        if !self.is_authenticated() {
            debug!("no credential to restore");
            return false;
        }
        match self.observe(self.api.user_info().await) {
            Ok(env) => {
                if let Some(info) = env.into_success() {
                    self.commit_profile(info.into());
                    info!("session restored");
                    true
                } else {
                    warn!("backend refused profile lookup");
                    self.clear_session("profile lookup rejected");
                    false
                }
            }
            Err(e) => {
                warn!(error = %e, "session restore failed");
                if self.is_authenticated() {
                    self.clear_session("profile lookup failed");
                }
                false
            }
        }
    }

    /// Record a credential and profile obtained elsewhere. Local only.
    pub fn login(&self, token: &str, profile: UserProfile) -> Result<(), CoreError> {
        let token = BearerToken::new(token.trim()).ok_or_else(|| CoreError::ValidationFailed {
            message: "token must not be blank".into(),
        })?;
        let mut persisted = Ok(());
        self.session.send_if_modified(|state| {
            // The in-memory watch list is the only one carried over; a key
            // left behind by an earlier account must not survive.
            let favorites = state.favorites().as_ref().clone();
            persisted = self.persist_sign_in(&token, &profile, &favorites);
            if persisted.is_err() {
                return false;
            }
            *state = Arc::new(SessionState::signed_in(token, Some(profile), favorites));
            true
        });
        persisted?;
        info!("signed in");
        Ok(())
    }

    fn persist_sign_in(
        &self,
        token: &BearerToken,
        profile: &UserProfile,
        favorites: &[FavoriteStock],
    ) -> Result<(), StorageError> {
        let store = self.storage.as_ref();
        token.persist(store)?;
        storage::write_json(store, keys::USER, profile)?;
        if favorites.is_empty() {
            store.remove(keys::FAVORITES)
        } else {
            storage::write_json(store, keys::FAVORITES, favorites)
        }
    }

    /// Forget the session locally: credential, profile, watch list, the
    /// recorded build token, and all session-scoped storage.
    pub fn logout(&self) {
        if let Err(e) = self.storage.remove(keys::APP_VERSION) {
            warn!(error = %e, "failed to remove recorded build version");
        }
        if let Err(e) = self.session_storage.clear() {
            warn!(error = %e, "failed to clear session storage");
        }
        self.clear_session("logout");
    }

    /// Change nickname and avatar, merging them into the held profile.
    pub async fn update_profile(&self, nickname: &str, avatar_url: &str) -> bool {
        match self.observe(self.api.update_profile(nickname, avatar_url).await) {
            Ok(env) if env.is_success() => {
                let mut profile = self.current_user().unwrap_or_default();
                profile.name = Some(nickname.to_owned());
                profile.avatar = Some(avatar_url.to_owned());
                self.commit_profile(profile);
                true
            }
            Ok(env) => {
                warn!(code = env.code, message = ?env.message, "profile update rejected");
                false
            }
            Err(e) => {
                warn!(error = %e, "profile update failed");
                false
            }
        }
    }

    // ── QR-code login ────────────────────────────────────────────────

    pub async fn fetch_scan_login_url(&self) -> Option<ScanTicket> {
        match self.api.scan_login_url().await {
            Ok(env) => {
                let ticket = env.into_success();
                if ticket.is_none() {
                    warn!("backend refused to issue a login ticket");
                }
                ticket
            }
            Err(e) => {
                warn!(error = %e, "failed to fetch login ticket");
                None
            }
        }
    }

    /// Poll a login ticket; on confirmation, sign in.
    ///
    /// When the backend omits the profile, it is fetched with
    /// [`restore_session`](Self::restore_session). Transport errors are
    /// re-raised.
    pub async fn poll_scan_login(&self, state: &str) -> Result<ScanLoginOutcome, CoreError> {
        let env = self.observe(self.api.login_status(state).await)?;
        if !env.is_success() {
            return Ok(ScanLoginOutcome::Rejected {
                code: env.code,
                message: env.message.unwrap_or_default(),
            });
        }
        let Some(status) = env.data else {
            return Err(CoreError::Internal("login status without payload".into()));
        };

        match status.status {
            ScanState::Pending => Ok(ScanLoginOutcome::Pending {
                remaining: status.remaining,
            }),
            ScanState::Confirmed => {
                let token = status.token.unwrap_or_default();
                let from_backend = status.user_info.map(UserProfile::from);
                let needs_lookup = from_backend.is_none();
                let profile = from_backend.unwrap_or_else(|| UserProfile {
                    id: status.user_id,
                    ..UserProfile::default()
                });
                self.login(&token, profile)?;
                if needs_lookup {
                    self.restore_session().await;
                }
                Ok(ScanLoginOutcome::Confirmed {
                    profile: self.current_user(),
                })
            }
            ScanState::Expired | ScanState::NotFound => Ok(ScanLoginOutcome::Expired),
            ScanState::Unknown => Ok(ScanLoginOutcome::Rejected {
                code: env.code,
                message: env.message.unwrap_or_else(|| "unknown login status".into()),
            }),
        }
    }
}
