use std::sync::Arc;

use serde::{Deserialize, Serialize};
use stocklink_api::BearerToken;

use super::FavoriteStock;

/// The signed-in user's profile.
///
/// Persisted under the `user` key with camelCase field names, matching
/// what earlier clients wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub stocks_count: Option<u32>,
}

impl UserProfile {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("-")
    }
}

/// Credential, profile, and watch list, committed together.
///
/// Invariant: without a token there is no profile and no favorites.
/// The only constructors that produce an authenticated state take the
/// token explicitly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    token: Option<BearerToken>,
    profile: Option<UserProfile>,
    favorites: Arc<Vec<FavoriteStock>>,
}

impl SessionState {
    pub fn signed_out() -> Self {
        Self::default()
    }

    pub fn signed_in(
        token: BearerToken,
        profile: Option<UserProfile>,
        favorites: Vec<FavoriteStock>,
    ) -> Self {
        Self {
            token: Some(token),
            profile,
            favorites: Arc::new(favorites),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn token(&self) -> Option<&BearerToken> {
        self.token.as_ref()
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }

    pub fn favorites(&self) -> &Arc<Vec<FavoriteStock>> {
        &self.favorites
    }

    /// Same session with a new profile. No-op when signed out.
    pub(crate) fn with_profile(&self, profile: UserProfile) -> Self {
        if self.token.is_none() {
            return Self::signed_out();
        }
        Self {
            profile: Some(profile),
            ..self.clone()
        }
    }

    /// Same session with a new watch list. No-op when signed out.
    pub(crate) fn with_favorites(&self, favorites: Vec<FavoriteStock>) -> Self {
        if self.token.is_none() {
            return Self::signed_out();
        }
        Self {
            favorites: Arc::new(favorites),
            ..self.clone()
        }
    }
}

/// Result of polling a QR-code login ticket.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanLoginOutcome {
    /// Not scanned yet; seconds left on the ticket.
    Pending { remaining: Option<i64> },
    /// Signed in. The profile is whatever the store holds afterwards.
    Confirmed { profile: Option<UserProfile> },
    /// Ticket is no longer valid; request a new one.
    Expired,
    /// The backend refused the poll.
    Rejected { code: i64, message: String },
}
