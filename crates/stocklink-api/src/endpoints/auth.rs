// Login flow and user profile endpoints
//
// The QR-code login endpoints answer with top-level fields next to
// `code`; the profile endpoints nest under `data`.

use tracing::debug;

use crate::client::{ApiClient, require_non_blank};
use crate::error::Error;
use crate::models::{Envelope, LoginStatus, ProfileUpdate, ScanTicket, UserInfo};

impl ApiClient {
    /// Request a QR-code login ticket.
    ///
    /// `GET /api/auth/scan-login-url`
    pub async fn scan_login_url(&self) -> Result<Envelope<ScanTicket>, Error> {
        debug!("requesting scan-login ticket");
        self.get("/api/auth/scan-login-url", &[])
            .await?
            .into_flat_envelope()
    }

    /// Poll a login ticket.
    ///
    /// `GET /api/auth/login-status?state=...`. An expired or unknown
    /// ticket is answered with 401/404 by the backend and therefore
    /// surfaces as a transport error.
    pub async fn login_status(&self, state: &str) -> Result<Envelope<LoginStatus>, Error> {
        let state = require_non_blank("state", state)?;
        debug!(state, "polling scan-login status");
        self.get("/api/auth/login-status", &[("state", state.to_owned())])
            .await?
            .into_flat_envelope()
    }

    /// Profile of the credential holder.
    ///
    /// `GET /api/user/info`
    pub async fn user_info(&self) -> Result<Envelope<UserInfo>, Error> {
        debug!("fetching user info");
        self.get("/api/user/info", &[]).await?.into_envelope()
    }

    /// Change nickname and avatar.
    ///
    /// `POST /api/user/profile` with `{"nickname", "avatar_url"}`
    pub async fn update_profile(
        &self,
        nickname: &str,
        avatar_url: &str,
    ) -> Result<Envelope<serde_json::Value>, Error> {
        let nickname = require_non_blank("nickname", nickname)?;
        debug!(nickname, "updating profile");
        self.post(
            "/api/user/profile",
            Some(&ProfileUpdate {
                nickname,
                avatar_url,
            }),
        )
        .await?
        .into_envelope()
    }
}
