// WeChat push settings and pushed-message lookup

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::debug;

use crate::client::{ApiClient, require_non_blank};
use crate::error::Error;
use crate::models::{Envelope, Payload, PushSettingsData, PushSettingsUpdate};

impl ApiClient {
    /// `GET /api/wechat/push/settings?user_id=`
    pub async fn push_settings(&self, user_id: i64) -> Result<Envelope<PushSettingsData>, Error> {
        debug!(user_id, "fetching push settings");
        self.get(
            "/api/wechat/push/settings",
            &[("user_id", user_id.to_string())],
        )
        .await?
        .into_envelope()
    }

    /// `POST /api/wechat/push/settings` with `{"user_id", "settings"}`
    pub async fn update_push_settings(
        &self,
        user_id: i64,
        settings: &BTreeMap<String, bool>,
    ) -> Result<Envelope<Value>, Error> {
        debug!(user_id, entries = settings.len(), "updating push settings");
        self.post(
            "/api/wechat/push/settings",
            Some(&PushSettingsUpdate { user_id, settings }),
        )
        .await?
        .into_envelope()
    }

    /// A pushed message by id.
    ///
    /// `GET /api/wechat?msgid=`. The body shape varies (bare object,
    /// enveloped, or a bag of news categories), so the raw payload is
    /// returned for the caller to classify.
    pub async fn wechat_message(&self, msg_id: &str) -> Result<Payload, Error> {
        let msg_id = require_non_blank("msg_id", msg_id)?;
        debug!(msg_id, "fetching wechat message");
        self.get("/api/wechat", &[("msgid", msg_id.to_owned())]).await
    }
}
