// Read-only content actions: lookups, news, tags, evaluation, pushed
// messages, changelog, assistant, push settings. None of these touch the session
// except through the shared 401 handling.

use std::collections::BTreeMap;
use std::time::Duration;

use serde_json::Value;
use stocklink_api::Envelope;
use tracing::{debug, warn};

use super::StateStore;
use crate::convert;
use crate::error::CoreError;
use crate::model::{
    Evaluation, HotStock, NewsPage, PushSettings, StockSummary, TagStocks, UpdateLogQuery,
    UpdateLogs, WechatMessage,
};

/// Action-level deadline for news detail, inside the transport's 300 s.
pub const NEWS_DETAIL_DEADLINE: Duration = Duration::from_secs(280);

impl StateStore {
    /// Success payload, or `None` with a warning for any failure.
    fn settle<T>(
        &self,
        what: &'static str,
        result: Result<Envelope<T>, stocklink_api::Error>,
    ) -> Option<T> {
        match self.observe(result) {
            Ok(env) if env.is_success() => env.data,
            Ok(env) => {
                warn!(what, code = env.code, message = ?env.message, "request rejected");
                None
            }
            Err(e) => {
                warn!(what, error = %e, "request failed");
                None
            }
        }
    }

    // ── Stock lookups ────────────────────────────────────────────────

    pub async fn search_stocks(&self, keyword: &str, limit: u32) -> Vec<StockSummary> {
        self.settle("search", self.api.search_stocks(keyword, limit).await)
            .map(|r| r.stocks)
            .unwrap_or_default()
    }

    pub async fn fetch_hot_stocks(&self, symbol: &str) -> Vec<HotStock> {
        self.settle("hot stocks", self.api.hot_stocks(symbol).await)
            .unwrap_or_default()
    }

    pub async fn fetch_stock_history(&self, code: &str, years: u32) -> Option<Value> {
        self.settle("history", self.api.stock_history(code, years).await)
    }

    pub async fn fetch_stock_detail(&self, code: &str) -> Option<Value> {
        self.settle("detail", self.api.stock_detail(code).await)
    }

    pub async fn fetch_stock_forecast(&self, code: &str) -> Vec<Value> {
        self.settle("forecast", self.api.stock_forecast(code).await)
            .unwrap_or_default()
    }

    // ── News ─────────────────────────────────────────────────────────

    /// One page of news for a stock; an empty page on any failure.
    pub async fn fetch_stock_news(&self, code: &str, page: u32, limit: u32) -> NewsPage {
        self.settle("stock news", self.api.stock_news(code, page, limit).await)
            .map(NewsPage::from)
            .unwrap_or_default()
    }

    pub async fn fetch_push_news(&self, page: u32, limit: u32) -> Option<Value> {
        self.settle("push news", self.api.push_news(page, limit).await)
    }

    /// Full article. Domain failure is `Ok(None)`; transport failure and
    /// the [`NEWS_DETAIL_DEADLINE`] are re-raised.
    pub async fn fetch_news_detail(&self, id: &str) -> Result<Option<Value>, CoreError> {
        debug!(id, "fetching news detail");
        let result = tokio::time::timeout(NEWS_DETAIL_DEADLINE, self.api.news_detail(id))
            .await
            .map_err(|_| CoreError::Timeout {
                timeout_secs: NEWS_DETAIL_DEADLINE.as_secs(),
            })?;
        let env = self.observe(result)?;
        if env.is_success() {
            Ok(env.data)
        } else {
            warn!(id, code = env.code, message = ?env.message, "news detail rejected");
            Ok(None)
        }
    }

    // ── Tags / evaluation ────────────────────────────────────────────

    /// Tag leaders, strongest first. Domain failure yields an empty
    /// result; transport failure is re-raised.
    pub async fn fetch_tag_stocks(&self, tag: &str) -> Result<TagStocks, CoreError> {
        let env = self.observe(self.api.tag_leaders(tag).await)?;
        match env.into_success() {
            Some(raw) => Ok(convert::tag_stocks(raw)),
            None => Ok(TagStocks::default()),
        }
    }

    /// AI evaluation. Requires a session: without one, `None` and no request.
    pub async fn fetch_evaluation(&self, code: &str, refresh: bool) -> Option<Evaluation> {
        if !self.is_authenticated() {
            debug!(code, "evaluation requires a session");
            return None;
        }
        self.settle("evaluation", self.api.evaluation(code, refresh).await)
            .map(Evaluation::from)
    }

    // ── Pushed messages ──────────────────────────────────────────────

    /// Look up and classify a pushed message.
    ///
    /// Never fails: a blank id (no request), a transport error, or an
    /// unrecognized shape all yield [`WechatMessage::empty`].
    pub async fn fetch_wechat_message(&self, msg_id: &str) -> WechatMessage {
        if msg_id.trim().is_empty() {
            warn!("blank message id");
            return WechatMessage::empty();
        }
        match self.observe(self.api.wechat_message(msg_id).await) {
            Ok(payload) => WechatMessage::classify(payload.body()).unwrap_or_else(|| {
                warn!(msg_id, "unrecognized message shape");
                WechatMessage::empty()
            }),
            Err(e) => {
                warn!(msg_id, error = %e, "message lookup failed");
                WechatMessage::empty()
            }
        }
    }

    // ── Changelog ────────────────────────────────────────────────────

    /// A changelog page. Domain failure is `Ok(None)`; transport failure
    /// is re-raised.
    pub async fn fetch_update_logs(
        &self,
        query: &UpdateLogQuery,
    ) -> Result<Option<UpdateLogs>, CoreError> {
        let env = self.observe(self.api.update_logs(query).await)?;
        Ok(env.into_success().map(UpdateLogs::from))
    }

    pub async fn fetch_update_types(&self) -> Vec<String> {
        self.settle("update types", self.api.update_types().await)
            .and_then(|t| t.types)
            .unwrap_or_default()
    }

    // ── Assistant ────────────────────────────────────────────────────

    /// Send one question to the assistant. Every failure is re-raised;
    /// a domain failure becomes [`CoreError::Rejected`].
    pub async fn ask_assistant(&self, query: &str) -> Result<Value, CoreError> {
        let env = self.observe(self.api.chat_query(query).await)?;
        if !env.is_success() {
            return Err(CoreError::Rejected {
                code: env.code,
                message: env.message.unwrap_or_default(),
            });
        }
        Ok(env.data.unwrap_or(Value::Null))
    }

    // ── Push settings ────────────────────────────────────────────────

    pub async fn fetch_push_settings(&self, user_id: i64) -> PushSettings {
        self.settle("push settings", self.api.push_settings(user_id).await)
            .unwrap_or_default()
    }

    pub async fn update_push_settings(
        &self,
        user_id: i64,
        settings: &BTreeMap<String, bool>,
    ) -> bool {
        match self.observe(self.api.update_push_settings(user_id, settings).await) {
            Ok(env) => env.is_success(),
            Err(e) => {
                warn!(error = %e, "push settings update failed");
                false
            }
        }
    }
}
