// Wire types for the AIStockLink backend.
//
// Every response is a JSON object carrying a domain-level status marker
// (`code`) next to its payload. Most endpoints nest the payload under
// `data`; a few (login flow, wechat messages) put fields at the top level.
// Fields are lenient (`#[serde(default)]`) because the backend omits
// nulls freely, and unknown fields are kept in `extra` so nothing the UI
// might render is lost.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Error;

const BODY_PREVIEW_LEN: usize = 200;

pub(crate) fn preview(body: &str) -> String {
    body.chars().take(BODY_PREVIEW_LEN).collect()
}

// ── Payload ─────────────────────────────────────────────────────────

/// A successfully transported response body.
///
/// Always a JSON object. The domain marker is left for the caller to
/// inspect: a 2xx response can still carry a domain failure.
#[derive(Debug, Clone, PartialEq)]
pub struct Payload {
    body: Value,
}

impl Payload {
    /// Wrap a response body. Anything other than a JSON object is malformed.
    pub fn from_body(body: Value) -> Result<Self, Error> {
        if body.is_object() {
            Ok(Self { body })
        } else {
            Err(Error::MalformedEnvelope {
                message: "response body is not a JSON object".into(),
                body: preview(&body.to_string()),
            })
        }
    }

    /// The domain status marker. Numeric strings are accepted.
    pub fn code(&self) -> Option<i64> {
        match self.body.get("code")? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Human-readable message; the backend uses `message`, `msg`, and
    /// on some routes `error`.
    pub fn message(&self) -> Option<&str> {
        message_of(&self.body)
    }

    /// The nested `data` payload, if present and not null.
    pub fn data(&self) -> Option<&Value> {
        self.body.get("data").filter(|v| !v.is_null())
    }

    pub fn body(&self) -> &Value {
        &self.body
    }

    pub fn into_body(self) -> Value {
        self.body
    }

    /// Interpret as `{ code, message, data: T }`.
    ///
    /// `data` is only decoded when the marker denotes success; a failed
    /// envelope's payload is dropped rather than forced into `T`.
    pub fn into_envelope<T: DeserializeOwned>(self) -> Result<Envelope<T>, Error> {
        let code = self.require_code()?;
        let message = self.message().map(String::from);
        let data = if is_success_code(code) {
            match self.data() {
                Some(value) => Some(decode_value(value.clone())?),
                None => None,
            }
        } else {
            None
        };
        Ok(Envelope {
            code,
            message,
            data,
        })
    }

    /// Interpret as `{ code, message, ...T }` where the payload fields sit
    /// next to the marker instead of under `data`.
    pub fn into_flat_envelope<T: DeserializeOwned>(self) -> Result<Envelope<T>, Error> {
        let code = self.require_code()?;
        let message = self.message().map(String::from);
        let data = if is_success_code(code) {
            Some(decode_value(self.body)?)
        } else {
            None
        };
        Ok(Envelope {
            code,
            message,
            data,
        })
    }

    fn require_code(&self) -> Result<i64, Error> {
        self.code().ok_or_else(|| Error::MalformedEnvelope {
            message: "missing domain status marker `code`".into(),
            body: preview(&self.body.to_string()),
        })
    }
}

fn decode_value<T: DeserializeOwned>(value: Value) -> Result<T, Error> {
    let body = preview(&value.to_string());
    serde_json::from_value(value).map_err(|e| Error::Deserialization {
        message: e.to_string(),
        body,
    })
}

// ── Envelope ────────────────────────────────────────────────────────

/// First string among the message keys the backend uses.
pub(crate) fn message_of(body: &Value) -> Option<&str> {
    ["message", "msg", "error"]
        .iter()
        .find_map(|k| body.get(*k).and_then(Value::as_str))
}

/// Decoded response: domain marker, message, and payload on success.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope<T> {
    pub code: i64,
    pub message: Option<String>,
    pub data: Option<T>,
}

/// Markers the backend uses for success. Most endpoints answer `0`;
/// the forecast endpoint answers `200`.
pub fn is_success_code(code: i64) -> bool {
    code == 0 || code == 200
}

impl<T> Envelope<T> {
    pub fn is_success(&self) -> bool {
        is_success_code(self.code)
    }

    /// The payload when the marker denotes success.
    pub fn into_success(self) -> Option<T> {
        if self.is_success() { self.data } else { None }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Envelope<U> {
        Envelope {
            code: self.code,
            message: self.message,
            data: self.data.map(f),
        }
    }
}

// ── Auth / user ─────────────────────────────────────────────────────

/// QR-code login ticket.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScanTicket {
    pub state: String,
    #[serde(default)]
    pub qrcode_url: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanState {
    Pending,
    Confirmed,
    Expired,
    NotFound,
    #[serde(other)]
    Unknown,
}

/// Poll result for a QR-code login ticket (top-level fields).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoginStatus {
    pub status: ScanState,
    #[serde(default)]
    pub remaining: Option<i64>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub user_info: Option<UserInfo>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UserInfo {
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub stocks_count: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileUpdate<'a> {
    pub nickname: &'a str,
    pub avatar_url: &'a str,
}

// ── Stocks ──────────────────────────────────────────────────────────

/// A row of the user's watch list as stored by the backend.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct StockRecord {
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub market: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub latest_price: Option<f64>,
    #[serde(default)]
    pub change_percent: Option<f64>,
    #[serde(default)]
    pub added_at: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Entry submitted to `/stocks/add`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct NewFavorite {
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market: Option<String>,
}

impl NewFavorite {
    pub fn code(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: None,
            market: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AddFavoritesResult {
    #[serde(default)]
    pub added: Vec<Value>,
    #[serde(default)]
    pub errors: Vec<Value>,
    #[serde(default)]
    pub total_added: u32,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RemoveFavoritesResult {
    #[serde(default)]
    pub deleted_codes: Vec<String>,
    #[serde(default)]
    pub total_deleted: u32,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ImageRecognition {
    #[serde(default)]
    pub stocks: Vec<Value>,
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub rejected: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct StockSummary {
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub market: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SearchResult {
    #[serde(default)]
    pub stocks: Vec<StockSummary>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct HotStock {
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub market: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub rank: Option<u32>,
    #[serde(default)]
    pub latest_price: Option<f64>,
    #[serde(default)]
    pub change_percent: Option<f64>,
}

// ── Market / tags / evaluation ──────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct IndexEntry {
    pub index: String,
    #[serde(default)]
    pub value: f64,
    #[serde(default)]
    pub change: Option<f64>,
    #[serde(default)]
    pub change_pct: f64,
}

/// A leading stock for a concept tag. `change_percent` arrives as either
/// a number or a numeric string, so it is kept raw.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct TagLeader {
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub market: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub latest_price: Option<Value>,
    #[serde(default)]
    pub change_percent: Option<Value>,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TagLeaders {
    #[serde(default)]
    pub leaders: Vec<TagLeader>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct EvaluationData {
    #[serde(default)]
    pub conclusion: Option<String>,
    #[serde(default)]
    pub evaluation_time: Option<String>,
    #[serde(default)]
    pub news_list: Option<Vec<Value>>,
    #[serde(default)]
    pub reason: Option<String>,
}

// ── News ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct NewsPagination {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub total_pages: Option<u32>,
    #[serde(default)]
    pub has_more: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct NewsList {
    #[serde(default)]
    pub news: Option<Vec<Value>>,
    #[serde(default)]
    pub pagination: Option<NewsPagination>,
}

// ── Push settings ───────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct PushSettingsData {
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub settings: BTreeMap<String, bool>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct PushSettingsUpdate<'a> {
    pub user_id: i64,
    pub settings: &'a BTreeMap<String, bool>,
}

// ── Update logs ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct UpdateLogQuery {
    pub page: u32,
    pub per_page: u32,
    pub update_type: Option<String>,
}

impl Default for UpdateLogQuery {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 10,
            update_type: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct UpdateLog {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub update_type: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct LogPagination {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub per_page: Option<u32>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub pages: Option<u32>,
    #[serde(default)]
    pub has_prev: Option<bool>,
    #[serde(default)]
    pub has_next: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UpdateLogPage {
    #[serde(default)]
    pub logs: Option<Vec<UpdateLog>>,
    #[serde(default)]
    pub pagination: Option<LogPagination>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UpdateTypes {
    #[serde(default)]
    pub types: Option<Vec<String>>,
}
