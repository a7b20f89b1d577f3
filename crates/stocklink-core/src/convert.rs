// ── Wire-to-domain conversions ──
//
// Normalization from stocklink-api wire types into the shapes the
// store commits. Pure functions; no I/O.

use std::cmp::Ordering;

use serde_json::Value;
use stocklink_api::models::{
    EvaluationData, IndexEntry, NewsList, StockRecord, TagLeaders, UpdateLogPage, UserInfo,
};

use crate::model::{
    Evaluation, FavoriteStock, IndexQuote, MarketOverview, NewsPage, TagStocks, UpdateLogs,
    UserProfile, canonical_index_key,
};

// ── Session ─────────────────────────────────────────────────────────

impl From<UserInfo> for UserProfile {
    fn from(info: UserInfo) -> Self {
        Self {
            id: info.user_id,
            name: info.nickname,
            avatar: info.avatar_url,
            role: info.role,
            created_at: info.created_at,
            stocks_count: info.stocks_count,
        }
    }
}

impl From<StockRecord> for FavoriteStock {
    fn from(rec: StockRecord) -> Self {
        Self {
            code: rec.code,
            name: rec.name,
            market: rec.market,
            industry: rec.industry,
            latest_price: rec.latest_price,
            change_percent: rec.change_percent,
            added_at: rec.added_at,
        }
    }
}

// ── Market ──────────────────────────────────────────────────────────

/// Key each index by its canonical name. Later duplicates win.
pub fn market_overview(entries: Vec<IndexEntry>) -> MarketOverview {
    entries
        .into_iter()
        .map(|e| {
            (
                canonical_index_key(&e.index),
                IndexQuote {
                    value: e.value,
                    change: e.change_pct,
                },
            )
        })
        .collect()
}

// ── News ────────────────────────────────────────────────────────────

impl From<NewsList> for NewsPage {
    fn from(raw: NewsList) -> Self {
        let defaults = NewsPage::default();
        let pagination = raw.pagination.unwrap_or_default();
        Self {
            list: raw.news.unwrap_or_default(),
            total: pagination.total.unwrap_or(defaults.total),
            // Zero is treated as absent.
            current_page: pagination
                .page
                .filter(|p| *p != 0)
                .unwrap_or(defaults.current_page),
            total_pages: pagination
                .total_pages
                .filter(|p| *p != 0)
                .unwrap_or(defaults.total_pages),
            has_more: pagination.has_more.unwrap_or(defaults.has_more),
        }
    }
}

// ── Tags ────────────────────────────────────────────────────────────

/// Leaders sorted by percent change, strongest first. The sort is stable,
/// so ties keep backend order. Unparseable changes count as zero, and
/// `-0` ties with `0`.
pub fn tag_stocks(raw: TagLeaders) -> TagStocks {
    let mut stocks = raw.leaders;
    stocks.sort_by(|a, b| {
        let a = change_percent(a.change_percent.as_ref());
        let b = change_percent(b.change_percent.as_ref());
        // Both sides are finite, so this never falls back.
        b.partial_cmp(&a).unwrap_or(Ordering::Equal)
    });
    TagStocks {
        description: raw.description.unwrap_or_default(),
        stocks,
    }
}

/// Numeric value of a percent-change field: numbers as-is, strings by
/// their leading decimal prefix (`"5.5%"` is 5.5), everything else 0.
pub fn change_percent(value: Option<&Value>) -> f64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => leading_float(s),
        _ => None,
    };
    parsed.filter(|f| f.is_finite()).unwrap_or(0.0)
}

fn leading_float(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    while let Some(&b) = bytes.get(end) {
        match b {
            b'0'..=b'9' => seen_digit = true,
            b'.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end += 1;
    }
    if !seen_digit {
        return None;
    }
    s.get(..end)?.parse().ok()
}

// ── Evaluation ──────────────────────────────────────────────────────

impl From<EvaluationData> for Evaluation {
    fn from(raw: EvaluationData) -> Self {
        let non_empty = |s: Option<String>| s.filter(|s| !s.is_empty());
        Self {
            conclusion: non_empty(raw.conclusion)
                .unwrap_or_else(|| Self::UNKNOWN_CONCLUSION.to_owned()),
            evaluation_time: raw.evaluation_time.unwrap_or_default(),
            news_list: raw.news_list.unwrap_or_default(),
            reason: non_empty(raw.reason).unwrap_or_else(|| Self::MISSING_REASON.to_owned()),
        }
    }
}

// ── Update logs ─────────────────────────────────────────────────────

impl From<UpdateLogPage> for UpdateLogs {
    fn from(raw: UpdateLogPage) -> Self {
        Self {
            logs: raw.logs.unwrap_or_default(),
            pagination: raw.pagination.unwrap_or_default(),
        }
    }
}
