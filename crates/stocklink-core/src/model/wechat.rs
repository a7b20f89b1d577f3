// ── Pushed WeChat messages ──
//
// The lookup endpoint answers with one of three shapes: a single-stock
// push with top-level fields, an enveloped `{code, data}` result, or a
// bag of optional news-category arrays. `WechatMessage::classify` is the
// only place that looks at the raw body.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const CATEGORY_KEYS: [&str; 4] = ["top_news", "hk_us_news", "good_news", "bad_news"];

/// Normalized pushed message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WechatMessage {
    /// News about one stock.
    Stock(StockPush),
    /// Daily digest grouped by category.
    Digest(NewsDigest),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockPush {
    pub stock_id: String,
    pub stock_name: String,
    pub id: Option<String>,
    pub date: String,
    pub title: String,
    pub content: String,
    pub evaluation: Option<String>,
    pub reason: Option<String>,
    pub link: Option<String>,
    pub published_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsDigest {
    pub date: String,
    pub top_news: Vec<WechatNewsItem>,
    pub hk_us_news: Vec<WechatNewsItem>,
    pub good_news: Vec<WechatNewsItem>,
    pub bad_news: Vec<WechatNewsItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WechatNewsItem {
    pub id: Option<String>,
    pub title: String,
    pub content: Option<String>,
    pub evaluation: Option<String>,
    pub sector: Option<String>,
    pub reason: Option<String>,
    pub link: Option<String>,
    pub published_at: Option<String>,
}

impl Default for WechatMessage {
    fn default() -> Self {
        Self::empty()
    }
}

impl WechatMessage {
    /// The canonical "nothing to show" shape.
    pub fn empty() -> Self {
        Self::Digest(NewsDigest::default())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Stock(_) => false,
            Self::Digest(d) => {
                d.date.is_empty()
                    && d.top_news.is_empty()
                    && d.hk_us_news.is_empty()
                    && d.good_news.is_empty()
                    && d.bad_news.is_empty()
            }
        }
    }

    /// Classify a raw body.
    ///
    /// Checked in order: single-stock fields, a successful `{code: 0, data}`
    /// envelope (whose `data` is classified in turn), then any news
    /// category. Anything else is `None`.
    pub fn classify(body: &Value) -> Option<Self> {
        let obj = body.as_object()?;

        if truthy(obj.get("stock_id")) && truthy(obj.get("stock_name")) {
            return Some(Self::Stock(stock_push(obj)));
        }

        if obj.get("code").and_then(Value::as_i64) == Some(0) && truthy(obj.get("data")) {
            let data = obj.get("data")?;
            return Some(Self::classify_inner(data).unwrap_or_else(|| match data.as_object() {
                Some(inner) => Self::Digest(digest(inner)),
                None => Self::empty(),
            }));
        }

        Self::classify_inner(body)
    }

    fn classify_inner(body: &Value) -> Option<Self> {
        let obj = body.as_object()?;
        if truthy(obj.get("stock_id")) && truthy(obj.get("stock_name")) {
            return Some(Self::Stock(stock_push(obj)));
        }
        if CATEGORY_KEYS.iter().any(|k| truthy(obj.get(*k))) {
            return Some(Self::Digest(digest(obj)));
        }
        None
    }
}

// ── Field extraction ─────────────────────────────────────────────────

/// Loose truthiness: null, `false`, `0`, and `""` are false; arrays and
/// objects are true even when empty.
fn truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_) | Value::Object(_)) => true,
    }
}

/// Strings as-is, numbers stringified, anything else absent.
fn text(obj: &Map<String, Value>, key: &str) -> Option<String> {
    match obj.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn stock_push(obj: &Map<String, Value>) -> StockPush {
    StockPush {
        stock_id: text(obj, "stock_id").unwrap_or_default(),
        stock_name: text(obj, "stock_name").unwrap_or_default(),
        id: text(obj, "id"),
        date: text(obj, "date").unwrap_or_default(),
        title: text(obj, "title").unwrap_or_default(),
        content: text(obj, "content").unwrap_or_default(),
        evaluation: text(obj, "evaluation"),
        reason: text(obj, "reason"),
        link: text(obj, "link"),
        published_at: text(obj, "published_at"),
    }
}

fn digest(obj: &Map<String, Value>) -> NewsDigest {
    let items = |key: &str| -> Vec<WechatNewsItem> {
        obj.get(key)
            .and_then(Value::as_array)
            .map(|arr| arr.iter().filter_map(Value::as_object).map(news_item).collect())
            .unwrap_or_default()
    };
    NewsDigest {
        date: text(obj, "date").unwrap_or_default(),
        top_news: items("top_news"),
        hk_us_news: items("hk_us_news"),
        good_news: items("good_news"),
        bad_news: items("bad_news"),
    }
}

fn news_item(obj: &Map<String, Value>) -> WechatNewsItem {
    WechatNewsItem {
        id: text(obj, "id"),
        title: text(obj, "title").unwrap_or_default(),
        content: text(obj, "content"),
        evaluation: text(obj, "evaluation"),
        sector: text(obj, "sector"),
        reason: text(obj, "reason"),
        link: text(obj, "link"),
        published_at: text(obj, "published_at"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn single_stock_push_is_recognized() {
        let body = json!({
            "stock_id": 600519,
            "stock_name": "贵州茅台",
            "title": "t",
            "content": "c",
            "date": "2025-05-01",
            "evaluation": "利好"
        });
        let WechatMessage::Stock(push) = WechatMessage::classify(&body).unwrap() else {
            panic!("expected stock push");
        };
        assert_eq!(push.stock_id, "600519");
        assert_eq!(push.evaluation.as_deref(), Some("利好"));
    }

    #[test]
    fn enveloped_digest_is_unwrapped() {
        let body = json!({
            "code": 0,
            "data": { "date": "2025-05-01", "top_news": [{ "title": "a", "sector": "科技" }] }
        });
        let WechatMessage::Digest(d) = WechatMessage::classify(&body).unwrap() else {
            panic!("expected digest");
        };
        assert_eq!(d.date, "2025-05-01");
        assert_eq!(d.top_news[0].sector.as_deref(), Some("科技"));
        assert!(d.hk_us_news.is_empty());
    }

    #[test]
    fn category_bag_with_only_bad_news_is_a_digest() {
        let body = json!({ "bad_news": [] });
        let msg = WechatMessage::classify(&body).unwrap();
        assert!(matches!(msg, WechatMessage::Digest(_)));
        assert!(msg.is_empty());
    }

    #[test]
    fn unrecognized_shapes_are_none() {
        assert!(WechatMessage::classify(&json!({ "code": 1, "msg": "x" })).is_none());
        assert!(WechatMessage::classify(&json!({ "stock_id": "1", "stock_name": "" })).is_none());
        assert!(WechatMessage::classify(&json!([1])).is_none());
    }

    #[test]
    fn empty_shape_serializes_with_kind_tag() {
        let v = serde_json::to_value(WechatMessage::empty()).unwrap();
        assert_eq!(v["kind"], "digest");
        assert_eq!(v["date"], "");
        assert_eq!(v["top_news"], json!([]));
    }
}
