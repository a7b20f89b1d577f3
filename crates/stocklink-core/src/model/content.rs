use serde::{Deserialize, Serialize};
use serde_json::Value;
use stocklink_api::models::{LogPagination, TagLeader, UpdateLog};

/// One page of news for a stock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsPage {
    pub list: Vec<Value>,
    pub total: u64,
    pub current_page: u32,
    pub total_pages: u32,
    pub has_more: bool,
}

impl Default for NewsPage {
    /// The page shown when nothing could be fetched.
    fn default() -> Self {
        Self {
            list: Vec::new(),
            total: 0,
            current_page: 1,
            total_pages: 1,
            has_more: false,
        }
    }
}

/// Leading stocks of a concept tag, strongest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TagStocks {
    pub description: String,
    pub stocks: Vec<TagLeader>,
}

/// AI verdict on recent news for a stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    pub conclusion: String,
    pub evaluation_time: String,
    pub news_list: Vec<Value>,
    pub reason: String,
}

impl Evaluation {
    pub const UNKNOWN_CONCLUSION: &'static str = "未知";
    pub const MISSING_REASON: &'static str = "暂无评估理由";
}

/// A page of the product changelog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateLogs {
    pub logs: Vec<UpdateLog>,
    pub pagination: LogPagination,
}
