// ── Domain model ──
//
// Normalized shapes committed to the store or handed to consumers.
// Wire types stay in stocklink-api; `crate::convert` maps between them.

mod content;
mod market;
mod session;
mod stock;
mod wechat;

pub use content::{Evaluation, NewsPage, TagStocks, UpdateLogs};
pub use market::{IndexQuote, MarketOverview, canonical_index_key};
pub use session::{ScanLoginOutcome, SessionState, UserProfile};
pub use stock::{FavoriteStock, dedup_by_code};
pub use wechat::{NewsDigest, StockPush, WechatMessage, WechatNewsItem};

// Wire types that need no normalization are exposed as-is.
pub use stocklink_api::models::{
    AddFavoritesResult, HotStock, ImageRecognition, LogPagination, NewFavorite,
    PushSettingsData as PushSettings, RemoveFavoritesResult, ScanTicket, StockSummary, TagLeader,
    UpdateLog, UpdateLogQuery,
};
