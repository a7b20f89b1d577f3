// Typed endpoint functions, one module per backend resource.
//
// Each function is a thin mapping from typed arguments to a single
// transport call: no retries, no caching, no state. Blank identifiers
// are rejected before the request is built.

mod auth;
mod chat;
mod logs;
mod market;
mod news;
mod stocks;
mod wechat;

pub use news::NEWS_DETAIL_TIMEOUT;
pub use stocks::{
    DEFAULT_HISTORY_YEARS, DEFAULT_HOT_SYMBOL, DEFAULT_SEARCH_LIMIT, MAX_ADD_BATCH,
};
