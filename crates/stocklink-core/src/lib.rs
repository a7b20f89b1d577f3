// stocklink-core: Session state, action protocols, and cache lifecycle
// between stocklink-api and consumers (CLI).

pub mod cache;
pub mod config;
pub mod context;
pub mod convert;
pub mod error;
pub mod guard;
pub mod model;
pub mod store;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use cache::{BuildVersion, CacheManager, MemoryResponseCaches, ResponseCaches, VersionSource};
pub use config::{ClientConfig, StorageLocation};
pub use context::AppContext;
pub use error::CoreError;
pub use guard::{Navigation, NavigationGuard, RouteMeta, RouteTarget};
pub use store::StateStore;
pub use stream::StateStream;

// Re-export model types at the crate root for ergonomics.
pub use model::{
    // Session
    FavoriteStock, ScanLoginOutcome, SessionState, UserProfile,
    // Market / content
    Evaluation, IndexQuote, MarketOverview, NewsPage, TagStocks, UpdateLogs,
    // Pushed messages
    NewsDigest, StockPush, WechatMessage, WechatNewsItem,
};
