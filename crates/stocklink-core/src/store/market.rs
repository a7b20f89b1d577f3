// Market overview action.

use std::sync::Arc;

use tracing::{debug, warn};

use super::StateStore;
use crate::convert;
use crate::model::MarketOverview;

impl StateStore {
    /// Rebuild the overview from the backend.
    ///
    /// Never leaves the overview empty: on any failure the fixed fallback
    /// snapshot is committed instead and returned.
    pub async fn fetch_market_overview(&self) -> Arc<MarketOverview> {
        let overview = match self.observe(self.api.market_overview().await) {
            Ok(env) if env.is_success() => {
                let overview = convert::market_overview(env.data.unwrap_or_default());
                if overview.is_empty() {
                    warn!("market overview came back empty; using fallback");
                    MarketOverview::fallback()
                } else {
                    debug!(indices = overview.len(), "market overview refreshed");
                    overview
                }
            }
            Ok(env) => {
                warn!(code = env.code, "market overview rejected; using fallback");
                MarketOverview::fallback()
            }
            Err(e) => {
                warn!(error = %e, "market overview failed; using fallback");
                MarketOverview::fallback()
            }
        };
        self.commit_market(overview)
    }
}
