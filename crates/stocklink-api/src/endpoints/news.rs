// News endpoints

use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use crate::client::{ApiClient, RequestOptions, require_non_blank};
use crate::error::Error;
use crate::models::{Envelope, NewsList};

/// News detail is generated on demand and can take minutes.
pub const NEWS_DETAIL_TIMEOUT: Duration = Duration::from_secs(300);

impl ApiClient {
    /// News for one stock.
    ///
    /// `GET /api/news/get?code=&page=&limit=`
    pub async fn stock_news(
        &self,
        code: &str,
        page: u32,
        limit: u32,
    ) -> Result<Envelope<NewsList>, Error> {
        let code = require_non_blank("code", code)?;
        debug!(code, page, limit, "fetching stock news");
        self.get(
            "/api/news/get",
            &[
                ("code", code.to_owned()),
                ("page", page.to_string()),
                ("limit", limit.to_string()),
            ],
        )
        .await?
        .into_envelope()
    }

    /// News pushed for the credential holder's watch list.
    ///
    /// `GET /api/news/pushnews?page=&limit=`
    pub async fn push_news(&self, page: u32, limit: u32) -> Result<Envelope<Value>, Error> {
        debug!(page, limit, "fetching push news");
        self.get(
            "/api/news/pushnews",
            &[("page", page.to_string()), ("limit", limit.to_string())],
        )
        .await?
        .into_envelope()
    }

    /// Full article with AI analysis.
    ///
    /// `GET /api/news/detail?id=`, with a 300 s deadline.
    pub async fn news_detail(&self, id: &str) -> Result<Envelope<Value>, Error> {
        let id = require_non_blank("id", id)?;
        debug!(id, "fetching news detail");
        self.get_with(
            "/api/news/detail",
            &[("id", id.to_owned())],
            RequestOptions::with_timeout(NEWS_DETAIL_TIMEOUT),
        )
        .await?
        .into_envelope()
    }
}
