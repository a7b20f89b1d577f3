// Watch-list and stock lookup endpoints

use serde_json::{Value, json};
use tracing::debug;

use crate::client::{ApiClient, require_non_blank};
use crate::error::Error;
use crate::models::{
    AddFavoritesResult, Envelope, HotStock, ImageRecognition, NewFavorite, RemoveFavoritesResult,
    SearchResult, StockRecord,
};

pub const DEFAULT_SEARCH_LIMIT: u32 = 10;
pub const DEFAULT_HOT_SYMBOL: &str = "国内人气榜";
pub const DEFAULT_HISTORY_YEARS: u32 = 3;
/// The backend refuses larger batches.
pub const MAX_ADD_BATCH: usize = 20;

impl ApiClient {
    /// The credential holder's watch list.
    ///
    /// `GET /api/stocks/get`
    pub async fn list_favorites(&self) -> Result<Envelope<Vec<StockRecord>>, Error> {
        debug!("listing favorites");
        self.get("/api/stocks/get", &[]).await?.into_envelope()
    }

    /// Add stocks to the watch list.
    ///
    /// `POST /api/stocks/add` with `{"stocks": [...]}`
    pub async fn add_favorites(
        &self,
        stocks: &[NewFavorite],
    ) -> Result<Envelope<AddFavoritesResult>, Error> {
        if stocks.is_empty() {
            return Err(Error::Validation {
                field: "stocks",
                reason: "at least one stock is required".into(),
            });
        }
        if stocks.len() > MAX_ADD_BATCH {
            return Err(Error::Validation {
                field: "stocks",
                reason: format!("at most {MAX_ADD_BATCH} stocks per request"),
            });
        }
        for stock in stocks {
            require_non_blank("code", &stock.code)?;
        }
        debug!(count = stocks.len(), "adding favorites");
        self.post("/api/stocks/add", Some(&json!({ "stocks": stocks })))
            .await?
            .into_envelope()
    }

    /// Remove stocks from the watch list.
    ///
    /// `POST /api/stocks/remove` with `{"codes": [...]}`
    pub async fn remove_favorites(
        &self,
        codes: &[String],
    ) -> Result<Envelope<RemoveFavoritesResult>, Error> {
        if codes.is_empty() {
            return Err(Error::Validation {
                field: "codes",
                reason: "at least one code is required".into(),
            });
        }
        for code in codes {
            require_non_blank("code", code)?;
        }
        debug!(count = codes.len(), "removing favorites");
        self.post("/api/stocks/remove", Some(&json!({ "codes": codes })))
            .await?
            .into_envelope()
    }

    /// Recognize stock names in a screenshot and stage them for adding.
    ///
    /// `POST /api/stocks/add_from_image` with `{"image": "<base64>"}`
    pub async fn add_favorites_from_image(
        &self,
        image_base64: &str,
    ) -> Result<Envelope<ImageRecognition>, Error> {
        let image = require_non_blank("image", image_base64)?;
        debug!(bytes = image.len(), "submitting watch-list screenshot");
        self.post("/api/stocks/add_from_image", Some(&json!({ "image": image })))
            .await?
            .into_envelope()
    }

    /// Commit the stocks staged by the last screenshot upload.
    ///
    /// `POST /api/stocks/confirm_from_image`
    pub async fn confirm_favorites_from_image(&self) -> Result<Envelope<Value>, Error> {
        debug!("confirming screenshot stocks");
        self.post("/api/stocks/confirm_from_image", None::<&Value>)
            .await?
            .into_envelope()
    }

    /// `GET /api/stocks/search?keyword=&limit=`
    pub async fn search_stocks(
        &self,
        keyword: &str,
        limit: u32,
    ) -> Result<Envelope<SearchResult>, Error> {
        let keyword = require_non_blank("keyword", keyword)?;
        debug!(keyword, limit, "searching stocks");
        self.get(
            "/api/stocks/search",
            &[("keyword", keyword.to_owned()), ("limit", limit.to_string())],
        )
        .await?
        .into_envelope()
    }

    /// Popularity ranking for a list symbol such as `国内人气榜`.
    ///
    /// `GET /api/stocks/hot?symbol=`
    pub async fn hot_stocks(&self, symbol: &str) -> Result<Envelope<Vec<HotStock>>, Error> {
        let symbol = require_non_blank("symbol", symbol)?;
        debug!(symbol, "fetching hot stocks");
        self.get("/api/stocks/hot", &[("symbol", symbol.to_owned())])
            .await?
            .into_envelope()
    }

    /// Daily price history.
    ///
    /// `GET /api/stocks/history?code=&years=`
    pub async fn stock_history(&self, code: &str, years: u32) -> Result<Envelope<Value>, Error> {
        let code = require_non_blank("code", code)?;
        debug!(code, years, "fetching price history");
        self.get(
            "/api/stocks/history",
            &[("code", code.to_owned()), ("years", years.to_string())],
        )
        .await?
        .into_envelope()
    }

    /// `GET /api/stocks/detail?code=`
    pub async fn stock_detail(&self, code: &str) -> Result<Envelope<Value>, Error> {
        let code = require_non_blank("code", code)?;
        debug!(code, "fetching stock detail");
        self.get("/api/stocks/detail", &[("code", code.to_owned())])
            .await?
            .into_envelope()
    }

    /// Earnings forecast. This endpoint marks success with `200`.
    ///
    /// `GET /api/stocks/forecast?code=`
    pub async fn stock_forecast(&self, code: &str) -> Result<Envelope<Vec<Value>>, Error> {
        let code = require_non_blank("code", code)?;
        debug!(code, "fetching forecast");
        self.get("/api/stocks/forecast", &[("code", code.to_owned())])
            .await?
            .into_envelope()
    }
}
