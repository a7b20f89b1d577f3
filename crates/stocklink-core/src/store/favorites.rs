// Watch-list actions.
//
// Mutations never patch the held list: a successful add or remove is
// followed by a full re-fetch so the backend stays the source of truth.

use serde_json::Value;
use tracing::{debug, warn};

use super::StateStore;
use crate::model::{
    AddFavoritesResult, FavoriteStock, ImageRecognition, NewFavorite, RemoveFavoritesResult,
};

impl StateStore {
    /// Replace the held watch list with the backend's.
    ///
    /// Returns `false` on any failure; the previous list is kept.
    pub async fn fetch_favorites(&self) -> bool {
        match self.observe(self.api.list_favorites().await) {
            Ok(env) if env.is_success() => {
                let list: Vec<FavoriteStock> = env
                    .data
                    .unwrap_or_default()
                    .into_iter()
                    .map(FavoriteStock::from)
                    .collect();
                debug!(count = list.len(), "favorites replaced");
                self.commit_favorites(list);
                true
            }
            Ok(env) => {
                warn!(code = env.code, message = ?env.message, "favorites fetch rejected");
                false
            }
            Err(e) => {
                warn!(error = %e, "favorites fetch failed");
                false
            }
        }
    }

    /// Add stocks, then re-fetch. `None` on any failure.
    pub async fn add_favorites(&self, stocks: &[NewFavorite]) -> Option<AddFavoritesResult> {
        match self.observe(self.api.add_favorites(stocks).await) {
            Ok(env) if env.is_success() => {
                self.fetch_favorites().await;
                Some(env.data.unwrap_or_default())
            }
            Ok(env) => {
                warn!(code = env.code, message = ?env.message, "add favorites rejected");
                None
            }
            Err(e) => {
                warn!(error = %e, "add favorites failed");
                None
            }
        }
    }

    /// Remove stocks by code, then re-fetch. `None` on any failure.
    pub async fn remove_favorites(&self, codes: &[String]) -> Option<RemoveFavoritesResult> {
        match self.observe(self.api.remove_favorites(codes).await) {
            Ok(env) if env.is_success() => {
                self.fetch_favorites().await;
                Some(env.data.unwrap_or_default())
            }
            Ok(env) => {
                warn!(code = env.code, message = ?env.message, "remove favorites rejected");
                None
            }
            Err(e) => {
                warn!(error = %e, "remove favorites failed");
                None
            }
        }
    }

    /// Upload a watch-list screenshot, then re-fetch.
    pub async fn add_favorites_from_image(&self, image_base64: &str) -> Option<ImageRecognition> {
        match self.observe(self.api.add_favorites_from_image(image_base64).await) {
            Ok(env) if env.is_success() => {
                self.fetch_favorites().await;
                Some(env.data.unwrap_or_default())
            }
            Ok(env) => {
                warn!(code = env.code, message = ?env.message, "screenshot upload rejected");
                None
            }
            Err(e) => {
                warn!(error = %e, "screenshot upload failed");
                None
            }
        }
    }

    /// Commit the stocks staged by the last screenshot, then re-fetch.
    pub async fn confirm_favorites_from_image(&self) -> Option<Value> {
        match self.observe(self.api.confirm_favorites_from_image().await) {
            Ok(env) if env.is_success() => {
                self.fetch_favorites().await;
                Some(env.data.unwrap_or(Value::Null))
            }
            Ok(env) => {
                warn!(code = env.code, message = ?env.message, "screenshot confirm rejected");
                None
            }
            Err(e) => {
                warn!(error = %e, "screenshot confirm failed");
                None
            }
        }
    }
}
