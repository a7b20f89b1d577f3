// Product changelog endpoints

use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{Envelope, UpdateLogPage, UpdateLogQuery, UpdateTypes};

impl ApiClient {
    /// `GET /api/logs?page=&per_page=[&update_type=]`
    pub async fn update_logs(&self, query: &UpdateLogQuery) -> Result<Envelope<UpdateLogPage>, Error> {
        let mut params = vec![
            ("page", query.page.to_string()),
            ("per_page", query.per_page.to_string()),
        ];
        if let Some(kind) = query.update_type.as_deref().filter(|t| !t.trim().is_empty()) {
            params.push(("update_type", kind.to_owned()));
        }
        debug!(page = query.page, per_page = query.per_page, "fetching update logs");
        self.get("/api/logs", &params).await?.into_envelope()
    }

    /// `GET /api/logs/types`
    pub async fn update_types(&self) -> Result<Envelope<UpdateTypes>, Error> {
        debug!("fetching update types");
        self.get("/api/logs/types", &[]).await?.into_envelope()
    }
}
