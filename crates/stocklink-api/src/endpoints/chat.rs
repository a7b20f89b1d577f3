use serde_json::json;
use tracing::debug;

use crate::client::{ApiClient, require_non_blank};
use crate::error::Error;
use crate::models::Envelope;

impl ApiClient {
    /// Ask the assistant a free-form question.
    ///
    /// `POST /api/chat/query` with `{"query": "..."}`
    pub async fn chat_query(&self, query: &str) -> Result<Envelope<serde_json::Value>, Error> {
        let query = require_non_blank("query", query)?;
        debug!(chars = query.chars().count(), "sending chat query");
        self.post("/api/chat/query", Some(&json!({ "query": query })))
            .await?
            .into_envelope()
    }
}
