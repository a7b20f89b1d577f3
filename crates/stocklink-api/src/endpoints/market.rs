// Market overview, concept tags, and AI evaluation

use tracing::debug;

use crate::client::{ApiClient, require_non_blank};
use crate::error::Error;
use crate::models::{Envelope, EvaluationData, IndexEntry, TagLeaders};

impl ApiClient {
    /// Major index quotes, keyed by display name.
    ///
    /// `GET /api/market/overview`
    pub async fn market_overview(&self) -> Result<Envelope<Vec<IndexEntry>>, Error> {
        debug!("fetching market overview");
        self.get("/api/market/overview", &[]).await?.into_envelope()
    }

    /// Leading stocks for a concept tag.
    ///
    /// `GET /api/tags/leaders?tag=`
    pub async fn tag_leaders(&self, tag: &str) -> Result<Envelope<TagLeaders>, Error> {
        let tag = require_non_blank("tag", tag)?;
        debug!(tag, "fetching tag leaders");
        self.get("/api/tags/leaders", &[("tag", tag.to_owned())])
            .await?
            .into_envelope()
    }

    /// AI sentiment evaluation of recent news. `refresh` bypasses the
    /// backend's cached verdict.
    ///
    /// `GET /api/eva?code=&refresh=0|1`
    pub async fn evaluation(
        &self,
        code: &str,
        refresh: bool,
    ) -> Result<Envelope<EvaluationData>, Error> {
        let code = require_non_blank("code", code)?;
        debug!(code, refresh, "fetching evaluation");
        self.get(
            "/api/eva",
            &[
                ("code", code.to_owned()),
                ("refresh", u8::from(refresh).to_string()),
            ],
        )
        .await?
        .into_envelope()
    }
}
