// ── Core error types ──
//
// User-facing errors from stocklink-core. Consumers never see raw HTTP
// or JSON failures; the `From<stocklink_api::Error>` impl translates
// transport-layer errors into domain-appropriate variants.

use stocklink_api::StorageError;
use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach backend at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// The HTTP stack gave up on its own; no deadline of ours is known.
    #[error("Request timed out")]
    TransportTimeout,

    #[error("Not signed in, or the session has expired")]
    Unauthorized,

    // ── Operation errors ─────────────────────────────────────────────
    /// The backend answered with a domain-level failure marker.
    #[error("Rejected by backend (code {code}): {message}")]
    Rejected { code: i64, message: String },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Local state ──────────────────────────────────────────────────
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::TransportTimeout)
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<stocklink_api::Error> for CoreError {
    fn from(err: stocklink_api::Error) -> Self {
        match err {
            stocklink_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::TransportTimeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map(|u| u.to_string())
                            .unwrap_or_else(|| "<unknown>".into()),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            stocklink_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            stocklink_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            stocklink_api::Error::Unauthorized => CoreError::Unauthorized,
            stocklink_api::Error::Http { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            stocklink_api::Error::MalformedEnvelope { message, body: _ } => CoreError::Api {
                message: format!("Malformed response: {message}"),
                status: None,
            },
            stocklink_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
            stocklink_api::Error::Validation { field, reason } => CoreError::ValidationFailed {
                message: format!("{field} {reason}"),
            },
            stocklink_api::Error::Storage(e) => CoreError::Storage(e),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::CoreError;

    #[test]
    fn api_errors_map_to_user_facing_variants() {
        let err: CoreError = stocklink_api::Error::Unauthorized.into();
        assert!(err.is_unauthorized());

        let err: CoreError = stocklink_api::Error::Timeout { timeout_secs: 180 }.into();
        assert!(matches!(err, CoreError::Timeout { timeout_secs: 180 }));
        assert_eq!(err.to_string(), "Request timed out after 180s");

        let err: CoreError = stocklink_api::Error::Validation {
            field: "msg_id",
            reason: "must not be blank".into(),
        }
        .into();
        assert_eq!(err.to_string(), "Validation failed: msg_id must not be blank");

        let err: CoreError = stocklink_api::Error::Http {
            status: 503,
            message: "busy".into(),
        }
        .into();
        assert!(matches!(err, CoreError::Api { status: Some(503), .. }));
    }

    #[tokio::test]
    async fn http_stack_timeout_message_has_no_deadline() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::any())
            .respond_with(
                wiremock::ResponseTemplate::new(200).set_delay(std::time::Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let transport = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(50))
            .build()
            .unwrap()
            .get(server.uri())
            .send()
            .await
            .unwrap_err();
        assert!(transport.is_timeout());

        let err: CoreError = stocklink_api::Error::Transport(transport).into();
        assert!(matches!(err, CoreError::TransportTimeout));
        assert!(err.is_timeout());
        assert_eq!(err.to_string(), "Request timed out");
    }
}
