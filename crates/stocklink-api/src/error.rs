use thiserror::Error;

use crate::storage::StorageError;

/// Top-level error type for the `stocklink-api` crate.
///
/// Covers every failure mode of the transport and the endpoint functions:
/// network, timeout, HTTP status, envelope shape, and caller input.
/// Domain-level rejections (an envelope whose `code` marks failure) are
/// *not* errors here; they surface as [`Envelope::is_success`] returning
/// `false`.
///
/// [`Envelope::is_success`]: crate::models::Envelope::is_success
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, TLS, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Request did not complete before its deadline.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ── HTTP status ─────────────────────────────────────────────────
    /// The backend rejected the credential (HTTP 401).
    ///
    /// The persisted credential and profile have already been removed
    /// from durable storage by the time this is returned.
    #[error("Unauthorized -- credential missing, expired, or revoked")]
    Unauthorized,

    /// Any other non-2xx status.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// The body was not a JSON object we can treat as an envelope.
    #[error("Malformed response envelope: {message}")]
    MalformedEnvelope { message: String, body: String },

    /// The envelope was fine but its payload did not match the expected type.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    // ── Caller input ────────────────────────────────────────────────
    /// Rejected before any network call was made.
    #[error("Invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    // ── Storage ─────────────────────────────────────────────────────
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl Error {
    /// Returns `true` if the backend answered 401.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    /// Returns `true` if the request never reached the network.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout { .. } => true,
            Self::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// The HTTP status associated with this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized => Some(401),
            Self::Http { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
