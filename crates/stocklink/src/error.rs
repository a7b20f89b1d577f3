//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` variants into user-facing errors with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use stocklink_config::ConfigError;
use stocklink_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const REJECTED: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not reach the backend at {url}: {reason}")]
    #[diagnostic(
        code(stocklink::connection_failed),
        help(
            "Check your network connection and the configured backend URL.\n\
             URL: {url}\n\
             Override with: stocklink --base-url <URL> ..."
        )
    )]
    ConnectionFailed { url: String, reason: String },

    // ── Authentication ───────────────────────────────────────────────

    #[error("Not signed in")]
    #[diagnostic(
        code(stocklink::not_signed_in),
        help("Sign in with: stocklink session scan\nOr: stocklink session login --token <TOKEN>")
    )]
    NotSignedIn,

    #[error("The backend rejected the stored credential")]
    #[diagnostic(
        code(stocklink::auth_failed),
        help("The local session has been cleared. Sign in again with: stocklink session scan")
    )]
    AuthFailed,

    #[error("Login ticket expired before it was confirmed")]
    #[diagnostic(
        code(stocklink::scan_expired),
        help("Run `stocklink session scan` again and scan the new code promptly.")
    )]
    ScanExpired,

    // ── API ──────────────────────────────────────────────────────────

    #[error("Request rejected ({code}): {message}")]
    #[diagnostic(code(stocklink::rejected))]
    Rejected { code: i64, message: String },

    #[error("API error{}: {message}", http_suffix(.status.as_ref()))]
    #[diagnostic(code(stocklink::api_error), help("Run with -v for request details."))]
    ApiError {
        message: String,
        status: Option<u16>,
    },

    #[error("No data returned for {what}")]
    #[diagnostic(
        code(stocklink::no_data),
        help("The backend answered but had nothing to show. Run with -v for details.")
    )]
    NoData { what: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(stocklink::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error(transparent)]
    #[diagnostic(
        code(stocklink::config),
        help("Inspect the effective configuration with: stocklink config show")
    )]
    Config(#[from] ConfigError),

    // ── Interactive ──────────────────────────────────────────────────

    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(stocklink::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── Timeout ──────────────────────────────────────────────────────

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(stocklink::timeout),
        help("Increase timeout with --timeout or try again later.")
    )]
    Timeout { seconds: u64 },

    #[error("Request timed out")]
    #[diagnostic(
        code(stocklink::timeout),
        help("Increase timeout with --timeout or try again later.")
    )]
    TransportTimeout,

    // ── Internal / IO ────────────────────────────────────────────────

    #[error("Local storage failed: {0}")]
    #[diagnostic(
        code(stocklink::storage),
        help("Check permissions of the storage directory, or point --storage-dir elsewhere.")
    )]
    Storage(String),

    #[error("Internal error: {0}")]
    #[diagnostic(code(stocklink::internal))]
    Internal(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn http_suffix(status: Option<&u16>) -> String {
    status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::NotSignedIn | Self::AuthFailed | Self::ScanExpired => exit_code::AUTH,
            Self::Rejected { .. } | Self::NoData { .. } => exit_code::REJECTED,
            Self::Timeout { .. } | Self::TransportTimeout => exit_code::TIMEOUT,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed { url, reason },
            CoreError::Timeout { timeout_secs } => CliError::Timeout {
                seconds: timeout_secs,
            },
            CoreError::TransportTimeout => CliError::TransportTimeout,
            CoreError::Unauthorized => CliError::AuthFailed,
            CoreError::Rejected { code, message } => CliError::Rejected { code, message },
            CoreError::ValidationFailed { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },
            CoreError::Api { message, status } => CliError::ApiError { message, status },
            CoreError::Storage(e) => CliError::Storage(e.to_string()),
            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },
            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}
