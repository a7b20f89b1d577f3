//! CLI configuration: thin wrapper around `stocklink_config`.
//!
//! Re-exports the shared types and adds resolution that respects
//! `GlobalOpts` flag overrides (--base-url, --timeout, --storage-dir).

use stocklink_core::ClientConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use stocklink_config::{Config, config_path, load_config, save_config};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Apply flag overrides on top of the loaded file + environment config.
///
/// The CLI's own version is the build token unless the config names one.
pub fn apply_overrides(mut cfg: Config, global: &GlobalOpts) -> Config {
    if let Some(ref url) = global.base_url {
        cfg.api.base_url.clone_from(url);
    }
    if let Some(timeout) = global.timeout {
        cfg.api.timeout_secs = timeout;
    }
    if let Some(ref dir) = global.storage_dir {
        cfg.storage.dir = Some(dir.clone());
    }
    cfg.app
        .version
        .get_or_insert_with(|| env!("CARGO_PKG_VERSION").to_owned());
    cfg
}

/// Load, override, and translate into the core runtime config.
pub fn resolve(global: &GlobalOpts) -> Result<ClientConfig, CliError> {
    let cfg = apply_overrides(load_config()?, global);
    Ok(cfg.to_client_config()?)
}
