//! Configuration for the stocklink CLI.
//!
//! TOML file + `STOCKLINK_*` environment layering, and translation to
//! `stocklink_core::ClientConfig`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use stocklink_api::transport::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use stocklink_core::{BuildVersion, ClientConfig, StorageLocation};

/// File name of the durable key-value document inside the storage dir.
pub const STORAGE_FILE: &str = "storage.json";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiSettings,

    #[serde(default)]
    pub storage: StorageSettings,

    #[serde(default)]
    pub app: AppSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ApiSettings {
    /// Backend root URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request deadline in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    pub user_agent: Option<String>,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            user_agent: None,
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.into()
}
fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct StorageSettings {
    /// Directory for durable storage. Platform data dir when unset.
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct AppSettings {
    /// Explicit build token for cache reconciliation.
    pub version: Option<String>,
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("cn", "aistocklink", "stocklink")
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || home_fallback(".config").join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Default directory for durable storage.
pub fn data_dir() -> PathBuf {
    project_dirs().map_or_else(
        || home_fallback(".local/share"),
        |dirs| dirs.data_dir().to_path_buf(),
    )
}

fn home_fallback(sub: &str) -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(sub);
    p.push("stocklink");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file path + environment. A missing file is
/// not an error; defaults apply.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("STOCKLINK_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if loading fails.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Translation ─────────────────────────────────────────────────────

impl Config {
    /// Where durable storage lives for this configuration.
    pub fn storage_path(&self) -> PathBuf {
        self.storage
            .dir
            .clone()
            .unwrap_or_else(data_dir)
            .join(STORAGE_FILE)
    }

    /// Build the core runtime config.
    pub fn to_client_config(&self) -> Result<ClientConfig, ConfigError> {
        let base_url: url::Url =
            self.api
                .base_url
                .parse()
                .map_err(|_| ConfigError::Validation {
                    field: "api.base_url".into(),
                    reason: format!("invalid URL: {}", self.api.base_url),
                })?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ConfigError::Validation {
                field: "api.base_url".into(),
                reason: format!("unsupported scheme '{}'", base_url.scheme()),
            });
        }
        if self.api.timeout_secs == 0 {
            return Err(ConfigError::Validation {
                field: "api.timeout_secs".into(),
                reason: "must be greater than zero".into(),
            });
        }

        Ok(ClientConfig {
            base_url,
            timeout: Duration::from_secs(self.api.timeout_secs),
            user_agent: self.api.user_agent.clone(),
            storage: StorageLocation::File(self.storage_path()),
            build_version: BuildVersion::resolve(self.app.version.as_deref()),
        })
    }
}
