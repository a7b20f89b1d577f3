//! Clap derive structures for the `stocklink` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// stocklink -- watch lists, market data and AI news evaluation from AIStockLink
#[derive(Debug, Parser)]
#[command(
    name = "stocklink",
    version,
    about = "AIStockLink stock news from the command line",
    long_about = "Command-line client for the AIStockLink service.\n\n\
        Keeps a local session (credential, profile, watch list) between runs\n\
        and purges stale local caches whenever the client build changes.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Backend URL (overrides config)
    #[arg(long, env = "STOCKLINK_BASE_URL", global = true)]
    pub base_url: Option<String>,

    /// Directory holding the local session store (overrides config)
    #[arg(long, env = "STOCKLINK_STORAGE_DIR", global = true)]
    pub storage_dir: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "STOCKLINK_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Request timeout in seconds (overrides config)
    #[arg(long, env = "STOCKLINK_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in, inspect or end the local session
    #[command(alias = "s")]
    Session(SessionArgs),

    /// Manage the watch list
    #[command(alias = "fav", alias = "f")]
    Favorites(FavoritesArgs),

    /// Show the major index overview
    #[command(alias = "m")]
    Market,

    /// Search stocks by code or name
    Search {
        /// Code or name fragment
        keyword: String,

        /// Maximum number of results
        #[arg(long, short = 'n', default_value_t = stocklink_api::endpoints::DEFAULT_SEARCH_LIMIT)]
        limit: u32,
    },

    /// Show a popularity ranking
    Hot {
        /// Ranking name
        #[arg(long, default_value = stocklink_api::endpoints::DEFAULT_HOT_SYMBOL)]
        symbol: String,
    },

    /// Show one stock: detail, price history, or forecast
    Stock(StockArgs),

    /// Browse news for a stock or the watch list
    #[command(alias = "n")]
    News(NewsArgs),

    /// Show the leading stocks of a concept tag
    Tags {
        /// Tag name
        tag: String,
    },

    /// Show the AI evaluation of recent news for a stock
    Eva {
        /// Stock code
        code: String,

        /// Ask the backend to re-evaluate instead of returning its cached verdict
        #[arg(long)]
        refresh: bool,
    },

    /// Show a pushed WeChat message
    Wechat {
        /// Message id from the push link
        msgid: String,
    },

    /// Browse the product changelog
    Logs(LogsArgs),

    /// View or change WeChat push settings
    Push(PushArgs),

    /// Ask the assistant a question
    Chat {
        /// Question text
        query: String,
    },

    /// Inspect or purge local caches
    Cache(CacheArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Session ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SessionArgs {
    #[command(subcommand)]
    pub command: SessionCommand,
}

#[derive(Debug, Subcommand)]
pub enum SessionCommand {
    /// Show whether a session is held and who it belongs to
    Status,

    /// Re-validate the stored credential against the backend
    Restore,

    /// Store a credential obtained elsewhere and validate it
    Login {
        /// Bearer token
        #[arg(long, env = "STOCKLINK_TOKEN", hide_env_values = true)]
        token: String,
    },

    /// Sign in by scanning a QR code with WeChat
    Scan {
        /// Give up after this many seconds
        #[arg(long, default_value_t = 300)]
        wait: u64,
    },

    /// Change nickname and avatar
    Profile {
        #[arg(long)]
        nickname: String,

        #[arg(long, default_value = "")]
        avatar_url: String,
    },

    /// Forget the session and purge every local cache
    Logout,
}

// ── Favorites ────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct FavoritesArgs {
    #[command(subcommand)]
    pub command: FavoritesCommand,
}

#[derive(Debug, Subcommand)]
pub enum FavoritesCommand {
    /// List the watch list
    #[command(alias = "ls")]
    List {
        /// Print the locally cached list without asking the backend
        #[arg(long)]
        cached: bool,
    },

    /// Add stocks by code
    Add {
        /// Stock codes
        #[arg(required = true)]
        codes: Vec<String>,
    },

    /// Remove stocks by code
    #[command(alias = "rm")]
    Remove {
        /// Stock codes
        #[arg(required = true)]
        codes: Vec<String>,
    },

    /// Recognize stocks in a watch-list screenshot
    Import {
        /// Image file (PNG, JPEG, or WebP)
        image: PathBuf,
    },

    /// Add the stocks recognized by the last import
    Confirm,
}

// ── Stock ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct StockArgs {
    #[command(subcommand)]
    pub command: StockCommand,
}

#[derive(Debug, Subcommand)]
pub enum StockCommand {
    /// Quote and company detail
    Detail { code: String },

    /// Daily price history
    History {
        code: String,

        /// Number of years to fetch
        #[arg(long, default_value_t = stocklink_api::endpoints::DEFAULT_HISTORY_YEARS)]
        years: u32,
    },

    /// Price forecast
    Forecast { code: String },
}

// ── News ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct NewsArgs {
    #[command(subcommand)]
    pub command: NewsCommand,
}

#[derive(Debug, Subcommand)]
pub enum NewsCommand {
    /// News for one stock
    #[command(alias = "ls")]
    List {
        /// Stock code
        code: String,

        #[arg(long, default_value_t = 1)]
        page: u32,

        #[arg(long, default_value_t = 10)]
        limit: u32,
    },

    /// News pushed for the watch list
    Pushed {
        #[arg(long, default_value_t = 1)]
        page: u32,

        #[arg(long, default_value_t = 10)]
        limit: u32,
    },

    /// Full article
    Detail {
        /// News id
        id: String,
    },
}

// ── Logs ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct LogsArgs {
    #[command(subcommand)]
    pub command: LogsCommand,
}

#[derive(Debug, Subcommand)]
pub enum LogsCommand {
    /// One page of changelog entries
    #[command(alias = "ls")]
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,

        #[arg(long, default_value_t = 10)]
        per_page: u32,

        /// Only entries of this type
        #[arg(long = "type")]
        update_type: Option<String>,
    },

    /// Known changelog entry types
    Types,
}

// ── Push settings ────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct PushArgs {
    #[command(subcommand)]
    pub command: PushCommand,
}

#[derive(Debug, Subcommand)]
pub enum PushCommand {
    /// Show push settings of the signed-in user
    Get,

    /// Turn push categories on or off
    Set {
        /// `name=on|off` pairs, e.g. `morning=on`
        #[arg(required = true, value_parser = parse_toggle)]
        toggles: Vec<(String, bool)>,
    },
}

fn parse_toggle(raw: &str) -> Result<(String, bool), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected name=on|off, got '{raw}'"))?;
    let enabled = match value.to_ascii_lowercase().as_str() {
        "on" | "true" | "1" | "yes" => true,
        "off" | "false" | "0" | "no" => false,
        other => return Err(format!("expected on or off, got '{other}'")),
    };
    if name.trim().is_empty() {
        return Err("setting name must not be empty".into());
    }
    Ok((name.trim().to_owned(), enabled))
}

// ── Cache ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub command: CacheCommand,
}

#[derive(Debug, Subcommand)]
pub enum CacheCommand {
    /// Show the running build token and the recorded one
    Status,

    /// Purge stale caches if the build changed
    Reconcile,

    /// Clear every local cache, including the session
    Purge,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the effective configuration
    Show,

    /// Print the config file path
    Path,

    /// Write a config file, prompting for values
    Init {
        /// Backend URL to store (skips the prompt)
        #[arg(long)]
        base_url: Option<String>,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
