//! Command dispatch: bridges CLI args -> store actions -> output formatting.

pub mod cache;
pub mod config_cmd;
pub mod favorites;
pub mod logs;
pub mod market;
pub mod news;
pub mod push;
pub mod session;
pub mod stocks;
pub mod util;
pub mod wechat;

use stocklink_core::AppContext;

use crate::cli::{Command, GlobalOpts, SessionCommand};
use crate::error::CliError;

/// Whether start-up should re-validate a stored credential before `cmd`.
///
/// Session commands manage the credential themselves; cache commands
/// must not trigger network traffic.
pub fn wants_restore(cmd: &Command) -> bool {
    match cmd {
        Command::Session(args) => matches!(args.command, SessionCommand::Status),
        Command::Cache(_) => false,
        _ => true,
    }
}

/// Dispatch a session-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, ctx: &AppContext, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Session(args) => session::handle(ctx, args, global).await,
        Command::Favorites(args) => favorites::handle(ctx, args, global).await,
        Command::Market => market::overview(ctx, global).await,
        Command::Search { keyword, limit } => stocks::search(ctx, &keyword, limit, global).await,
        Command::Hot { symbol } => stocks::hot(ctx, &symbol, global).await,
        Command::Stock(args) => stocks::handle(ctx, args, global).await,
        Command::News(args) => news::handle(ctx, args, global).await,
        Command::Tags { tag } => market::tags(ctx, &tag, global).await,
        Command::Eva { code, refresh } => market::evaluation(ctx, &code, refresh, global).await,
        Command::Wechat { msgid } => wechat::handle(ctx, &msgid, global).await,
        Command::Logs(args) => logs::handle(ctx, args, global).await,
        Command::Push(args) => push::handle(ctx, args, global).await,
        Command::Chat { query } => news::chat(ctx, &query, global).await,
        Command::Cache(args) => cache::handle(ctx, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
