//! Local cache lifecycle.

use serde::Serialize;
use stocklink_core::AppContext;

use crate::cli::{CacheArgs, CacheCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Serialize)]
struct CacheView {
    version: String,
    source: String,
    stored_version: Option<String>,
    purged_on_start: bool,
    keys: Vec<String>,
}

fn cache_detail(v: &CacheView, color: bool) -> String {
    [
        format!("{}  {} ({})", output::heading("Build", color), v.version, v.source),
        format!(
            "  Recorded:  {}",
            v.stored_version.as_deref().unwrap_or("-")
        ),
        format!(
            "  Purged:    {}",
            if v.purged_on_start { "at this start" } else { "no" }
        ),
        format!("  Keys:      {}", v.keys.join(", ")),
    ]
    .join("\n")
}

pub async fn handle(ctx: &AppContext, args: CacheArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let cache = ctx.cache();
    match args.command {
        CacheCommand::Status => {
            let mut keys = ctx.storage().keys();
            keys.sort();
            let view = CacheView {
                version: cache.version().token.clone(),
                source: cache.version().source.to_string(),
                stored_version: cache.stored_version(),
                purged_on_start: ctx.purged_on_start(),
                keys,
            };
            let color = output::should_color(&global.color);
            let out = output::render_single(
                &global.output,
                &view,
                |v| cache_detail(v, color),
                |v| v.version.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        CacheCommand::Reconcile => {
            let purged = cache.reconcile_version()?;
            let message = if purged || ctx.purged_on_start() {
                "Stale caches purged for this build"
            } else {
                "Caches already match this build"
            };
            output::notice(message, global.quiet);
            Ok(())
        }

        CacheCommand::Purge => {
            if !util::confirm("Clear all local data, including the session?", global.yes)? {
                return Ok(());
            }
            ctx.logout()?;
            output::notice("All local caches cleared", global.quiet);
            Ok(())
        }
    }
}
