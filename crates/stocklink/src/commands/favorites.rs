//! Watch-list command handlers.

use stocklink_api::endpoints::MAX_ADD_BATCH;
use stocklink_core::model::NewFavorite;
use stocklink_core::{AppContext, FavoriteStock};
use tabled::Tabled;

use crate::cli::{FavoritesArgs, FavoritesCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct FavoriteRow {
    #[tabled(rename = "Code")]
    code: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Market")]
    market: String,
    #[tabled(rename = "Industry")]
    industry: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Change")]
    change: String,
}

impl FavoriteRow {
    fn new(s: &FavoriteStock, color: bool) -> Self {
        Self {
            code: s.code.clone(),
            name: s.name.clone(),
            market: s.market.clone().unwrap_or_default(),
            industry: s.industry.clone().unwrap_or_default(),
            price: s.latest_price.map(|p| format!("{p:.2}")).unwrap_or_default(),
            change: output::change_pct(s.change_percent, color),
        }
    }
}

fn print_list(list: &[FavoriteStock], global: &GlobalOpts) {
    let color = output::should_color(&global.color);
    let out = output::render_list(
        &global.output,
        list,
        |s| FavoriteRow::new(s, color),
        |s| s.code.clone(),
    );
    output::print_output(&out, global.quiet);
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(ctx: &AppContext, args: FavoritesArgs, global: &GlobalOpts) -> Result<(), CliError> {
    util::require_session(ctx)?;
    let store = ctx.store();

    match args.command {
        FavoritesCommand::List { cached } => {
            if !cached && !store.fetch_favorites().await {
                tracing::warn!("showing cached watch list; refresh failed");
            }
            print_list(&store.favorites(), global);
            Ok(())
        }

        FavoritesCommand::Add { codes } => {
            if codes.len() > MAX_ADD_BATCH {
                return Err(CliError::Validation {
                    field: "codes".into(),
                    reason: format!("at most {MAX_ADD_BATCH} stocks per request"),
                });
            }
            let stocks: Vec<NewFavorite> = codes.iter().map(|c| NewFavorite::code(c.trim())).collect();
            let result = store
                .add_favorites(&stocks)
                .await
                .ok_or_else(|| CliError::NoData {
                    what: "add to watch list".into(),
                })?;
            output::notice(
                &format!(
                    "Added {} stock(s), {} rejected",
                    result.total_added,
                    result.errors.len()
                ),
                global.quiet,
            );
            print_list(&store.favorites(), global);
            Ok(())
        }

        FavoritesCommand::Remove { codes } => {
            let result = store
                .remove_favorites(&codes)
                .await
                .ok_or_else(|| CliError::NoData {
                    what: "remove from watch list".into(),
                })?;
            output::notice(
                &format!("Removed {} stock(s)", result.total_deleted),
                global.quiet,
            );
            print_list(&store.favorites(), global);
            Ok(())
        }

        FavoritesCommand::Import { image } => {
            let data_url = util::read_image_data_url(&image)?;
            let recognition = store
                .add_favorites_from_image(&data_url)
                .await
                .ok_or_else(|| CliError::NoData {
                    what: "screenshot recognition".into(),
                })?;
            let out = output::render_single(
                &global.output,
                &recognition,
                |r| {
                    format!(
                        "Recognized {} stock(s), {} rejected.\nRun `stocklink favorites confirm` to add them.",
                        r.total,
                        r.rejected.len()
                    )
                },
                |r| r.total.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        FavoritesCommand::Confirm => {
            store
                .confirm_favorites_from_image()
                .await
                .ok_or_else(|| CliError::NoData {
                    what: "screenshot confirmation".into(),
                })?;
            print_list(&store.favorites(), global);
            Ok(())
        }
    }
}
