//! Stock lookups: search, rankings, detail, history, forecast.

use serde_json::Value;
use stocklink_core::AppContext;
use stocklink_core::model::{HotStock, StockSummary};
use tabled::Tabled;

use crate::cli::{GlobalOpts, StockArgs, StockCommand};
use crate::error::CliError;
use crate::output;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "Code")]
    code: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Market")]
    market: String,
}

impl From<&StockSummary> for SummaryRow {
    fn from(s: &StockSummary) -> Self {
        Self {
            code: s.code.clone(),
            name: s.name.clone(),
            market: s.market.clone().unwrap_or_default(),
        }
    }
}

#[derive(Tabled)]
struct HotRow {
    #[tabled(rename = "#")]
    rank: String,
    #[tabled(rename = "Code")]
    code: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Change")]
    change: String,
}

impl HotRow {
    fn new(s: &HotStock, color: bool) -> Self {
        Self {
            rank: s.rank.map(|r| r.to_string()).unwrap_or_default(),
            code: s.code.clone(),
            name: s.name.clone(),
            price: s.latest_price.map(|p| format!("{p:.2}")).unwrap_or_default(),
            change: output::change_pct(s.change_percent, color),
        }
    }
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn search(
    ctx: &AppContext,
    keyword: &str,
    limit: u32,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let results = ctx.store().search_stocks(keyword, limit).await;
    let out = output::render_list(
        &global.output,
        &results,
        |s| SummaryRow::from(s),
        |s| s.code.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn hot(ctx: &AppContext, symbol: &str, global: &GlobalOpts) -> Result<(), CliError> {
    let ranking = ctx.store().fetch_hot_stocks(symbol).await;
    let color = output::should_color(&global.color);
    let out = output::render_list(
        &global.output,
        &ranking,
        |s| HotRow::new(s, color),
        |s| s.code.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

/// Raw payload views: the backend shapes for these are not fixed, so the
/// table view is pretty JSON.
fn print_payload(payload: &Value, global: &GlobalOpts) {
    let out = output::render_single(
        &global.output,
        payload,
        output::render_json_pretty::<Value>,
        output::render_json_compact::<Value>,
    );
    output::print_output(&out, global.quiet);
}

pub async fn handle(ctx: &AppContext, args: StockArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let store = ctx.store();
    match args.command {
        StockCommand::Detail { code } => {
            let detail = store
                .fetch_stock_detail(&code)
                .await
                .ok_or_else(|| CliError::NoData {
                    what: format!("detail of {code}"),
                })?;
            print_payload(&detail, global);
        }
        StockCommand::History { code, years } => {
            let history = store
                .fetch_stock_history(&code, years)
                .await
                .ok_or_else(|| CliError::NoData {
                    what: format!("history of {code}"),
                })?;
            print_payload(&history, global);
        }
        StockCommand::Forecast { code } => {
            let forecast = store.fetch_stock_forecast(&code).await;
            if forecast.is_empty() {
                return Err(CliError::NoData {
                    what: format!("forecast of {code}"),
                });
            }
            print_payload(&Value::Array(forecast), global);
        }
    }
    Ok(())
}
