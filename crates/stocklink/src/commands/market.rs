//! Market overview, concept tags, and AI evaluation.

use serde::Serialize;
use stocklink_core::convert::change_percent;
use stocklink_core::model::TagLeader;
use stocklink_core::{AppContext, Evaluation, IndexQuote};
use tabled::Tabled;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::util;

// ── Market overview ─────────────────────────────────────────────────

#[derive(Serialize)]
struct IndexLine<'a> {
    key: &'a str,
    value: f64,
    change: f64,
}

#[derive(Tabled)]
struct IndexRow {
    #[tabled(rename = "Index")]
    key: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Change")]
    change: String,
}

pub async fn overview(ctx: &AppContext, global: &GlobalOpts) -> Result<(), CliError> {
    let overview = ctx.store().fetch_market_overview().await;
    let lines: Vec<IndexLine<'_>> = overview
        .iter()
        .map(|(key, &IndexQuote { value, change })| IndexLine { key, value, change })
        .collect();

    let color = output::should_color(&global.color);
    let out = output::render_list(
        &global.output,
        &lines,
        |l| IndexRow {
            key: l.key.to_owned(),
            value: format!("{:.2}", l.value),
            change: output::change_pct(Some(l.change), color),
        },
        |l| format!("{}\t{:.2}\t{:+.2}", l.key, l.value, l.change),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

// ── Tags ────────────────────────────────────────────────────────────

#[derive(Tabled)]
struct LeaderRow {
    #[tabled(rename = "Code")]
    code: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Industry")]
    industry: String,
    #[tabled(rename = "Change")]
    change: String,
    #[tabled(rename = "Reason")]
    reason: String,
}

impl LeaderRow {
    fn new(l: &TagLeader, color: bool) -> Self {
        Self {
            code: l.code.clone(),
            name: l.name.clone(),
            industry: l.industry.clone().unwrap_or_default(),
            change: output::change_pct(Some(change_percent(l.change_percent.as_ref())), color),
            reason: util::truncate(l.reason.as_deref().unwrap_or_default(), 40),
        }
    }
}

pub async fn tags(ctx: &AppContext, tag: &str, global: &GlobalOpts) -> Result<(), CliError> {
    let result = ctx.store().fetch_tag_stocks(tag).await?;
    if result.stocks.is_empty() {
        return Err(CliError::NoData {
            what: format!("tag '{tag}'"),
        });
    }

    let color = output::should_color(&global.color);
    if matches!(global.output, crate::cli::OutputFormat::Table) && !result.description.is_empty() {
        output::print_output(&output::heading(&result.description, color), global.quiet);
    }
    let out = output::render_list(
        &global.output,
        &result.stocks,
        |l| LeaderRow::new(l, color),
        |l| l.code.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

// ── Evaluation ──────────────────────────────────────────────────────

fn evaluation_detail(code: &str, e: &Evaluation, color: bool) -> String {
    let mut lines = vec![
        format!("{}  {}", output::heading(code, color), e.conclusion),
        format!("  Evaluated:  {}", e.evaluation_time),
        format!("  Reason:     {}", e.reason),
    ];
    if !e.news_list.is_empty() {
        lines.push(format!("  Based on {} news item(s)", e.news_list.len()));
    }
    lines.join("\n")
}

pub async fn evaluation(
    ctx: &AppContext,
    code: &str,
    refresh: bool,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    util::require_session(ctx)?;
    let eval = ctx
        .store()
        .fetch_evaluation(code, refresh)
        .await
        .ok_or_else(|| CliError::NoData {
            what: format!("evaluation of {code}"),
        })?;

    let color = output::should_color(&global.color);
    let out = output::render_single(
        &global.output,
        &eval,
        |e| evaluation_detail(code, e, color),
        |e| e.conclusion.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
