//! News and assistant command handlers.

use serde_json::Value;
use stocklink_core::{AppContext, NewsPage};
use tabled::Tabled;

use crate::cli::{GlobalOpts, NewsArgs, NewsCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct NewsRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Published")]
    published: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Evaluation")]
    evaluation: String,
}

/// Pick the first present field, rendering numbers as text.
fn field(item: &Value, keys: &[&str]) -> String {
    keys.iter()
        .find_map(|k| match item.get(*k) {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        })
        .unwrap_or_default()
}

impl From<&Value> for NewsRow {
    fn from(item: &Value) -> Self {
        Self {
            id: field(item, &["id", "news_id"]),
            published: field(item, &["published_at", "publish_time", "date"]),
            title: util::truncate(&field(item, &["title"]), 48),
            evaluation: field(item, &["evaluation", "conclusion"]),
        }
    }
}

fn print_page(page: &NewsPage, global: &GlobalOpts) {
    let out = match global.output {
        crate::cli::OutputFormat::Table => {
            let table = output::render_list(
                &global.output,
                &page.list,
                |v| NewsRow::from(v),
                |v| field(v, &["id"]),
            );
            let footer = format!(
                "page {}/{} ({} total{})",
                page.current_page,
                page.total_pages,
                page.total,
                if page.has_more { ", more available" } else { "" }
            );
            let color = output::should_color(&global.color);
            format!("{table}\n{}", output::muted(&footer, color))
        }
        crate::cli::OutputFormat::Plain => output::render_list(
            &global.output,
            &page.list,
            |v| NewsRow::from(v),
            |v| field(v, &["id"]),
        ),
        _ => output::render_single(&global.output, page, |_| String::new(), |_| String::new()),
    };
    output::print_output(&out, global.quiet);
}

fn article_detail(v: &Value, color: bool) -> String {
    let mut lines = vec![output::heading(&field(v, &["title"]), color)];
    let meta = [
        field(v, &["published_at", "publish_time", "date"]),
        field(v, &["source"]),
        field(v, &["evaluation", "conclusion"]),
    ]
    .into_iter()
    .filter(|s| !s.is_empty())
    .collect::<Vec<_>>()
    .join("  ");
    if !meta.is_empty() {
        lines.push(output::muted(&meta, color));
    }
    let body = field(v, &["content", "summary"]);
    if !body.is_empty() {
        lines.push(String::new());
        lines.push(body);
    }
    let reason = field(v, &["reason"]);
    if !reason.is_empty() {
        lines.push(String::new());
        lines.push(format!("Reason: {reason}"));
    }
    lines.join("\n")
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn handle(ctx: &AppContext, args: NewsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let store = ctx.store();
    match args.command {
        NewsCommand::List { code, page, limit } => {
            let news = store.fetch_stock_news(&code, page, limit).await;
            print_page(&news, global);
            Ok(())
        }

        NewsCommand::Pushed { page, limit } => {
            util::require_session(ctx)?;
            let pushed = store
                .fetch_push_news(page, limit)
                .await
                .ok_or_else(|| CliError::NoData {
                    what: "pushed news".into(),
                })?;
            let out = output::render_single(
                &global.output,
                &pushed,
                output::render_json_pretty::<Value>,
                output::render_json_compact::<Value>,
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        NewsCommand::Detail { id } => {
            let article = store
                .fetch_news_detail(&id)
                .await?
                .ok_or_else(|| CliError::NoData {
                    what: format!("news {id}"),
                })?;
            let color = output::should_color(&global.color);
            let out = output::render_single(
                &global.output,
                &article,
                |v| article_detail(v, color),
                |v| field(v, &["content"]),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}

pub async fn chat(ctx: &AppContext, query: &str, global: &GlobalOpts) -> Result<(), CliError> {
    let answer = ctx.store().ask_assistant(query).await?;
    let out = output::render_single(
        &global.output,
        &answer,
        |v| {
            let text = field(v, &["answer", "response", "content"]);
            if text.is_empty() {
                output::render_json_pretty(v)
            } else {
                text
            }
        },
        |v| field(v, &["answer", "response", "content"]),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
