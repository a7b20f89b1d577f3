//! Product changelog.

use stocklink_core::model::{UpdateLog, UpdateLogQuery};
use stocklink_core::{AppContext, UpdateLogs};
use tabled::Tabled;

use crate::cli::{GlobalOpts, LogsArgs, LogsCommand, OutputFormat};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct LogRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Change")]
    message: String,
}

impl From<&UpdateLog> for LogRow {
    fn from(l: &UpdateLog) -> Self {
        Self {
            date: l.created_at.clone().unwrap_or_default(),
            kind: l.update_type.clone(),
            message: util::truncate(&l.message, 72),
        }
    }
}

fn print_logs(logs: &UpdateLogs, global: &GlobalOpts) {
    let out = match global.output {
        OutputFormat::Table => {
            let table = output::render_list(
                &global.output,
                &logs.logs,
                |l| LogRow::from(l),
                |l| l.message.clone(),
            );
            let p = &logs.pagination;
            let footer = format!(
                "page {}/{} ({} total)",
                p.page.unwrap_or(1),
                p.pages.unwrap_or(1),
                p.total.unwrap_or(logs.logs.len() as u64)
            );
            let color = output::should_color(&global.color);
            format!("{table}\n{}", output::muted(&footer, color))
        }
        OutputFormat::Plain => output::render_list(
            &global.output,
            &logs.logs,
            |l| LogRow::from(l),
            |l| l.message.clone(),
        ),
        _ => output::render_single(&global.output, logs, |_| String::new(), |_| String::new()),
    };
    output::print_output(&out, global.quiet);
}

pub async fn handle(ctx: &AppContext, args: LogsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        LogsCommand::List {
            page,
            per_page,
            update_type,
        } => {
            let query = UpdateLogQuery {
                page,
                per_page,
                update_type,
            };
            let logs = ctx
                .store()
                .fetch_update_logs(&query)
                .await?
                .ok_or_else(|| CliError::NoData {
                    what: "changelog".into(),
                })?;
            print_logs(&logs, global);
            Ok(())
        }

        LogsCommand::Types => {
            let types = ctx.store().fetch_update_types().await;
            let out = output::render_single(
                &global.output,
                &types,
                |t| t.join("\n"),
                |t| t.join("\n"),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
