//! WeChat push settings of the signed-in user.

use std::collections::BTreeMap;

use stocklink_core::AppContext;
use stocklink_core::model::PushSettings;
use tabled::Tabled;

use crate::cli::{GlobalOpts, PushArgs, PushCommand};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct ToggleRow {
    #[tabled(rename = "Category")]
    name: String,
    #[tabled(rename = "Enabled")]
    enabled: String,
}

fn print_settings(settings: &BTreeMap<String, bool>, global: &GlobalOpts) {
    let entries: Vec<(&String, &bool)> = settings.iter().collect();
    let out = match global.output {
        crate::cli::OutputFormat::Table | crate::cli::OutputFormat::Plain => output::render_list(
            &global.output,
            &entries,
            |(name, on)| ToggleRow {
                name: (*name).clone(),
                enabled: if **on { "on" } else { "off" }.into(),
            },
            |(name, on)| format!("{name}={}", if **on { "on" } else { "off" }),
        ),
        _ => output::render_single(&global.output, settings, |_| String::new(), |_| String::new()),
    };
    output::print_output(&out, global.quiet);
}

pub async fn handle(ctx: &AppContext, args: PushArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let user_id = util::require_user_id(ctx)?;
    let store = ctx.store();

    match args.command {
        PushCommand::Get => {
            let PushSettings { settings, .. } = store.fetch_push_settings(user_id).await;
            print_settings(&settings, global);
            Ok(())
        }

        PushCommand::Set { toggles } => {
            let PushSettings { mut settings, .. } = store.fetch_push_settings(user_id).await;
            settings.extend(toggles);
            if !store.update_push_settings(user_id, &settings).await {
                return Err(CliError::NoData {
                    what: "push settings update".into(),
                });
            }
            output::notice("Push settings saved", global.quiet);
            print_settings(&settings, global);
            Ok(())
        }
    }
}
