//! Config subcommand handlers.

use dialoguer::Input;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn format_toml(cfg: &Config) -> String {
    toml::to_string_pretty(cfg).unwrap_or_else(|e| format!("# unable to render config: {e}"))
}

/// Handle config subcommands. Synchronous: nothing here needs the backend.
pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Show => {
            let cfg = config::apply_overrides(config::load_config()?, global);
            let out = output::render_single(&global.output, &cfg, format_toml, |c| {
                c.api.base_url.clone()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::Init { base_url } => {
            let mut cfg = stocklink_config::load_config_or_default();

            let base_url = match base_url {
                Some(url) => url,
                None if std::io::IsTerminal::is_terminal(&std::io::stdin()) => Input::new()
                    .with_prompt("Backend URL")
                    .default(cfg.api.base_url.clone())
                    .interact_text()
                    .map_err(prompt_err)?,
                None => {
                    return Err(CliError::Validation {
                        field: "base_url".into(),
                        reason: "pass --base-url when stdin is not a terminal".into(),
                    });
                }
            };
            cfg.api.base_url = base_url.trim().to_owned();

            // Reject bad values before anything is written.
            cfg.to_client_config()?;

            let path = config::save_config(&cfg)?;
            output::notice(&format!("Config written to {}", path.display()), global.quiet);
            Ok(())
        }
    }
}
