//! Shared helpers for command handlers.

use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use stocklink_core::{AppContext, UserProfile};

use crate::error::CliError;

/// The signed-in user's profile, or `NotSignedIn`.
pub fn require_session(ctx: &AppContext) -> Result<UserProfile, CliError> {
    if !ctx.store().is_authenticated() {
        return Err(CliError::NotSignedIn);
    }
    Ok(ctx.store().current_user().unwrap_or_default())
}

/// The signed-in user's numeric id, needed by the push-settings endpoints.
pub fn require_user_id(ctx: &AppContext) -> Result<i64, CliError> {
    require_session(ctx)?.id.ok_or_else(|| CliError::Validation {
        field: "session".into(),
        reason: "the stored profile has no user id; run `stocklink session restore`".into(),
    })
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::IsTerminal::is_terminal(&std::io::stdin()) {
        return Err(CliError::NonInteractiveRequiresYes {
            action: message.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Read an image file and encode it as a data URL.
pub fn read_image_data_url(path: &Path) -> Result<String, CliError> {
    let mime = match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        _ => {
            return Err(CliError::Validation {
                field: "image".into(),
                reason: format!("unsupported image type: {}", path.display()),
            });
        }
    };
    let bytes = std::fs::read(path)?;
    Ok(format!("data:{mime};base64,{}", STANDARD.encode(bytes)))
}

/// Cut `text` to at most `max` characters, marking the cut.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_owned();
    }
    let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}
