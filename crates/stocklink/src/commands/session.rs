//! Session command handlers.

use std::time::Duration;

use serde::Serialize;
use stocklink_core::{AppContext, CoreError, ScanLoginOutcome, UserProfile};
use tracing::debug;

use crate::cli::{GlobalOpts, SessionArgs, SessionCommand};
use crate::error::CliError;
use crate::output;

/// Interval between login-status polls.
const SCAN_POLL_INTERVAL: Duration = Duration::from_secs(2);

// ── Status view ─────────────────────────────────────────────────────

#[derive(Serialize)]
struct SessionView {
    authenticated: bool,
    user: Option<UserProfile>,
    favorites: usize,
    build_version: String,
}

impl SessionView {
    fn capture(ctx: &AppContext) -> Self {
        let session = ctx.store().session();
        Self {
            authenticated: session.is_authenticated(),
            user: session.profile().cloned(),
            favorites: session.favorites().len(),
            build_version: ctx.cache().version().token.clone(),
        }
    }
}

fn session_detail(v: &SessionView, color: bool) -> String {
    if !v.authenticated {
        return output::muted("Not signed in", color);
    }
    let user = v.user.clone().unwrap_or_default();
    [
        format!("{}  {}", output::heading("Signed in as", color), user.display_name()),
        format!("  ID:         {}", user.id.map(|i| i.to_string()).unwrap_or_default()),
        format!("  Role:       {}", user.role.as_deref().unwrap_or("-")),
        format!("  Since:      {}", user.created_at.as_deref().unwrap_or("-")),
        format!("  Favorites:  {}", v.favorites),
        format!("  Build:      {}", v.build_version),
    ]
    .join("\n")
}

fn show_status(ctx: &AppContext, global: &GlobalOpts) {
    let view = SessionView::capture(ctx);
    let color = output::should_color(&global.color);
    let out = output::render_single(
        &global.output,
        &view,
        |v| session_detail(v, color),
        |v| v.authenticated.to_string(),
    );
    output::print_output(&out, global.quiet);
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(ctx: &AppContext, args: SessionArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        SessionCommand::Status => {
            show_status(ctx, global);
            Ok(())
        }

        SessionCommand::Restore => {
            if !ctx.store().is_authenticated() {
                return Err(CliError::NotSignedIn);
            }
            if !ctx.store().restore_session().await {
                return Err(CliError::AuthFailed);
            }
            ctx.store().fetch_favorites().await;
            show_status(ctx, global);
            Ok(())
        }

        SessionCommand::Login { token } => {
            ctx.store().login(&token, UserProfile::default())?;
            if !ctx.store().restore_session().await {
                return Err(CliError::AuthFailed);
            }
            ctx.store().fetch_favorites().await;
            show_status(ctx, global);
            Ok(())
        }

        SessionCommand::Scan { wait } => scan(ctx, Duration::from_secs(wait), global).await,

        SessionCommand::Profile {
            nickname,
            avatar_url,
        } => {
            crate::commands::util::require_session(ctx)?;
            if !ctx.store().update_profile(&nickname, &avatar_url).await {
                return Err(CliError::NoData {
                    what: "profile update".into(),
                });
            }
            show_status(ctx, global);
            Ok(())
        }

        SessionCommand::Logout => {
            ctx.logout()?;
            output::notice("Signed out; local caches cleared", global.quiet);
            Ok(())
        }
    }
}

// ── QR-code login ───────────────────────────────────────────────────

async fn scan(ctx: &AppContext, wait: Duration, global: &GlobalOpts) -> Result<(), CliError> {
    let ticket = ctx
        .store()
        .fetch_scan_login_url()
        .await
        .ok_or_else(|| CliError::NoData {
            what: "login ticket".into(),
        })?;

    let color = output::should_color(&global.color);
    eprintln!(
        "{}\n{}",
        output::heading("Scan with WeChat to sign in:", color),
        ticket.qrcode_url
    );

    let ttl = ticket.expires_in.map_or(wait, |s| wait.min(Duration::from_secs(s)));
    let deadline = tokio::time::Instant::now() + ttl;
    loop {
        let outcome = match ctx.store().poll_scan_login(&ticket.state).await {
            Ok(outcome) => outcome,
            // The backend answers an expired or unknown ticket with 401/404.
            Err(CoreError::Unauthorized | CoreError::Api { status: Some(404), .. }) => {
                return Err(CliError::ScanExpired);
            }
            Err(e) => return Err(e.into()),
        };
        match outcome {
            ScanLoginOutcome::Pending { remaining } => {
                debug!(?remaining, "waiting for scan confirmation");
            }
            ScanLoginOutcome::Confirmed { .. } => break,
            ScanLoginOutcome::Expired => return Err(CliError::ScanExpired),
            ScanLoginOutcome::Rejected { code, message } => {
                return Err(CliError::Rejected { code, message });
            }
        }
        if tokio::time::Instant::now() + SCAN_POLL_INTERVAL > deadline {
            return Err(CliError::ScanExpired);
        }
        tokio::time::sleep(SCAN_POLL_INTERVAL).await;
    }

    ctx.store().fetch_favorites().await;
    show_status(ctx, global);
    Ok(())
}
