//! steamidle - keep a game-network account "currently playing" from the terminal.
//!
//! Logs on through a connection-manager gateway, declares one or more app ids
//! as being played, re-declares them on a schedule, and shows elapsed time
//! until Ctrl+C. Presence is cleared and the account logged out on the way out.

mod logging;
mod prompt;
mod ui;

use std::process::ExitCode;

use anyhow::Result;
use steamidle_core::auth::Sentry;
use steamidle_core::{
    run_session, AuthSession, Config, Credentials, GatewayClient, SessionOutcome, ShutdownSignal,
};
use tracing::{info, warn};

use prompt::StdinGuardPrompt;
use ui::TerminalPresenter;

const ENV_GATEWAY_URL: &str = "STEAMIDLE_GATEWAY_URL";

const BANNER: &str = "\
╔═══════════════════════════════════════════════════╗
║       Steam Idler - keeps your games running      ║
╚═══════════════════════════════════════════════════╝
";

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let _log_guard = logging::init_logging();
    info!("steamidle starting");

    let mut config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            warn!(error = %e, "Failed to load config, using defaults");
            Config::default()
        }
    };
    if let Ok(url) = std::env::var(ENV_GATEWAY_URL) {
        config.gateway_url = Some(url);
    }

    println!("{}", BANNER);

    // Everything the operator types is checked before any network call.
    let startup = prompt::prompt_account_name(config.last_username.as_deref()).and_then(|account| {
        let password = prompt::prompt_password()?;
        let app_ids = prompt::prompt_app_ids()?;
        Ok((account, password, app_ids))
    });
    let (account_name, password, app_ids) = match startup {
        Ok(input) => input,
        Err(e) => {
            warn!(error = %e, "Invalid startup input");
            println!("✗ Error: {}", e);
            return Ok(ExitCode::FAILURE);
        }
    };

    let policy = config.policy();
    let client = GatewayClient::new(config.gateway_url())?;
    let auth = AuthSession::new(client, StdinGuardPrompt)
        .with_sentry(Sentry::load(&config.sentry_path()))
        .with_max_guard_attempts(policy.max_guard_attempts);

    println!("\nLogging in...");
    let outcome = run_session(
        auth,
        Credentials::new(account_name.clone(), password),
        app_ids,
        TerminalPresenter::new(),
        policy,
        ShutdownSignal::ctrl_c,
    )
    .await?;

    match outcome {
        SessionOutcome::Completed(report) => {
            info!(
                elapsed = report.elapsed_secs,
                cause = ?report.cause,
                "Session finished"
            );
            config.last_username = Some(account_name);
            if let Err(e) = config.save() {
                warn!(error = %e, "Failed to save config");
            }
        }
        SessionOutcome::Rejected(reason) => info!(%reason, "Login rejected"),
        SessionOutcome::Cancelled => println!("Login cancelled."),
        SessionOutcome::HandshakeFailed(message) => info!(%message, "Login failed"),
    }

    info!("steamidle shutting down");
    Ok(ExitCode::SUCCESS)
}
