//! Interactive input: startup prompts and the guard-code prompt.

use std::io::{self, BufRead, Write};

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use steamidle_core::auth::{GuardCodePrompt, SecondFactorChallenge};
use steamidle_core::AppIdSet;

pub const ENV_USERNAME: &str = "STEAMIDLE_USERNAME";
pub const ENV_PASSWORD: &str = "STEAMIDLE_PASSWORD";
pub const ENV_APP_ID: &str = "STEAMIDLE_APP_ID";

/// Print `label` and read one trimmed line. `None` on end of input.
fn read_line(label: &str) -> io::Result<Option<String>> {
    print!("{}", label);
    io::stdout().flush()?;

    let mut input = String::new();
    if io::stdin().lock().read_line(&mut input)? == 0 {
        return Ok(None);
    }
    Ok(Some(input.trim().to_string()))
}

pub fn prompt_account_name(last_username: Option<&str>) -> Result<String> {
    if let Ok(name) = std::env::var(ENV_USERNAME) {
        return Ok(name.trim().to_string());
    }

    let label = match last_username {
        Some(last) => format!("Steam login [{}]: ", last),
        None => "Steam login: ".to_string(),
    };
    let input = read_line(&label)?.context("Input closed")?;
    let name = match (input.is_empty(), last_username) {
        (true, Some(last)) => last.to_string(),
        _ => input,
    };
    if name.is_empty() {
        bail!("Steam login is required");
    }
    Ok(name)
}

pub fn prompt_password() -> Result<String> {
    if let Ok(password) = std::env::var(ENV_PASSWORD) {
        return Ok(password);
    }
    let password = rpassword::prompt_password("Steam password: ")?;
    Ok(password)
}

pub fn prompt_app_ids() -> Result<AppIdSet> {
    let input = match std::env::var(ENV_APP_ID) {
        Ok(value) => value,
        Err(_) => read_line("App ID(s) to idle: ")?.context("Input closed")?,
    };
    parse_app_ids(&input)
}

fn parse_app_ids(input: &str) -> Result<AppIdSet> {
    Ok(input.parse()?)
}

/// Reads guard codes from stdin on a blocking thread.
pub struct StdinGuardPrompt;

#[async_trait]
impl GuardCodePrompt for StdinGuardPrompt {
    async fn request_code(
        &mut self,
        challenge: &SecondFactorChallenge,
    ) -> io::Result<Option<String>> {
        if challenge.is_retry() {
            println!("Invalid code. Try again.");
        }
        let label = "Steam Guard code (leave empty if not required): ";
        tokio::task::spawn_blocking(move || read_line(label))
            .await
            .map_err(io::Error::other)?
    }
}
