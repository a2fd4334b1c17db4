use std::fmt;
use std::io;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{info, warn};

use crate::client::{ClientError, EResult, LoginOutcome, LoginRequest, SteamClient};

use super::{Credentials, Sentry};

/// The logon service turned down the last attempt and wants a (new) guard code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecondFactorChallenge {
    /// Number of the login attempt that was just turned down, starting at 1.
    pub attempt: u32,
    pub result: EResult,
}

impl SecondFactorChallenge {
    /// True when an earlier code was already tried and refused.
    pub fn is_retry(&self) -> bool {
        self.attempt > 1
    }
}

/// Asks the operator for a guard code.
///
/// `Ok(Some(""))` means "I have no code"; `Ok(None)` means input is gone and
/// the handshake should stop.
#[async_trait]
pub trait GuardCodePrompt: Send {
    async fn request_code(&mut self, challenge: &SecondFactorChallenge)
        -> io::Result<Option<String>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    Denied(EResult),
    GuardAttemptsExhausted { attempts: u32 },
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::Denied(result) => write!(f, "login denied: {}", result),
            RejectReason::GuardAttemptsExhausted { attempts } => {
                write!(f, "guard code refused {} times, giving up", attempts)
            }
        }
    }
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Login request failed: {0}")]
    Client(#[from] ClientError),

    #[error("Failed to read guard code: {0}")]
    Prompt(#[from] io::Error),
}

/// A logged-on client plus who it is logged on as.
///
/// Whoever holds this owns the network session and is responsible for
/// logging it out.
pub struct AuthenticatedSession<C> {
    client: C,
    account_name: String,
    display_name: String,
    authenticated_at: DateTime<Utc>,
}

impl<C> AuthenticatedSession<C> {
    pub fn account_name(&self) -> &str {
        &self.account_name
    }

    /// Persona name reported by the network, or the account name if it sent none.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn authenticated_at(&self) -> DateTime<Utc> {
        self.authenticated_at
    }

    pub(crate) fn into_parts(self) -> (C, String, String) {
        (self.client, self.account_name, self.display_name)
    }
}

pub enum AuthResult<C> {
    Authenticated(AuthenticatedSession<C>),
    Rejected(RejectReason),
    Cancelled,
}

impl<C> fmt::Debug for AuthResult<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthResult::Authenticated(session) => f
                .debug_tuple("Authenticated")
                .field(&session.display_name)
                .finish(),
            AuthResult::Rejected(reason) => f.debug_tuple("Rejected").field(reason).finish(),
            AuthResult::Cancelled => f.write_str("Cancelled"),
        }
    }
}

/// Logon handshake for one client.
pub struct AuthSession<C, G> {
    client: C,
    prompt: G,
    sentry: Option<Sentry>,
    max_guard_attempts: Option<u32>,
}

impl<C: SteamClient, G: GuardCodePrompt> AuthSession<C, G> {
    pub fn new(client: C, prompt: G) -> Self {
        Self {
            client,
            prompt,
            sentry: None,
            max_guard_attempts: None,
        }
    }

    pub fn with_sentry(mut self, sentry: Option<Sentry>) -> Self {
        self.sentry = sentry;
        self
    }

    /// Cap on guard codes the operator may try. `None` retries forever.
    pub fn with_max_guard_attempts(mut self, max: Option<u32>) -> Self {
        self.max_guard_attempts = max;
        self
    }

    /// Log on, asking for guard codes as long as the service wants one.
    ///
    /// The first attempt goes out without a code. On a rejection the client
    /// is dropped without logout, since nothing was ever logged on.
    pub async fn authenticate(mut self, credentials: Credentials) -> Result<AuthResult<C>, AuthError> {
        let mut code = String::new();
        let mut attempt: u32 = 0;
        let mut codes_asked: u32 = 0;

        loop {
            attempt += 1;
            let request = LoginRequest {
                account_name: credentials.account_name(),
                password: credentials.secret(),
                two_factor_code: &code,
                sentry: self.sentry.as_ref(),
            };
            info!(
                account = %credentials.account_name(),
                attempt,
                with_code = !code.is_empty(),
                with_sentry = self.sentry.is_some(),
                "Logging in"
            );

            let outcome = self.client.login(&request).await?;
            let result = match outcome {
                LoginOutcome::LoggedOn { display_name } => {
                    let display_name = if display_name.is_empty() {
                        credentials.account_name().to_string()
                    } else {
                        display_name
                    };
                    info!(%display_name, attempt, "Logged in");
                    return Ok(AuthResult::Authenticated(AuthenticatedSession {
                        client: self.client,
                        account_name: credentials.account_name().to_string(),
                        display_name,
                        authenticated_at: Utc::now(),
                    }));
                }
                LoginOutcome::Denied(result) => {
                    warn!(%result, attempt, "Login denied");
                    return Ok(AuthResult::Rejected(RejectReason::Denied(result)));
                }
                LoginOutcome::GuardRequired(result) => result,
            };

            if self.max_guard_attempts.is_some_and(|max| codes_asked >= max) {
                warn!(attempts = codes_asked, "Guard code attempts exhausted");
                return Ok(AuthResult::Rejected(RejectReason::GuardAttemptsExhausted {
                    attempts: codes_asked,
                }));
            }

            info!(%result, attempt, "Guard code required");
            let challenge = SecondFactorChallenge { attempt, result };
            codes_asked += 1;
            match self.prompt.request_code(&challenge).await? {
                Some(answer) => code = answer.trim().to_string(),
                None => {
                    info!("Guard code prompt closed, abandoning login");
                    return Ok(AuthResult::Cancelled);
                }
            }
        }
    }
}
