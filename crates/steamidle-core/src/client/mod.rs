//! Network client interface for the game-distribution service.
//!
//! The session core never talks to the network directly. It drives a
//! `SteamClient`, which provides the four calls the idle session needs:
//! log on, declare played apps, pump pending events, log off.
//!
//! `GatewayClient` implements the trait over JSON/HTTP against a
//! connection-manager gateway.

pub mod app_id;
pub mod error;
pub mod gateway;

#[cfg(test)]
pub(crate) mod fake;

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;

pub use app_id::{AppId, AppIdError, AppIdSet, MAX_APP_IDS};
pub use error::{ClientError, GatewayError};
pub use gateway::GatewayClient;

use crate::auth::Sentry;

/// Result code returned by the logon service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EResult(pub i32);

impl EResult {
    pub const OK: EResult = EResult(1);
    pub const FAIL: EResult = EResult(2);
    pub const INVALID_PASSWORD: EResult = EResult(5);
    pub const ACCOUNT_NOT_FOUND: EResult = EResult(18);
    pub const ACCOUNT_DISABLED: EResult = EResult(43);
    pub const ACCOUNT_LOGON_DENIED: EResult = EResult(63);
    pub const INVALID_LOGIN_AUTH_CODE: EResult = EResult(65);
    pub const RATE_LIMIT_EXCEEDED: EResult = EResult(84);
    pub const NEED_TWO_FACTOR: EResult = EResult(85);
    pub const TWO_FACTOR_CODE_MISMATCH: EResult = EResult(88);

    /// Codes that mean "send another guard code", not "go away".
    pub fn is_guard_challenge(self) -> bool {
        matches!(
            self,
            Self::ACCOUNT_LOGON_DENIED
                | Self::INVALID_LOGIN_AUTH_CODE
                | Self::NEED_TWO_FACTOR
                | Self::TWO_FACTOR_CODE_MISMATCH
        )
    }

    pub fn name(self) -> Option<&'static str> {
        let name = match self {
            Self::OK => "OK",
            Self::FAIL => "Fail",
            Self::INVALID_PASSWORD => "InvalidPassword",
            Self::ACCOUNT_NOT_FOUND => "AccountNotFound",
            Self::ACCOUNT_DISABLED => "AccountDisabled",
            Self::ACCOUNT_LOGON_DENIED => "AccountLogonDenied",
            Self::INVALID_LOGIN_AUTH_CODE => "InvalidLoginAuthCode",
            Self::RATE_LIMIT_EXCEEDED => "RateLimitExceeded",
            Self::NEED_TWO_FACTOR => "AccountLoginDeniedNeedTwoFactor",
            Self::TWO_FACTOR_CODE_MISMATCH => "TwoFactorCodeMismatch",
            _ => return None,
        };
        Some(name)
    }
}

impl fmt::Display for EResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{} ({})", name, self.0),
            None => write!(f, "code {}", self.0),
        }
    }
}

/// One logon attempt.
#[derive(Clone, Copy)]
pub struct LoginRequest<'a> {
    pub account_name: &'a str,
    pub password: &'a str,
    /// Empty when no code is available.
    pub two_factor_code: &'a str,
    pub sentry: Option<&'a Sentry>,
}

/// What the logon service said about a `LoginRequest`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    LoggedOn { display_name: String },
    /// A guard code is missing or was wrong; retrying with a new one may work.
    GuardRequired(EResult),
    Denied(EResult),
}

impl LoginOutcome {
    /// Classify a raw result code the way the logon service intends it.
    pub fn from_eresult(eresult: EResult, display_name: Option<String>) -> Self {
        if eresult == EResult::OK {
            LoginOutcome::LoggedOn {
                display_name: display_name.unwrap_or_default(),
            }
        } else if eresult.is_guard_challenge() {
            LoginOutcome::GuardRequired(eresult)
        } else {
            LoginOutcome::Denied(eresult)
        }
    }
}

/// Connection to the game-distribution network.
///
/// Implementations own the connection. `pump_events` must return within
/// roughly `timeout`; the idle loop additionally enforces that bound.
#[async_trait]
pub trait SteamClient: Send {
    async fn login(&mut self, request: &LoginRequest<'_>) -> Result<LoginOutcome, ClientError>;

    /// Replace the set of apps this session is "currently playing".
    async fn games_played(&mut self, app_ids: &[AppId]) -> Result<(), ClientError>;

    async fn pump_events(&mut self, timeout: Duration) -> Result<(), ClientError>;

    async fn logout(&mut self) -> Result<(), ClientError>;
}
