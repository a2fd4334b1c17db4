//! JSON/HTTP client for a connection-manager gateway.
//!
//! The gateway keeps the actual network connection and exposes it as a
//! handful of session-scoped endpoints. One `GatewayClient` holds at most one
//! gateway session at a time.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{AppId, ClientError, EResult, GatewayError, LoginOutcome, LoginRequest, SteamClient};

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds for login/declaration/logout calls.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Part of each pump slice kept back from the server-side wait, so a poll
/// that waits its full time still returns before the slice ends.
const POLL_SLACK_MS: u64 = 40;

/// Event kind the gateway emits when the network dropped the session.
const EVENT_LOGGED_OFF: &str = "logged_off";

#[derive(Debug, Serialize)]
struct LoginBody<'a> {
    account_name: &'a str,
    password: &'a str,
    two_factor_code: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sentry: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    eresult: i32,
    #[serde(default)]
    persona_name: Option<String>,
    #[serde(default)]
    session_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct GamesPlayedBody {
    games: Vec<AppId>,
}

#[derive(Debug, Deserialize)]
struct EventsResponse {
    #[serde(default)]
    events: Vec<GatewayEvent>,
}

#[derive(Debug, Deserialize)]
struct GatewayEvent {
    kind: String,
}

pub struct GatewayClient {
    client: Client,
    base_url: String,
    session_id: Option<String>,
}

impl GatewayClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session_id: None,
        })
    }

    pub fn is_logged_on(&self) -> bool {
        self.session_id.is_some()
    }

    fn session_url(&self, endpoint: &str) -> Result<String, ClientError> {
        let id = self.session_id.as_deref().ok_or(ClientError::NotLoggedOn)?;
        Ok(format!("{}/session/{}/{}", self.base_url, id, endpoint))
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(GatewayError::from_status(status, &body).into())
        }
    }
}

#[async_trait]
impl SteamClient for GatewayClient {
    async fn login(&mut self, request: &LoginRequest<'_>) -> Result<LoginOutcome, ClientError> {
        let url = format!("{}/session/login", self.base_url);
        let body = LoginBody {
            account_name: request.account_name,
            password: request.password,
            two_factor_code: request.two_factor_code,
            sentry: request
                .sentry
                .map(|s| base64::engine::general_purpose::STANDARD.encode(s.bytes())),
        };

        let response = self.client.post(&url).json(&body).send().await?;
        let response = Self::check_response(response).await?;
        let login: LoginResponse = response.json().await?;

        let eresult = EResult(login.eresult);
        debug!(%eresult, "Login response received");

        let outcome = LoginOutcome::from_eresult(eresult, login.persona_name);
        if let LoginOutcome::LoggedOn { .. } = outcome {
            let session_id = login.session_id.ok_or_else(|| {
                GatewayError::InvalidResponse("login succeeded without a session id".to_string())
            })?;
            self.session_id = Some(session_id);
        }
        Ok(outcome)
    }

    async fn games_played(&mut self, app_ids: &[AppId]) -> Result<(), ClientError> {
        let url = self.session_url("games_played")?;
        let body = GamesPlayedBody {
            games: app_ids.to_vec(),
        };

        let response = self.client.post(&url).json(&body).send().await?;
        Self::check_response(response).await?;
        Ok(())
    }

    async fn pump_events(&mut self, timeout: Duration) -> Result<(), ClientError> {
        let url = self.session_url("events")?;
        let server_wait = timeout.saturating_sub(Duration::from_millis(POLL_SLACK_MS));
        let timeout_ms = server_wait.as_millis().to_string();

        let response = self
            .client
            .get(&url)
            .query(&[("timeout_ms", timeout_ms.as_str())])
            .timeout(timeout)
            .send()
            .await?;
        let response = Self::check_response(response).await?;
        let events: EventsResponse = response.json().await?;

        if !events.events.is_empty() {
            debug!(count = events.events.len(), "Gateway events received");
        }
        if events.events.iter().any(|e| e.kind == EVENT_LOGGED_OFF) {
            warn!("Gateway reported the session as logged off");
            return Err(ClientError::Disconnected);
        }
        Ok(())
    }

    async fn logout(&mut self) -> Result<(), ClientError> {
        if self.session_id.is_none() {
            debug!("Logout requested without a gateway session");
            return Ok(());
        }
        let url = self.session_url("logout")?;

        let response = self.client.post(&url).send().await?;
        Self::check_response(response).await?;
        self.session_id = None;
        Ok(())
    }
}
