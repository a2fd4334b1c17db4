//! Scripted in-memory collaborators for tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use crate::auth::{GuardCodePrompt, SecondFactorChallenge};

use super::{AppId, ClientError, EResult, GatewayError, LoginOutcome, LoginRequest, SteamClient};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Login { two_factor_code: String, with_sentry: bool },
    GamesPlayed(Vec<u32>),
    Logout,
}

/// Everything the fake saw, shared with the test after the client moved away.
#[derive(Debug, Default)]
pub struct Journal {
    pub calls: Vec<Call>,
    pub pumps: usize,
    pub pump_failures: usize,
}

#[derive(Clone, Default)]
pub struct JournalHandle(Arc<Mutex<Journal>>);

impl JournalHandle {
    pub fn calls(&self) -> Vec<Call> {
        self.0.lock().unwrap().calls.clone()
    }

    pub fn pumps(&self) -> usize {
        self.0.lock().unwrap().pumps
    }

    pub fn pump_failures(&self) -> usize {
        self.0.lock().unwrap().pump_failures
    }

    pub fn logins(&self) -> usize {
        self.count(|c| matches!(c, Call::Login { .. }))
    }

    pub fn logouts(&self) -> usize {
        self.count(|c| matches!(c, Call::Logout))
    }

    pub fn declarations(&self) -> Vec<Vec<u32>> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::GamesPlayed(ids) => Some(ids),
                _ => None,
            })
            .collect()
    }

    fn count(&self, f: impl Fn(&Call) -> bool) -> usize {
        self.0.lock().unwrap().calls.iter().filter(|c| f(c)).count()
    }

    fn record(&self, call: Call) {
        self.0.lock().unwrap().calls.push(call);
    }
}

pub struct FakeClient {
    journal: JournalHandle,
    logins: VecDeque<LoginOutcome>,
    login_transport_error: bool,
    created: Instant,
    pump_fault_window: Option<(Duration, Duration)>,
    pump_stall: Option<Duration>,
    failing_declarations: Vec<usize>,
    declarations_sent: usize,
    fail_logout: bool,
}

impl FakeClient {
    /// A client whose logins answer with `outcomes` in order.
    pub fn scripted(outcomes: impl IntoIterator<Item = LoginOutcome>) -> Self {
        Self {
            journal: JournalHandle::default(),
            logins: outcomes.into_iter().collect(),
            login_transport_error: false,
            created: Instant::now(),
            pump_fault_window: None,
            pump_stall: None,
            failing_declarations: Vec::new(),
            declarations_sent: 0,
            fail_logout: false,
        }
    }

    pub fn logged_on(display_name: &str) -> Self {
        Self::scripted([LoginOutcome::LoggedOn {
            display_name: display_name.to_string(),
        }])
    }

    pub fn journal(&self) -> JournalHandle {
        self.journal.clone()
    }

    pub fn with_login_transport_error(mut self) -> Self {
        self.login_transport_error = true;
        self
    }

    /// Pumps fail while the fake's age is inside `[from, to)`.
    pub fn with_pump_faults(mut self, from: Duration, to: Duration) -> Self {
        self.pump_fault_window = Some((from, to));
        self
    }

    /// Pumps ignore their timeout and wait this long instead.
    pub fn with_pump_stall(mut self, stall: Duration) -> Self {
        self.pump_stall = Some(stall);
        self
    }

    /// Declarations with these 0-based call numbers fail.
    pub fn with_failing_declarations(mut self, calls: impl IntoIterator<Item = usize>) -> Self {
        self.failing_declarations = calls.into_iter().collect();
        self
    }

    pub fn with_failing_logout(mut self) -> Self {
        self.fail_logout = true;
        self
    }
}

#[async_trait]
impl SteamClient for FakeClient {
    async fn login(&mut self, request: &LoginRequest<'_>) -> Result<LoginOutcome, ClientError> {
        self.journal.record(Call::Login {
            two_factor_code: request.two_factor_code.to_string(),
            with_sentry: request.sentry.is_some(),
        });
        if self.login_transport_error {
            return Err(GatewayError::ServerError("login backend down".to_string()).into());
        }
        Ok(self
            .logins
            .pop_front()
            .unwrap_or(LoginOutcome::Denied(EResult::FAIL)))
    }

    async fn games_played(&mut self, app_ids: &[AppId]) -> Result<(), ClientError> {
        self.journal
            .record(Call::GamesPlayed(app_ids.iter().map(|id| id.get()).collect()));
        let call = self.declarations_sent;
        self.declarations_sent += 1;
        if self.failing_declarations.contains(&call) {
            return Err(GatewayError::ServerError("declaration rejected".to_string()).into());
        }
        Ok(())
    }

    async fn pump_events(&mut self, timeout: Duration) -> Result<(), ClientError> {
        tokio::time::sleep(self.pump_stall.unwrap_or(timeout)).await;

        let age = self.created.elapsed();
        let mut journal = self.journal.0.lock().unwrap();
        journal.pumps += 1;
        if let Some((from, to)) = self.pump_fault_window {
            if age >= from && age < to {
                journal.pump_failures += 1;
                return Err(ClientError::Disconnected);
            }
        }
        Ok(())
    }

    async fn logout(&mut self) -> Result<(), ClientError> {
        self.journal.record(Call::Logout);
        if self.fail_logout {
            return Err(GatewayError::Unauthorized.into());
        }
        Ok(())
    }
}

/// Guard-code prompt answering from a script; `None` answers mean "input closed".
pub struct ScriptedPrompt {
    answers: VecDeque<Option<String>>,
    seen: Arc<Mutex<Vec<SecondFactorChallenge>>>,
}

impl ScriptedPrompt {
    pub fn new<S: Into<String>>(answers: impl IntoIterator<Item = Option<S>>) -> Self {
        Self {
            answers: answers.into_iter().map(|a| a.map(Into::into)).collect(),
            seen: Arc::default(),
        }
    }

    pub fn silent() -> Self {
        Self::new(Vec::<Option<String>>::new())
    }

    pub fn seen(&self) -> Arc<Mutex<Vec<SecondFactorChallenge>>> {
        Arc::clone(&self.seen)
    }
}

#[async_trait]
impl GuardCodePrompt for ScriptedPrompt {
    async fn request_code(
        &mut self,
        challenge: &SecondFactorChallenge,
    ) -> std::io::Result<Option<String>> {
        self.seen.lock().unwrap().push(challenge.clone());
        Ok(self.answers.pop_front().unwrap_or(Some(String::new())))
    }
}
