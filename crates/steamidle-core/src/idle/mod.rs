//! The idle session state machine.
//!
//! `Authenticating → Active → Draining → Closed`. A rejected or failed
//! handshake stops before `Active` and never declares or logs out anything.
//! Once `Active`, every exit (cancellation or fault) drains: declare the
//! empty set, then log out.

pub mod policy;
pub mod runner;

use std::io;

use thiserror::Error;
use tracing::{info, warn};

pub use policy::SessionPolicy;
pub use runner::IdleLoop;

use crate::auth::{AuthResult, AuthSession, Credentials, GuardCodePrompt, RejectReason};
use crate::client::{AppIdSet, ClientError, SteamClient};
use crate::shutdown::ShutdownSignal;
use crate::status::{Notice, StatusPresenter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Authenticating,
    Active,
    Draining,
    Closed,
}

/// Why an active session went into teardown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrainCause {
    Cancelled,
    Fault(String),
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Failed to announce presence: {0}")]
    Announce(#[source] ClientError),

    #[error("Failed to update status display: {0}")]
    Render(#[from] io::Error),

    #[error("Teardown failed: {0}")]
    Teardown(#[source] ClientError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReport {
    pub display_name: String,
    pub elapsed_secs: u64,
    /// Declarations the network accepted, including the final empty one.
    pub announcements: u64,
    pub cause: DrainCause,
}

#[derive(Debug)]
pub enum SessionOutcome {
    Completed(SessionReport),
    Rejected(RejectReason),
    /// The operator walked away from the guard-code prompt.
    Cancelled,
    HandshakeFailed(String),
}

/// Log on and idle until cancelled.
///
/// `arm_shutdown` is called once, when the session turns active, so that an
/// interrupt during the handshake keeps its default meaning. An `Err` only
/// comes out of teardown itself.
pub async fn run_session<C, G, P, F>(
    auth: AuthSession<C, G>,
    credentials: Credentials,
    app_ids: AppIdSet,
    mut presenter: P,
    policy: SessionPolicy,
    arm_shutdown: F,
) -> Result<SessionOutcome, SessionError>
where
    C: SteamClient,
    G: GuardCodePrompt,
    P: StatusPresenter,
    F: FnOnce() -> ShutdownSignal,
{
    info!(phase = ?Phase::Authenticating, apps = %app_ids, "Session starting");

    let session = match auth.authenticate(credentials).await {
        Ok(AuthResult::Authenticated(session)) => session,
        Ok(AuthResult::Rejected(reason)) => {
            presenter.notify(Notice::Rejected(&reason));
            return Ok(SessionOutcome::Rejected(reason));
        }
        Ok(AuthResult::Cancelled) => return Ok(SessionOutcome::Cancelled),
        Err(e) => {
            warn!(error = %e, "Handshake failed");
            let message = e.to_string();
            presenter.notify(Notice::HandshakeFailed(&message));
            return Ok(SessionOutcome::HandshakeFailed(message));
        }
    };

    info!(
        account = session.account_name(),
        at = %session.authenticated_at(),
        "Logged on"
    );
    presenter.notify(Notice::LoggedIn {
        display_name: session.display_name(),
    });
    let shutdown = arm_shutdown();

    let report = IdleLoop::new(session, app_ids, presenter, policy, shutdown)
        .run()
        .await?;
    Ok(SessionOutcome::Completed(report))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::client::fake::{Call, FakeClient, ScriptedPrompt};
    use crate::client::{AppId, EResult, LoginOutcome};
    use crate::shutdown;
    use crate::status::testing::RecordingPresenter;

    fn csgo() -> AppIdSet {
        AppIdSet::single(AppId::new(730).unwrap())
    }

    fn creds() -> Credentials {
        Credentials::new("idler", "hunter2")
    }

    /// Signal that fires after `after` of (paused) time.
    fn cancel_after(after: Duration) -> ShutdownSignal {
        let (trigger, signal) = shutdown::channel();
        tokio::spawn(async move {
            tokio::time::sleep(after).await;
            trigger.trigger();
        });
        signal
    }

    async fn idle(
        client: FakeClient,
        presenter: &mut RecordingPresenter,
        cancel_at: Duration,
    ) -> Result<SessionOutcome, SessionError> {
        let auth = AuthSession::new(client, ScriptedPrompt::silent());
        run_session(
            auth,
            creds(),
            csgo(),
            presenter,
            SessionPolicy::default(),
            move || cancel_after(cancel_at),
        )
        .await
    }

    fn completed(outcome: SessionOutcome) -> SessionReport {
        match outcome {
            SessionOutcome::Completed(report) => report,
            other => panic!("expected Completed, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_announce_declares_app() {
        let client = FakeClient::logged_on("Idler");
        let journal = client.journal();
        let mut presenter = RecordingPresenter::default();

        idle(client, &mut presenter, Duration::from_secs(2)).await.unwrap();

        assert_eq!(journal.logins(), 1);
        assert_eq!(journal.declarations().first(), Some(&vec![730]));
        let notices = presenter.notices();
        assert_eq!(notices[0], "logged_in");
        assert_eq!(notices[1], "idle_started");
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_revokes_then_logs_out() {
        let client = FakeClient::logged_on("Idler");
        let journal = client.journal();
        let mut presenter = RecordingPresenter::default();

        let report = completed(
            idle(client, &mut presenter, Duration::from_secs(12))
                .await
                .unwrap(),
        );

        assert_eq!(report.cause, DrainCause::Cancelled);
        assert_eq!(report.elapsed_secs, 12);
        assert_eq!(report.announcements, 2);
        assert_eq!(
            journal.calls(),
            vec![
                Call::Login {
                    two_factor_code: String::new(),
                    with_sentry: false
                },
                Call::GamesPlayed(vec![730]),
                Call::GamesPlayed(vec![]),
                Call::Logout,
            ]
        );
        assert_eq!(
            presenter.notices()[2..],
            ["shutting_down".to_string(), "logged_out".to_string()]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_renders_once_per_second() {
        let client = FakeClient::logged_on("Idler");
        let mut presenter = RecordingPresenter::default();

        idle(client, &mut presenter, Duration::from_millis(10_500))
            .await
            .unwrap();

        assert_eq!(presenter.renders(), (1..=10).collect::<Vec<u64>>());
    }

    #[tokio::test(start_paused = true)]
    async fn test_heartbeat_every_thirty_seconds() {
        let client = FakeClient::logged_on("Idler");
        let journal = client.journal();
        let mut presenter = RecordingPresenter::default();

        let report = completed(
            idle(client, &mut presenter, Duration::from_secs(95))
                .await
                .unwrap(),
        );

        let declarations = journal.declarations();
        assert_eq!(
            declarations,
            vec![vec![730], vec![730], vec![730], vec![730], vec![]]
        );
        assert_eq!(report.announcements, 5);
        assert_eq!(journal.logouts(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_configured_long_tick_keeps_cadence() {
        let client = FakeClient::logged_on("Idler");
        let journal = client.journal();
        let mut presenter = RecordingPresenter::default();
        let policy = crate::Config {
            tick_interval_ms: Some(45_000),
            ..Default::default()
        }
        .policy();

        run_session(
            AuthSession::new(client, ScriptedPrompt::silent()),
            creds(),
            csgo(),
            &mut presenter,
            policy,
            || cancel_after(Duration::from_millis(95_500)),
        )
        .await
        .unwrap();

        assert_eq!(
            journal.declarations(),
            vec![vec![730], vec![730], vec![730], vec![730], vec![]]
        );
        assert_eq!(presenter.renders(), (1..=95).collect::<Vec<u64>>());
    }

    #[tokio::test(start_paused = true)]
    async fn test_pump_faults_are_absorbed() {
        let client = FakeClient::logged_on("Idler")
            .with_pump_faults(Duration::from_secs(5), Duration::from_secs(6));
        let journal = client.journal();
        let mut presenter = RecordingPresenter::default();

        let report = completed(
            idle(client, &mut presenter, Duration::from_secs(10))
                .await
                .unwrap(),
        );

        assert_eq!(report.cause, DrainCause::Cancelled);
        assert!(journal.pump_failures() > 0);
        assert!(journal.pumps() > journal.pump_failures());
        assert!(presenter.renders().contains(&9));
        assert!(presenter.notices().iter().all(|n| !n.starts_with("fault")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_pump_is_cut_off() {
        let client = FakeClient::logged_on("Idler").with_pump_stall(Duration::from_secs(60));
        let mut presenter = RecordingPresenter::default();

        let report = completed(
            idle(client, &mut presenter, Duration::from_millis(4_500))
                .await
                .unwrap(),
        );

        assert_eq!(report.cause, DrainCause::Cancelled);
        assert_eq!(presenter.renders(), vec![1, 2, 3, 4]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_heartbeat_fault_drains() {
        let client = FakeClient::logged_on("Idler").with_failing_declarations([1]);
        let journal = client.journal();
        let mut presenter = RecordingPresenter::default();

        let report = completed(
            idle(client, &mut presenter, Duration::from_secs(300))
                .await
                .unwrap(),
        );

        assert!(matches!(report.cause, DrainCause::Fault(_)));
        assert_eq!(report.elapsed_secs, 30);
        assert_eq!(
            journal.declarations(),
            vec![vec![730], vec![730], vec![]]
        );
        assert_eq!(journal.logouts(), 1);
        assert!(presenter.notices().iter().any(|n| n.starts_with("fault")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_render_fault_drains() {
        let client = FakeClient::logged_on("Idler");
        let journal = client.journal();
        let mut presenter = RecordingPresenter {
            fail_render_at: Some(3),
            ..Default::default()
        };

        let report = completed(
            idle(client, &mut presenter, Duration::from_secs(300))
                .await
                .unwrap(),
        );

        assert!(matches!(report.cause, DrainCause::Fault(_)));
        assert_eq!(presenter.renders(), vec![1, 2]);
        assert_eq!(journal.declarations().last(), Some(&Vec::new()));
        assert_eq!(journal.logouts(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_first_announce_still_logs_out() {
        let client = FakeClient::logged_on("Idler").with_failing_declarations([0]);
        let journal = client.journal();
        let mut presenter = RecordingPresenter::default();

        let report = completed(
            idle(client, &mut presenter, Duration::from_secs(300))
                .await
                .unwrap(),
        );

        assert!(matches!(report.cause, DrainCause::Fault(_)));
        assert_eq!(journal.declarations(), vec![vec![730], vec![]]);
        assert_eq!(journal.logouts(), 1);
        assert!(presenter.renders().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_teardown_failure_propagates_after_logout() {
        let client = FakeClient::logged_on("Idler").with_failing_declarations([1]);
        let journal = client.journal();
        let mut presenter = RecordingPresenter::default();

        let result = idle(client, &mut presenter, Duration::from_secs(5)).await;

        assert!(matches!(result, Err(SessionError::Teardown(_))));
        assert_eq!(journal.declarations(), vec![vec![730], vec![]]);
        assert_eq!(journal.logouts(), 1);
        assert!(!presenter.notices().contains(&"logged_out".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_logout_propagates() {
        let client = FakeClient::logged_on("Idler").with_failing_logout();
        let mut presenter = RecordingPresenter::default();

        let result = idle(client, &mut presenter, Duration::from_secs(1)).await;
        assert!(matches!(result, Err(SessionError::Teardown(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_before_first_tick() {
        let client = FakeClient::logged_on("Idler");
        let journal = client.journal();
        let mut presenter = RecordingPresenter::default();
        let (trigger, signal) = shutdown::channel();
        trigger.trigger();

        let outcome = run_session(
            AuthSession::new(client, ScriptedPrompt::silent()),
            creds(),
            csgo(),
            &mut presenter,
            SessionPolicy::default(),
            move || signal,
        )
        .await
        .unwrap();

        let report = completed(outcome);
        assert_eq!(report.elapsed_secs, 0);
        assert_eq!(journal.declarations(), vec![vec![730], vec![]]);
        assert_eq!(journal.pumps(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejected_never_declares() {
        let client = FakeClient::scripted([LoginOutcome::Denied(EResult::INVALID_PASSWORD)]);
        let journal = client.journal();
        let mut presenter = RecordingPresenter::default();
        let mut armed = false;

        let outcome = run_session(
            AuthSession::new(client, ScriptedPrompt::silent()),
            creds(),
            csgo(),
            &mut presenter,
            SessionPolicy::default(),
            || {
                armed = true;
                ShutdownSignal::never()
            },
        )
        .await
        .unwrap();

        assert!(matches!(
            outcome,
            SessionOutcome::Rejected(RejectReason::Denied(EResult::INVALID_PASSWORD))
        ));
        assert!(!armed);
        assert!(journal.declarations().is_empty());
        assert_eq!(journal.logouts(), 0);
        assert_eq!(presenter.notices(), vec!["rejected".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_handshake_failure_never_declares() {
        let client = FakeClient::logged_on("Idler").with_login_transport_error();
        let journal = client.journal();
        let mut presenter = RecordingPresenter::default();

        let outcome = idle(client, &mut presenter, Duration::from_secs(1))
            .await
            .unwrap();

        assert!(matches!(outcome, SessionOutcome::HandshakeFailed(_)));
        assert!(journal.declarations().is_empty());
        assert_eq!(journal.logouts(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_multiple_apps_declared_together() {
        let client = FakeClient::logged_on("Idler");
        let journal = client.journal();
        let mut presenter = RecordingPresenter::default();
        let apps: AppIdSet = "730,440".parse().unwrap();

        run_session(
            AuthSession::new(client, ScriptedPrompt::silent()),
            creds(),
            apps,
            &mut presenter,
            SessionPolicy::default(),
            || cancel_after(Duration::from_secs(1)),
        )
        .await
        .unwrap();

        assert_eq!(journal.declarations(), vec![vec![440, 730], vec![]]);
    }
}
