use tokio::time::{self, error::Elapsed, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::auth::AuthenticatedSession;
use crate::client::{AppIdSet, ClientError, SteamClient};
use crate::clock::SessionClock;
use crate::presence::PresenceHeartbeat;
use crate::shutdown::ShutdownSignal;
use crate::status::{Notice, StatusPresenter, StatusSnapshot};

use super::{DrainCause, Phase, SessionError, SessionPolicy, SessionReport};

/// Mutable per-session bookkeeping, touched only by the loop itself.
#[derive(Debug)]
struct SessionState {
    clock: SessionClock,
    /// Elapsed second of the last accepted declaration.
    last_presence_announce: u64,
    /// Elapsed second of the last status render.
    last_status_render: u64,
}

impl SessionState {
    fn start() -> Self {
        Self {
            clock: SessionClock::start(),
            last_presence_announce: 0,
            last_status_render: 0,
        }
    }
}

/// Keeps one logged-on client in "now playing" state until cancelled.
///
/// The loop owns the client for its whole life. `run` consumes the loop, and
/// every path out of it goes through `drain`, which clears the declaration
/// and logs out exactly once.
pub struct IdleLoop<C, P> {
    client: C,
    account_name: String,
    display_name: String,
    app_ids: AppIdSet,
    presenter: P,
    policy: SessionPolicy,
    shutdown: ShutdownSignal,
    heartbeat: PresenceHeartbeat,
    phase: Phase,
}

impl<C: SteamClient, P: StatusPresenter> IdleLoop<C, P> {
    pub fn new(
        session: AuthenticatedSession<C>,
        app_ids: AppIdSet,
        presenter: P,
        policy: SessionPolicy,
        shutdown: ShutdownSignal,
    ) -> Self {
        let (client, account_name, display_name) = session.into_parts();
        Self {
            client,
            account_name,
            display_name,
            app_ids,
            presenter,
            policy: policy.validated(),
            shutdown,
            heartbeat: PresenceHeartbeat::new(),
            phase: Phase::Authenticating,
        }
    }

    pub async fn run(mut self) -> Result<SessionReport, SessionError> {
        self.enter(Phase::Active);
        let mut state = SessionState::start();

        let cause = match self.activate().await {
            Ok(()) => self.drive(&mut state).await,
            Err(e) => {
                error!(error = %e, "Initial presence announcement failed");
                DrainCause::Fault(e.to_string())
            }
        };
        self.drain(state, cause).await
    }

    fn enter(&mut self, phase: Phase) {
        info!(from = ?self.phase, to = ?phase, "Session phase change");
        self.phase = phase;
    }

    async fn activate(&mut self) -> Result<(), SessionError> {
        self.heartbeat
            .announce(&mut self.client, &self.app_ids)
            .await
            .map_err(SessionError::Announce)?;
        info!(apps = %self.app_ids, "Idling started");
        self.presenter.notify(Notice::IdleStarted {
            app_ids: &self.app_ids,
        });
        Ok(())
    }

    /// Tick until cancelled or until a tick fails.
    async fn drive(&mut self, state: &mut SessionState) -> DrainCause {
        let mut pacing = time::interval(self.policy.tick_interval);
        pacing.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            pacing.tick().await;
            if self.shutdown.is_requested() {
                info!(elapsed = state.clock.elapsed_secs(), "Cancellation observed");
                return DrainCause::Cancelled;
            }
            if let Err(e) = self.tick(state).await {
                error!(error = %e, elapsed = state.clock.elapsed_secs(), "Session fault");
                return DrainCause::Fault(e.to_string());
            }
        }
    }

    async fn tick(&mut self, state: &mut SessionState) -> Result<(), SessionError> {
        let timeout = self.policy.pump_timeout;
        absorb_transient(time::timeout(timeout, self.client.pump_events(timeout)).await);

        let elapsed = state.clock.elapsed_secs();

        if elapsed.saturating_sub(state.last_status_render) >= self.policy.render_secs() {
            let snapshot = self.snapshot(state, elapsed);
            self.presenter.render(&snapshot)?;
            state.last_status_render = elapsed;
        }

        if elapsed.saturating_sub(state.last_presence_announce) >= self.policy.heartbeat_secs() {
            self.heartbeat
                .announce(&mut self.client, &self.app_ids)
                .await
                .map_err(SessionError::Announce)?;
            state.last_presence_announce = elapsed;
        }

        Ok(())
    }

    fn snapshot(&self, state: &SessionState, elapsed_secs: u64) -> StatusSnapshot {
        StatusSnapshot {
            account_name: self.account_name.clone(),
            display_name: self.display_name.clone(),
            app_ids: self.app_ids.clone(),
            elapsed_secs,
            started_at: state.clock.started_at(),
        }
    }

    /// Clear the declaration, then log out. Not interruptible.
    ///
    /// Both steps are attempted once each, whatever happened to the other.
    /// The first failure is returned after the client is closed.
    async fn drain(mut self, state: SessionState, cause: DrainCause) -> Result<SessionReport, SessionError> {
        self.enter(Phase::Draining);
        if let DrainCause::Fault(message) = &cause {
            self.presenter.notify(Notice::Fault(message));
        }
        self.presenter.notify(Notice::ShuttingDown);

        let revoked = self.heartbeat.revoke(&mut self.client).await;
        if let Err(e) = &revoked {
            error!(error = %e, "Failed to clear presence");
        }
        let logged_out = self.client.logout().await;
        if let Err(e) = &logged_out {
            error!(error = %e, "Failed to log out");
        }

        let elapsed_secs = state.clock.elapsed_secs();
        self.enter(Phase::Closed);
        revoked.map_err(SessionError::Teardown)?;
        logged_out.map_err(SessionError::Teardown)?;

        self.presenter.notify(Notice::LoggedOut);
        info!(elapsed = elapsed_secs, announcements = self.heartbeat.announcements(), "Session closed");

        Ok(SessionReport {
            display_name: self.display_name,
            elapsed_secs,
            announcements: self.heartbeat.announcements(),
            cause,
        })
    }
}

/// Event-pump faults and overruns end here. The session carries on.
fn absorb_transient(pumped: Result<Result<(), ClientError>, Elapsed>) {
    match pumped {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!(error = %e, "Event pump failed, continuing"),
        Err(_) => debug!("Event pump overran its slice, continuing"),
    }
}
