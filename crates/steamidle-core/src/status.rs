//! What a front end needs to show session progress.

use std::io;

use chrono::{DateTime, Utc};

use crate::auth::RejectReason;
use crate::client::AppIdSet;
use crate::clock::{format_elapsed, format_hours};

/// Point-in-time view of an active session.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusSnapshot {
    pub account_name: String,
    pub display_name: String,
    pub app_ids: AppIdSet,
    pub elapsed_secs: u64,
    pub started_at: DateTime<Utc>,
}

impl StatusSnapshot {
    pub fn elapsed_display(&self) -> String {
        format_elapsed(self.elapsed_secs)
    }

    pub fn hours_display(&self) -> String {
        format_hours(self.elapsed_secs)
    }
}

/// One-off events worth telling the operator about.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice<'a> {
    LoggedIn { display_name: &'a str },
    IdleStarted { app_ids: &'a AppIdSet },
    Rejected(&'a RejectReason),
    HandshakeFailed(&'a str),
    /// Something broke while the session was active; teardown follows.
    Fault(&'a str),
    ShuttingDown,
    LoggedOut,
}

/// Display surface for the session.
///
/// `render` is called about once per elapsed second while active; an error
/// from it ends the session. `notify` is best-effort.
pub trait StatusPresenter {
    fn render(&mut self, status: &StatusSnapshot) -> io::Result<()>;

    fn notify(&mut self, notice: Notice<'_>);
}

impl<P: StatusPresenter + ?Sized> StatusPresenter for &mut P {
    fn render(&mut self, status: &StatusSnapshot) -> io::Result<()> {
        (**self).render(status)
    }

    fn notify(&mut self, notice: Notice<'_>) {
        (**self).notify(notice)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    pub enum Shown {
        Status(u64),
        Notice(String),
    }

    /// Records everything shown; can be told to fail rendering at some point.
    #[derive(Default)]
    pub struct RecordingPresenter {
        pub shown: Vec<Shown>,
        pub fail_render_at: Option<u64>,
    }

    impl RecordingPresenter {
        pub fn renders(&self) -> Vec<u64> {
            self.shown
                .iter()
                .filter_map(|s| match s {
                    Shown::Status(secs) => Some(*secs),
                    _ => None,
                })
                .collect()
        }

        pub fn notices(&self) -> Vec<String> {
            self.shown
                .iter()
                .filter_map(|s| match s {
                    Shown::Notice(n) => Some(n.clone()),
                    _ => None,
                })
                .collect()
        }
    }

    impl StatusPresenter for RecordingPresenter {
        fn render(&mut self, status: &StatusSnapshot) -> io::Result<()> {
            if self.fail_render_at.is_some_and(|at| status.elapsed_secs >= at) {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "terminal went away"));
            }
            self.shown.push(Shown::Status(status.elapsed_secs));
            Ok(())
        }

        fn notify(&mut self, notice: Notice<'_>) {
            let label = match notice {
                Notice::LoggedIn { .. } => "logged_in".to_string(),
                Notice::IdleStarted { .. } => "idle_started".to_string(),
                Notice::Rejected(_) => "rejected".to_string(),
                Notice::HandshakeFailed(_) => "handshake_failed".to_string(),
                Notice::Fault(msg) => format!("fault: {}", msg),
                Notice::ShuttingDown => "shutting_down".to_string(),
                Notice::LoggedOut => "logged_out".to_string(),
            };
            self.shown.push(Shown::Notice(label));
        }
    }
}
