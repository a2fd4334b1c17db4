//! Core library for steamidle.
//!
//! This crate holds everything that does not touch the terminal:
//!
//! - `client`: the `SteamClient` interface and the HTTP gateway implementation
//! - `auth`: credential handshake with the second-factor retry loop
//! - `presence`: periodic "now playing" declarations
//! - `clock`: elapsed session time and its display format
//! - `idle`: the session state machine and its guaranteed teardown
//! - `status`: the interface a front end implements to show progress
//! - `config`: on-disk configuration and tunable session policy

pub mod auth;
pub mod client;
pub mod clock;
pub mod config;
pub mod idle;
pub mod presence;
pub mod shutdown;
pub mod status;

pub use auth::{AuthResult, AuthSession, AuthenticatedSession, Credentials, GuardCodePrompt};
pub use client::{AppId, AppIdSet, ClientError, GatewayClient, SteamClient};
pub use clock::SessionClock;
pub use config::Config;
pub use idle::{run_session, IdleLoop, SessionError, SessionOutcome, SessionPolicy, SessionReport};
pub use presence::PresenceHeartbeat;
pub use shutdown::{ShutdownSignal, ShutdownTrigger};
pub use status::{Notice, StatusPresenter, StatusSnapshot};
