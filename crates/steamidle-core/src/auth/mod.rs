//! Authentication against the network's logon service.
//!
//! This module provides:
//! - `Credentials`: account name and secret, held only for the handshake
//! - `Sentry`: the cached device-authorization token, read if present
//! - `AuthSession`: the logon handshake with its second-factor retry loop
//!
//! A successful handshake hands the logged-on client over as an
//! `AuthenticatedSession`, which the idle loop then owns.

pub mod credentials;
pub mod sentry;
pub mod session;

pub use credentials::Credentials;
pub use sentry::{Sentry, DEFAULT_SENTRY_FILE};
pub use session::{
    AuthError, AuthResult, AuthSession, AuthenticatedSession, GuardCodePrompt, RejectReason,
    SecondFactorChallenge,
};
