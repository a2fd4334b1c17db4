use std::fmt;
use std::path::Path;

use tracing::{debug, warn};

/// Default sentry file, relative to the working directory.
pub const DEFAULT_SENTRY_FILE: &str = "steam_sentry.bin";

/// Device-authorization token from an earlier, already verified logon.
///
/// The content is opaque. This crate only reads it; whatever talks to the
/// network is responsible for writing it.
#[derive(Clone, PartialEq, Eq)]
pub struct Sentry(Vec<u8>);

impl Sentry {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.0
    }

    /// Read the sentry file if there is one.
    ///
    /// A missing, empty, or unreadable file means "no sentry" and the
    /// handshake goes ahead without it.
    pub fn load(path: &Path) -> Option<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No sentry file");
            return None;
        }
        match std::fs::read(path) {
            Ok(bytes) if bytes.is_empty() => {
                warn!(path = %path.display(), "Sentry file is empty, ignoring");
                None
            }
            Ok(bytes) => {
                debug!(path = %path.display(), len = bytes.len(), "Loaded sentry file");
                Some(Self(bytes))
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read sentry file, ignoring");
                None
            }
        }
    }
}

impl fmt::Debug for Sentry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sentry({} bytes)", self.0.len())
    }
}
