//! "Now playing" declarations.
//!
//! The network silently forgets a declaration after a while, so an active
//! session re-sends it on a schedule. `PresenceHeartbeat` sends declarations
//! and remembers what was last accepted.

pub mod heartbeat;

pub use heartbeat::PresenceHeartbeat;
