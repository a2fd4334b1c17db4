//! Elapsed session time.
//!
//! The clock reads the tokio clock so that paused-time tests drive it the same
//! way they drive the idle loop's timers.

use chrono::{DateTime, Utc};
use tokio::time::Instant;

const SECS_PER_HOUR: u64 = 3600;
const SECS_PER_MINUTE: u64 = 60;

#[derive(Debug, Clone, Copy)]
pub struct SessionClock {
    started: Instant,
    started_at: DateTime<Utc>,
}

impl SessionClock {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
            started_at: Utc::now(),
        }
    }

    /// Whole seconds since `start()`. Never decreases.
    pub fn elapsed_secs(&self) -> u64 {
        self.started.elapsed().as_secs()
    }

    /// Wall-clock time the session started, for display only.
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }
}

/// Format seconds as `HH:MM:SS`. Hours keep growing past 99.
pub fn format_elapsed(secs: u64) -> String {
    let hours = secs / SECS_PER_HOUR;
    let minutes = (secs % SECS_PER_HOUR) / SECS_PER_MINUTE;
    let seconds = secs % SECS_PER_MINUTE;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

/// Format seconds as fractional hours, e.g. `1.50h`.
pub fn format_hours(secs: u64) -> String {
    format!("{:.2}h", secs as f64 / SECS_PER_HOUR as f64)
}
