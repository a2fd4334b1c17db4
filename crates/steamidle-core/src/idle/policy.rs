use std::time::Duration;

use tracing::warn;

/// How often presence is re-declared. The network drops declarations that go
/// unrefreshed for longer than this.
pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);
pub const MAX_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

pub const DEFAULT_RENDER_INTERVAL: Duration = Duration::from_secs(1);

/// Pacing between ticks of the idle loop.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(100);
pub const MIN_TICK_INTERVAL: Duration = Duration::from_millis(10);
/// Heartbeat and render checks only run on ticks, so a tick may not outlast
/// the shortest of them.
pub const MAX_TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Longest a single event pump may block.
pub const DEFAULT_PUMP_TIMEOUT: Duration = Duration::from_millis(100);
pub const MAX_PUMP_TIMEOUT: Duration = Duration::from_millis(100);
pub const MIN_PUMP_TIMEOUT: Duration = Duration::from_millis(1);

/// Timing knobs for an idle session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionPolicy {
    pub heartbeat_interval: Duration,
    pub render_interval: Duration,
    pub tick_interval: Duration,
    pub pump_timeout: Duration,
    /// `None` keeps asking for guard codes for as long as the service wants one.
    pub max_guard_attempts: Option<u32>,
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            heartbeat_interval: DEFAULT_HEARTBEAT_INTERVAL,
            render_interval: DEFAULT_RENDER_INTERVAL,
            tick_interval: DEFAULT_TICK_INTERVAL,
            pump_timeout: DEFAULT_PUMP_TIMEOUT,
            max_guard_attempts: None,
        }
    }
}

impl SessionPolicy {
    /// Pull every value back inside the range the idle loop supports.
    ///
    /// Session time is counted in whole seconds, so heartbeat and render
    /// intervals are rounded down to seconds with a floor of one.
    pub fn validated(self) -> Self {
        let heartbeat_interval = whole_secs(self.heartbeat_interval);
        let heartbeat_interval = if heartbeat_interval > MAX_HEARTBEAT_INTERVAL {
            warn!(
                requested = ?self.heartbeat_interval,
                max = ?MAX_HEARTBEAT_INTERVAL,
                "Heartbeat interval too long, clamping"
            );
            MAX_HEARTBEAT_INTERVAL
        } else {
            heartbeat_interval
        };

        let pump_timeout = self.pump_timeout.clamp(MIN_PUMP_TIMEOUT, MAX_PUMP_TIMEOUT);
        if pump_timeout != self.pump_timeout {
            warn!(requested = ?self.pump_timeout, using = ?pump_timeout, "Pump timeout out of range");
        }

        let tick_interval = self.tick_interval.clamp(MIN_TICK_INTERVAL, MAX_TICK_INTERVAL);
        if tick_interval != self.tick_interval {
            warn!(requested = ?self.tick_interval, using = ?tick_interval, "Tick interval out of range");
        }

        Self {
            heartbeat_interval,
            render_interval: whole_secs(self.render_interval),
            tick_interval,
            pump_timeout,
            max_guard_attempts: self.max_guard_attempts,
        }
    }

    pub(crate) fn heartbeat_secs(&self) -> u64 {
        self.heartbeat_interval.as_secs().max(1)
    }

    pub(crate) fn render_secs(&self) -> u64 {
        self.render_interval.as_secs().max(1)
    }
}

fn whole_secs(d: Duration) -> Duration {
    Duration::from_secs(d.as_secs().max(1))
}
