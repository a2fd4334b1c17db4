//! Operator cancellation.
//!
//! A `ShutdownTrigger` latches a flag that the idle loop reads between ticks.
//! Once set it never clears, so a request cannot be lost or undone.

use tokio::sync::watch;
use tracing::{info, warn};

#[derive(Debug)]
pub struct ShutdownTrigger {
    tx: watch::Sender<bool>,
}

#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

pub fn channel() -> (ShutdownTrigger, ShutdownSignal) {
    let (tx, rx) = watch::channel(false);
    (ShutdownTrigger { tx }, ShutdownSignal { rx })
}

impl ShutdownTrigger {
    /// Request shutdown. Returns false if it was already requested.
    pub fn trigger(&self) -> bool {
        self.tx.send_if_modified(|requested| {
            let first = !*requested;
            *requested = true;
            first
        })
    }
}

impl ShutdownSignal {
    /// A signal that never fires.
    pub fn never() -> Self {
        let (tx, rx) = watch::channel(false);
        // Dropping the sender leaves the value at false forever.
        drop(tx);
        Self { rx }
    }

    /// A signal latched by Ctrl+C (and SIGTERM on unix).
    ///
    /// The listener keeps running after the first interrupt and swallows the
    /// following ones, so repeated Ctrl+C cannot cut teardown short. Must be
    /// called inside a tokio runtime.
    pub fn ctrl_c() -> Self {
        let (trigger, signal) = channel();
        tokio::spawn(async move {
            loop {
                if let Err(e) = wait_for_interrupt().await {
                    warn!(error = %e, "Failed to listen for interrupt signals");
                    return;
                }
                if trigger.trigger() {
                    info!("Interrupt received, shutting down");
                } else {
                    info!("Interrupt received again, shutdown already in progress");
                }
            }
        });
        signal
    }

    pub fn is_requested(&self) -> bool {
        *self.rx.borrow()
    }
}

#[cfg(unix)]
async fn wait_for_interrupt() -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result,
        _ = terminate.recv() => Ok(()),
    }
}

#[cfg(not(unix))]
async fn wait_for_interrupt() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}
