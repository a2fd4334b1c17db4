use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use steamidle_core::config::APP_NAME;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_FILE_PREFIX: &str = "steamidle.log";

/// Rolled log files older than this are removed at startup.
const KEEP_LOG_DAYS: u64 = 7;

/// Initialize file logging.
///
/// The status screen owns the terminal, so logs only go to a daily rolling
/// file. Use RUST_LOG to control the level (e.g. RUST_LOG=debug).
pub fn init_logging() -> WorkerGuard {
    let log_dir = log_directory();

    let file_appender = tracing_appender::rolling::daily(&log_dir, LOG_FILE_PREFIX);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,hyper=warn,reqwest=warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_ansi(false)
                .with_writer(file_writer),
        )
        .init();

    tracing::info!(dir = %log_dir.display(), version = env!("CARGO_PKG_VERSION"), "Logging initialized");
    cleanup_old_logs(&log_dir, KEEP_LOG_DAYS);

    guard
}

fn log_directory() -> PathBuf {
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
        .join("logs");

    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        eprintln!("Warning: Failed to create log directory: {}", e);
    }
    log_dir
}

fn cleanup_old_logs(log_dir: &Path, keep_days: u64) {
    let Some(cutoff) = SystemTime::now().checked_sub(Duration::from_secs(keep_days * 24 * 60 * 60)) else {
        return;
    };

    let entries = match std::fs::read_dir(log_dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read log directory for cleanup");
            return;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let is_rolled_log = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|name| name.starts_with(LOG_FILE_PREFIX) && name != LOG_FILE_PREFIX);
        if !is_rolled_log {
            continue;
        }

        let modified = match entry.metadata().and_then(|m| m.modified()) {
            Ok(m) => m,
            Err(_) => continue,
        };
        if modified < cutoff {
            match std::fs::remove_file(&path) {
                Ok(()) => tracing::debug!(path = %path.display(), "Removed old log file"),
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "Failed to remove old log file"),
            }
        }
    }
}
