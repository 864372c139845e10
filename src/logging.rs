//! File logging through `tracing`.
//!
//! Nothing is written to the terminal: the watch command owns the screen and the export
//! command may be writing SVG to stdout. Entries go to a daily rolling file under the XDG
//! state directory, and rotated files older than a week are pruned on startup.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::SystemTime;
use tracing_appender::{non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{prelude::*, EnvFilter};

/// File name prefix of every log file; rotation appends the date.
pub const LOG_FILE_PREFIX: &str = "wavegraph.log";

/// Filter variable checked before `RUST_LOG`.
const LOG_ENV_VAR: &str = "WAVEGRAPH_LOG";

const DEFAULT_FILTER: &str = "info";

/// Rotated files kept on disk.
const MAX_LOG_FILES: usize = 7;

/// Flushes the non-blocking writer when the process exits.
static APPENDER_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Installs the global subscriber writing to the rolling log file.
///
/// The filter comes from `WAVEGRAPH_LOG`, then `RUST_LOG`, then defaults to `info`.
///
/// # Errors
/// - If the log directory cannot be determined or created
/// - If logging was already initialized
pub fn init_logging() -> anyhow::Result<()> {
    let log_dir = get_log_dir()?;
    fs::create_dir_all(&log_dir)?;

    let removed = cleanup_old_logs(&log_dir).unwrap_or_else(|e| {
        eprintln!("Warning: Failed to cleanup old logs: {e}");
        0
    });

    let (writer, guard) = tracing_appender::non_blocking(rolling::daily(&log_dir, LOG_FILE_PREFIX));
    APPENDER_GUARD
        .set(guard)
        .map_err(|_| anyhow::anyhow!("Logging already initialized"))?;

    tracing_subscriber::registry()
        .with(env_filter(std::env::var(LOG_ENV_VAR).ok()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_target(true)
                .with_thread_ids(true)
                .with_ansi(false),
        )
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))?;

    tracing::debug!(
        "Logging to {} ({removed} old files removed)",
        log_dir.display()
    );
    Ok(())
}

/// Builds the filter from an explicit directive, falling back to `RUST_LOG`.
fn env_filter(directive: Option<String>) -> EnvFilter {
    directive
        .and_then(|d| EnvFilter::try_new(d).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

/// Directory holding the log files: `$XDG_STATE_HOME/wavegraph`, or
/// `~/.local/state/wavegraph` when the variable is unset.
///
/// The directory is not created here.
///
/// # Errors
/// - If the home directory cannot be determined
pub fn get_log_dir() -> anyhow::Result<PathBuf> {
    if let Some(state) = std::env::var_os("XDG_STATE_HOME").filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(state).join("wavegraph"));
    }
    let home =
        dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?;
    Ok(home.join(".local").join("state").join("wavegraph"))
}

/// Rotated log files in `log_dir`, newest first.
fn rotated_logs(log_dir: &Path) -> anyhow::Result<Vec<(PathBuf, SystemTime)>> {
    let mut logs: Vec<(PathBuf, SystemTime)> = fs::read_dir(log_dir)?
        .filter_map(Result::ok)
        .filter(|entry| is_rotated_log(&entry.file_name().to_string_lossy()))
        .filter_map(|entry| {
            let modified = entry.metadata().ok()?.modified().ok()?;
            Some((entry.path(), modified))
        })
        .collect();
    logs.sort_by(|a, b| b.1.cmp(&a.1));
    Ok(logs)
}

/// Deletes rotated files beyond the newest `MAX_LOG_FILES` and returns how many went.
fn cleanup_old_logs(log_dir: &Path) -> anyhow::Result<usize> {
    let mut removed = 0;
    for (path, _) in rotated_logs(log_dir)?.into_iter().skip(MAX_LOG_FILES) {
        match fs::remove_file(&path) {
            Ok(()) => removed += 1,
            Err(e) => eprintln!("Warning: Failed to delete {}: {e}", path.display()),
        }
    }
    Ok(removed)
}

/// True for `wavegraph.log.YYYY-MM-DD`.
fn is_rotated_log(file_name: &str) -> bool {
    file_name
        .strip_prefix(LOG_FILE_PREFIX)
        .and_then(|rest| rest.strip_prefix('.'))
        .is_some_and(|date| date.matches('-').count() == 2)
}
