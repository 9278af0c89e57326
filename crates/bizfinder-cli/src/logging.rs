use std::path::{Path, PathBuf};

use anyhow::Context;
use bizfinder_core::AppConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Installs the process-wide subscriber: human-readable events on stderr and
/// a plain-text copy appended to the configured log file by a background
/// writer.
///
/// `RUST_LOG` takes precedence over `BIZFINDER_LOG_LEVEL`. Hold the returned
/// guard until exit so buffered file lines are flushed.
///
/// # Errors
///
/// Returns an error if the filter is invalid, the log path names no file,
/// or a subscriber is already installed.
pub(crate) fn init(config: &AppConfig) -> anyhow::Result<WorkerGuard> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;

    let (log_dir, log_filename) = split_log_path(&config.log_file)?;
    let file_appender = rolling::never(log_dir, log_filename);
    let (file_writer, guard) = non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(fmt::layer().with_writer(file_writer).with_ansi(false))
        .try_init()?;

    Ok(guard)
}

/// Splits the log path into the directory the appender writes in and the
/// file name. A bare file name lives in the working directory.
fn split_log_path(path: &Path) -> anyhow::Result<(PathBuf, PathBuf)> {
    let file_name = path
        .file_name()
        .with_context(|| format!("log path {} names no file", path.display()))?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok((dir, PathBuf::from(file_name)))
}
