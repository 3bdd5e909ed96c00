//! Structured logging setup (§4.9): one subscriber installed per process, never a reopened
//! module-level singleton.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::ControllerError;

/// Installs the controller's logging subscriber: stderr only, no per-worker file sink.
///
/// # Errors
/// Returns [`ControllerError::Logging`] if a subscriber was already installed in this process.
pub fn init_controller_logging() -> Result<(), ControllerError> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer())
        .try_init()
        .map_err(|err| ControllerError::Logging(err.to_string()))
}

/// Installs a worker process's logging subscriber: stderr plus a rotating file sink under
/// `logs_dir` named after `worker_index`, so a single worker's log can be inspected in
/// isolation.
///
/// The returned [`WorkerGuard`] is a scoped resource: the file sink flushes and closes when it
/// is dropped, which callers should hold for the lifetime of the worker process.
///
/// # Errors
/// Returns [`ControllerError::Logging`] if a subscriber was already installed in this process.
pub fn init_worker_logging(
    logs_dir: &Path,
    worker_index: usize,
) -> Result<WorkerGuard, ControllerError> {
    let file_appender =
        tracing_appender::rolling::never(logs_dir, format!("inspector_{worker_index}.log"));
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer())
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .try_init()
        .map_err(|err| ControllerError::Logging(err.to_string()))?;

    Ok(guard)
}
