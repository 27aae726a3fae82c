use std::env;
use std::fs::{self, OpenOptions};
use std::path::Path;

use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Environment variable overriding the log filter
pub const LOG_ENV_VAR: &str = "TAG_HISTORY_LOG";

const DEFAULT_FILTER: &str = "info";

/// Resolves the log filter from the environment, defaulting to `info`
pub fn resolve_filter() -> String {
    env::var(LOG_ENV_VAR)
        .ok()
        .filter(|f| !f.is_empty())
        .unwrap_or_else(|| DEFAULT_FILTER.to_string())
}

/// Initializes the tracing subscriber to append logs to `log_path`.
///
/// The returned guard flushes the background writer on drop and must be
/// held for the lifetime of the program.
pub fn init(log_path: &Path, filter: &str) -> anyhow::Result<WorkerGuard> {
    if let Some(parent) = log_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Couldn't create the log directory: {}", parent.display()))?;
    }
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .with_context(|| format!("Couldn't open the log file: {}", log_path.display()))?;

    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .parse(filter)
        .context("Couldn't parse the log filter")?;

    let (writer, guard) = tracing_appender::non_blocking(log_file);
    let file_layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_filter(env_filter);

    tracing_subscriber::registry()
        .with(file_layer)
        .try_init()
        .context("Couldn't install the tracing subscriber")?;

    Ok(guard)
}
