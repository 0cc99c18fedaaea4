//! Tracing setup
//!
//! Logs go to stderr because stdout carries the notification stream.

use crate::config::LogConfig;
use anyhow::{Context, Result};
use std::str::FromStr;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;

/// Resolve the effective level: each `-v` raises verbosity past the config
pub fn effective_level(config: &LogConfig, verbose: u8) -> Result<Level> {
    let configured = Level::from_str(&config.level)
        .map_err(|_| anyhow::anyhow!("Invalid log level: {}", config.level))?;

    Ok(match verbose {
        0 => configured,
        1 => configured.max(Level::DEBUG),
        _ => Level::TRACE,
    })
}

/// Install the global subscriber
///
/// The returned guard must be kept alive so buffered file output is flushed.
pub fn init(config: &LogConfig, verbose: u8) -> Result<Option<WorkerGuard>> {
    let level = effective_level(config, verbose)?;

    match &config.file {
        Some(path) => {
            let directory = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| std::path::Path::new("."));
            let file_name = path
                .file_name()
                .context("log.file must name a file")?;
            std::fs::create_dir_all(directory).context("Failed to create log directory")?;

            let appender = tracing_appender::rolling::never(directory, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_max_level(level)
                .with_ansi(false)
                .with_writer(writer)
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::fmt()
                .with_max_level(level)
                .with_writer(std::io::stderr)
                .init();
            Ok(None)
        }
    }
}
