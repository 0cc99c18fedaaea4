//! Subcommand implementations

pub mod config;
pub mod run;
pub mod watch;

use crate::config::SystemConfig;
use crate::providers::build_registry;
use crate::transport::JsonLineSink;
use anyhow::Result;
use projrelay_watcher::{DebounceConfig, Debouncer, NotifierContext};
use std::sync::Arc;
use tracing::info;

/// Build the debouncer with stdout as the notification sink
pub(crate) fn start_debouncer(config: &SystemConfig) -> Result<Debouncer> {
    let providers = build_registry(&config.providers)?;
    info!(
        providers = ?providers.keys(),
        debounce_ms = config.notifier.debounce_ms,
        "Starting notifier"
    );

    let context = NotifierContext::new(providers, Arc::new(JsonLineSink::stdout()));
    Ok(Debouncer::new(
        context,
        DebounceConfig::with_millis(config.notifier.debounce_ms),
    ))
}
