//! Relay project-file changes under a directory

use crate::config::SystemConfig;
use anyhow::{Context, Result};
use projrelay_watcher::{FileNamePatterns, FsChangeSource, IgnoreRules};
use std::path::Path;
use tracing::info;

pub async fn run(config: &SystemConfig, root: &Path) -> Result<()> {
    let root = root
        .canonicalize()
        .with_context(|| format!("Cannot watch {}", root.display()))?;

    let debouncer = super::start_debouncer(config)?;
    let rules = IgnoreRules::load(&root, config.watch.clone())
        .context("Failed to load ignore rules")?;
    let patterns = FileNamePatterns::new(&config.providers.all_patterns())
        .context("Invalid provider file pattern")?;
    let source = FsChangeSource::start(rules, patterns, debouncer.clone())
        .context("Failed to start filesystem watcher")?;

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;

    info!("Stopping watch on {}", source.root().display());
    drop(source);
    debouncer.drain().await;
    Ok(())
}
