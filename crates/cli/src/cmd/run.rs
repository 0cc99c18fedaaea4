//! Relay changes read from stdin
//!
//! Input is one JSON object per line:
//!
//! ```text
//! {"path": "/src/App/App.csproj", "kind": "Changed"}
//! ```
//!
//! When stdin closes, pending notifications are flushed before exiting.

use crate::config::SystemConfig;
use anyhow::{Context, Result};
use projrelay_core::RawChangeKind;
use projrelay_watcher::Debouncer;
use serde::Deserialize;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

/// One raw change as read from the input stream
#[derive(Debug, Deserialize, PartialEq)]
pub struct ChangeRecord {
    pub path: PathBuf,
    pub kind: RawChangeKind,
}

/// Parse one input line; blank lines yield `None`
pub fn parse_line(line: &str) -> Result<Option<ChangeRecord>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let record = serde_json::from_str(line).context("Malformed change record")?;
    Ok(Some(record))
}

pub async fn run(config: &SystemConfig) -> Result<()> {
    let debouncer = super::start_debouncer(config)?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let interrupted = tokio::signal::ctrl_c();
    tokio::pin!(interrupted);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line.context("Failed to read change stream")? {
                    Some(line) => relay_line(&debouncer, &line),
                    None => break,
                }
            }
            _ = &mut interrupted => {
                info!("Interrupted");
                break;
            }
        }
    }

    info!(pending = debouncer.pending_count(), "Input closed, draining pending notifications");
    debouncer.drain().await;
    Ok(())
}

fn relay_line(debouncer: &Debouncer, line: &str) {
    match parse_line(line) {
        Ok(Some(record)) => {
            debouncer.on_change(&record.path, record.kind);
        }
        Ok(None) => {}
        Err(e) => warn!("Skipping input line: {:#}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_line() {
        let record = parse_line(r#"{"path": "src/App/App.csproj", "kind": "Reloaded"}"#)
            .unwrap()
            .unwrap();
        assert_eq!(
            record,
            ChangeRecord {
                path: PathBuf::from("src/App/App.csproj"),
                kind: RawChangeKind::Reloaded,
            }
        );
    }

    #[test]
    fn test_parse_line_accepts_workspace_names() {
        let record = parse_line(r#"{"path": "a.csproj", "kind": "ProjectAdded"}"#)
            .unwrap()
            .unwrap();
        assert_eq!(record.kind, RawChangeKind::Added);

        let record = parse_line(r#"{"path": "a.cs", "kind": "DocumentChanged"}"#)
            .unwrap()
            .unwrap();
        assert_eq!(record.kind, RawChangeKind::Unrelated);
    }

    #[test]
    fn test_parse_line_blank_and_malformed() {
        assert!(parse_line("   ").unwrap().is_none());
        assert!(parse_line("{not json").is_err());
        assert!(parse_line(r#"{"kind": "Added"}"#).is_err());
    }
}
