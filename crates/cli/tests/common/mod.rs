//! Common utilities for integration tests

pub mod cli;

use std::path::{Path, PathBuf};

/// Write `contents` as `config.toml` in `dir`
pub fn write_config(dir: &Path, contents: &str) -> PathBuf {
    let path = dir.join("config.toml");
    std::fs::write(&path, contents).expect("Failed to write test config");
    path
}
