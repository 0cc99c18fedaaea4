//! System configuration
//!
//! Loaded from `<config_dir>/projrelay/config.toml` unless a path is given.
//! A missing file means defaults.

use anyhow::{Context, Result};
use projrelay_watcher::{FileNamePatterns, IgnoreConfig, DEFAULT_DEBOUNCE_MS};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    pub notifier: NotifierConfig,
    pub providers: ProvidersConfig,
    pub watch: IgnoreConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifierConfig {
    /// Debounce window in milliseconds
    pub debounce_ms: u64,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    /// Per-query provider timeout; 0 disables it
    pub timeout_ms: u64,

    /// Manifest providers in registration order
    pub manifest: Vec<ManifestProviderConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 2000,
            manifest: vec![
                ManifestProviderConfig {
                    key: "MsBuild".to_string(),
                    patterns: vec![
                        "*.csproj".to_string(),
                        "*.fsproj".to_string(),
                        "*.vbproj".to_string(),
                    ],
                },
                ManifestProviderConfig {
                    key: "DotNet".to_string(),
                    patterns: vec!["project.json".to_string()],
                },
            ],
        }
    }
}

impl ProvidersConfig {
    /// Every file-name pattern claimed by some provider, deduplicated
    pub fn all_patterns(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.manifest
            .iter()
            .flat_map(|m| m.patterns.iter())
            .filter(|p| seen.insert(*p))
            .cloned()
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestProviderConfig {
    pub key: String,
    pub patterns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,

    /// Log to this file instead of stderr
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl SystemConfig {
    /// Check value ranges and provider keys
    pub fn validate(&self) -> Result<()> {
        if !(1..=60_000).contains(&self.notifier.debounce_ms) {
            anyhow::bail!(
                "notifier.debounce_ms must be between 1 and 60000 (got {})",
                self.notifier.debounce_ms
            );
        }

        if self.providers.timeout_ms > 60_000 {
            anyhow::bail!(
                "providers.timeout_ms must be at most 60000 (got {})",
                self.providers.timeout_ms
            );
        }

        let mut keys = HashSet::new();
        for provider in &self.providers.manifest {
            if provider.key.trim().is_empty() {
                anyhow::bail!("providers.manifest entries need a non-empty key");
            }
            if !keys.insert(provider.key.as_str()) {
                anyhow::bail!("duplicate provider key: {}", provider.key);
            }
            if provider.patterns.is_empty() {
                anyhow::bail!("provider '{}' has no patterns", provider.key);
            }
            FileNamePatterns::new(&provider.patterns)
                .with_context(|| format!("provider '{}' has an invalid pattern", provider.key))?;
        }

        FileNamePatterns::new(&self.watch.additional_patterns)
            .context("watch.additional_patterns has an invalid pattern")?;

        if !LOG_LEVELS.contains(&self.log.level.as_str()) {
            anyhow::bail!(
                "log.level must be one of {} (got '{}')",
                LOG_LEVELS.join(", "),
                self.log.level
            );
        }

        Ok(())
    }
}

/// Default config file location
pub fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("projrelay").join("config.toml"))
}

/// Load configuration from `path`, or from the default location
///
/// An explicit path must exist; the default location may be absent.
pub fn load(path: Option<&Path>) -> Result<SystemConfig> {
    let config = match path {
        Some(path) => load_from(path)?,
        None => match config_file_path() {
            Some(path) if path.exists() => load_from(&path)?,
            _ => SystemConfig::default(),
        },
    };

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn load_from(path: &Path) -> Result<SystemConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file {}", path.display()))
}

/// Write `config` to `path`, creating parent directories
pub fn save(config: &SystemConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create config directory")?;
    }
    let contents = toml::to_string_pretty(config).context("Failed to serialize config")?;
    std::fs::write(path, contents)
        .with_context(|| format!("Failed to write config file {}", path.display()))
}

/// Create the default config file if it does not exist yet
pub fn init_if_missing(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    save(&SystemConfig::default(), path)?;
    Ok(true)
}

/// Annotated example configuration
pub fn example_config() -> &'static str {
    r#"# projrelay configuration

[notifier]
# Delay between the first change to a project and its notification (1-60000)
debounce_ms = 500

[providers]
# Per-query provider timeout in milliseconds (0 disables, max 60000)
timeout_ms = 2000

# Patterns are file-name globs in .gitignore syntax
[[providers.manifest]]
key = "MsBuild"
patterns = ["*.csproj", "*.fsproj", "*.vbproj"]

[[providers.manifest]]
key = "DotNet"
patterns = ["project.json"]

[watch]
# Skip paths matched by the watched root's .gitignore
use_gitignore = true
# Extra .gitignore-style patterns, relative to the watched root
additional_patterns = []

[log]
# trace | debug | info | warn | error
level = "info"
# file = "/var/log/projrelay.log"
"#
}
