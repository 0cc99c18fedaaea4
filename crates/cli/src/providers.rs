//! Built-in project state providers

use crate::config::ProvidersConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use projrelay_core::{ProjectStateProvider, ProviderError, ProviderRegistry};
use projrelay_watcher::FileNamePatterns;
use serde_json::{json, Value};
use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Describes project manifests matched by file name
///
/// Answers with on-disk facts about the manifest; a path that does not
/// match, or no longer exists, is not applicable.
pub struct ManifestProvider {
    key: String,
    patterns: FileNamePatterns,
}

impl ManifestProvider {
    /// `patterns` are file-name globs in .gitignore syntax
    pub fn new<S: AsRef<str>>(key: impl Into<String>, patterns: &[S]) -> Result<Self> {
        let key = key.into();
        let patterns = FileNamePatterns::new(patterns)
            .with_context(|| format!("Invalid file pattern for provider '{}'", key))?;
        Ok(Self { key, patterns })
    }

    fn claims(&self, path: &Path) -> bool {
        self.patterns.matches(path)
    }
}

#[async_trait]
impl ProjectStateProvider for ManifestProvider {
    fn key(&self) -> &str {
        &self.key
    }

    async fn describe(&self, path: &Path) -> Result<Option<Value>, ProviderError> {
        if !self.claims(path) {
            return Ok(None);
        }

        let metadata = match tokio::fs::metadata(path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let last_modified_ms = metadata.modified().ok().and_then(unix_millis);

        let project_name = match path.file_name().and_then(|n| n.to_str()) {
            // project.json projects are named after their directory
            Some("project.json") => path.parent().and_then(|p| p.file_name()),
            _ => path.file_stem(),
        };

        Ok(Some(json!({
            "Path": path.to_string_lossy(),
            "ProjectName": project_name.map(|n| n.to_string_lossy()),
            "Directory": path.parent().map(|p| p.to_string_lossy()),
            "Size": metadata.len(),
            "LastModifiedMs": last_modified_ms,
        })))
    }
}

/// Milliseconds since the Unix epoch, if representable
fn unix_millis(time: SystemTime) -> Option<u64> {
    let since_epoch = time.duration_since(UNIX_EPOCH).ok()?;
    u64::try_from(since_epoch.as_millis()).ok()
}

/// Bounds how long a wrapped provider may take to answer
pub struct TimeoutProvider {
    inner: Arc<dyn ProjectStateProvider>,
    timeout: Duration,
}

impl TimeoutProvider {
    pub fn new(inner: Arc<dyn ProjectStateProvider>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }
}

#[async_trait]
impl ProjectStateProvider for TimeoutProvider {
    fn key(&self) -> &str {
        self.inner.key()
    }

    async fn describe(&self, path: &Path) -> Result<Option<Value>, ProviderError> {
        tokio::time::timeout(self.timeout, self.inner.describe(path))
            .await
            .map_err(|_| ProviderError::Timeout(self.timeout))?
    }
}

/// Build the provider registry described by the configuration
pub fn build_registry(config: &ProvidersConfig) -> Result<ProviderRegistry> {
    let mut registry = ProviderRegistry::new();

    for manifest in &config.manifest {
        let mut provider: Arc<dyn ProjectStateProvider> =
            Arc::new(ManifestProvider::new(&manifest.key, &manifest.patterns)?);
        if config.timeout_ms > 0 {
            provider = Arc::new(TimeoutProvider::new(
                provider,
                Duration::from_millis(config.timeout_ms),
            ));
        }
        registry
            .register(provider)
            .with_context(|| format!("Failed to register provider '{}'", manifest.key))?;
    }

    Ok(registry)
}
