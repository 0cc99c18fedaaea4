//! Project state providers
//!
//! A provider answers "what do you currently know about the project at
//! this path?". The registry fans a query out to every provider and
//! merges the answers into a [`ProjectInfoBundle`].

use crate::error::{ProviderError, RegistryError};
use crate::payload::ProjectInfoBundle;
use async_trait::async_trait;
use futures::future::join_all;
use futures::FutureExt;
use serde_json::Value;
use std::panic::AssertUnwindSafe;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// Source of project descriptions
///
/// Implementations must tolerate concurrent calls: flushes for different
/// subjects query providers in parallel.
#[async_trait]
pub trait ProjectStateProvider: Send + Sync {
    /// Identifier used as the bundle key, e.g. `MsBuild`
    fn key(&self) -> &str;

    /// Describe the project at `path`, or `Ok(None)` if not applicable
    async fn describe(&self, path: &Path) -> Result<Option<Value>, ProviderError>;
}

/// Ordered set of providers, unique by key
#[derive(Default, Clone)]
pub struct ProviderRegistry {
    providers: Vec<Arc<dyn ProjectStateProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a provider; keys must be non-empty and unique
    pub fn register(&mut self, provider: Arc<dyn ProjectStateProvider>) -> Result<(), RegistryError> {
        let key = provider.key();
        if key.is_empty() {
            return Err(RegistryError::EmptyKey);
        }
        if self.providers.iter().any(|p| p.key() == key) {
            return Err(RegistryError::DuplicateKey(key.to_string()));
        }
        self.providers.push(provider);
        Ok(())
    }

    /// Builder-style [`register`](Self::register)
    pub fn with(mut self, provider: Arc<dyn ProjectStateProvider>) -> Result<Self, RegistryError> {
        self.register(provider)?;
        Ok(self)
    }

    /// Provider keys in registration order
    pub fn keys(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.key()).collect()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Query every provider for `path` and merge the answers
    ///
    /// Providers run concurrently. A provider that fails or panics is
    /// logged and left out of the bundle; it never fails the query as a
    /// whole.
    pub async fn describe_all(&self, path: &Path) -> ProjectInfoBundle {
        let answers = join_all(self.providers.iter().map(|p| {
            AssertUnwindSafe(p.describe(path))
                .catch_unwind()
                .map(flatten_panic)
        }))
        .await;

        let mut bundle = ProjectInfoBundle::new();
        for (provider, answer) in self.providers.iter().zip(answers) {
            match answer {
                Ok(Some(fragment)) => {
                    if !bundle.insert(provider.key(), fragment) {
                        warn!(provider = provider.key(), "Duplicate provider fragment dropped");
                    }
                }
                Ok(None) => {
                    debug!(provider = provider.key(), path = %path.display(), "Provider declined");
                }
                Err(e) => {
                    warn!(
                        provider = provider.key(),
                        path = %path.display(),
                        "Provider query failed: {}",
                        e
                    );
                }
            }
        }
        bundle
    }
}

fn flatten_panic(
    answer: std::thread::Result<Result<Option<serde_json::Value>, ProviderError>>,
) -> Result<Option<serde_json::Value>, ProviderError> {
    answer.unwrap_or_else(|panic| Err(ProviderError::Panicked(panic_message(&*panic))))
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}
