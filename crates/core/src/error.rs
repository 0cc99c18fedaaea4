//! Error types shared by providers, sinks and the registry

use std::time::Duration;
use thiserror::Error;

/// Failure while a provider answers a project query
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Provider did not answer within its time budget
    #[error("provider timed out after {0:?}")]
    Timeout(Duration),

    /// I/O failure while inspecting the project
    #[error("provider I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Provider panicked while answering
    #[error("provider panicked: {0}")]
    Panicked(String),

    /// Anything else the provider wants to report
    #[error("{0}")]
    Other(String),
}

/// Failure while delivering a notification
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to write notification: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode notification: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("sink closed")]
    Closed,
}

/// Failure while building a provider registry
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("provider key must not be empty")]
    EmptyKey,

    #[error("provider '{0}' is already registered")]
    DuplicateKey(String),
}
