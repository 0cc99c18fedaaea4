//! Core types for projrelay
//!
//! This crate provides:
//! - Change classification (raw workspace change kinds → event kinds)
//! - The coalescing key used to deduplicate bursts of changes
//! - Provider contract and registry for project state lookups
//! - Notification payloads and the sink contract

pub mod error;
pub mod event;
pub mod payload;
pub mod provider;
pub mod sink;

// Re-exports
pub use error::{ProviderError, RegistryError, SinkError};
pub use event::{ChangeKey, EventKind, RawChangeKind};
pub use payload::{NotificationPayload, ProjectInfoBundle};
pub use provider::{ProjectStateProvider, ProviderRegistry};
pub use sink::NotificationSink;
