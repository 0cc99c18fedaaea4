//! Change coalescing for projrelay
//!
//! This crate provides:
//! - Per-key debouncing with a fixed window (500ms default)
//! - The lock-protected set of pending keys
//! - Filesystem watching as one possible change source
//! - Ignore rules for build output and editor noise

pub mod context;
pub mod debounce;
pub mod ignore;
pub mod pending;
pub mod source;

// Re-exports
pub use context::NotifierContext;
pub use debounce::{ChangeOutcome, DebounceConfig, Debouncer, DEFAULT_DEBOUNCE_MS};
pub use self::ignore::{FileNamePatterns, IgnoreConfig, IgnoreRules};
pub use pending::PendingSet;
pub use source::{FsChangeSource, SourceError};
