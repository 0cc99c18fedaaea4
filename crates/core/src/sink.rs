//! Outbound notification contract

use crate::error::SinkError;
use crate::payload::NotificationPayload;

/// Receives consolidated notifications
///
/// Delivery is fire-and-forget from the debouncer's point of view: an
/// error is logged by the caller and never retried.
///
/// `emit` is synchronous and may block, for example on a full pipe. On a
/// multi-threaded runtime the debouncer calls it via `block_in_place`.
pub trait NotificationSink: Send + Sync {
    fn emit(&self, notification: &NotificationPayload) -> Result<(), SinkError>;
}

