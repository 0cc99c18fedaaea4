//! Per-key debouncing with async timers
//!
//! Coalesces bursts of project changes:
//! - The first change for a key schedules one flush after a fixed window
//! - Further changes for the same key inside the window are absorbed
//! - The flush gathers fresh provider state and emits one notification
//!
//! The window is measured from the first arrival and is not extended by
//! later arrivals. Example: a project file saved 100 times in 300ms yields
//! a single `ProjectChanged` notification 500ms after the first save.
//!
//! A change that lands after a flush has removed its key starts a new
//! generation with its own timer, even if the previous flush is still
//! querying providers. Two notifications for one subject may therefore be
//! emitted close together; a later change is never lost.

use crate::context::NotifierContext;
use crate::pending::PendingSet;
use projrelay_core::{ChangeKey, EventKind, NotificationPayload, RawChangeKind, SinkError};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::{Handle, RuntimeFlavor};
use tokio::sync::Notify;
use tokio::task::block_in_place;
use tokio::time::sleep;
use tracing::{debug, error, trace, warn};

/// Default debounce window
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;

/// Debounce configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceConfig {
    /// Delay between the first arrival of a key and its flush
    pub window: Duration,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self::with_millis(DEFAULT_DEBOUNCE_MS)
    }
}

impl DebounceConfig {
    pub fn with_millis(ms: u64) -> Self {
        Self {
            window: Duration::from_millis(ms),
        }
    }
}

/// What `on_change` did with an incoming change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOutcome {
    /// First arrival of the key; a flush was scheduled
    Scheduled,
    /// A flush for the same key is already pending
    Coalesced,
    /// Not a project-level change
    Ignored,
}

/// Coalescing notifier
///
/// Cheap to clone; clones share the same pending set and timers.
#[derive(Clone)]
pub struct Debouncer {
    inner: Arc<Inner>,
    runtime: Handle,
}

struct Inner {
    /// Keys with a scheduled flush that has not started yet
    pending: PendingSet,

    /// Providers and sink
    context: NotifierContext,

    /// Fixed debounce window
    window: Duration,

    /// Flushes scheduled or running
    in_flight: AtomicUsize,

    /// Signalled when `in_flight` drops to zero
    idle: Notify,
}

impl Debouncer {
    /// Create a debouncer that schedules flushes on the current tokio runtime
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime. Use
    /// [`with_handle`](Self::with_handle) to pass a runtime explicitly.
    pub fn new(context: NotifierContext, config: DebounceConfig) -> Self {
        Self::with_handle(context, config, Handle::current())
    }

    /// Create a debouncer that schedules flushes on `runtime`
    ///
    /// `on_change` may then be called from any thread, including threads
    /// that are not part of a runtime.
    pub fn with_handle(context: NotifierContext, config: DebounceConfig, runtime: Handle) -> Self {
        Self {
            inner: Arc::new(Inner {
                pending: PendingSet::new(),
                context,
                window: config.window,
                in_flight: AtomicUsize::new(0),
                idle: Notify::new(),
            }),
            runtime,
        }
    }

    /// Register a raw change
    ///
    /// Never blocks beyond the short pending-set lock and never fails.
    pub fn on_change(&self, path: impl AsRef<Path>, raw: RawChangeKind) -> ChangeOutcome {
        let path = path.as_ref();
        let Some(key) = ChangeKey::classify(path, raw) else {
            trace!(path = %path.display(), ?raw, "Ignoring non-project change");
            return ChangeOutcome::Ignored;
        };

        // Count the flush before the key becomes visible so `drain` never
        // observes a pending key with a zero counter.
        let slot = FlightSlot::acquire(&self.inner);

        if !self.inner.pending.insert(key.clone()) {
            debug!(%key, "Coalesced into pending flush");
            return ChangeOutcome::Coalesced;
        }

        debug!(%key, window = ?self.inner.window, "Scheduling flush");
        let inner = Arc::clone(&self.inner);
        self.runtime.spawn(async move {
            let _slot = slot;
            sleep(inner.window).await;
            inner.flush(key).await;
        });

        ChangeOutcome::Scheduled
    }

    /// Wait until no flush is scheduled or running
    pub async fn drain(&self) {
        loop {
            let notified = self.inner.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.inner.in_flight.load(Ordering::Acquire) == 0 {
                return;
            }
            notified.await;
        }
    }

    /// Number of keys waiting for their flush
    pub fn pending_count(&self) -> usize {
        self.inner.pending.len()
    }

    /// Number of flushes scheduled or running
    pub fn in_flight(&self) -> usize {
        self.inner.in_flight.load(Ordering::Acquire)
    }

    pub fn window(&self) -> Duration {
        self.inner.window
    }
}

impl Inner {
    async fn flush(&self, key: ChangeKey) {
        if !self.pending.try_remove(&key) {
            error!(%key, "Flush fired for a key that was not pending");
            debug_assert!(false, "flush fired for non-pending key {key}");
        }

        // The lock is released here; providers and the sink run unlocked.
        let payload = match key.kind() {
            EventKind::Removed => NotificationPayload::removed(key.shared_path()),
            EventKind::Added | EventKind::Changed => {
                let bundle = self.context.providers.describe_all(key.path()).await;
                NotificationPayload::with_body(&key, bundle)
            }
        };

        match self.deliver(&payload) {
            Ok(()) => debug!(%key, "Notification emitted"),
            Err(e) => warn!(%key, "Failed to emit notification: {}", e),
        }
    }

    /// Hand `payload` to the sink
    ///
    /// Sinks are synchronous and may block on a slow reader. On a
    /// multi-threaded runtime the worker's other tasks are moved off first.
    fn deliver(&self, payload: &NotificationPayload) -> Result<(), SinkError> {
        match Handle::current().runtime_flavor() {
            RuntimeFlavor::MultiThread => block_in_place(|| self.context.sink.emit(payload)),
            _ => self.context.sink.emit(payload),
        }
    }
}

/// One unit of `in_flight`, released on drop even if a flush panics
struct FlightSlot {
    inner: Arc<Inner>,
}

impl FlightSlot {
    fn acquire(inner: &Arc<Inner>) -> Self {
        inner.in_flight.fetch_add(1, Ordering::AcqRel);
        Self {
            inner: Arc::clone(inner),
        }
    }
}

impl Drop for FlightSlot {
    fn drop(&mut self) {
        if self.inner.in_flight.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.inner.idle.notify_waiters();
        }
    }
}
