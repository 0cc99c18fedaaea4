//! Collaborators shared by every flush

use projrelay_core::{NotificationSink, ProviderRegistry};
use std::sync::Arc;

/// Providers and sink, built once at startup and handed to the debouncer
#[derive(Clone)]
pub struct NotifierContext {
    pub providers: ProviderRegistry,
    pub sink: Arc<dyn NotificationSink>,
}

impl NotifierContext {
    pub fn new(providers: ProviderRegistry, sink: Arc<dyn NotificationSink>) -> Self {
        Self { providers, sink }
    }
}
