//! Notification payloads

use crate::event::{ChangeKey, EventKind};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

/// Project descriptions gathered from every provider for one subject
///
/// Entries keep provider registration order. A key appears at most once;
/// the first fragment recorded for a key wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectInfoBundle {
    entries: Vec<(String, Value)>,
}

impl ProjectInfoBundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a provider fragment. Returns false if the key was already present.
    pub fn insert(&mut self, key: impl Into<String>, fragment: Value) -> bool {
        let key = key.into();
        if self.contains(&key) {
            return false;
        }
        self.entries.push((key, fragment));
        true
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Provider keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for ProjectInfoBundle {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, fragment) in &self.entries {
            map.serialize_entry(key, fragment)?;
        }
        map.end()
    }
}

/// One consolidated notification for a coalesced key
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationPayload {
    kind: EventKind,
    subject: Arc<Path>,
    body: Option<ProjectInfoBundle>,
}

impl NotificationPayload {
    /// Notification for a removed project; never carries a body
    pub fn removed(subject: Arc<Path>) -> Self {
        Self {
            kind: EventKind::Removed,
            subject,
            body: None,
        }
    }

    /// Notification carrying freshly gathered project state
    ///
    /// A `Removed` key yields a payload without a body.
    pub fn with_body(key: &ChangeKey, bundle: ProjectInfoBundle) -> Self {
        match key.kind() {
            EventKind::Removed => Self::removed(key.shared_path()),
            kind => Self {
                kind,
                subject: key.shared_path(),
                body: Some(bundle),
            },
        }
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Wire event name, e.g. `ProjectChanged`
    pub fn event_type(&self) -> &'static str {
        self.kind.event_type()
    }

    pub fn subject(&self) -> &Path {
        &self.subject
    }

    /// Provider-derived body; `None` for removals
    pub fn body(&self) -> Option<&ProjectInfoBundle> {
        self.body.as_ref()
    }
}
