//! Change classification and the coalescing key

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::Path;
use std::sync::Arc;

/// Kind of change as reported by the workspace
///
/// Anything that is not a project-level change deserializes to
/// [`RawChangeKind::Unrelated`] and is dropped by the debouncer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RawChangeKind {
    #[serde(alias = "ProjectAdded")]
    Added,
    #[serde(alias = "ProjectChanged")]
    Changed,
    #[serde(alias = "ProjectReloaded")]
    Reloaded,
    #[serde(alias = "ProjectRemoved")]
    Removed,
    #[serde(other)]
    Unrelated,
}

/// Normalized project event kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    Added,
    Changed,
    Removed,
}

impl EventKind {
    /// Classify a raw change. Reloads collapse into `Changed`.
    pub fn from_raw(raw: RawChangeKind) -> Option<Self> {
        match raw {
            RawChangeKind::Added => Some(EventKind::Added),
            RawChangeKind::Changed | RawChangeKind::Reloaded => Some(EventKind::Changed),
            RawChangeKind::Removed => Some(EventKind::Removed),
            RawChangeKind::Unrelated => None,
        }
    }

    /// Event name used on the wire
    pub fn event_type(self) -> &'static str {
        match self {
            EventKind::Added => "ProjectAdded",
            EventKind::Changed => "ProjectChanged",
            EventKind::Removed => "ProjectRemoved",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.event_type())
    }
}

/// Coalescing identity: two changes merge iff both path and kind match
///
/// Paths compare by their raw string value, not by components, so
/// `./p.csproj` and `p.csproj` are different subjects. The path is interned
/// behind an `Arc` so keys are cheap to clone into timer tasks.
#[derive(Debug, Clone)]
pub struct ChangeKey {
    path: Arc<Path>,
    kind: EventKind,
}

impl PartialEq for ChangeKey {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.path.as_os_str() == other.path.as_os_str()
    }
}

impl Eq for ChangeKey {}

impl Hash for ChangeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.path.as_os_str().hash(state);
        self.kind.hash(state);
    }
}

impl ChangeKey {
    pub fn new(path: impl AsRef<Path>, kind: EventKind) -> Self {
        Self {
            path: Arc::from(path.as_ref()),
            kind,
        }
    }

    /// Build a key straight from a raw change, if it is a project change
    pub fn classify(path: impl AsRef<Path>, raw: RawChangeKind) -> Option<Self> {
        EventKind::from_raw(raw).map(|kind| Self::new(path, kind))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Shared handle to the subject path
    pub fn shared_path(&self) -> Arc<Path> {
        Arc::clone(&self.path)
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }
}

impl fmt::Display for ChangeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.path.display())
    }
}
