//! Filesystem change source
//!
//! Watches a directory tree and feeds project-file changes into a
//! [`Debouncer`]. Renames are split into a removal of the old path and an
//! addition of the new one.

use crate::debounce::Debouncer;
use crate::ignore::{FileNamePatterns, IgnoreRules};
use notify::event::{ModifyKind, RenameMode};
use notify::{Event, EventKind as FsEventKind, RecommendedWatcher, RecursiveMode, Watcher};
use projrelay_core::RawChangeKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, trace, warn};

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("watch root does not exist: {0}")]
    MissingRoot(PathBuf),

    #[error("failed to start filesystem watcher: {0}")]
    Notify(#[from] notify::Error),

    #[error("failed to load ignore rules: {0}")]
    Ignore(#[from] ignore::Error),
}

/// Running filesystem watch; stops when dropped
pub struct FsChangeSource {
    root: PathBuf,
    _watcher: RecommendedWatcher,
}

impl FsChangeSource {
    /// Start watching `rules.root()` recursively
    ///
    /// Only paths whose file name matches one of `project_patterns` are
    /// forwarded; an empty set forwards every path that is not ignored.
    pub fn start(
        rules: IgnoreRules,
        project_patterns: FileNamePatterns,
        debouncer: Debouncer,
    ) -> Result<Self, SourceError> {
        let root = rules.root().to_path_buf();
        if !root.is_dir() {
            return Err(SourceError::MissingRoot(root));
        }

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
            Ok(event) => {
                for (path, raw) in classify(&event) {
                    if rules.should_ignore(&path) || !is_project_file(&path, &project_patterns) {
                        trace!(path = %path.display(), "Skipping filesystem change");
                        continue;
                    }
                    debouncer.on_change(&path, raw);
                }
            }
            Err(e) => warn!("Filesystem watcher error: {}", e),
        })?;

        watcher.watch(&root, RecursiveMode::Recursive)?;
        info!("Watching {}", root.display());

        Ok(Self {
            root,
            _watcher: watcher,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Map a filesystem event to project change kinds, one per affected path
pub fn classify(event: &Event) -> Vec<(PathBuf, RawChangeKind)> {
    let tag = |raw: RawChangeKind| -> Vec<(PathBuf, RawChangeKind)> {
        event.paths.iter().map(|p| (p.clone(), raw)).collect()
    };

    match event.kind {
        FsEventKind::Create(_) => tag(RawChangeKind::Added),
        FsEventKind::Remove(_) => tag(RawChangeKind::Removed),
        FsEventKind::Modify(ModifyKind::Name(RenameMode::From)) => tag(RawChangeKind::Removed),
        FsEventKind::Modify(ModifyKind::Name(RenameMode::To)) => tag(RawChangeKind::Added),
        FsEventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
            let mut changes = Vec::with_capacity(2);
            if let Some(from) = event.paths.first() {
                changes.push((from.clone(), RawChangeKind::Removed));
            }
            if let Some(to) = event.paths.get(1) {
                changes.push((to.clone(), RawChangeKind::Added));
            }
            changes
        }
        // Access-time and permission updates do not change a project
        FsEventKind::Modify(ModifyKind::Metadata(_)) => Vec::new(),
        FsEventKind::Modify(_) => tag(RawChangeKind::Changed),
        FsEventKind::Access(_) | FsEventKind::Any | FsEventKind::Other => Vec::new(),
    }
}

fn is_project_file(path: &Path, patterns: &FileNamePatterns) -> bool {
    patterns.is_empty() || patterns.matches(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::NotifierContext;
    use crate::debounce::DebounceConfig;
    use crate::ignore::IgnoreConfig;
    use notify::event::{AccessKind, CreateKind, DataChange, MetadataKind, RemoveKind};
    use parking_lot::Mutex;
    use projrelay_core::{NotificationPayload, NotificationSink, ProviderRegistry, SinkError};
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::TempDir;

    fn event(kind: FsEventKind, paths: &[&str]) -> Event {
        paths
            .iter()
            .fold(Event::new(kind), |e, p| e.add_path(PathBuf::from(p)))
    }

    #[test]
    fn test_classify_basic_kinds() {
        let created = event(FsEventKind::Create(CreateKind::File), &["a.csproj"]);
        assert_eq!(classify(&created), vec![(PathBuf::from("a.csproj"), RawChangeKind::Added)]);

        let written = event(
            FsEventKind::Modify(ModifyKind::Data(DataChange::Content)),
            &["a.csproj"],
        );
        assert_eq!(classify(&written), vec![(PathBuf::from("a.csproj"), RawChangeKind::Changed)]);

        let removed = event(FsEventKind::Remove(RemoveKind::File), &["a.csproj"]);
        assert_eq!(classify(&removed), vec![(PathBuf::from("a.csproj"), RawChangeKind::Removed)]);
    }

    #[test]
    fn test_classify_rename_both_splits_paths() {
        let renamed = event(
            FsEventKind::Modify(ModifyKind::Name(RenameMode::Both)),
            &["old.csproj", "new.csproj"],
        );
        assert_eq!(
            classify(&renamed),
            vec![
                (PathBuf::from("old.csproj"), RawChangeKind::Removed),
                (PathBuf::from("new.csproj"), RawChangeKind::Added),
            ]
        );
    }

    #[test]
    fn test_classify_skips_noise() {
        let touched = event(
            FsEventKind::Modify(ModifyKind::Metadata(MetadataKind::AccessTime)),
            &["a.csproj"],
        );
        assert!(classify(&touched).is_empty());

        let read = event(FsEventKind::Access(AccessKind::Any), &["a.csproj"]);
        assert!(classify(&read).is_empty());
    }

    #[test]
    fn test_project_file_patterns() {
        let patterns = FileNamePatterns::new(&["*.csproj", "project.json"]).unwrap();
        let none = FileNamePatterns::new::<&str>(&[]).unwrap();

        assert!(is_project_file(Path::new("src/App/App.csproj"), &patterns));
        assert!(is_project_file(Path::new("src/Lib/project.json"), &patterns));
        assert!(!is_project_file(Path::new("src/Lib/project.json.bak"), &patterns));
        assert!(!is_project_file(Path::new("src/App/Program.cs"), &patterns));
        assert!(is_project_file(Path::new("anything.txt"), &none));
    }

    #[test]
    fn test_start_rejects_missing_root() {
        let temp_dir = TempDir::new().unwrap();
        let rules = IgnoreRules::load(&temp_dir.path().join("nope"), IgnoreConfig::default()).unwrap();
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();
        let debouncer = Debouncer::with_handle(
            NotifierContext::new(ProviderRegistry::new(), Arc::new(NullSink)),
            DebounceConfig::default(),
            runtime.handle().clone(),
        );

        let patterns = FileNamePatterns::new::<&str>(&[]).unwrap();
        let err = FsChangeSource::start(rules, patterns, debouncer).err().unwrap();
        assert!(matches!(err, SourceError::MissingRoot(_)));
    }

    struct NullSink;

    impl NotificationSink for NullSink {
        fn emit(&self, _: &NotificationPayload) -> Result<(), SinkError> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct CollectingSink {
        seen: Mutex<Vec<NotificationPayload>>,
    }

    impl NotificationSink for CollectingSink {
        fn emit(&self, notification: &NotificationPayload) -> Result<(), SinkError> {
            self.seen.lock().push(notification.clone());
            Ok(())
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_project_file_creation_is_forwarded() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().canonicalize().unwrap();
        let sink = Arc::new(CollectingSink::default());
        let debouncer = Debouncer::new(
            NotifierContext::new(ProviderRegistry::new(), sink.clone()),
            DebounceConfig::with_millis(50),
        );

        let rules = IgnoreRules::load(&root, IgnoreConfig::default()).unwrap();
        let patterns = FileNamePatterns::new(&["*.csproj"]).unwrap();
        let _source = FsChangeSource::start(rules, patterns, debouncer).unwrap();

        std::fs::write(root.join("Notes.txt"), b"not a project").unwrap();
        std::fs::write(root.join("App.csproj"), b"<Project />").unwrap();

        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        loop {
            let found = sink
                .seen
                .lock()
                .iter()
                .any(|p| p.subject() == root.join("App.csproj"));
            if found {
                break;
            }
            assert!(tokio::time::Instant::now() < deadline, "no notification for App.csproj");
            tokio::time::sleep(Duration::from_millis(25)).await;
        }

        assert!(sink
            .seen
            .lock()
            .iter()
            .all(|p| p.subject() != root.join("Notes.txt")));
    }
}
