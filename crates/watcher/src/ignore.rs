//! Path filtering for the filesystem change source
//!
//! Sources of ignore patterns, highest priority first:
//! 1. Built-in patterns (VCS metadata, build output, editor temp files)
//! 2. .gitignore patterns (optional, enabled by default)
//! 3. Config-based patterns

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Directories whose contents never describe a project
const BUILTIN_DIRS: &[&str] = &[".git", ".jj", ".vs", ".vscode", ".idea", "bin", "obj", "node_modules"];

/// Ignore rule set for one watched root
pub struct IgnoreRules {
    /// Watched root directory
    root: PathBuf,

    /// Gitignore patterns (optional)
    gitignore: Option<Gitignore>,

    /// Patterns from config, compiled with gitignore semantics
    additional: Gitignore,

    config: IgnoreConfig,
}

impl IgnoreRules {
    /// Load ignore rules for `root`
    ///
    /// `additional_patterns` use .gitignore syntax and are compiled once here.
    pub fn load(root: &Path, config: IgnoreConfig) -> Result<Self, ignore::Error> {
        let mut builder = GitignoreBuilder::new(root);
        for pattern in &config.additional_patterns {
            builder.add_line(None, pattern)?;
        }

        let mut rules = Self {
            root: root.to_path_buf(),
            gitignore: None,
            additional: builder.build()?,
            config,
        };

        rules.reload()?;
        Ok(rules)
    }

    /// Re-read .gitignore from disk
    pub fn reload(&mut self) -> Result<(), ignore::Error> {
        self.gitignore = None;

        if self.config.use_gitignore {
            let gitignore_path = self.root.join(".gitignore");
            if gitignore_path.exists() {
                let mut builder = GitignoreBuilder::new(&self.root);
                if let Some(e) = builder.add(&gitignore_path) {
                    return Err(e);
                }
                self.gitignore = Some(builder.build()?);
            }
        }

        Ok(())
    }

    /// Check if a path (absolute or relative to the root) should be ignored
    pub fn should_ignore(&self, path: &Path) -> bool {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);

        if is_builtin_ignored(relative) {
            return true;
        }

        // Pattern matching only applies under the root
        if relative.has_root() {
            return false;
        }

        let is_dir = self.root.join(relative).is_dir();
        self.gitignore
            .iter()
            .chain(std::iter::once(&self.additional))
            .any(|matcher| {
                matcher
                    .matched_path_or_any_parents(relative, is_dir)
                    .is_ignore()
            })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

fn is_builtin_ignored(relative: &Path) -> bool {
    let in_builtin_dir = relative.components().any(|c| {
        c.as_os_str()
            .to_str()
            .map(|s| BUILTIN_DIRS.contains(&s))
            .unwrap_or(false)
    });
    if in_builtin_dir {
        return true;
    }

    let filename = relative
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("");

    // Vim swap files, backups, Emacs auto-save and lock files
    filename.ends_with(".swp")
        || filename.ends_with('~')
        || (filename.starts_with('#') && filename.ends_with('#'))
        || filename.starts_with(".#")
        || filename.ends_with(".tmp")
        || filename == ".DS_Store"
}

/// File-name globs such as `*.csproj` or `project.json`
///
/// Patterns use .gitignore glob syntax and are matched against the file
/// name only, never against directories further up the path.
#[derive(Debug, Clone)]
pub struct FileNamePatterns {
    matcher: Gitignore,
}

impl FileNamePatterns {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, ignore::Error> {
        let mut builder = GitignoreBuilder::new("");
        for pattern in patterns {
            builder.add_line(None, pattern.as_ref())?;
        }
        Ok(Self {
            matcher: builder.build()?,
        })
    }

    /// No patterns were given
    pub fn is_empty(&self) -> bool {
        self.matcher.is_empty()
    }

    /// Whether the file name of `path` matches any pattern
    pub fn matches(&self, path: &Path) -> bool {
        match path.file_name() {
            Some(name) => self.matcher.matched(Path::new(name), false).is_ignore(),
            None => false,
        }
    }
}

/// Ignore configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IgnoreConfig {
    /// Use .gitignore patterns (default: true)
    #[serde(default = "default_true")]
    pub use_gitignore: bool,

    /// Additional patterns from config
    #[serde(default)]
    pub additional_patterns: Vec<String>,
}

impl Default for IgnoreConfig {
    fn default() -> Self {
        Self {
            use_gitignore: true,
            additional_patterns: vec![],
        }
    }
}

fn default_true() -> bool {
    true
}
