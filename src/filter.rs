//! Exclusion rules for traversal and file discovery.
//!
//! A path is excluded when any of its components is an excluded directory
//! name, or (files only) when its root-relative path matches an excluded
//! glob pattern.

use std::collections::BTreeSet;
use std::path::{Component, Path};

use glob::Pattern;
use thiserror::Error;

/// Directory names skipped by the snapshot report.
const SNAPSHOT_DIRS: &[&str] = &[
    ".git",
    ".hg",
    ".svn",
    ".venv",
    "venv",
    ".tox",
    ".eggs",
    "__pycache__",
    ".pytest_cache",
    ".mypy_cache",
    ".ruff_cache",
    "node_modules",
    "dist",
    "build",
    ".idea",
    ".vscode",
];

/// File globs skipped by the snapshot report.
const SNAPSHOT_GLOBS: &[&str] = &[
    "**/*.pyc",
    "**/*.pyo",
    "**/*.pyd",
    "**/*.so",
    "**/*.dylib",
    "**/*.dll",
    "**/.DS_Store",
];

/// File globs skipped by the documentation pack.
const PACK_GLOBS: &[&str] = &["**/*.pyc", "**/.DS_Store"];

/// Errors building a rule set.
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("invalid exclude glob '{pattern}': {message}")]
    InvalidGlob { pattern: String, message: String },
}

/// Excluded directory names plus excluded file globs.
///
/// Immutable once built; extend it with [`with_dirs`](Self::with_dirs) and
/// [`with_globs`](Self::with_globs) before handing it to a traversal.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use docsnap::filter::ExclusionRules;
///
/// let rules = ExclusionRules::snapshot_defaults()
///     .with_globs(["*.log"])
///     .unwrap();
///
/// assert!(rules.is_excluded(Path::new("web/node_modules/x.js"), false));
/// assert!(rules.is_excluded(Path::new("logs/run.log"), false));
/// assert!(!rules.is_excluded(Path::new("src/app.py"), false));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ExclusionRules {
    dirs: BTreeSet<String>,
    globs: Vec<Pattern>,
}

impl ExclusionRules {
    /// Create an empty rule set that excludes nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults used by the codebase snapshot report.
    pub fn snapshot_defaults() -> Self {
        Self::from_static(SNAPSHOT_DIRS, SNAPSHOT_GLOBS)
    }

    /// Defaults used by the documentation pack: the snapshot directories
    /// plus `sessions`, and a shorter glob list.
    pub fn pack_defaults() -> Self {
        let mut rules = Self::from_static(SNAPSHOT_DIRS, PACK_GLOBS);
        rules.dirs.insert("sessions".to_string());
        rules
    }

    fn from_static(dirs: &[&str], globs: &[&str]) -> Self {
        Self {
            dirs: dirs.iter().map(|d| d.to_string()).collect(),
            // Built-in patterns are known to compile.
            globs: globs.iter().filter_map(|g| Pattern::new(g).ok()).collect(),
        }
    }

    /// Add excluded directory names.
    pub fn with_dirs<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dirs.extend(names.into_iter().map(Into::into));
        self
    }

    /// Add excluded glob patterns, rejecting malformed ones.
    pub fn with_globs<I, S>(mut self, patterns: I) -> Result<Self, FilterError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for pattern in patterns {
            let pattern = pattern.as_ref();
            let compiled = Pattern::new(pattern).map_err(|e| FilterError::InvalidGlob {
                pattern: pattern.to_string(),
                message: e.to_string(),
            })?;
            self.globs.push(compiled);
        }
        Ok(self)
    }

    /// Check whether a single name is an excluded directory name.
    pub fn is_excluded_name(&self, name: &str) -> bool {
        self.dirs.contains(name)
    }

    /// Decide whether a root-relative path is excluded.
    ///
    /// Any component equal to an excluded name excludes the path, for files
    /// and directories alike. Globs only apply to non-directories and are
    /// matched against the whole relative path using `/` separators.
    pub fn is_excluded(&self, relative: &Path, is_dir: bool) -> bool {
        let mut joined = String::new();

        for component in relative.components() {
            let Component::Normal(part) = component else {
                continue;
            };
            let part = part.to_string_lossy();
            if self.dirs.contains(part.as_ref()) {
                return true;
            }
            if !joined.is_empty() {
                joined.push('/');
            }
            joined.push_str(&part);
        }

        if is_dir {
            return false;
        }

        self.globs.iter().any(|g| g.matches(&joined))
    }
}

/// Render a relative path with `/` separators regardless of platform.
pub fn display_relative(relative: &Path) -> String {
    let parts: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    }
}
