//! Fluent builder API for docsnap.
//!
//! Validates the workspace root and focus directory, renders trees and
//! extracts documentation literals for every discovered source file.

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::{Serialize, Serializer};
use tracing::{debug, info, warn};

use crate::docstring::{extract, read_source, Extraction};
use crate::errors::SnapError;
use crate::filter::{display_relative, ExclusionRules};
use crate::markdown::headings_in_file;
use crate::tree::render_tree;
use crate::walker::discover_files;

/// Default depth for rendered trees.
pub const DEFAULT_TREE_DEPTH: usize = 6;

/// Focus trees never go deeper than this.
const MAX_FOCUS_TREE_DEPTH: usize = 6;

/// Documentation extracted from one source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileDoc {
    /// Path relative to the workspace root.
    #[serde(serialize_with = "relative")]
    pub path: PathBuf,
    pub extraction: Extraction,
}

/// Heading outline of one Markdown file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkdownDoc {
    /// Path relative to the workspace root.
    #[serde(serialize_with = "relative")]
    pub path: PathBuf,
    pub headings: Vec<String>,
}

fn relative<S: Serializer>(path: &Path, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&display_relative(path))
}

/// Builder for a documentation snapshot of a workspace.
///
/// # Examples
///
/// ```no_run
/// use docsnap::builder::Snapshot;
///
/// let result = Snapshot::new("./my-project")
///     .focus("src")
///     .tree_depth(4)
///     .build()
///     .unwrap();
///
/// println!("{} files, {} undocumented", result.files.len(), result.missing_count());
/// ```
#[derive(Debug, Clone)]
pub struct Snapshot {
    root: PathBuf,
    focus: Option<PathBuf>,
    tree_depth: usize,
    focus_tree_depth: Option<usize>,
    rules: ExclusionRules,
    markdown_headings: Option<usize>,
}

impl Snapshot {
    /// Create a new builder for the given root path.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            focus: None,
            tree_depth: DEFAULT_TREE_DEPTH,
            focus_tree_depth: None,
            rules: ExclusionRules::snapshot_defaults(),
            markdown_headings: None,
        }
    }

    /// Narrow the source scan to a directory, relative to the root.
    pub fn focus(mut self, focus: impl Into<PathBuf>) -> Self {
        self.focus = Some(focus.into());
        self
    }

    /// Depth of the root tree.
    pub fn tree_depth(mut self, depth: usize) -> Self {
        self.tree_depth = depth;
        self
    }

    /// Depth of the focus tree.
    ///
    /// Defaults to the root tree depth clamped to `1..=6`.
    pub fn focus_tree_depth(mut self, depth: usize) -> Self {
        self.focus_tree_depth = Some(depth);
        self
    }

    /// Replace the exclusion rules (snapshot defaults otherwise).
    pub fn rules(mut self, rules: ExclusionRules) -> Self {
        self.rules = rules;
        self
    }

    /// Also outline Markdown files under the root.
    pub fn include_markdown(mut self, max_headings: usize) -> Self {
        self.markdown_headings = Some(max_headings);
        self
    }

    /// Validate paths, then render trees and extract documentation.
    pub fn build(self) -> Result<SnapshotResult, SnapError> {
        let (root, focus) = self.resolve()?;

        let root_tree = render_tree(&root, self.tree_depth, &self.rules);

        let focus_tree = (focus != root).then(|| {
            let depth = self
                .focus_tree_depth
                .unwrap_or_else(|| self.tree_depth.clamp(1, MAX_FOCUS_TREE_DEPTH));
            render_tree(&focus, depth, &self.rules)
        });

        let sources = discover_files(&root, &focus, "py", &self.rules)?;
        let files = extract_all(&root, sources);

        let markdown = match self.markdown_headings {
            Some(max) => {
                let docs = discover_files(&root, &root, "md", &self.rules)?;
                Some(outline_all(&root, docs, max))
            }
            None => None,
        };

        let result = SnapshotResult {
            root,
            focus,
            root_tree,
            focus_tree,
            files,
            markdown,
        };

        info!(
            files = result.files.len(),
            missing = result.missing_count(),
            markdown = result.markdown_count(),
            "snapshot built"
        );

        Ok(result)
    }

    /// Canonicalize root and focus; reject a focus outside the root.
    fn resolve(&self) -> Result<(PathBuf, PathBuf), SnapError> {
        let root = dunce::canonicalize(&self.root)
            .ok()
            .filter(|p| p.is_dir())
            .ok_or_else(|| SnapError::RootNotDirectory(self.root.clone()))?;

        let Some(focus) = &self.focus else {
            return Ok((root.clone(), root));
        };

        let joined = root.join(focus);
        let focus = dunce::canonicalize(&joined)
            .ok()
            .filter(|p| p.is_dir())
            .ok_or(SnapError::FocusNotDirectory(joined))?;

        if !focus.starts_with(&root) {
            return Err(SnapError::FocusOutsideRoot { root, focus });
        }

        debug!(root = %root.display(), focus = %focus.display(), "resolved paths");
        Ok((root, focus))
    }
}

/// Extract documentation from every source in parallel, keeping order.
fn extract_all(root: &Path, sources: Vec<PathBuf>) -> Vec<FileDoc> {
    sources
        .into_par_iter()
        .map(|path| {
            let extraction = match read_source(&path) {
                Ok(source) => extract(&source),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "cannot read source file");
                    Extraction::Missing
                }
            };
            FileDoc {
                path: relative_to(root, &path),
                extraction,
            }
        })
        .collect()
}

fn outline_all(root: &Path, docs: Vec<PathBuf>, max_headings: usize) -> Vec<MarkdownDoc> {
    docs.into_par_iter()
        .map(|path| MarkdownDoc {
            headings: headings_in_file(&path, max_headings),
            path: relative_to(root, &path),
        })
        .collect()
}

fn relative_to(root: &Path, path: &Path) -> PathBuf {
    path.strip_prefix(root).unwrap_or(path).to_path_buf()
}

/// Result of a snapshot build.
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotResult {
    /// Canonical workspace root.
    pub root: PathBuf,
    /// Canonical focus directory (the root when no focus was given).
    pub focus: PathBuf,
    /// Rendered tree of the root.
    pub root_tree: Vec<String>,
    /// Rendered tree of the focus, when it differs from the root.
    pub focus_tree: Option<Vec<String>>,
    /// One entry per discovered source file, in discovery order.
    pub files: Vec<FileDoc>,
    /// Markdown outlines, when requested.
    pub markdown: Option<Vec<MarkdownDoc>>,
}

impl SnapshotResult {
    /// Focus path relative to the root (`.` for the root itself).
    pub fn focus_relative(&self) -> String {
        display_relative(self.focus.strip_prefix(&self.root).unwrap_or(&self.focus))
    }

    /// Relative paths of files without documentation.
    pub fn missing(&self) -> Vec<&Path> {
        self.files
            .iter()
            .filter(|f| f.extraction.is_missing())
            .map(|f| f.path.as_path())
            .collect()
    }

    pub fn missing_count(&self) -> usize {
        self.files.iter().filter(|f| f.extraction.is_missing()).count()
    }

    pub fn markdown_count(&self) -> usize {
        self.markdown.as_ref().map_or(0, Vec::len)
    }
}
