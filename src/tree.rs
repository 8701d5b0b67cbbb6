//! Deterministic directory tree rendering.
//!
//! Walks a directory with `std::fs::read_dir`, applies the exclusion rules,
//! and renders one line per entry with box-drawing characters. Entries are
//! never materialized as a tree; ordering is computed per directory.

use std::cmp::Ordering;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::filter::ExclusionRules;

/// Box-drawing characters for tree rendering.
const BRANCH: &str = "├── ";
const LAST_BRANCH: &str = "└── ";
const VERTICAL: &str = "│   ";
const SPACE: &str = "    ";

/// Placeholder leaf for a directory that could not be listed.
pub const PERMISSION_DENIED: &str = "[permission denied]";
/// Placeholder leaf for any other listing failure.
pub const UNREADABLE: &str = "[unreadable]";

/// A directory entry that survived filtering.
#[derive(Debug)]
struct Entry {
    name: String,
    path: PathBuf,
    is_dir: bool,
}

/// Directories first, then case-insensitive name, then exact name.
fn sibling_order(a: &Entry, b: &Entry) -> Ordering {
    match (a.is_dir, b.is_dir) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => a
            .name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.name.cmp(&b.name)),
    }
}

/// Render a directory tree as lines.
///
/// The first line is the absolute path of `root`. Depth 0 is the root's
/// direct children; nothing at depth `max_depth` or below is listed.
/// Directories that cannot be listed get a single placeholder leaf and the
/// rest of the tree still renders, so this never fails.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use docsnap::filter::ExclusionRules;
/// use docsnap::tree::render_tree;
///
/// let lines = render_tree(Path::new("."), 2, &ExclusionRules::snapshot_defaults());
/// println!("{}", lines.join("\n"));
/// ```
pub fn render_tree(root: &Path, max_depth: usize, rules: &ExclusionRules) -> Vec<String> {
    let root = dunce::canonicalize(root).unwrap_or_else(|_| root.to_path_buf());

    let mut lines = vec![root.display().to_string()];
    render_dir(&mut lines, &root, &root, "", 0, max_depth, rules);
    lines
}

fn render_dir(
    lines: &mut Vec<String>,
    root: &Path,
    dir: &Path,
    prefix: &str,
    depth: usize,
    max_depth: usize,
    rules: &ExclusionRules,
) {
    if depth >= max_depth {
        return;
    }

    let entries = match list_entries(root, dir, rules) {
        Ok(entries) => entries,
        Err(e) => {
            let placeholder = if e.kind() == ErrorKind::PermissionDenied {
                PERMISSION_DENIED
            } else {
                UNREADABLE
            };
            warn!(path = %dir.display(), error = %e, "cannot list directory");
            lines.push(format!("{prefix}{LAST_BRANCH}{placeholder}"));
            return;
        }
    };

    let count = entries.len();
    for (i, entry) in entries.iter().enumerate() {
        let is_last = i + 1 == count;
        let branch = if is_last { LAST_BRANCH } else { BRANCH };

        let mut line = String::with_capacity(prefix.len() + branch.len() + entry.name.len() + 1);
        line.push_str(prefix);
        line.push_str(branch);
        line.push_str(&entry.name);
        if entry.is_dir {
            line.push('/');
        }
        lines.push(line);

        if entry.is_dir {
            let continuation = if is_last { SPACE } else { VERTICAL };
            let child_prefix = format!("{prefix}{continuation}");
            render_dir(lines, root, &entry.path, &child_prefix, depth + 1, max_depth, rules);
        }
    }
}

/// List, filter, and sort the entries of one directory.
fn list_entries(root: &Path, dir: &Path, rules: &ExclusionRules) -> std::io::Result<Vec<Entry>> {
    let mut entries = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(path = %dir.display(), error = %e, "skipping unreadable entry");
                continue;
            }
        };

        let path = entry.path();
        // Follows symlinks; broken links count as files.
        let is_dir = std::fs::metadata(&path).is_ok_and(|m| m.is_dir());
        let relative = path.strip_prefix(root).unwrap_or(&path);

        if rules.is_excluded(relative, is_dir) {
            continue;
        }

        entries.push(Entry {
            name: entry.file_name().to_string_lossy().into_owned(),
            path,
            is_dir,
        });
    }

    entries.sort_by(sibling_order);
    Ok(entries)
}
