//! Source file discovery.
//!
//! Uses the `ignore` crate for the recursive walk, with its gitignore and
//! hidden-file handling switched off: only [`ExclusionRules`] decide what
//! is skipped.

use std::path::{Path, PathBuf};

use ignore::{DirEntry, WalkBuilder};
use thiserror::Error;
use tracing::{debug, warn};

use crate::filter::ExclusionRules;

/// Errors that can occur during file discovery.
#[derive(Debug, Error)]
pub enum WalkError {
    #[error("path not found: {path}")]
    NotFound { path: PathBuf },

    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// List files named `*.{extension}` below `scan_dir`.
///
/// Paths are tested against `rules` relative to `root`, so a focus
/// directory shares exclusions with the whole workspace. Excluded
/// directories are never entered. Unreadable directories are logged and
/// skipped. The result is sorted case-insensitively by path.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use docsnap::filter::ExclusionRules;
/// use docsnap::walker::discover_files;
///
/// let rules = ExclusionRules::snapshot_defaults();
/// let files = discover_files(Path::new("."), Path::new("./src"), "py", &rules).unwrap();
/// for file in files {
///     println!("{}", file.display());
/// }
/// ```
pub fn discover_files(
    root: &Path,
    scan_dir: &Path,
    extension: &str,
    rules: &ExclusionRules,
) -> Result<Vec<PathBuf>, WalkError> {
    if !scan_dir.exists() {
        return Err(WalkError::NotFound {
            path: scan_dir.to_path_buf(),
        });
    }

    let suffix = format!(".{extension}");
    let prune_root = root.to_path_buf();
    let prune_rules = rules.clone();

    let mut builder = WalkBuilder::new(scan_dir);
    builder
        .standard_filters(false)
        .follow_links(false)
        .filter_entry(move |entry| {
            if entry.depth() == 0 || !is_dir(entry) {
                return true;
            }
            let rel = entry.path().strip_prefix(&prune_root).unwrap_or(entry.path());
            !prune_rules.is_excluded(rel, true)
        });

    let mut files = Vec::new();
    for result in builder.build() {
        let entry = match result {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "skipping unreadable path");
                continue;
            }
        };

        let path = entry.path();
        let named = path
            .file_name()
            .is_some_and(|n| n.to_string_lossy().ends_with(&suffix));
        if !named || !is_file(&entry) {
            continue;
        }

        let rel = path.strip_prefix(root).unwrap_or(path);
        if rules.is_excluded(rel, false) {
            debug!(path = %rel.display(), "excluded");
            continue;
        }

        files.push(path.to_path_buf());
    }

    files.sort_by_cached_key(|p| (p.to_string_lossy().to_lowercase(), p.clone()));
    Ok(files)
}

fn is_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_some_and(|ft| ft.is_dir())
}

/// Regular files, plus symlinks that resolve to one.
fn is_file(entry: &DirEntry) -> bool {
    match entry.file_type() {
        Some(ft) if ft.is_file() => true,
        Some(ft) if ft.is_symlink() => std::fs::metadata(entry.path()).is_ok_and(|m| m.is_file()),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn names(root: &Path, files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|p| crate::filter::display_relative(p.strip_prefix(root).unwrap()))
            .collect()
    }

    #[test]
    fn test_finds_by_extension_sorted() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("pkg/Sub")).unwrap();
        fs::write(root.join("pkg/b.py"), "").unwrap();
        fs::write(root.join("pkg/A.py"), "").unwrap();
        fs::write(root.join("pkg/Sub/c.py"), "").unwrap();
        fs::write(root.join("pkg/notes.txt"), "").unwrap();
        fs::write(root.join("pkg/typed.pyi"), "").unwrap();

        let files = discover_files(root, root, "py", &ExclusionRules::new()).unwrap();
        assert_eq!(names(root, &files), vec!["pkg/A.py", "pkg/b.py", "pkg/Sub/c.py"]);
    }

    #[test]
    fn test_hidden_and_gitignored_files_included() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir(root.join(".git")).unwrap();
        fs::write(root.join(".gitignore"), "*.py\n").unwrap();
        fs::create_dir(root.join(".hidden")).unwrap();
        fs::write(root.join(".hidden/mod.py"), "").unwrap();
        fs::write(root.join("top.py"), "").unwrap();

        let files = discover_files(root, root, "py", &ExclusionRules::new()).unwrap();
        assert_eq!(names(root, &files), vec![".hidden/mod.py", "top.py"]);
    }

    #[test]
    fn test_excluded_dirs_and_globs() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("app/__pycache__")).unwrap();
        fs::create_dir_all(root.join("venv/lib")).unwrap();
        fs::write(root.join("app/main.py"), "").unwrap();
        fs::write(root.join("app/__pycache__/main.py"), "").unwrap();
        fs::write(root.join("venv/lib/site.py"), "").unwrap();
        fs::write(root.join("app/generated_pb2.py"), "").unwrap();

        let rules = ExclusionRules::snapshot_defaults()
            .with_globs(["**/*_pb2.py"])
            .unwrap();
        let files = discover_files(root, root, "py", &rules).unwrap();
        assert_eq!(names(root, &files), vec!["app/main.py"]);
    }

    #[test]
    fn test_scan_dir_relative_to_root() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("src/build")).unwrap();
        fs::write(root.join("src/keep.py"), "").unwrap();
        fs::write(root.join("src/build/skip.py"), "").unwrap();
        fs::write(root.join("outside.py"), "").unwrap();

        let files =
            discover_files(root, &root.join("src"), "py", &ExclusionRules::snapshot_defaults())
                .unwrap();
        assert_eq!(names(root, &files), vec!["src/keep.py"]);
    }

    #[test]
    fn test_missing_scan_dir() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("absent");
        let result = discover_files(dir.path(), &missing, "py", &ExclusionRules::new());
        assert!(matches!(result, Err(WalkError::NotFound { .. })));
    }
}
