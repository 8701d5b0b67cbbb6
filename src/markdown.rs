//! Markdown heading outlines for the documentation pack.

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use tracing::warn;

static HEADING: OnceLock<Option<Regex>> = OnceLock::new();

fn heading_regex() -> Option<&'static Regex> {
    HEADING
        .get_or_init(|| Regex::new(r"^(#{1,6})\s+(.+?)\s*$").ok())
        .as_ref()
}

/// List ATX headings as an indented bullet outline.
///
/// Each heading becomes `"  " * (level - 1) + "- " + title`; at most
/// `max_headings` entries are returned.
///
/// # Examples
///
/// ```
/// use docsnap::markdown::extract_headings;
///
/// let outline = extract_headings("# Guide\n\ntext\n## Install  \n", 10);
/// assert_eq!(outline, vec!["- Guide", "  - Install"]);
/// ```
pub fn extract_headings(text: &str, max_headings: usize) -> Vec<String> {
    let mut out = Vec::new();
    let Some(re) = heading_regex() else {
        return out;
    };
    if max_headings == 0 {
        return out;
    }

    for line in text.lines() {
        let Some(caps) = re.captures(line) else {
            continue;
        };
        let (Some(hashes), Some(title)) = (caps.get(1), caps.get(2)) else {
            continue;
        };

        let level = hashes.as_str().len();
        out.push(format!("{}- {}", "  ".repeat(level - 1), title.as_str()));
        if out.len() >= max_headings {
            break;
        }
    }

    out
}

/// Read a Markdown file and outline its headings.
///
/// Unreadable files produce an empty outline.
pub fn headings_in_file(path: &Path, max_headings: usize) -> Vec<String> {
    match std::fs::read(path) {
        Ok(bytes) => extract_headings(&String::from_utf8_lossy(&bytes), max_headings),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "cannot read markdown file");
            Vec::new()
        }
    }
}
