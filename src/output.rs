//! Output formatting for docsnap.
//!
//! Formats snapshot results as Markdown reports for humans (and for
//! pasting into LLM prompts), or as JSON for programmatic access.

use std::path::Path;

use serde::Serialize;
use thiserror::Error;

use crate::builder::{FileDoc, MarkdownDoc, SnapshotResult};
use crate::docstring::Extraction;
use crate::filter::display_relative;
use crate::truncate::truncate;

/// Errors that can occur during output formatting.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Output format selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Markdown report (default).
    #[default]
    Markdown,
    /// JSON for programmatic access.
    Json,
}

/// Options for the codebase snapshot report.
#[derive(Debug, Clone)]
pub struct SnapshotOptions {
    pub format: OutputFormat,
    pub max_docstring_lines: usize,
    pub max_docstring_chars: usize,
    /// Only list files without documentation.
    pub missing_only: bool,
}

impl Default for SnapshotOptions {
    fn default() -> Self {
        Self {
            format: OutputFormat::Markdown,
            max_docstring_lines: 60,
            max_docstring_chars: 4000,
            missing_only: false,
        }
    }
}

/// Options for the documentation pack report.
#[derive(Debug, Clone)]
pub struct PackOptions {
    pub format: OutputFormat,
    pub max_docstring_lines: usize,
    pub max_docstring_chars: usize,
}

impl Default for PackOptions {
    fn default() -> Self {
        Self {
            format: OutputFormat::Markdown,
            max_docstring_lines: 40,
            max_docstring_chars: 2500,
        }
    }
}

const NO_DOCSTRING: &str = "_No module docstring found._";

// ============================================================================
// Main Entry Points
// ============================================================================

/// Format the codebase snapshot report.
pub fn format_snapshot(
    result: &SnapshotResult,
    options: &SnapshotOptions,
) -> Result<String, OutputError> {
    match options.format {
        OutputFormat::Markdown => Ok(snapshot_markdown(result, options)),
        OutputFormat::Json => {
            let files = result
                .files
                .iter()
                .filter(|f| !options.missing_only || f.extraction.is_missing())
                .map(|f| json_file(f, options.max_docstring_lines, options.max_docstring_chars))
                .collect();
            let report = JsonReport {
                report: "snapshot",
                focus_tree: result.focus_tree.as_deref(),
                markdown: None,
                ..JsonReport::new(result, files)
            };
            Ok(serde_json::to_string_pretty(&report)?)
        }
    }
}

/// Format the documentation pack report.
pub fn format_pack(result: &SnapshotResult, options: &PackOptions) -> Result<String, OutputError> {
    match options.format {
        OutputFormat::Markdown => Ok(pack_markdown(result, options)),
        OutputFormat::Json => {
            let files = result
                .files
                .iter()
                .map(|f| json_file(f, options.max_docstring_lines, options.max_docstring_chars))
                .collect();
            let report = JsonReport {
                report: "pack",
                focus_tree: None,
                markdown: Some(result.markdown.as_deref().unwrap_or_default()),
                ..JsonReport::new(result, files)
            };
            Ok(serde_json::to_string_pretty(&report)?)
        }
    }
}

/// Write a report, creating parent directories as needed.
pub fn write_report(path: &Path, report: &str) -> Result<(), OutputError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, report)?;
    Ok(())
}

// ============================================================================
// Markdown Formatting
// ============================================================================

fn snapshot_markdown(result: &SnapshotResult, options: &SnapshotOptions) -> String {
    let missing = result.missing();

    let mut parts = vec![
        "# Codebase snapshot\n".to_string(),
        format!("**Root:** `{}`  \n", result.root.display()),
        format!("**Focus:** `{}`  \n", result.focus_relative()),
        format!("**Python files scanned:** {}  \n", result.files.len()),
        format!("**Missing module docstrings:** {}\n", missing.len()),
        "## Project tree (root)\n".to_string(),
        text_block(&result.root_tree.join("\n")),
    ];

    if let Some(focus_tree) = &result.focus_tree {
        parts.push("## Focus tree\n".to_string());
        parts.push(text_block(&focus_tree.join("\n")));
    }

    push_missing(&mut parts, &missing);

    parts.push("## Module docstrings\n".to_string());
    if result.files.is_empty() {
        parts.push("_No Python files found in focus._\n".to_string());
    }
    for file in &result.files {
        if options.missing_only && file.extraction.is_found() {
            continue;
        }
        let body = match &file.extraction {
            Extraction::Found(text) => fenced(&truncate(
                text,
                options.max_docstring_lines,
                options.max_docstring_chars,
            )),
            Extraction::Missing => NO_DOCSTRING.to_string(),
        };
        parts.push(format!("### {}\n\n{}\n", display_relative(&file.path), body));
    }

    parts.join("\n")
}

fn pack_markdown(result: &SnapshotResult, options: &PackOptions) -> String {
    let missing = result.missing();

    let mut parts = vec![
        "# Docs context pack\n".to_string(),
        format!("**Root:** `{}`  \n", result.root.display()),
        format!("**Focus (Python docstrings):** `{}`  \n", result.focus_relative()),
        format!("**Python files scanned:** {}  \n", result.files.len()),
        format!("**Markdown files found:** {}  \n", result.markdown_count()),
        format!("**Missing module docstrings:** {}\n", missing.len()),
        "## Repo tree\n".to_string(),
        text_block(&result.root_tree.join("\n")),
    ];

    push_missing(&mut parts, &missing);

    parts.push("## Python module docstrings\n".to_string());
    if result.files.is_empty() {
        parts.push("_No Python files found._\n".to_string());
    }
    for file in &result.files {
        let body = match &file.extraction {
            Extraction::Found(text) => fenced(&truncate(
                text,
                options.max_docstring_lines,
                options.max_docstring_chars,
            )),
            Extraction::Missing => NO_DOCSTRING.to_string(),
        };
        parts.push(format!("### {}\n\n{}\n", display_relative(&file.path), body));
    }

    parts.push("## Markdown docs headings\n".to_string());
    let markdown = result.markdown.as_deref().unwrap_or_default();
    if markdown.is_empty() {
        parts.push("_No Markdown files found._\n".to_string());
    }
    for doc in markdown {
        parts.push(format!("### {}\n", display_relative(&doc.path)));
        if doc.headings.is_empty() {
            parts.push("_No headings found._\n".to_string());
        } else {
            parts.push(format!("{}\n", doc.headings.join("\n")));
        }
    }

    parts.join("\n")
}

fn push_missing(parts: &mut Vec<String>, missing: &[&Path]) {
    if missing.is_empty() {
        return;
    }
    let listing: Vec<String> = missing.iter().map(|p| display_relative(p)).collect();
    parts.push("## Missing module docstrings\n".to_string());
    parts.push(text_block(&listing.join("\n")));
}

fn fenced(text: &str) -> String {
    format!("```text\n{text}\n```")
}

fn text_block(text: &str) -> String {
    format!("{}\n", fenced(text))
}

// ============================================================================
// JSON Formatting
// ============================================================================

#[derive(Serialize)]
struct JsonReport<'a> {
    report: &'static str,
    root: String,
    focus: String,
    python_files: usize,
    missing_count: usize,
    root_tree: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    focus_tree: Option<&'a [String]>,
    missing: Vec<String>,
    files: Vec<JsonFile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    markdown: Option<&'a [MarkdownDoc]>,
}

impl<'a> JsonReport<'a> {
    fn new(result: &'a SnapshotResult, files: Vec<JsonFile>) -> Self {
        Self {
            report: "",
            root: result.root.display().to_string(),
            focus: result.focus_relative(),
            python_files: result.files.len(),
            missing_count: result.missing_count(),
            root_tree: &result.root_tree,
            focus_tree: None,
            missing: result.missing().iter().map(|p| display_relative(p)).collect(),
            files,
            markdown: None,
        }
    }
}

#[derive(Serialize)]
struct JsonFile {
    path: String,
    docstring: Extraction,
}

fn json_file(file: &FileDoc, max_lines: usize, max_chars: usize) -> JsonFile {
    let docstring = match file.extraction.text() {
        Some(text) => Extraction::Found(truncate(text, max_lines, max_chars)),
        None => Extraction::Missing,
    };
    JsonFile {
        path: display_relative(&file.path),
        docstring,
    }
}
