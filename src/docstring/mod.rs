//! Leading documentation literal extraction.
//!
//! A file's documentation literal is its first statement when that
//! statement is a bare string literal. Extraction runs in two tiers:
//!
//! 1. a structured parse (tree-sitter) that only trusts error-free trees;
//! 2. a lexical fallback that inspects the first substantive token, for
//!    files that do not parse (half-edited code, unsupported syntax).
//!
//! Extraction never fails. Anything that cannot be read as a leading
//! literal degrades to [`Extraction::Missing`].

mod encoding;
mod lexer;
mod literal;
mod python;

use std::borrow::Cow;
use std::cell::RefCell;

use serde::Serialize;
use tracing::trace;
use tree_sitter::Parser;

pub use encoding::{decode_source, read_source};
pub use lexer::leading_literal;
pub use literal::{decode_literal, LiteralError, LiteralValue};
pub use python::Python;

/// Outcome of extracting a documentation literal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "text", rename_all = "snake_case")]
pub enum Extraction {
    /// The literal's text with surrounding newlines stripped.
    Found(String),
    /// No leading literal, or one that is blank.
    Missing,
}

impl Extraction {
    /// Build an outcome from a literal value: strips leading and trailing
    /// newlines and treats blank text as missing.
    pub fn from_literal(value: &str) -> Self {
        let stripped = value.trim_matches('\n');
        if stripped.trim().is_empty() {
            Extraction::Missing
        } else {
            Extraction::Found(stripped.to_string())
        }
    }

    /// The extracted text, if any.
    pub fn text(&self) -> Option<&str> {
        match self {
            Extraction::Found(text) => Some(text),
            Extraction::Missing => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Extraction::Found(_))
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Extraction::Missing)
    }
}

/// Structured-parse tier for one source language.
///
/// Implementations return `None` when the source does not parse cleanly,
/// which hands the source to the lexical fallback.
pub trait DocstringParser {
    /// Human-readable language name, used in logs.
    fn language(&self) -> &'static str;

    /// Inspect the first statement of a cleanly parsed module.
    fn structured(&self, source: &str) -> Option<Extraction>;
}

/// Extract the leading documentation literal from Python source text.
///
/// # Examples
///
/// ```
/// use docsnap::docstring::{extract, Extraction};
///
/// assert_eq!(
///     extract("\"\"\"computes totals\"\"\"\n\ndef total(): ...\n"),
///     Extraction::Found("computes totals".into()),
/// );
/// assert_eq!(extract("import os\n\"not a docstring\"\n"), Extraction::Missing);
/// assert_eq!(extract(""), Extraction::Missing);
/// ```
pub fn extract(source: &str) -> Extraction {
    extract_with(&Python, source)
}

/// Extract with an explicit structured-parse tier.
pub fn extract_with<P: DocstringParser + ?Sized>(parser: &P, source: &str) -> Extraction {
    let source = normalize_newlines(source);

    if let Some(outcome) = parser.structured(&source) {
        trace!(language = parser.language(), "structured tier decided");
        return outcome;
    }

    trace!(language = parser.language(), "falling back to token scan");
    leading_literal(&source)
}

/// Translate `\r\n` and lone `\r` line endings to `\n`.
fn normalize_newlines(source: &str) -> Cow<'_, str> {
    if !source.contains('\r') {
        return Cow::Borrowed(source);
    }
    Cow::Owned(source.replace("\r\n", "\n").replace('\r', "\n"))
}

// Thread-local parser caching to avoid re-initialization overhead.
// Parser initialization can fail (grammar load); callers treat that as a
// failed structured parse rather than panicking.
thread_local! {
    static PYTHON_PARSER: RefCell<Option<Parser>> = const { RefCell::new(None) };
}

fn init_python_parser() -> Result<Parser, ()> {
    let mut p = Parser::new();
    p.set_language(&tree_sitter_python::LANGUAGE.into())
        .map_err(|_| ())?;
    Ok(p)
}

fn with_cached_parser<F, R>(
    cell: &'static std::thread::LocalKey<RefCell<Option<Parser>>>,
    init: fn() -> Result<Parser, ()>,
    f: F,
) -> Result<R, String>
where
    F: FnOnce(&mut Parser) -> R,
{
    cell.with(|cell| {
        let mut slot = cell.borrow_mut();
        if slot.is_none() {
            *slot = Some(init().map_err(|()| "failed to initialize parser".to_string())?);
        }

        let parser = slot
            .as_mut()
            .ok_or_else(|| "failed to initialize parser".to_string())?;
        Ok(f(parser))
    })
}

/// Execute a function with a cached Python parser.
pub(crate) fn with_python_parser<F, R>(f: F) -> Result<R, String>
where
    F: FnOnce(&mut Parser) -> R,
{
    with_cached_parser(&PYTHON_PARSER, init_python_parser, f)
}
