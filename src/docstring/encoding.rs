//! Encoding-aware reading of Python sources.
//!
//! Honours a UTF-8 byte-order mark and a PEP 263 declaration such as
//! `# -*- coding: latin-1 -*-` on one of the first two lines. Anything that
//! cannot be decoded as declared falls back to lossy UTF-8.

use std::borrow::Cow;
use std::path::Path;
use std::sync::OnceLock;

use encoding_rs::{Encoding, UTF_8};
use regex::bytes::Regex;
use tracing::debug;

const BOM: &[u8] = b"\xef\xbb\xbf";

static COOKIE: OnceLock<Option<Regex>> = OnceLock::new();
static BLANK: OnceLock<Option<Regex>> = OnceLock::new();

fn cookie_regex() -> Option<&'static Regex> {
    COOKIE
        .get_or_init(|| Regex::new(r"(?-u)^[ \t\x0c]*#.*?coding[:=][ \t]*([-\w.]+)").ok())
        .as_ref()
}

fn blank_regex() -> Option<&'static Regex> {
    BLANK
        .get_or_init(|| Regex::new(r"(?-u)^[ \t\x0c]*(?:[#\r\n]|$)").ok())
        .as_ref()
}

/// Read a source file, decoding it as declared.
///
/// Only I/O failures are errors; undecodable content is replaced with
/// U+FFFD instead.
pub fn read_source(path: &Path) -> std::io::Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(decode_source(&bytes))
}

/// Decode raw source bytes. See [`read_source`].
pub fn decode_source(bytes: &[u8]) -> String {
    let (has_bom, body) = match bytes.strip_prefix(BOM) {
        Some(rest) => (true, rest),
        None => (false, bytes),
    };

    let Some(label) = find_declaration(body) else {
        return match std::str::from_utf8(body) {
            Ok(text) => text.to_string(),
            Err(_) => lossy(body),
        };
    };

    let Some(codec) = lookup(&label) else {
        debug!(label = %label, "unknown source encoding");
        return lossy(body);
    };

    if has_bom && codec != Codec::Encoding(UTF_8) {
        debug!(label = %label, "encoding declaration conflicts with BOM");
        return lossy(body);
    }

    let decoded = match codec {
        Codec::Latin1 => Some(encoding_rs::mem::decode_latin1(body)),
        Codec::Ascii => std::str::from_utf8(body)
            .ok()
            .filter(|_| body.is_ascii())
            .map(Cow::Borrowed),
        Codec::Encoding(encoding) => encoding.decode_without_bom_handling_and_without_replacement(body),
    };

    match decoded {
        Some(text) => text.into_owned(),
        None => {
            debug!(label = %label, "source not valid in declared encoding");
            lossy(body)
        }
    }
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Find the encoding declared on line one, or on line two when line one is
/// blank or a comment.
fn find_declaration(source: &[u8]) -> Option<String> {
    let mut lines = source.split_inclusive(|b| *b == b'\n');

    let first = lines.next()?;
    if let Some(label) = cookie(first) {
        return Some(label);
    }

    if !blank_regex()?.is_match(first) {
        return None;
    }

    lines.next().and_then(cookie)
}

fn cookie(line: &[u8]) -> Option<String> {
    let caps = cookie_regex()?.captures(line)?;
    let label = caps.get(1)?.as_bytes();
    Some(String::from_utf8_lossy(label).into_owned())
}

/// How a declared codec is decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Codec {
    /// Python's latin-1: every byte is the code point of the same value.
    Latin1,
    /// Strict 7-bit ASCII.
    Ascii,
    Encoding(&'static Encoding),
}

/// Map a Python codec name onto a decoder.
///
/// WHATWG labels alias `latin1` and `ascii` to windows-1252, so those two
/// are handled here instead of through `encoding_rs` labels.
fn lookup(label: &str) -> Option<Codec> {
    let normal = normalize_label(label);
    match normal.as_ref() {
        "iso-8859-1" => Some(Codec::Latin1),
        "ascii" | "us-ascii" | "646" => Some(Codec::Ascii),
        other => Encoding::for_label(other.as_bytes()).map(Codec::Encoding),
    }
}

/// Python spells codecs more loosely than the WHATWG labels.
fn normalize_label(label: &str) -> Cow<'static, str> {
    let name = label.to_ascii_lowercase().replace('_', "-");

    let matches = |base: &str| name == base || name.starts_with(&format!("{base}-"));

    if matches("utf-8") || name == "utf8" {
        return Cow::Borrowed("utf-8");
    }
    if matches("latin-1") || matches("iso-8859-1") || matches("iso-latin-1") || name == "latin1" || name == "l1" {
        return Cow::Borrowed("iso-8859-1");
    }
    Cow::Owned(name)
}
