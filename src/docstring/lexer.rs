//! Token-level fallback for sources that do not parse.
//!
//! Only the first substantive token is ever examined: blank lines,
//! comments, indentation, line continuations and a leading byte-order mark
//! are skipped, and whatever comes next either is a string literal or ends
//! the search.

use tracing::debug;

use super::literal::{decode_literal, is_prefix_char, is_valid_prefix, LiteralValue};
use super::Extraction;

/// First substantive token of a source text.
#[derive(Debug, PartialEq, Eq)]
enum Token<'a> {
    /// A complete string literal, prefix and quotes included.
    Str(&'a str),
    /// Anything else, including lexical errors.
    Other,
    /// Nothing but trivia.
    End,
}

/// Extract a leading literal by scanning tokens.
///
/// A string literal that cannot be evaluated (an f-string, an escape with
/// no decoding) is returned as its raw token text rather than dropped.
pub fn leading_literal(source: &str) -> Extraction {
    match first_token(source) {
        Token::Str(raw) => match decode_literal(raw) {
            Ok(LiteralValue::Text(value)) => Extraction::from_literal(&value),
            Ok(LiteralValue::Bytes) => Extraction::Missing,
            Err(e) => {
                debug!(error = %e, "literal not evaluable, keeping raw token");
                Extraction::from_literal(raw)
            }
        },
        Token::Other | Token::End => Extraction::Missing,
    }
}

fn first_token(source: &str) -> Token<'_> {
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);
    let bytes = source.as_bytes();
    let mut pos = 0;

    while pos < bytes.len() {
        match bytes[pos] {
            b' ' | b'\t' | b'\x0c' | b'\n' => pos += 1,
            b'#' => {
                pos = source[pos..]
                    .find('\n')
                    .map_or(bytes.len(), |offset| pos + offset);
            }
            b'\\' if bytes.get(pos + 1) == Some(&b'\n') => pos += 2,
            _ => return string_token(&source[pos..]),
        }
    }

    Token::End
}

/// Lex a string literal at the start of `rest`, if one starts there.
fn string_token(rest: &str) -> Token<'_> {
    let prefix_len = rest
        .chars()
        .take_while(|c| is_prefix_char(*c))
        .count();
    if prefix_len > 2 || !is_valid_prefix(&rest[..prefix_len]) {
        return Token::Other;
    }

    let after_prefix = &rest[prefix_len..];
    let Some(quote) = after_prefix.chars().next().filter(|c| *c == '"' || *c == '\'') else {
        return Token::Other;
    };

    let triple: String = std::iter::repeat(quote).take(3).collect();
    let (delimiter, body_start) = if after_prefix.starts_with(&triple) {
        (triple.as_str(), 3)
    } else {
        (&after_prefix[..1], 1)
    };
    let multiline = delimiter.len() == 3;

    let body = &after_prefix[body_start..];
    let mut chars = body.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            // In raw strings the backslash stays, but still protects the
            // next character from closing the literal.
            '\\' => {
                chars.next();
            }
            '\n' if !multiline => return Token::Other,
            _ if body[i..].starts_with(delimiter) => {
                let end = prefix_len + body_start + i + delimiter.len();
                return Token::Str(&rest[..end]);
            }
            _ => {}
        }
    }

    // Unterminated literal.
    Token::Other
}

#[cfg(test)]
mod tests {
    use super::*;

    fn found(text: &str) -> Extraction {
        Extraction::Found(text.to_string())
    }

    #[test]
    fn test_first_token_kinds() {
        assert_eq!(first_token(""), Token::End);
        assert_eq!(first_token("\n  \n# note\n"), Token::End);
        assert_eq!(first_token("import os"), Token::Other);
        assert_eq!(first_token("  'x' + 1"), Token::Str("'x'"));
        assert_eq!(first_token("rb'\\x'"), Token::Str("rb'\\x'"));
        assert_eq!(first_token("raise x"), Token::Other);
        assert_eq!(first_token("ub'x'"), Token::Other);
        assert_eq!(first_token("\\\n'after continuation'"), Token::Str("'after continuation'"));
    }

    #[test]
    fn test_docstring_before_broken_code() {
        let src = "#!/usr/bin/env python\n\n\"\"\"\nSummary.\n\"\"\"\nclass Broken(\n";
        assert_eq!(leading_literal(src), found("Summary."));
    }

    #[test]
    fn test_other_token_stops_scan() {
        let src = "x = (\n'''late'''\n";
        assert_eq!(leading_literal(src), Extraction::Missing);
    }

    #[test]
    fn test_bom_skipped() {
        assert_eq!(leading_literal("\u{feff}'bom first'\n)"), found("bom first"));
    }

    #[test]
    fn test_escaped_quotes_do_not_close() {
        assert_eq!(leading_literal("'it\\'s'\n)"), found("it's"));
        assert_eq!(leading_literal("r'it\\'s'\n)"), found("it\\'s"));
        assert_eq!(leading_literal("\"\"\"a \\\"\"\" b\"\"\"\n)"), found("a \"\"\" b"));
    }

    #[test]
    fn test_unterminated_is_missing() {
        assert_eq!(leading_literal("\"\"\"never closed\n"), Extraction::Missing);
        assert_eq!(leading_literal("'newline\ninside'"), Extraction::Missing);
    }

    #[test]
    fn test_bytes_is_missing() {
        assert_eq!(leading_literal("b'data'\n)"), Extraction::Missing);
    }

    #[test]
    fn test_undecodable_keeps_raw_token() {
        assert_eq!(leading_literal("f'{name}'\n)"), found("f'{name}'"));
        assert_eq!(leading_literal("'\\x4'\n)"), found("'\\x4'"));
    }

    #[test]
    fn test_blank_literal_is_missing() {
        assert_eq!(leading_literal("'''\n\n'''\n)"), Extraction::Missing);
    }

    #[test]
    fn test_indented_first_token() {
        assert_eq!(leading_literal("    '''indented'''\n  )"), found("indented"));
    }
}
