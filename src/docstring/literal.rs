//! Python string literal decoding.
//!
//! Decodes one literal token (prefix, quotes, body) into its value.

use thiserror::Error;

/// Decoded value of a string literal token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiteralValue {
    Text(String),
    /// A `b"..."` literal. Its contents are never needed.
    Bytes,
}

/// Reasons a literal token cannot be evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LiteralError {
    #[error("formatted string literals are not constants")]
    Formatted,

    #[error("invalid string prefix '{0}'")]
    Prefix(String),

    #[error("malformed quoting")]
    Quotes,

    #[error("unsupported escape sequence '{0}'")]
    Escape(String),
}

#[derive(Debug, Default)]
struct Prefix {
    raw: bool,
    bytes: bool,
    formatted: bool,
}

fn parse_prefix(prefix: &str) -> Result<Prefix, LiteralError> {
    let mut flags = Prefix::default();
    let mut unicode = false;

    for c in prefix.chars() {
        let seen = match c.to_ascii_lowercase() {
            'r' => std::mem::replace(&mut flags.raw, true),
            'b' => std::mem::replace(&mut flags.bytes, true),
            'f' => std::mem::replace(&mut flags.formatted, true),
            'u' => std::mem::replace(&mut unicode, true),
            _ => return Err(LiteralError::Prefix(prefix.to_string())),
        };
        if seen {
            return Err(LiteralError::Prefix(prefix.to_string()));
        }
    }

    let valid = match prefix.len() {
        0 | 1 => true,
        // rb, br, fr, rf in any case; u never combines.
        2 => !unicode && flags.raw && (flags.bytes ^ flags.formatted),
        _ => false,
    };
    if !valid {
        return Err(LiteralError::Prefix(prefix.to_string()));
    }
    Ok(flags)
}

/// Whether `prefix` is a legal string prefix (possibly empty).
pub(crate) fn is_valid_prefix(prefix: &str) -> bool {
    parse_prefix(prefix).is_ok()
}

/// Whether a character may appear in a string prefix.
pub(crate) fn is_prefix_char(c: char) -> bool {
    matches!(c.to_ascii_lowercase(), 'r' | 'b' | 'f' | 'u')
}

/// Decode a complete string literal token such as `r'''abc'''` or `"a\n"`.
///
/// Line endings are expected to be normalized to `\n` already.
pub fn decode_literal(token: &str) -> Result<LiteralValue, LiteralError> {
    let quote_at = token
        .find(['"', '\''])
        .ok_or(LiteralError::Quotes)?;
    let flags = parse_prefix(&token[..quote_at])?;

    let quoted = &token[quote_at..];
    let quote = &quoted[..1];
    let triple = quote.repeat(3);
    let delimiter = if quoted.len() >= 6 && quoted.starts_with(&triple) {
        triple.as_str()
    } else {
        quote
    };

    let body = quoted
        .strip_prefix(delimiter)
        .and_then(|rest| rest.strip_suffix(delimiter))
        .ok_or(LiteralError::Quotes)?;

    if flags.formatted {
        return Err(LiteralError::Formatted);
    }
    if flags.bytes {
        return Ok(LiteralValue::Bytes);
    }
    if flags.raw {
        return Ok(LiteralValue::Text(body.to_string()));
    }

    unescape(body).map(LiteralValue::Text)
}

fn unescape(body: &str) -> Result<String, LiteralError> {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }

        let Some(esc) = chars.next() else {
            // A lone trailing backslash would have escaped the closing quote.
            return Err(LiteralError::Quotes);
        };

        match esc {
            '\n' => {}
            '\\' => out.push('\\'),
            '\'' => out.push('\''),
            '"' => out.push('"'),
            'a' => out.push('\x07'),
            'b' => out.push('\x08'),
            'f' => out.push('\x0c'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'v' => out.push('\x0b'),
            '0'..='7' => {
                let mut value = esc.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match chars.peek().and_then(|d| d.to_digit(8)) {
                        Some(d) => {
                            value = value * 8 + d;
                            chars.next();
                        }
                        None => break,
                    }
                }
                out.push(char_from(value, &format!("\\{esc}"))?);
            }
            'x' => out.push(hex_escape(&mut chars, 2, 'x')?),
            'u' => out.push(hex_escape(&mut chars, 4, 'u')?),
            'U' => out.push(hex_escape(&mut chars, 8, 'U')?),
            'N' => out.push(named_escape(&mut chars)?),
            // Unknown escapes are kept verbatim.
            other => {
                out.push('\\');
                out.push(other);
            }
        }
    }

    Ok(out)
}

fn hex_escape(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    width: usize,
    kind: char,
) -> Result<char, LiteralError> {
    let mut digits = String::with_capacity(width);
    for _ in 0..width {
        match chars.peek() {
            Some(d) if d.is_ascii_hexdigit() => {
                digits.push(*d);
                chars.next();
            }
            _ => return Err(LiteralError::Escape(format!("\\{kind}{digits}"))),
        }
    }

    let escape = format!("\\{kind}{digits}");
    let value = u32::from_str_radix(&digits, 16).map_err(|_| LiteralError::Escape(escape.clone()))?;
    char_from(value, &escape)
}

/// `\N{NAME}`, looked up in the Unicode name table.
fn named_escape(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Result<char, LiteralError> {
    if chars.next_if_eq(&'{').is_none() {
        return Err(LiteralError::Escape("\\N".to_string()));
    }

    let mut name = String::new();
    loop {
        match chars.next() {
            Some('}') => break,
            Some(c) => name.push(c),
            None => return Err(LiteralError::Escape(format!("\\N{{{name}"))),
        }
    }

    unicode_names2::character(&name).ok_or_else(|| LiteralError::Escape(format!("\\N{{{name}}}")))
}

/// Surrogates and out-of-range values cannot live in a Rust string.
fn char_from(value: u32, escape: &str) -> Result<char, LiteralError> {
    char::from_u32(value).ok_or_else(|| LiteralError::Escape(escape.to_string()))
}
