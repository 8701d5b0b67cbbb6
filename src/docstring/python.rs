//! Python structured tier using tree-sitter.

use tracing::debug;
use tree_sitter::Node;

use super::literal::{decode_literal, LiteralError, LiteralValue};
use super::{with_python_parser, DocstringParser, Extraction};

/// Python module docstrings.
#[derive(Debug, Clone, Copy, Default)]
pub struct Python;

impl DocstringParser for Python {
    fn language(&self) -> &'static str {
        "python"
    }

    fn structured(&self, source: &str) -> Option<Extraction> {
        let outcome = with_python_parser(|parser| {
            let tree = parser.parse(source, None)?;
            let root = tree.root_node();
            if root.has_error() {
                debug!("source has syntax errors");
                return None;
            }
            module_docstring(root, source)
        });

        match outcome {
            Ok(outcome) => outcome,
            Err(e) => {
                debug!(error = %e, "python parser unavailable");
                None
            }
        }
    }
}

/// Docstring of a cleanly parsed module.
///
/// `None` when the literal holds an escape Python itself would reject,
/// which leaves the decision to the token scan.
fn module_docstring(module: Node, source: &str) -> Option<Extraction> {
    let Some(first) = named_children(module).next() else {
        return Some(Extraction::Missing);
    };

    if first.kind() != "expression_statement" {
        return Some(Extraction::Missing);
    }

    let mut exprs = named_children(first);
    let (Some(expr), None) = (exprs.next(), exprs.next()) else {
        // Tuples, assignments and friends are not docstrings.
        return Some(Extraction::Missing);
    };

    string_value(unparenthesize(expr), source)
}

/// Named, non-extra children. Comments are extras.
fn named_children<'a>(node: Node<'a>) -> impl Iterator<Item = Node<'a>> {
    let mut cursor = node.walk();
    let children: Vec<Node<'a>> = node
        .named_children(&mut cursor)
        .filter(|c| !c.is_extra())
        .collect();
    children.into_iter()
}

/// `("doc")` is the same constant as `"doc"`.
fn unparenthesize(mut node: Node) -> Node {
    while node.kind() == "parenthesized_expression" {
        let mut inner = named_children(node);
        match (inner.next(), inner.next()) {
            (Some(child), None) => node = child,
            _ => break,
        }
    }
    node
}

fn string_value(expr: Node, source: &str) -> Option<Extraction> {
    let parts: Vec<Node> = match expr.kind() {
        "string" => vec![expr],
        "concatenated_string" => named_children(expr)
            .filter(|c| c.kind() == "string")
            .collect(),
        _ => return Some(Extraction::Missing),
    };

    let mut text = String::new();
    for part in parts {
        match decode_literal(&source[part.byte_range()]) {
            Ok(LiteralValue::Text(value)) => text.push_str(&value),
            // Bytes and f-strings are not constant text.
            Ok(LiteralValue::Bytes) | Err(LiteralError::Formatted) => {
                return Some(Extraction::Missing);
            }
            Err(e) => {
                debug!(error = %e, "invalid literal, deferring to token scan");
                return None;
            }
        }
    }

    Some(Extraction::from_literal(&text))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn structured(source: &str) -> Option<Extraction> {
        Python.structured(source)
    }

    fn found(text: &str) -> Option<Extraction> {
        Some(Extraction::Found(text.to_string()))
    }

    #[test]
    fn test_plain_docstring() {
        assert_eq!(structured("\"\"\"Handle requests.\"\"\"\n"), found("Handle requests."));
        assert_eq!(structured("'single'\n"), found("single"));
    }

    #[test]
    fn test_syntax_error_defers() {
        assert_eq!(structured("\"\"\"doc\"\"\"\ndef f(:\n"), None);
    }

    #[test]
    fn test_empty_module() {
        assert_eq!(structured(""), Some(Extraction::Missing));
    }

    #[test]
    fn test_non_literal_first_statement() {
        assert_eq!(structured("x = 'doc'\n"), Some(Extraction::Missing));
        assert_eq!(structured("def f():\n    '''doc'''\n"), Some(Extraction::Missing));
        assert_eq!(structured("'a' + 'b'\n"), Some(Extraction::Missing));
    }

    #[test]
    fn test_implicit_concatenation() {
        assert_eq!(structured("'first ' \"second\"\n"), found("first second"));
    }

    #[test]
    fn test_parenthesized() {
        assert_eq!(structured("(\n    'wrapped'\n)\n"), found("wrapped"));
    }

    #[test]
    fn test_bytes_and_fstrings_are_not_docstrings() {
        assert_eq!(structured("b'raw bytes'\n"), Some(Extraction::Missing));
        assert_eq!(structured("f'formatted'\n"), Some(Extraction::Missing));
    }

    #[test]
    fn test_escapes_decoded() {
        assert_eq!(structured("'tab\\there'\n"), found("tab\there"));
        assert_eq!(structured("r'raw\\there'\n"), found("raw\\there"));
    }

    #[test]
    fn test_named_escape_decoded() {
        assert_eq!(structured("\"\"\"\\N{BULLET} x\"\"\"\n"), found("\u{2022} x"));
    }

    #[test]
    fn test_invalid_escape_defers() {
        assert_eq!(structured("'\\N{NO SUCH NAME} item'\n"), None);
        assert_eq!(structured("'\\x4'\n"), None);
    }

    #[test]
    fn test_tuple_is_not_docstring() {
        assert_eq!(structured("'a', 'b'\n"), Some(Extraction::Missing));
    }
}
