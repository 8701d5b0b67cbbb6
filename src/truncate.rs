//! Bounding extracted text for reports.

/// Marker line appended when text is cut.
///
/// Text whose last line already equals the marker gets one extra line of
/// budget, even if that line was written by hand.
pub const TRUNCATION_MARKER: &str = "… (truncated)";

/// Room reserved for the marker when cutting by characters.
const CHAR_SLACK: usize = 20;

/// Bound `text` to `max_lines` lines and `max_chars` characters.
///
/// Lines are cut first: the first `max_lines` lines are kept and a marker
/// line is appended. If the result still exceeds `max_chars` characters it
/// is cut to `max_chars - 20` characters, trailing whitespace is trimmed,
/// and a marker line is appended.
///
/// A trailing marker line does not count against the line budget, so
/// truncating already-truncated text is a no-op.
///
/// # Examples
///
/// ```
/// use docsnap::truncate::truncate;
///
/// let text = "one\ntwo\nthree";
/// assert_eq!(truncate(text, 2, 100), "one\ntwo\n… (truncated)");
/// assert_eq!(truncate(&truncate(text, 2, 100), 2, 100), "one\ntwo\n… (truncated)");
/// ```
pub fn truncate(text: &str, max_lines: usize, max_chars: usize) -> String {
    let mut lines: Vec<&str> = text.lines().collect();

    let marked = lines.last() == Some(&TRUNCATION_MARKER);
    let budget = if marked { max_lines + 1 } else { max_lines };

    if lines.len() > budget {
        lines.truncate(max_lines);
        lines.push(TRUNCATION_MARKER);
    }

    let out = lines.join("\n");
    if out.chars().count() <= max_chars {
        return out;
    }

    let keep = max_chars.saturating_sub(CHAR_SLACK);
    let cut: String = out.chars().take(keep).collect();
    format!("{}\n{}", cut.trim_end(), TRUNCATION_MARKER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_within_limits_unchanged() {
        assert_eq!(truncate("short doc", 10, 100), "short doc");
        assert_eq!(truncate("", 10, 100), "");
    }

    #[test]
    fn test_line_truncation() {
        let text = (1..=5).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n");
        assert_eq!(truncate(&text, 3, 1000), "line 1\nline 2\nline 3\n… (truncated)");
    }

    #[test]
    fn test_char_truncation() {
        let text = "x".repeat(50);
        let out = truncate(&text, 10, 30);
        assert_eq!(out, format!("{}\n{}", "x".repeat(10), TRUNCATION_MARKER));
    }

    #[test]
    fn test_char_truncation_trims_whitespace_at_cut() {
        let text = format!("{}     {}", "a".repeat(8), "b".repeat(40));
        let out = truncate(&text, 10, 30);
        assert_eq!(out, format!("{}\n{}", "a".repeat(8), TRUNCATION_MARKER));
    }

    #[test]
    fn test_lines_then_chars() {
        let text = (0..10).map(|_| "y".repeat(20)).collect::<Vec<_>>().join("\n");
        let out = truncate(&text, 4, 50);
        assert!(out.ends_with(TRUNCATION_MARKER));
        assert!(out.chars().count() <= 50);
        assert_eq!(out.matches(TRUNCATION_MARKER).count(), 1);
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        let text = "é".repeat(30);
        assert_eq!(truncate(&text, 5, 30), text);
    }

    #[test]
    fn test_trailing_marker_line_not_counted() {
        let text = format!("a\nb\n{TRUNCATION_MARKER}");
        assert_eq!(truncate(&text, 2, 1000), text);
    }

    #[test]
    fn test_idempotent() {
        let texts = [
            "a\nb\nc\nd\ne\nf".to_string(),
            "z".repeat(500),
            (0..40).map(|i| format!("{i:>3} lorem ipsum")).collect::<Vec<_>>().join("\n"),
            "tiny".to_string(),
        ];
        for text in &texts {
            for (lines, chars) in [(3, 1000), (100, 40), (5, 60), (0, 10), (2, 5)] {
                let once = truncate(text, lines, chars);
                let twice = truncate(&once, lines, chars);
                assert_eq!(once, twice, "lines={lines} chars={chars}");
            }
        }
    }
}
