use regex::Regex;
use std::sync::LazyLock;

static CLOSING_QUOTE_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x{201D}\s+").expect("Invalid regex"));

static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("Invalid regex"));

/// Normalize text before sentence detection.
///
/// A closing double quote (`”`) followed by whitespace keeps exactly one
/// space after it, every other whitespace run becomes a single space, and
/// the result is trimmed.
pub fn normalize(text: &str) -> String {
    let text = CLOSING_QUOTE_SPACE.replace_all(text, "\u{201D} ");
    let text = WHITESPACE_RUN.replace_all(&text, " ");
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_collapses_whitespace() {
        assert_eq!(normalize("  Hello \t\n  world.\n\n"), "Hello world.");
    }

    #[test]
    fn test_closing_quote_followed_by_newline() {
        assert_eq!(
            normalize("He said “stop.”\n\nThen he left."),
            "He said “stop.” Then he left."
        );
    }

    #[test]
    fn test_empty_and_blank() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize(" \n\t "), "");
    }

    #[test]
    fn test_unicode_whitespace() {
        assert_eq!(normalize("a\u{00A0}\u{2003}b"), "a b");
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "",
            "   ",
            "One.  Two!\nThree?",
            "“Quoted.”   \t Next line.",
            "tabs\tand\r\nwindows\r\nnewlines",
            "already normalized text",
        ];
        for sample in samples {
            let once = normalize(sample);
            assert_eq!(normalize(&once), once, "not idempotent for {:?}", sample);
        }
    }

    proptest! {
        #[test]
        fn prop_idempotent(text in any::<String>()) {
            let once = normalize(&text);
            prop_assert_eq!(normalize(&once), once);
        }

        #[test]
        fn prop_no_whitespace_runs(text in any::<String>()) {
            let normalized = normalize(&text);
            prop_assert_eq!(normalized.trim(), normalized.as_str());
            prop_assert!(normalized.chars().all(|c| c == ' ' || !c.is_whitespace()));
            prop_assert!(!normalized.contains("  "));
        }
    }
}
