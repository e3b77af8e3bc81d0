//! Cleanup of completion text before it is stored or displayed.
use std::sync::LazyLock;

use regex::Regex;

// Opening (with or without attributes) and closing paragraph tags
static PARAGRAPH_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<p(?:\s[^>]*)?>|</p\s*>").expect("Invalid paragraph tag regex")
});

/// Strips paragraph tags the model sometimes echoes back and trims the
/// surrounding whitespace. Tags are removed until none are left so
/// that nested fragments like `<<p>p>` don't leave a new tag behind,
/// which keeps this idempotent.
pub fn sanitize(raw: &str) -> String {
    let mut text = raw.to_string();
    while PARAGRAPH_TAG.is_match(&text) {
        text = PARAGRAPH_TAG.replace_all(&text, "").into_owned();
    }
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_paragraph_tags() {
        assert_eq!(sanitize(" <p>Hello</p> "), "Hello");
        assert_eq!(sanitize("<p>Hi there</p>"), "Hi there");
        assert_eq!(sanitize("<P class=\"x\">One</P>\n<p>Two</p>"), "One\nTwo");
    }

    #[test]
    fn test_sanitize_keeps_other_markup() {
        assert_eq!(sanitize("<pre>code</pre>"), "<pre>code</pre>");
        assert_eq!(sanitize("<b>bold</b>"), "<b>bold</b>");
        assert_eq!(sanitize("a < p > b"), "a < p > b");
    }

    #[test]
    fn test_sanitize_empty() {
        assert_eq!(sanitize(""), "");
        assert_eq!(sanitize("   \n\t"), "");
        assert_eq!(sanitize("<p> </p>"), "");
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let inputs = [
            "",
            "plain",
            " <p>Hello</p> ",
            "<<p>p>nested</p>",
            "<</p>p> spaced <p>",
            "  <p>\n  padded\n</p>  ",
            "<p a='1'>attr</p><p>",
            "emoji 🤖 <p>ok</p>",
        ];
        for input in inputs {
            let once = sanitize(input);
            assert_eq!(sanitize(&once), once, "input: {:?}", input);
            assert!(!PARAGRAPH_TAG.is_match(&once), "input: {:?}", input);
        }
    }
}
