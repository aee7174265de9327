//! Markup stripping for speech synthesis.
//!
//! Assistant answers may contain markdown. A speech synthesizer reads the
//! markup aloud, so every rule here only deletes or flattens syntax.

use regex::Regex;
use std::sync::LazyLock;

/// Hard ceiling on characters sent to the synthesizer
pub const SPEECH_CHAR_LIMIT: usize = 500;

/// Rewrite rules, applied top to bottom
static MARKUP_RULES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    vec![
        // **bold**
        (
            Regex::new(r"\*\*([^*\s](?:[^*\n]*[^*\s])?)\*\*").unwrap(),
            "${1}",
        ),
        // *italic*
        (
            Regex::new(r"\*([^*\s](?:[^*\n]*[^*\s])?)\*").unwrap(),
            "${1}",
        ),
        // __bold__, not inside words so snake_case names survive
        (
            Regex::new(r"(^|[^\w])__([^_\s](?:[^_\n]*[^_\s])?)__([^\w]|$)").unwrap(),
            "${1}${2}${3}",
        ),
        // _italic_
        (
            Regex::new(r"(^|[^\w])_([^_\s](?:[^_\n]*[^_\s])?)_([^\w]|$)").unwrap(),
            "${1}${2}${3}",
        ),
        // # Headings
        (Regex::new(r"(?m)^[ \t]*#{1,6}[ \t]+").unwrap(), ""),
        // ```fenced blocks``` are dropped whole
        (Regex::new(r"(?s)```.*?```").unwrap(), ""),
        // `inline code`
        (Regex::new(r"`([^`\n]+)`").unwrap(), "${1}"),
        // [text](target) and ![alt](src)
        (
            Regex::new(r"!?\[([^\]\n]+)\]\([^)\n]*\)").unwrap(),
            "${1}",
        ),
        // - bullets
        (Regex::new(r"(?m)^[ \t]*[-*+][ \t]+").unwrap(), ""),
        // 1. numbered items
        (Regex::new(r"(?m)^[ \t]*\d+[.)][ \t]+").unwrap(), ""),
        // Blank-line runs
        (Regex::new(r"\n\s*\n").unwrap(), "\n"),
        // Horizontal whitespace runs
        (Regex::new(r"[ \t]{2,}|\t").unwrap(), " "),
    ]
});

fn strip_pass(text: &str) -> String {
    let mut result = text.to_string();
    for (pattern, replacement) in MARKUP_RULES.iter() {
        result = pattern.replace_all(&result, *replacement).into_owned();
    }
    result.trim().to_string()
}

/// Remove markdown so text can be read aloud
///
/// The pass is repeated until nothing changes. Every rule shortens the text
/// or turns a tab into a space, so this terminates, and the result is a
/// fixed point: `strip_markup(strip_markup(s)) == strip_markup(s)`.
pub fn strip_markup(text: &str) -> String {
    let mut current = strip_pass(text);
    loop {
        let next = strip_pass(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Cut to at most `max_chars` characters, on a char boundary
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Sanitized and truncated text, ready for the synthesizer
pub fn prepare_for_speech(text: &str) -> String {
    let clean = strip_markup(text);
    truncate_chars(&clean, SPEECH_CHAR_LIMIT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emphasis_removed() {
        assert_eq!(
            strip_markup("**Bold** and *italic* and __strong__ and _em_"),
            "Bold and italic and strong and em"
        );
    }

    #[test]
    fn test_snake_case_names_survive() {
        assert_eq!(
            strip_markup("open hello_world_test.txt now"),
            "open hello_world_test.txt now"
        );
        assert_eq!(strip_markup("2 * 3 * 4"), "2 * 3 * 4");
    }

    #[test]
    fn test_headings_and_blank_lines() {
        assert_eq!(
            strip_markup("# Files\n\n## Summary\nThere are 3 files."),
            "Files\nSummary\nThere are 3 files."
        );
    }

    #[test]
    fn test_code_blocks_and_inline_code() {
        assert_eq!(
            strip_markup("Run ```bash\nls -la\n``` then `cat a.txt`."),
            "Run then cat a.txt."
        );
    }

    #[test]
    fn test_links_keep_text() {
        assert_eq!(
            strip_markup("See [the docs](https://example.com/x) please"),
            "See the docs please"
        );
    }

    #[test]
    fn test_list_markers() {
        assert_eq!(
            strip_markup("- one\n* two\n+ three\n1. four\n2) five"),
            "one\ntwo\nthree\nfour\nfive"
        );
        assert_eq!(strip_markup("* **report.txt** is largest"), "report.txt is largest");
    }

    #[test]
    fn test_whitespace_collapsed_and_trimmed() {
        assert_eq!(strip_markup("a\n\n\n\nb"), "a\nb");
        assert_eq!(strip_markup("a   b\t\tc"), "a b c");
        assert_eq!(strip_markup("  padded  "), "padded");
        assert_eq!(strip_markup(""), "");
    }

    #[test]
    fn test_idempotent_on_awkward_inputs() {
        let samples = [
            "`*`a`*`",
            "***a***",
            "**a*",
            "*a [b*](u)",
            "__a_b__",
            "_ _x_ _",
            "- - - item",
            "1. 2. 3. x",
            "# # double heading",
            "[**x**](u) and ![img](p.png)",
            "```unterminated\ncode",
            "line\n \n\t\n  \nline",
            "\t*\t*\t",
            "**__nested__**",
        ];
        for sample in samples {
            let once = strip_markup(sample);
            let twice = strip_markup(&once);
            assert_eq!(once, twice, "not idempotent for {:?}", sample);
        }
    }

    #[test]
    fn test_truncate_on_char_boundary() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("abc", 0), "");
    }

    #[test]
    fn test_prepare_for_speech_limit() {
        let long = "word ".repeat(300);
        let prepared = prepare_for_speech(&long);
        assert_eq!(prepared.chars().count(), SPEECH_CHAR_LIMIT);

        assert_eq!(prepare_for_speech("**Done**"), "Done");
    }
}
