//! Line classification and checkbox-token location.
//!
//! Everything here is a pure function over a single line of text. Offsets are
//! UTF-8 byte offsets within the line; the characters the matcher cares about
//! (`-`, `[`, `]`, space, `|`) are all ASCII.

use std::ops::Range;
use std::sync::OnceLock;

use regex::Regex;

/// Width of the largest token shape, `- [ ]`.
pub const TOKEN_WINDOW: usize = 5;

/// A checkbox-shaped run of text found on a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The matched text, e.g. `- [ ]` or `-[`
    pub text: String,
    /// Byte range of the match within the line
    pub span: Range<usize>,
    /// Whether the closing bracket is part of the match
    pub complete: bool,
}

impl Token {
    fn from_match(text: &str, start: usize) -> Self {
        Self {
            text: text.to_string(),
            span: start..start + text.len(),
            complete: text.ends_with(']'),
        }
    }
}

fn table_checkbox_regex() -> &'static Regex {
    static TABLE_CHECKBOX_REGEX: OnceLock<Regex> = OnceLock::new();
    TABLE_CHECKBOX_REGEX.get_or_init(|| {
        Regex::new(r"^[\s>]*\|.*- ?\[ ?\]?").expect("Invalid table checkbox regex")
    })
}

fn trailing_token_regex() -> &'static Regex {
    static TRAILING_TOKEN_REGEX: OnceLock<Regex> = OnceLock::new();
    TRAILING_TOKEN_REGEX
        .get_or_init(|| Regex::new(r"- ?\[ ?\]?$").expect("Invalid trailing token regex"))
}

fn complete_token_regex() -> &'static Regex {
    static COMPLETE_TOKEN_REGEX: OnceLock<Regex> = OnceLock::new();
    COMPLETE_TOKEN_REGEX
        .get_or_init(|| Regex::new(r"- ?\[ ?\]").expect("Invalid complete token regex"))
}

/// Does this line look like a table row that carries a checkbox marker?
///
/// Leading whitespace and blockquote markers are skipped before the first
/// pipe; the marker itself may be in-progress (`- [`) or complete (`- [ ]`).
pub fn is_checkbox_in_table_context(line: &str) -> bool {
    table_checkbox_regex().is_match(line)
}

/// Guards against reacting to a `]` typed far away from any `[`.
pub fn is_trigger_position_valid(line: &str, position: usize) -> bool {
    if position > line.len() {
        return false;
    }
    let bytes = line.as_bytes();
    [1, 2].into_iter().any(|back| {
        position
            .checked_sub(back)
            .and_then(|index| bytes.get(index))
            .is_some_and(|&b| b == b'[')
    })
}

/// Find the token that ends at the caret.
///
/// When the byte at `position` is a `]` (the host auto-closed the bracket
/// and the caret sits in front of it) the window is extended past it so the
/// token comes back complete.
pub fn extract_checkbox_span(line: &str, position: usize) -> Option<Token> {
    if position > line.len() || !line.is_char_boundary(position) {
        return None;
    }

    let end = if line.as_bytes().get(position) == Some(&b']') {
        position + 1
    } else {
        position
    };

    let mut start = end.saturating_sub(TOKEN_WINDOW);
    while !line.is_char_boundary(start) {
        start += 1;
    }

    let window = &line[start..end];
    trailing_token_regex()
        .find(window)
        .map(|m| Token::from_match(m.as_str(), start + m.start()))
}

/// Every complete token on the line, left to right, non-overlapping.
pub fn find_all_checkbox_spans(line: &str) -> Vec<Token> {
    complete_token_regex()
        .find_iter(line)
        .map(|m| Token::from_match(m.as_str(), m.start()))
        .collect()
}
