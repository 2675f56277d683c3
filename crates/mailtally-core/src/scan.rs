//! Money token scanner.
//!
//! Finds numbers that directly follow a currency marker (`$45.00`,
//! `USD 1,234.56`, `€ 12,50`). The marker is compared literally and
//! case-insensitively, so symbols such as `$` need no escaping. After the
//! marker, any whitespace (newlines included) may precede the number.
//!
//! A number is a run of ASCII digits, `,` and `.` holding at least one digit.
//! The run ends at its last digit: trailing separators are sentence
//! punctuation (`"costs $45.00."`), not part of the amount.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::span::Span;

/// A raw numeric substring found next to a currency marker.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MoneyToken {
    /// The number exactly as written, separators included.
    pub text: String,
    /// Where the number sits in the scanned text.
    pub span: Span,
}

impl MoneyToken {
    /// Create a token.
    #[must_use]
    pub fn new(text: impl Into<String>, span: Span) -> Self {
        Self {
            text: text.into(),
            span,
        }
    }
}

impl fmt::Display for MoneyToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {}", self.text, self.span)
    }
}

/// Scan `text` for numbers following `marker`, in order of appearance.
///
/// Matches never overlap. An empty marker finds nothing.
#[must_use]
pub fn scan_money_tokens(text: &str, marker: &str) -> Vec<MoneyToken> {
    let mut tokens = Vec::new();
    if marker.is_empty() {
        return tokens;
    }

    let mut pos = 0;
    while pos < text.len() {
        if let Some(marker_end) = match_marker(text, pos, marker) {
            let number_start = skip_whitespace(text, marker_end);
            if let Some(number_end) = number_run_end(text, number_start) {
                let span = Span::new(number_start, number_end);
                tokens.push(MoneyToken::new(span.text(text), span));
                pos = number_end;
                continue;
            }
        }
        pos += text[pos..].chars().next().map_or(1, char::len_utf8);
    }

    tokens
}

/// Scan `text` for numbers following `marker` and return just their text.
///
/// # Example
///
/// ```
/// use mailtally_core::find_all_money_values;
///
/// let values = find_all_money_values("Total: $45.00 and $45.00 and $12.50", "$");
/// assert_eq!(values, vec!["45.00", "45.00", "12.50"]);
///
/// assert!(find_all_money_values("no prices here", "$").is_empty());
/// ```
#[must_use]
pub fn find_all_money_values(text: &str, marker: &str) -> Vec<String> {
    scan_money_tokens(text, marker)
        .into_iter()
        .map(|token| token.text)
        .collect()
}

/// If `marker` occurs at byte `pos` (ignoring case), return the byte just past it.
fn match_marker(text: &str, pos: usize, marker: &str) -> Option<usize> {
    let mut rest = text[pos..].char_indices();
    let mut end = pos;
    for expected in marker.chars() {
        let (offset, actual) = rest.next()?;
        if !chars_eq_ignore_case(actual, expected) {
            return None;
        }
        end = pos + offset + actual.len_utf8();
    }
    Some(end)
}

fn chars_eq_ignore_case(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

fn skip_whitespace(text: &str, pos: usize) -> usize {
    text[pos..]
        .char_indices()
        .find(|(_, c)| !c.is_whitespace())
        .map_or(text.len(), |(offset, _)| pos + offset)
}

/// End of the number starting at `start`, trimmed back to its last digit.
fn number_run_end(text: &str, start: usize) -> Option<usize> {
    let mut last_digit_end = None;
    for (offset, b) in text.as_bytes()[start..].iter().enumerate() {
        match b {
            b'0'..=b'9' => last_digit_end = Some(start + offset + 1),
            b',' | b'.' => {}
            _ => break,
        }
    }
    last_digit_end
}
