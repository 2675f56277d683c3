//! Decimal format resolution.
//!
//! Receipts are written in whatever locale the merchant uses, so `.` and `,`
//! can each be either the decimal or the thousands separator. A token is
//! read European-style (`1.234,56`) only when it is strictly dot-grouped:
//! one to three leading digits, any number of `.ddd` groups, and an optional
//! `,dd` tail. Everything else, plain integers included, is read with `,`
//! for thousands and `.` for decimals.
//!
//! The heuristic cannot tell `1.234` (European 1234) from a US `1.234`; it
//! deliberately resolves it as 1234.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{ParseError, ParseErrorKind};

/// The roles assigned to the two punctuation marks of a numeric token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Separators {
    /// Grouping mark, removed before parsing.
    pub thousands: char,
    /// Mark that splits the integer and fractional parts.
    pub decimal: char,
}

impl Separators {
    /// `1.234,56` style.
    pub const DOT_GROUPED: Self = Self {
        thousands: '.',
        decimal: ',',
    };

    /// `1,234.56` style, the default.
    pub const COMMA_GROUPED: Self = Self {
        thousands: ',',
        decimal: '.',
    };

    /// Pick the separator roles for a numeric token.
    #[must_use]
    pub fn detect(token: &str) -> Self {
        if is_dot_grouped(token) {
            Self::DOT_GROUPED
        } else {
            Self::COMMA_GROUPED
        }
    }
}

/// A numeric token with its separators removed.
///
/// `amount` is the value with the decimal point dropped, so `"1.234,56"`
/// becomes `{ amount: 123456, decimal_places: 2 }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParsedAmount {
    /// Digits of the integer and fractional parts, concatenated.
    pub amount: i64,
    /// Number of digits that followed the decimal separator.
    pub decimal_places: u32,
}

impl ParsedAmount {
    /// Create a parsed amount.
    #[must_use]
    pub const fn new(amount: i64, decimal_places: u32) -> Self {
        Self {
            amount,
            decimal_places,
        }
    }
}

impl FromStr for ParsedAmount {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        get_decimal_value(s)
    }
}

impl fmt::Display for ParsedAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.decimal_places == 0 {
            return write!(f, "{}", self.amount);
        }
        let width = self.decimal_places as usize + 1;
        let digits = format!("{:0width$}", self.amount);
        let (int_part, frac_part) = digits.split_at(digits.len() - self.decimal_places as usize);
        write!(f, "{int_part}.{frac_part}")
    }
}

/// Check whether a token is strictly dot-grouped: `^\d{1,3}(\.\d{3})*(,\d{2})?$`.
#[must_use]
pub fn is_dot_grouped(token: &str) -> bool {
    let bytes = token.as_bytes();

    let lead = digit_run(bytes, 0);
    if !(1..=3).contains(&lead) {
        return false;
    }
    let mut pos = lead;

    while bytes.get(pos) == Some(&b'.') {
        if digit_run(bytes, pos + 1) != 3 {
            return false;
        }
        pos += 4;
    }

    if bytes.get(pos) == Some(&b',') {
        if digit_run(bytes, pos + 1) != 2 {
            return false;
        }
        pos += 3;
    }

    pos == bytes.len()
}

fn digit_run(bytes: &[u8], start: usize) -> usize {
    bytes
        .get(start..)
        .map_or(0, |rest| rest.iter().take_while(|b| b.is_ascii_digit()).count())
}

/// Resolve the separators of a numeric token and strip them.
///
/// # Example
///
/// ```
/// use mailtally_core::get_decimal_value;
///
/// let european = get_decimal_value("1.234,56").unwrap();
/// assert_eq!((european.amount, european.decimal_places), (123456, 2));
///
/// let us = get_decimal_value("1,234.56").unwrap();
/// assert_eq!((us.amount, us.decimal_places), (123456, 2));
///
/// let whole = get_decimal_value("500").unwrap();
/// assert_eq!((whole.amount, whole.decimal_places), (500, 0));
/// ```
pub fn get_decimal_value(token: &str) -> Result<ParsedAmount, ParseError> {
    let separators = Separators::detect(token);

    let mut amount: i64 = 0;
    let mut digits = 0usize;
    let mut decimal_places: u32 = 0;
    let mut seen_decimal = false;

    for c in token.chars() {
        if c == separators.thousands {
            continue;
        }
        if c == separators.decimal {
            if seen_decimal {
                return Err(ParseError::new(
                    ParseErrorKind::MultipleDecimalSeparators(c),
                    token,
                ));
            }
            seen_decimal = true;
            continue;
        }
        let Some(digit) = c.to_digit(10) else {
            return Err(ParseError::new(ParseErrorKind::UnexpectedChar(c), token));
        };
        amount = amount
            .checked_mul(10)
            .and_then(|a| a.checked_add(i64::from(digit)))
            .ok_or_else(|| ParseError::new(ParseErrorKind::TooLarge, token))?;
        digits += 1;
        if seen_decimal {
            decimal_places += 1;
        }
    }

    if digits == 0 {
        return Err(ParseError::new(ParseErrorKind::Empty, token));
    }

    Ok(ParsedAmount::new(amount, decimal_places))
}
