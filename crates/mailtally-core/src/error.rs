//! Error types for amount parsing, total selection and normalization.

use std::fmt;
use thiserror::Error;

/// A numeric token that could not be reduced to an amount.
///
/// These are recoverable: extraction drops the offending token and keeps
/// going with the remaining candidates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// The kind of error.
    pub kind: ParseErrorKind,
    /// The token as it was handed to the resolver.
    pub input: String,
}

impl ParseError {
    /// Create a new parse error.
    #[must_use]
    pub fn new(kind: ParseErrorKind, input: impl Into<String>) -> Self {
        Self {
            kind,
            input: input.into(),
        }
    }

    /// Get a numeric code for the error kind.
    #[must_use]
    pub const fn kind_code(&self) -> u32 {
        match &self.kind {
            ParseErrorKind::Empty => 1,
            ParseErrorKind::UnexpectedChar(_) => 2,
            ParseErrorKind::MultipleDecimalSeparators(_) => 3,
            ParseErrorKind::TooLarge => 4,
        }
    }

    /// Get a short label for the error.
    #[must_use]
    pub const fn label(&self) -> &str {
        match &self.kind {
            ParseErrorKind::Empty => "no digits",
            ParseErrorKind::UnexpectedChar(_) => "unexpected character",
            ParseErrorKind::MultipleDecimalSeparators(_) => "ambiguous decimal separator",
            ParseErrorKind::TooLarge => "amount too large",
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} in {:?}", self.kind, self.input)
    }
}

impl std::error::Error for ParseError {}

/// Kinds of parse errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Nothing but separators (or nothing at all) was left after cleaning.
    Empty,
    /// A character other than a digit or separator.
    UnexpectedChar(char),
    /// The decimal separator occurs more than once.
    MultipleDecimalSeparators(char),
    /// The digits do not fit in a 64-bit amount.
    TooLarge,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "no digits left after removing separators"),
            Self::UnexpectedChar(c) => write!(f, "unexpected character '{c}'"),
            Self::MultipleDecimalSeparators(c) => {
                write!(f, "decimal separator '{c}' appears more than once")
            }
            Self::TooLarge => write!(f, "amount does not fit in 64 bits"),
        }
    }
}

/// The total picker was handed an empty candidate list.
///
/// Callers are expected to check for an empty extraction first and report
/// "no amount found" instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no candidate amounts to choose a total from")]
pub struct NoCandidateError;

/// Errors that can occur while rescaling to a currency's minor unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NormalizeError {
    /// Scaling up would overflow a 64-bit amount.
    #[error("amount {amount} overflows when scaled from {from} to {to} decimal places")]
    Overflow {
        /// The amount being scaled.
        amount: i64,
        /// Source decimal places.
        from: u32,
        /// Target exponent.
        to: u32,
    },
}
