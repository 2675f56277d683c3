//! Core engine for mailtally
//!
//! This crate turns the free-form text of a receipt into integer amounts in a
//! currency's minor unit:
//!
//! - [`find_all_money_values`] / [`scan_money_tokens`] - numbers next to a currency marker
//! - [`get_decimal_value`] - decide which of `.` and `,` is the decimal separator
//! - [`find_highest_count`] - pick the total among candidate amounts
//! - [`normalize_currency_value`] - rescale to a currency's minor unit
//! - [`CurrencyTable`] - currency codes, symbols and exponents
//! - [`extract`] / [`extract_with_total`] - all of the above in one call
//!
//! Everything here is pure: no I/O besides loading a currency table on
//! request, no logging, no shared state.
//!
//! # Example
//!
//! ```
//! use mailtally_core::{extract, CurrencyTable};
//!
//! let table = CurrencyTable::builtin();
//! let eur = table.get("EUR").unwrap();
//!
//! let body = "Zwischensumme €1.234,56\nGesamt €1.234,56\nVersand €4,90";
//! let result = extract(body, eur).result.unwrap();
//!
//! assert_eq!(result.amount, 123_456);
//! assert_eq!(result.other_amounts, vec![123_456, 123_456, 490]);
//! assert_eq!(result.currency_decimal, 2);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod currency;
pub mod decimal;
pub mod error;
pub mod extract;
pub mod normalize;
pub mod scan;
pub mod span;
pub mod total;

pub use currency::{Currency, CurrencyError, CurrencyTable, MAX_EXPONENT};
pub use decimal::{get_decimal_value, is_dot_grouped, ParsedAmount, Separators};
pub use error::{NoCandidateError, NormalizeError, ParseError, ParseErrorKind};
pub use extract::{
    extract, extract_with_total, Extraction, ExtractionResult, RejectedToken, TokenError,
};
pub use normalize::normalize_currency_value;
pub use scan::{find_all_money_values, scan_money_tokens, MoneyToken};
pub use span::Span;
pub use total::{find_highest_count, tally};

// Re-export commonly used external types
pub use rust_decimal::Decimal;
