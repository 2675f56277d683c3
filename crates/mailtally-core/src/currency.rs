//! Currency reference data.
//!
//! A [`CurrencyTable`] is an explicit value handed to whoever needs symbols
//! or exponents; there is no global registry. The built-in table covers the
//! common ISO 4217 currencies and can be replaced or extended from JSON.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while building a currency table.
#[derive(Debug, Error)]
pub enum CurrencyError {
    /// IO error reading a table file.
    #[error("failed to read currency table {path}: {source}")]
    Io {
        /// The path that failed to read.
        path: String,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The table is not valid JSON.
    #[error("invalid currency table: {0}")]
    Json(#[from] serde_json::Error),

    /// An entry has more minor-unit digits than a decimal amount can carry.
    #[error("invalid exponent {exponent} for {code}: at most {max} digits are supported", max = MAX_EXPONENT)]
    InvalidExponent {
        /// The currency code.
        code: String,
        /// The offending exponent.
        exponent: u32,
    },

    /// An entry has an unusable code.
    #[error("invalid currency code {code:?}: expected three ASCII letters")]
    InvalidCode {
        /// The offending code.
        code: String,
    },
}

/// Largest minor-unit exponent a currency may have.
pub const MAX_EXPONENT: u32 = 28;

/// A currency as the engine sees it: code, display symbol and minor-unit exponent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Currency {
    /// ISO 4217 code, upper case (e.g. "USD").
    pub code: String,
    /// Narrow display symbol (e.g. "$").
    pub symbol: String,
    /// Digits after the decimal point in the minor unit (2 for USD, 0 for JPY).
    pub exponent: u32,
}

impl Currency {
    /// Create a currency. The code is upper-cased.
    #[must_use]
    pub fn new(code: impl Into<String>, symbol: impl Into<String>, exponent: u32) -> Self {
        Self {
            code: code.into().to_ascii_uppercase(),
            symbol: symbol.into(),
            exponent,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.code, self.symbol)
    }
}

/// Common currencies: code, narrow symbol, exponent.
const BUILTIN: &[(&str, &str, u32)] = &[
    ("AED", "د.إ", 2),
    ("ARS", "$", 2),
    ("AUD", "$", 2),
    ("BGN", "лв", 2),
    ("BHD", "BD", 3),
    ("BRL", "R$", 2),
    ("CAD", "$", 2),
    ("CHF", "CHF", 2),
    ("CLP", "$", 0),
    ("CNY", "¥", 2),
    ("COP", "$", 2),
    ("CZK", "Kč", 2),
    ("DKK", "kr", 2),
    ("EUR", "€", 2),
    ("GBP", "£", 2),
    ("HKD", "$", 2),
    ("HUF", "Ft", 2),
    ("IDR", "Rp", 2),
    ("ILS", "₪", 2),
    ("INR", "₹", 2),
    ("ISK", "kr", 0),
    ("JOD", "JD", 3),
    ("JPY", "¥", 0),
    ("KRW", "₩", 0),
    ("KWD", "KD", 3),
    ("MXN", "$", 2),
    ("MYR", "RM", 2),
    ("NOK", "kr", 2),
    ("NZD", "$", 2),
    ("OMR", "OMR", 3),
    ("PHP", "₱", 2),
    ("PLN", "zł", 2),
    ("RON", "lei", 2),
    ("SAR", "SAR", 2),
    ("SEK", "kr", 2),
    ("SGD", "$", 2),
    ("THB", "฿", 2),
    ("TND", "DT", 3),
    ("TRY", "₺", 2),
    ("TWD", "$", 2),
    ("UAH", "₴", 2),
    ("USD", "$", 2),
    ("VND", "₫", 0),
    ("ZAR", "R", 2),
];

/// Lookup table from currency code to [`Currency`].
///
/// # Example
///
/// ```
/// use mailtally_core::{Currency, CurrencyTable};
///
/// let mut table = CurrencyTable::builtin();
/// assert_eq!(table.symbol_for("eur"), Some("€"));
/// assert_eq!(table.symbol_for("XYZ"), None);
///
/// table.insert(Currency::new("XTS", "T", 4));
/// assert_eq!(table.get("XTS").map(|c| c.exponent), Some(4));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CurrencyTable {
    currencies: HashMap<String, Currency>,
}

impl CurrencyTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table with the built-in currencies.
    #[must_use]
    pub fn builtin() -> Self {
        let mut table = Self::new();
        for &(code, symbol, exponent) in BUILTIN {
            table.insert(Currency::new(code, symbol, exponent));
        }
        table
    }

    /// Parse a JSON array of currencies.
    pub fn from_json(json: &str) -> Result<Self, CurrencyError> {
        let entries: Vec<Currency> = serde_json::from_str(json)?;
        let mut table = Self::new();
        for entry in entries {
            if entry.code.len() != 3 || !entry.code.chars().all(|c| c.is_ascii_alphabetic()) {
                return Err(CurrencyError::InvalidCode { code: entry.code });
            }
            if entry.exponent > MAX_EXPONENT {
                return Err(CurrencyError::InvalidExponent {
                    code: entry.code,
                    exponent: entry.exponent,
                });
            }
            table.insert(Currency::new(entry.code, entry.symbol, entry.exponent));
        }
        Ok(table)
    }

    /// Load a JSON currency table from a file.
    pub fn from_file(path: &Path) -> Result<Self, CurrencyError> {
        let json = std::fs::read_to_string(path).map_err(|source| CurrencyError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Add or replace a currency.
    pub fn insert(&mut self, currency: Currency) {
        self.currencies.insert(currency.code.clone(), currency);
    }

    /// Overlay another table on top of this one.
    pub fn extend(&mut self, other: Self) {
        self.currencies.extend(other.currencies);
    }

    /// Look up a currency by code (case-insensitive).
    #[must_use]
    pub fn get(&self, code: &str) -> Option<&Currency> {
        self.currencies.get(&code.trim().to_ascii_uppercase())
    }

    /// Resolve a currency code to its display symbol.
    ///
    /// Unknown codes yield `None`; the caller decides what to do without a
    /// symbol.
    #[must_use]
    pub fn symbol_for(&self, code: &str) -> Option<&str> {
        self.get(code)
            .map(|c| c.symbol.as_str())
            .filter(|s| !s.is_empty())
    }

    /// Number of currencies in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.currencies.len()
    }

    /// Check if the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.currencies.is_empty()
    }

    /// Currency codes in sorted order.
    #[must_use]
    pub fn codes(&self) -> Vec<&str> {
        let mut codes: Vec<&str> = self.currencies.keys().map(String::as_str).collect();
        codes.sort_unstable();
        codes
    }
}
