//! One-call extraction over an email body.
//!
//! Two entry points cover the two ways a total is known:
//!
//! - [`extract`]: nothing authoritative is known, so the total is picked from
//!   the scanned candidates.
//! - [`extract_with_total`]: a classifier already reported the total; it is
//!   parsed and normalized, and the scanned candidates only fill
//!   `other_amounts`.
//!
//! Tokens that fail to parse are dropped and reported in
//! [`Extraction::rejected`]; they never fail the whole extraction.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::currency::Currency;
use crate::decimal::get_decimal_value;
use crate::error::{NormalizeError, ParseError};
use crate::scan::{scan_money_tokens, MoneyToken};
use crate::total::find_highest_count;

/// Terminal output of the engine for one email body.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// The total, in the currency's minor unit.
    pub amount: i64,
    /// Every candidate found in the text, in the currency's minor unit, in text order.
    pub other_amounts: Vec<i64>,
    /// ISO 4217 code of the currency.
    pub currency: String,
    /// Minor-unit exponent of the currency.
    pub currency_decimal: u32,
}

/// Why a token or a reported total could not be used.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// The token is not a number.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// The number does not fit the currency's minor unit.
    #[error(transparent)]
    Normalize(#[from] NormalizeError),
}

/// A scanned token that was dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedToken {
    /// The token as scanned.
    pub token: MoneyToken,
    /// Why it was dropped.
    pub error: TokenError,
}

/// Report of one extraction run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Extraction {
    /// The result, or `None` when no usable amount was found.
    pub result: Option<ExtractionResult>,
    /// The marker that produced the candidates, if any matched.
    pub marker: Option<String>,
    /// Tokens that were dropped.
    pub rejected: Vec<RejectedToken>,
}

/// Candidates scanned from a body, normalized to the currency.
struct Candidates {
    amounts: Vec<i64>,
    marker: Option<String>,
    rejected: Vec<RejectedToken>,
}

/// Scan with the currency symbol, falling back to its code when the
/// symbol yields no usable amount.
///
/// Tokens dropped along the way are reported whichever marker wins.
fn collect_candidates(text: &str, currency: &Currency) -> Candidates {
    let mut markers = vec![currency.symbol.as_str()];
    if !currency.code.eq_ignore_ascii_case(&currency.symbol) {
        markers.push(currency.code.as_str());
    }

    let mut rejected = Vec::new();
    for marker in markers {
        let mut amounts = Vec::new();
        for token in scan_money_tokens(text, marker) {
            match normalize_token(&token.text, currency) {
                Ok(amount) => amounts.push(amount),
                Err(error) => rejected.push(RejectedToken { token, error }),
            }
        }
        if !amounts.is_empty() {
            return Candidates {
                amounts,
                marker: Some(marker.to_string()),
                rejected,
            };
        }
    }

    Candidates {
        amounts: Vec::new(),
        marker: None,
        rejected,
    }
}

fn normalize_token(text: &str, currency: &Currency) -> Result<i64, TokenError> {
    let parsed = get_decimal_value(text)?;
    Ok(currency.normalize(&parsed)?)
}

/// Extract the total and all candidate amounts from `text`.
///
/// # Example
///
/// ```
/// use mailtally_core::{extract, Currency};
///
/// let usd = Currency::new("USD", "$", 2);
/// let extraction = extract("Subtotal $45.00 Tax $0 Total $45.00", &usd);
/// let result = extraction.result.unwrap();
/// assert_eq!(result.amount, 4500);
/// assert_eq!(result.other_amounts, vec![4500, 0, 4500]);
/// ```
#[must_use]
pub fn extract(text: &str, currency: &Currency) -> Extraction {
    let candidates = collect_candidates(text, currency);

    let result = find_highest_count(&candidates.amounts)
        .ok()
        .map(|amount| ExtractionResult {
            amount,
            other_amounts: candidates.amounts,
            currency: currency.code.clone(),
            currency_decimal: currency.exponent,
        });

    Extraction {
        result,
        marker: candidates.marker,
        rejected: candidates.rejected,
    }
}

/// Extract with a total that is already known, e.g. from a model reply.
///
/// The total may still carry the currency symbol or code and surrounding
/// whitespace (`"$45.00"`, `"45,00 EUR"`).
pub fn extract_with_total(
    text: &str,
    total: &str,
    currency: &Currency,
) -> Result<Extraction, TokenError> {
    let amount = normalize_token(strip_currency(total, currency), currency)?;
    let candidates = collect_candidates(text, currency);

    Ok(Extraction {
        result: Some(ExtractionResult {
            amount,
            other_amounts: candidates.amounts,
            currency: currency.code.clone(),
            currency_decimal: currency.exponent,
        }),
        marker: candidates.marker,
        rejected: candidates.rejected,
    })
}

/// Remove a leading or trailing currency symbol or code from a total.
fn strip_currency<'a>(total: &'a str, currency: &Currency) -> &'a str {
    let mut value = total.trim();
    for marker in [currency.symbol.as_str(), currency.code.as_str()] {
        if marker.is_empty() {
            continue;
        }
        if let Some(rest) = strip_prefix_ignore_case(value, marker) {
            value = rest.trim_start();
        }
        if let Some(rest) = strip_suffix_ignore_case(value, marker) {
            value = rest.trim_end();
        }
    }
    value
}

fn strip_prefix_ignore_case<'a>(value: &'a str, marker: &str) -> Option<&'a str> {
    let head = value.get(..marker.len())?;
    head.eq_ignore_ascii_case(marker)
        .then(|| &value[marker.len()..])
}

fn strip_suffix_ignore_case<'a>(value: &'a str, marker: &str) -> Option<&'a str> {
    let split = value.len().checked_sub(marker.len())?;
    let tail = value.get(split..)?;
    tail.eq_ignore_ascii_case(marker).then(|| &value[..split])
}
