//! Conversion of parsed amounts into a currency's minor unit.
//!
//! Scaling up is exact. Scaling down happens when a receipt quotes more
//! fractional digits than the currency has (three decimals for a two-decimal
//! currency); the value is rounded half away from zero instead of failing.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::currency::Currency;
use crate::decimal::ParsedAmount;
use crate::error::NormalizeError;

/// Rescale `amount`, whose last `source_decimal_places` digits are fractional,
/// so that it has exactly `exponent` fractional digits.
///
/// # Example
///
/// ```
/// use mailtally_core::normalize_currency_value;
///
/// assert_eq!(normalize_currency_value(2, 2, 12345).unwrap(), 12345);
/// assert_eq!(normalize_currency_value(0, 2, 50).unwrap(), 5000);
/// assert_eq!(normalize_currency_value(3, 2, 123456).unwrap(), 12346);
/// ```
pub fn normalize_currency_value(
    source_decimal_places: u32,
    exponent: u32,
    amount: i64,
) -> Result<i64, NormalizeError> {
    let overflow = NormalizeError::Overflow {
        amount,
        from: source_decimal_places,
        to: exponent,
    };

    if exponent >= source_decimal_places {
        let factor = 10i64
            .checked_pow(exponent - source_decimal_places)
            .ok_or(overflow)?;
        return amount.checked_mul(factor).ok_or(overflow);
    }

    let scale = source_decimal_places - exponent;
    match Decimal::try_from_i128_with_scale(i128::from(amount), scale) {
        Ok(value) => value
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()
            .ok_or(overflow),
        // Beyond Decimal's 28-digit scale every i64 rounds to zero.
        Err(_) => Ok(0),
    }
}

impl Currency {
    /// Express a parsed amount in this currency's minor unit.
    pub fn normalize(&self, parsed: &ParsedAmount) -> Result<i64, NormalizeError> {
        normalize_currency_value(parsed.decimal_places, self.exponent, parsed.amount)
    }

    /// Convert a minor-unit amount back into major units.
    ///
    /// `None` when the exponent is beyond [`MAX_EXPONENT`](crate::currency::MAX_EXPONENT).
    #[must_use]
    pub fn to_major(&self, minor: i64) -> Option<Decimal> {
        Decimal::try_from_i128_with_scale(i128::from(minor), self.exponent).ok()
    }
}
