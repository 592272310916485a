//! 18-decimal fixed-point conversion
//!
//! The oracle stores prices as `uint256` scaled by 10^18. Conversion happens
//! once, immediately before submission.

use crate::error::SubmissionError;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Decimal places of on-chain prices
pub const PRICE_DECIMALS: u32 = 18;

/// Scale `price` to an integer with [`PRICE_DECIMALS`] places.
///
/// Digits beyond 18 places are truncated.
pub fn to_fixed_point(symbol: &str, price: Decimal) -> Result<u128, SubmissionError> {
    let encoding_error = |reason: &str| SubmissionError::Encoding {
        symbol: symbol.to_string(),
        reason: reason.to_string(),
    };

    if price.is_sign_negative() && !price.is_zero() {
        return Err(encoding_error("negative price"));
    }

    let whole = price.trunc().to_u128().ok_or_else(|| encoding_error("price out of range"))?;
    let fraction = price.fract();

    // fraction < 1, so fraction * 10^18 always fits in a Decimal
    let fraction_scaled = (fraction * Decimal::from(10u64.pow(PRICE_DECIMALS)))
        .trunc()
        .to_u128()
        .ok_or_else(|| encoding_error("price out of range"))?;

    whole
        .checked_mul(10u128.pow(PRICE_DECIMALS))
        .and_then(|w| w.checked_add(fraction_scaled))
        .ok_or_else(|| encoding_error("price out of range"))
}

/// Inverse of [`to_fixed_point`], for display and tests
pub fn from_fixed_point(value: u128) -> Option<Decimal> {
    let value = i128::try_from(value).ok()?;
    Decimal::try_from_i128_with_scale(value, PRICE_DECIMALS)
        .ok()
        .map(|d| d.normalize())
}
