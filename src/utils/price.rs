//! Pool ratio to fixed-point price conversion.
//!
//! Pools report their spot state as a Q128.128 ratio of raw quote-side units
//! (token1) per raw base-side unit (token0). These functions turn that ratio
//! into an 18-decimal price for one whole unit of either side, and compose two
//! such prices across a reference token.
//!
//! All divisions floor.

use alloy::primitives::{U256, U512};

use super::conversion::{mul_div_floor, narrow, pow10, widen, ONE};
use crate::error::InvalidPrice;

// ============================================
// Constants
// ============================================

/// Fractional bits of the pool ratio representation.
pub const RATIO_FRACTION_BITS: usize = 128;

/// Fractional bits of a Uniswap V3 `sqrtPriceX96`.
const SQRT_PRICE_FRACTION_BITS: usize = 96;

// ============================================
// Pool State to Ratio
// ============================================

/// Convert a Q64.96 `sqrtPriceX96` into a Q128.128 ratio (token1 per token0).
///
/// ratio_x128 = sqrtPriceX96^2 / 2^64, squared at double width.
///
/// Returns `None` for a zero price.
pub fn sqrt_price_x96_to_ratio_x128(sqrt_price_x96: U256) -> Option<U256> {
    if sqrt_price_x96.is_zero() {
        return None;
    }
    let wide = widen(sqrt_price_x96);
    let squared = wide.checked_mul(wide)?;
    narrow(squared >> (2 * SQRT_PRICE_FRACTION_BITS - RATIO_FRACTION_BITS))
}

/// Convert constant-product reserves into a Q128.128 ratio (token1 per token0).
///
/// Returns `None` if either reserve is empty.
pub fn reserves_to_ratio_x128(reserve0: U256, reserve1: U256) -> Option<U256> {
    if reserve0.is_zero() || reserve1.is_zero() {
        return None;
    }
    let quotient = (widen(reserve1) << RATIO_FRACTION_BITS) / widen(reserve0);
    narrow(quotient)
}

// ============================================
// Ratio to Price
// ============================================

/// Price of one whole token in whole counterpart units, scaled by 10^18.
///
/// `ratio_x128` is raw quote units per raw base unit. With the token on the base side:
///
/// ```text
/// price = ratio_x128 * 10^base_decimals * ONE / (10^quote_decimals * 2^128)
/// ```
///
/// With the token on the quote side the ratio is inverted before narrowing:
///
/// ```text
/// price = ONE * 10^quote_decimals * 2^128 / (ratio_x128 * 10^base_decimals)
/// ```
pub fn price_from_ratio_x128(
    ratio_x128: U256,
    base_decimals: u8,
    quote_decimals: u8,
    token_is_base_side: bool,
) -> Result<U256, InvalidPrice> {
    let ratio = widen(ratio_x128);
    let base_unit = widen(pow10(base_decimals).ok_or(InvalidPrice::Overflow)?);
    let quote_unit = widen(pow10(quote_decimals).ok_or(InvalidPrice::Overflow)?);
    let one = widen(ONE);
    let q128 = U512::from(1u64) << RATIO_FRACTION_BITS;

    let price = if token_is_base_side {
        let numerator = ratio.checked_mul(base_unit).ok_or(InvalidPrice::Overflow)?;
        let denominator = quote_unit.checked_mul(q128).ok_or(InvalidPrice::Overflow)?;
        mul_div_floor(numerator, one, denominator).ok_or(InvalidPrice::Overflow)?
    } else {
        if ratio.is_zero() {
            return Err(InvalidPrice::ZeroRatio);
        }
        let numerator = one.checked_mul(quote_unit).ok_or(InvalidPrice::Overflow)?;
        let denominator = ratio.checked_mul(base_unit).ok_or(InvalidPrice::Overflow)?;
        mul_div_floor(numerator, q128, denominator).ok_or(InvalidPrice::Overflow)?
    };

    narrow(price).ok_or(InvalidPrice::Overflow)
}

/// Chain a price quoted in a reference token with the reference's native price.
///
/// price_in_native = price_in_reference * reference_price / ONE
pub fn compose_prices(price_in_reference: U256, reference_price: U256) -> Result<U256, InvalidPrice> {
    let composed = mul_div_floor(widen(price_in_reference), widen(reference_price), widen(ONE))
        .ok_or(InvalidPrice::Overflow)?;
    narrow(composed).ok_or(InvalidPrice::Overflow)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q128() -> U256 {
        U256::from(1u64) << RATIO_FRACTION_BITS
    }

    /// |a - b| <= b / 100
    fn within_one_percent(actual: U256, expected: U256) -> bool {
        let diff = if actual > expected { actual - expected } else { expected - actual };
        diff * U256::from(100u64) <= expected
    }

    #[test]
    fn test_sqrt_price_of_one_is_unit_ratio() {
        let sqrt_one = U256::from(1u64) << SQRT_PRICE_FRACTION_BITS;
        assert_eq!(sqrt_price_x96_to_ratio_x128(sqrt_one), Some(q128()));
    }

    #[test]
    fn test_sqrt_price_of_four_is_ratio_sixteen() {
        let sqrt_four = U256::from(4u64) << SQRT_PRICE_FRACTION_BITS;
        assert_eq!(
            sqrt_price_x96_to_ratio_x128(sqrt_four),
            Some(U256::from(16u64) << RATIO_FRACTION_BITS)
        );
    }

    #[test]
    fn test_sqrt_price_max_uniswap_value_fits() {
        // MAX_SQRT_RATIO from Uniswap V3 TickMath
        let max_sqrt: U256 = "1461446703485210103287273052203988822378723970342".parse().unwrap();
        assert!(sqrt_price_x96_to_ratio_x128(max_sqrt).is_some());
    }

    #[test]
    fn test_zero_sqrt_price_rejected() {
        assert_eq!(sqrt_price_x96_to_ratio_x128(U256::ZERO), None);
    }

    #[test]
    fn test_reserves_ratio() {
        let ratio = reserves_to_ratio_x128(U256::from(2u64), U256::from(1u64)).unwrap();
        assert_eq!(ratio, q128() / U256::from(2u64));
    }

    #[test]
    fn test_empty_reserves_rejected() {
        assert_eq!(reserves_to_ratio_x128(U256::ZERO, U256::from(1u64)), None);
        assert_eq!(reserves_to_ratio_x128(U256::from(1u64), U256::ZERO), None);
    }

    #[test]
    fn test_base_side_parity_18_decimals() {
        let price = price_from_ratio_x128(q128(), 18, 18, true).unwrap();
        assert_eq!(price, ONE);
    }

    #[test]
    fn test_quote_side_inverts_ratio() {
        // 1 token0 = 4 token1  =>  1 token1 = 0.25 token0
        let ratio = U256::from(4u64) << RATIO_FRACTION_BITS;
        let price = price_from_ratio_x128(ratio, 18, 18, false).unwrap();
        assert_eq!(price, ONE / U256::from(4u64));
    }

    #[test]
    fn test_six_decimal_base_against_eighteen_decimal_quote() {
        // 1e6 raw (1 whole) base = 1e18 raw (1 whole) quote
        let ratio = reserves_to_ratio_x128(U256::from(1_000_000u64), ONE).unwrap();
        let price = price_from_ratio_x128(ratio, 6, 18, true).unwrap();
        assert_eq!(price, ONE);
    }

    #[test]
    fn test_six_decimal_quote_inverted_without_precision_collapse() {
        // Pool: 18-decimal base, 6-decimal quote, 1:1 in whole units.
        // The raw ratio is 1e-12, so inverting it in narrow precision would collapse.
        let ratio = reserves_to_ratio_x128(ONE, U256::from(1_000_000u64)).unwrap();
        let price = price_from_ratio_x128(ratio, 18, 6, false).unwrap();
        assert!(within_one_percent(price, ONE), "price {price}");
    }

    #[test]
    fn test_zero_ratio_cannot_be_inverted() {
        assert_eq!(
            price_from_ratio_x128(U256::ZERO, 18, 18, false),
            Err(InvalidPrice::ZeroRatio)
        );
    }

    #[test]
    fn test_tiny_ratio_inversion_overflows() {
        let result = price_from_ratio_x128(U256::from(1u64), 0, 24, false);
        assert_eq!(result, Err(InvalidPrice::Overflow));
    }

    #[test]
    fn test_unrepresentable_decimals_overflow() {
        assert_eq!(
            price_from_ratio_x128(q128(), 78, 77, true),
            Err(InvalidPrice::Overflow)
        );
        assert_eq!(
            price_from_ratio_x128(q128(), 18, 200, false),
            Err(InvalidPrice::Overflow)
        );
    }

    #[test]
    fn test_compose_prices() {
        // 0.5 reference per token, reference = 2 native
        let composed = compose_prices(ONE / U256::from(2u64), U256::from(2u64) * ONE).unwrap();
        assert_eq!(composed, ONE);
    }

    #[test]
    fn test_compose_prices_overflow() {
        assert_eq!(compose_prices(U256::MAX, U256::MAX), Err(InvalidPrice::Overflow));
    }
}
