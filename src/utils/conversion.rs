//! Fixed-point conversion helpers.
//!
//! Prices are `U256` integers scaled by [`ONE`] (10^18). Every multiply/divide
//! runs in `U512` and is narrowed back with an explicit overflow check, so no
//! intermediate step can silently wrap.

use alloy::primitives::{U256, U512};
use once_cell::sync::Lazy;

// ============================================
// Constants
// ============================================

/// Decimal places of the fixed-point price representation.
pub const PRICE_DECIMALS: u8 = 18;

/// 1.0 in fixed-point (10^18).
pub const ONE: U256 = U256::from_limbs([1_000_000_000_000_000_000, 0, 0, 0]);

/// Largest token precision accepted from a pool or feed read.
pub const MAX_TOKEN_DECIMALS: u8 = 24;

// ============================================
// Width Conversions
// ============================================

/// Zero-extend a `U256` into a `U512`.
#[inline]
pub fn widen(value: U256) -> U512 {
    let mut limbs = [0u64; 8];
    limbs[..4].copy_from_slice(value.as_limbs());
    U512::from_limbs(limbs)
}

/// Narrow a `U512` to `U256`, returning `None` if the high half is non-zero.
#[inline]
pub fn narrow(value: U512) -> Option<U256> {
    if value.bit_len() > 256 {
        return None;
    }
    Some(U256::from_limbs_slice(&value.as_limbs()[..4]))
}

// ============================================
// Arithmetic
// ============================================

/// floor(a * b / denominator), computed at double width.
///
/// Returns `None` on a zero denominator or if the product overflows `U512`.
#[inline]
pub fn mul_div_floor(a: U512, b: U512, denominator: U512) -> Option<U512> {
    if denominator.is_zero() {
        return None;
    }
    a.checked_mul(b)?.checked_div(denominator)
}

// ============================================
// Feed Normalization
// ============================================

/// Rescale a feed answer with `decimals` places to the 18-decimal price scale.
///
/// Down-scaling floors. Returns `None` for precisions above [`MAX_TOKEN_DECIMALS`]
/// or if up-scaling overflows.
pub fn normalize_feed_answer(answer: U256, decimals: u8) -> Option<U256> {
    if decimals > MAX_TOKEN_DECIMALS {
        return None;
    }
    if decimals <= PRICE_DECIMALS {
        answer.checked_mul(pow10(PRICE_DECIMALS - decimals)?)
    } else {
        Some(answer / pow10(decimals - PRICE_DECIMALS)?)
    }
}

// ============================================
// Internal Helpers
// ============================================

static POW10_CACHE: Lazy<[U256; MAX_TOKEN_DECIMALS as usize + 1]> = Lazy::new(|| {
    let ten = U256::from(10u64);
    let mut table = [U256::from(1u64); MAX_TOKEN_DECIMALS as usize + 1];
    for i in 1..table.len() {
        table[i] = table[i - 1] * ten;
    }
    table
});

/// Compute 10^exp as U256, or `None` once it no longer fits (exp > 77).
pub(crate) fn pow10(exp: u8) -> Option<U256> {
    if (exp as usize) < POW10_CACHE.len() {
        return Some(POW10_CACHE[exp as usize]);
    }
    let ten = U256::from(10u64);
    (0..exp).try_fold(U256::from(1u64), |acc, _| acc.checked_mul(ten))
}
