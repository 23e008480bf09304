//! Price bounds validation.
//!
//! The bounds are deliberately generous: thirty orders of magnitude between
//! [`MIN_PRICE`] and [`MAX_PRICE`]. They do not judge volatility, they catch
//! reads that are mathematically well-formed but economically absurd:
//!
//! 1. EMPTY OR DRAINED POOLS: a pool with near-zero reserves on one side reports a
//!    ratio that prices the token at dust or at billions of native units.
//!
//! 2. MANIPULATION: a single skewed read must not propagate into every valuation
//!    that trusts the lens.
//!
//! 3. CONVERSION ERRORS: a misconfigured side or decimal count shifts the price by
//!    many orders of magnitude and lands outside the window.
//!
//! Out-of-range prices are rejected, never clamped.

use alloy::primitives::U256;
use serde::Deserialize;

use crate::error::InvalidPrice;

// ============================================
// Price Validation Constants
// ============================================

/// Smallest accepted price: 10^6 in the 10^18 scale (one trillionth of a native unit).
pub const MIN_PRICE: U256 = U256::from_limbs([1_000_000, 0, 0, 0]);

/// Largest accepted price: 10^36 in the 10^18 scale (10^18 native units).
/// 10^36 = 0xc097ce7bc90715b34b9f1000000000 split into 64-bit limbs.
pub const MAX_PRICE: U256 = U256::from_limbs([0xb34b9f1000000000, 0xc097ce7bc90715, 0, 0]);

// ============================================
// Bounds
// ============================================

/// Inclusive window a resolved price must fall in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PriceBounds {
    #[serde(default = "default_min_price")]
    min: U256,
    #[serde(default = "default_max_price")]
    max: U256,
}

fn default_min_price() -> U256 {
    MIN_PRICE
}

fn default_max_price() -> U256 {
    MAX_PRICE
}

impl Default for PriceBounds {
    fn default() -> Self {
        Self {
            min: MIN_PRICE,
            max: MAX_PRICE,
        }
    }
}

impl PriceBounds {
    /// Returns `None` for an empty window or a zero minimum.
    pub fn new(min: U256, max: U256) -> Option<Self> {
        if min.is_zero() || min > max {
            return None;
        }
        Some(Self { min, max })
    }

    pub fn min(&self) -> U256 {
        self.min
    }

    pub fn max(&self) -> U256 {
        self.max
    }

    /// True if the bounds loaded from configuration form a usable window.
    pub fn is_well_formed(&self) -> bool {
        !self.min.is_zero() && self.min <= self.max
    }

    /// Validate a price against the window, passing it through unchanged.
    #[inline]
    pub fn validate(&self, price: U256) -> Result<U256, InvalidPrice> {
        if price < self.min {
            Err(InvalidPrice::BelowMinimum {
                price,
                min: self.min,
            })
        } else if price > self.max {
            Err(InvalidPrice::AboveMaximum {
                price,
                max: self.max,
            })
        } else {
            Ok(price)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pow10(exp: u64) -> U256 {
        U256::from(10u64).pow(U256::from(exp))
    }

    #[test]
    fn test_default_bounds_constants() {
        assert_eq!(MIN_PRICE, pow10(6));
        assert_eq!(MAX_PRICE, pow10(36));
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let bounds = PriceBounds::default();
        assert_eq!(bounds.validate(MIN_PRICE), Ok(MIN_PRICE));
        assert_eq!(bounds.validate(MAX_PRICE), Ok(MAX_PRICE));
        assert_eq!(bounds.validate(pow10(18)), Ok(pow10(18)));
    }

    #[test]
    fn test_below_minimum_rejected() {
        let bounds = PriceBounds::default();
        let price = MIN_PRICE - U256::from(1u64);
        assert_eq!(
            bounds.validate(price),
            Err(InvalidPrice::BelowMinimum {
                price,
                min: MIN_PRICE
            })
        );
        assert!(bounds.validate(U256::ZERO).is_err());
    }

    #[test]
    fn test_above_maximum_rejected() {
        let bounds = PriceBounds::default();
        let price = MAX_PRICE + U256::from(1u64);
        assert_eq!(
            bounds.validate(price),
            Err(InvalidPrice::AboveMaximum {
                price,
                max: MAX_PRICE
            })
        );
        assert!(bounds.validate(U256::MAX).is_err());
    }

    #[test]
    fn test_custom_bounds() {
        let bounds = PriceBounds::new(pow10(17), pow10(19)).unwrap();
        assert!(bounds.validate(pow10(16)).is_err());
        assert!(bounds.validate(pow10(18)).is_ok());
        assert!(bounds.validate(pow10(20)).is_err());
    }

    #[test]
    fn test_malformed_bounds_rejected() {
        assert!(PriceBounds::new(pow10(19), pow10(17)).is_none());
        assert!(PriceBounds::new(U256::ZERO, pow10(17)).is_none());
    }
}
