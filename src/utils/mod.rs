//! Fixed-point utilities for the price lens.
//!
//! This module is organized into focused submodules:
//!
//! - [`validation`] - Price bounds and the range check applied to every resolved price
//! - [`conversion`] - Width conversions, pow10, mul-div and feed normalization
//! - [`price`] - Pool ratio conversions (sqrtPriceX96, reserves) and hop composition

mod conversion;
mod price;
mod validation;

// ============================================
// Re-exports
// ============================================

// Conversion utilities
pub use conversion::{
    mul_div_floor, narrow, normalize_feed_answer, widen, MAX_TOKEN_DECIMALS, ONE, PRICE_DECIMALS,
};

// Price conversion utilities
pub use price::{
    compose_prices, price_from_ratio_x128, reserves_to_ratio_x128, sqrt_price_x96_to_ratio_x128,
    RATIO_FRACTION_BITS,
};

// Validation utilities
pub use validation::{PriceBounds, MAX_PRICE, MIN_PRICE};
