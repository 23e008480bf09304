//! Error types for price resolution and route administration.
//!
//! Errors fall into three groups:
//!
//! - **Configuration**: [`PriceError::TokenNotConfigured`], [`PriceError::ReferenceNotEligible`],
//!   [`PriceError::RouteTooDeep`]
//! - **Data**: [`PriceError::InvalidPrice`], [`PriceError::StaleOracleData`]
//! - **Dependency**: [`PriceError::UnderlyingReadFailed`]
//!
//! None of them are recovered inside the crate. A failed resolution never turns
//! into a default price.

use alloy::primitives::{Address, U256};
use thiserror::Error;

/// Why a computed price was refused.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidPrice {
    #[error("price {price} is below the minimum {min}")]
    BelowMinimum { price: U256, min: U256 },

    #[error("price {price} is above the maximum {max}")]
    AboveMaximum { price: U256, max: U256 },

    #[error("pool ratio is zero and cannot be inverted")]
    ZeroRatio,

    #[error("fixed-point arithmetic overflowed")]
    Overflow,
}

/// Failure while resolving a native-denominated price.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    #[error("token {0} has no configured price route")]
    TokenNotConfigured(Address),

    #[error("reference token {reference} used by {token} is not eligible as a hop")]
    ReferenceNotEligible { token: Address, reference: Address },

    #[error("reference token {reference} used by {token} is itself routed through a hop")]
    RouteTooDeep { token: Address, reference: Address },

    #[error("invalid price for {token}: {reason}")]
    InvalidPrice { token: Address, reason: InvalidPrice },

    #[error("oracle data for {token} is {age_secs}s old (max {max_age_secs}s)")]
    StaleOracleData {
        token: Address,
        age_secs: i64,
        max_age_secs: u64,
    },

    #[error("read of {target} failed: {reason}")]
    UnderlyingReadFailed { target: Address, reason: String },
}

impl PriceError {
    pub fn invalid(token: Address, reason: InvalidPrice) -> Self {
        Self::InvalidPrice { token, reason }
    }

    pub fn read_failed(target: Address, reason: impl Into<String>) -> Self {
        Self::UnderlyingReadFailed {
            target,
            reason: reason.into(),
        }
    }

    /// True for errors caused by route configuration rather than live data.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::TokenNotConfigured(_)
                | Self::ReferenceNotEligible { .. }
                | Self::RouteTooDeep { .. }
        )
    }
}

/// Rejected write to the route registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("caller {caller} is not the registry admin")]
    Unauthorized { caller: Address },

    #[error("the native asset {0} is priced by definition and cannot be routed")]
    NativeAssetRoute(Address),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_error_classification() {
        let token = Address::repeat_byte(0x11);
        assert!(PriceError::TokenNotConfigured(token).is_configuration_error());
        assert!(!PriceError::invalid(token, InvalidPrice::ZeroRatio).is_configuration_error());
        assert!(!PriceError::read_failed(token, "timeout").is_configuration_error());
    }

    #[test]
    fn test_invalid_price_message_carries_reason() {
        let token = Address::repeat_byte(0x11);
        let err = PriceError::invalid(
            token,
            InvalidPrice::BelowMinimum {
                price: U256::from(5u64),
                min: U256::from(1_000_000u64),
            },
        );
        let message = err.to_string();
        assert!(message.contains("below the minimum 1000000"));
    }
}
