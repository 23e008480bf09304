use alloy::primitives::Address;
use serde::Serialize;

/// Where a pool-derived price leg ends up.
///
/// At most one hop: a reference token's own route must be [`Hop::Direct`],
/// which rules out routing cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Hop {
    /// The pool pairs the token with the native asset.
    Direct,
    /// The pool pairs the token with `reference`, which is priced by its own route.
    OneHop { reference: Address },
}

/// A price read from an AMM pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PoolRoute {
    pub pool: Address,
    /// Token is token0 of the pool (counterpart is token1).
    pub token_is_base_side: bool,
    pub hop: Hop,
}

impl PoolRoute {
    /// The asset the pool pairs the token with.
    pub fn counterpart(&self, native_asset: Address) -> Address {
        match self.hop {
            Hop::Direct => native_asset,
            Hop::OneHop { reference } => reference,
        }
    }
}

/// How a configured token is priced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PricingStrategy {
    PoolDerived(PoolRoute),
    /// Native-denominated price from the external feed.
    ExternalFeed,
}

/// Per-token price route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RouteConfig {
    pub strategy: PricingStrategy,
}

impl RouteConfig {
    pub fn direct(pool: Address, token_is_base_side: bool) -> Self {
        Self {
            strategy: PricingStrategy::PoolDerived(PoolRoute {
                pool,
                token_is_base_side,
                hop: Hop::Direct,
            }),
        }
    }

    pub fn one_hop(pool: Address, reference: Address, token_is_base_side: bool) -> Self {
        Self {
            strategy: PricingStrategy::PoolDerived(PoolRoute {
                pool,
                token_is_base_side,
                hop: Hop::OneHop { reference },
            }),
        }
    }

    pub fn external() -> Self {
        Self {
            strategy: PricingStrategy::ExternalFeed,
        }
    }

    /// Build a route from its flat administrative form.
    ///
    /// `use_external_source` wins over the pool fields. A reference equal to the
    /// native asset collapses to a direct route.
    pub fn from_parts(
        native_asset: Address,
        pool: Address,
        reference_token: Option<Address>,
        token_is_base_side: bool,
        use_external_source: bool,
    ) -> Self {
        if use_external_source {
            return Self::external();
        }
        match reference_token {
            Some(reference) if reference != native_asset => {
                Self::one_hop(pool, reference, token_is_base_side)
            },
            _ => Self::direct(pool, token_is_base_side),
        }
    }

    /// Flat form: `(pool, reference_token, token_is_base_side, use_external_source)`.
    pub fn to_parts(&self) -> (Address, Option<Address>, bool, bool) {
        match self.strategy {
            PricingStrategy::ExternalFeed => (Address::ZERO, None, false, true),
            PricingStrategy::PoolDerived(route) => {
                let reference = match route.hop {
                    Hop::Direct => None,
                    Hop::OneHop { reference } => Some(reference),
                };
                (route.pool, reference, route.token_is_base_side, false)
            },
        }
    }

    pub fn reference_token(&self) -> Option<Address> {
        match self.strategy {
            PricingStrategy::PoolDerived(PoolRoute {
                hop: Hop::OneHop { reference },
                ..
            }) => Some(reference),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NATIVE: Address = Address::repeat_byte(0xee);
    const POOL: Address = Address::repeat_byte(0x01);
    const REFERENCE: Address = Address::repeat_byte(0x02);

    #[test]
    fn test_from_parts_direct() {
        let route = RouteConfig::from_parts(NATIVE, POOL, None, true, false);
        assert_eq!(route, RouteConfig::direct(POOL, true));
        assert_eq!(route.reference_token(), None);
    }

    #[test]
    fn test_from_parts_one_hop() {
        let route = RouteConfig::from_parts(NATIVE, POOL, Some(REFERENCE), false, false);
        assert_eq!(route, RouteConfig::one_hop(POOL, REFERENCE, false));
        assert_eq!(route.reference_token(), Some(REFERENCE));
    }

    #[test]
    fn test_native_reference_collapses_to_direct() {
        let route = RouteConfig::from_parts(NATIVE, POOL, Some(NATIVE), true, false);
        assert_eq!(route, RouteConfig::direct(POOL, true));
    }

    #[test]
    fn test_external_source_ignores_pool_fields() {
        let route = RouteConfig::from_parts(NATIVE, POOL, Some(REFERENCE), true, true);
        assert_eq!(route, RouteConfig::external());
        assert_eq!(route.to_parts(), (Address::ZERO, None, false, true));
    }

    #[test]
    fn test_to_parts_round_trips_pool_route() {
        let route = RouteConfig::one_hop(POOL, REFERENCE, true);
        let (pool, reference, base_side, external) = route.to_parts();
        assert_eq!(
            RouteConfig::from_parts(NATIVE, pool, reference, base_side, external),
            route
        );
    }

    #[test]
    fn test_counterpart() {
        let PricingStrategy::PoolDerived(direct) = RouteConfig::direct(POOL, true).strategy else {
            panic!("expected pool route");
        };
        assert_eq!(direct.counterpart(NATIVE), NATIVE);

        let PricingStrategy::PoolDerived(hop) =
            RouteConfig::one_hop(POOL, REFERENCE, true).strategy
        else {
            panic!("expected pool route");
        };
        assert_eq!(hop.counterpart(NATIVE), REFERENCE);
    }
}
