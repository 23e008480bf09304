use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::{Address, U256};
use chrono::Utc;
use log::{debug, warn};

use super::feed::{NoFeed, PriceFeed};
use super::pool_reader::PoolReader;
use crate::config::LensSettings;
use crate::error::{InvalidPrice, PriceError};
use crate::registry::{Hop, PoolRoute, PricingStrategy, RouteRegistry, RouteTable};
use crate::utils::{compose_prices, price_from_ratio_x128, PriceBounds, MAX_TOKEN_DECIMALS, ONE};

/// Default oldest external reading still trusted.
const DEFAULT_MAX_STALENESS: Duration = Duration::from_secs(3_600);

/// How far ahead of the local clock a feed reading may be dated.
const MAX_FEED_CLOCK_SKEW_SECS: i64 = 60;

/// Native-asset price resolution.
///
/// Resolves a token's price in native units per whole token, scaled by 10^18:
/// 1. Native asset → `ONE` (direct)
/// 2. External route → feed reading, staleness-checked and normalized
/// 3. Direct pool route → pool spot ratio against the native asset
/// 4. One-hop pool route → pool spot ratio against a reference token, composed
///    with the reference token's own direct price
///
/// Every resolved price (and every reference price used as a hop) passes the
/// bounds check. Nothing is cached: each call reads current pool state.
pub struct PriceResolver<P, F = NoFeed> {
    registry: Arc<RouteRegistry>,
    pools: P,
    feed: F,
    bounds: PriceBounds,
    max_staleness: Duration,
}

impl<P: PoolReader> PriceResolver<P, NoFeed> {
    /// Resolver whose external routes always fail with a read error.
    pub fn without_feed(registry: Arc<RouteRegistry>, pools: P) -> Self {
        Self::new(registry, pools, NoFeed)
    }
}

impl<P: PoolReader, F: PriceFeed> PriceResolver<P, F> {
    pub fn new(registry: Arc<RouteRegistry>, pools: P, feed: F) -> Self {
        Self {
            registry,
            pools,
            feed,
            bounds: PriceBounds::default(),
            max_staleness: DEFAULT_MAX_STALENESS,
        }
    }

    pub fn from_settings(
        registry: Arc<RouteRegistry>,
        pools: P,
        feed: F,
        settings: &LensSettings,
    ) -> Self {
        Self::new(registry, pools, feed)
            .with_bounds(settings.bounds)
            .with_max_staleness(settings.max_staleness())
    }

    pub fn with_bounds(mut self, bounds: PriceBounds) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn with_max_staleness(mut self, max_staleness: Duration) -> Self {
        self.max_staleness = max_staleness;
        self
    }

    pub fn registry(&self) -> &Arc<RouteRegistry> {
        &self.registry
    }

    /// Resolve `token`'s price in native units per whole token.
    pub async fn resolve_native_price(&self, token: Address) -> Result<U256, PriceError> {
        let native = self.registry.native_asset();
        if token == native {
            return Ok(ONE);
        }

        // One snapshot for both hops
        let table = self.registry.snapshot();
        let route = table.get_route(token)?;

        let price = match route.strategy {
            PricingStrategy::ExternalFeed => self.feed_price(token).await?,
            PricingStrategy::PoolDerived(pool_route) => match pool_route.hop {
                Hop::Direct => self.pool_price(token, &pool_route, native).await?,
                Hop::OneHop { reference } => {
                    if !table.is_reference_token(reference) {
                        return Err(PriceError::ReferenceNotEligible { token, reference });
                    }
                    let price_in_reference = self.pool_price(token, &pool_route, native).await?;
                    let reference_price = self.reference_price(&table, token, reference).await?;
                    compose_prices(price_in_reference, reference_price)
                        .map_err(|reason| PriceError::invalid(token, reason))?
                },
            },
        };

        let price = self.validate(token, price)?;
        debug!("Resolved {token} at {price} native (1e18 scale)");
        Ok(price)
    }

    /// Resolve `token` with one deadline spanning every read of the resolution.
    pub async fn resolve_native_price_within(
        &self,
        token: Address,
        timeout: Duration,
    ) -> Result<U256, PriceError> {
        match tokio::time::timeout(timeout, self.resolve_native_price(token)).await {
            Ok(result) => result,
            Err(_) => Err(PriceError::read_failed(
                token,
                format!("resolution timed out after {timeout:?}"),
            )),
        }
    }

    /// Resolve several tokens concurrently. Results are in input order.
    pub async fn resolve_native_prices(&self, tokens: &[Address]) -> Vec<Result<U256, PriceError>> {
        let tasks = tokens.iter().map(|token| self.resolve_native_price(*token));
        futures::future::join_all(tasks).await
    }

    /// Native price of a reference token used as a hop for `token`.
    ///
    /// The reference must be priced directly (pool against native, or feed).
    async fn reference_price(
        &self,
        table: &RouteTable,
        token: Address,
        reference: Address,
    ) -> Result<U256, PriceError> {
        let native = self.registry.native_asset();
        if reference == native {
            return Ok(ONE);
        }

        let route = table.get_route(reference)?;
        let price = match route.strategy {
            PricingStrategy::ExternalFeed => self.feed_price(reference).await?,
            PricingStrategy::PoolDerived(pool_route) => match pool_route.hop {
                Hop::Direct => self.pool_price(reference, &pool_route, native).await?,
                Hop::OneHop { .. } => return Err(PriceError::RouteTooDeep { token, reference }),
            },
        };

        self.validate(reference, price)
    }

    /// Price of one whole `token` in its pool counterpart.
    ///
    /// The pool must hold `token` on the side the route names and the
    /// counterpart the route expects; anything else is a read failure.
    async fn pool_price(
        &self,
        token: Address,
        route: &PoolRoute,
        native: Address,
    ) -> Result<U256, PriceError> {
        let state = self.pools.read_pool(route.pool).await?;
        let expected_counterpart = route.counterpart(native);

        let (held_token, held_counterpart) = if route.token_is_base_side {
            (state.token0, state.token1)
        } else {
            (state.token1, state.token0)
        };

        if held_token != token || held_counterpart != expected_counterpart {
            let side = if route.token_is_base_side { "token0" } else { "token1" };
            return Err(PriceError::read_failed(
                route.pool,
                format!(
                    "pool pairs {} with {}, route expects {token} as {side} against {expected_counterpart}",
                    state.token0, state.token1
                ),
            ));
        }

        if state.token0_decimals > MAX_TOKEN_DECIMALS || state.token1_decimals > MAX_TOKEN_DECIMALS {
            return Err(PriceError::read_failed(
                route.pool,
                format!(
                    "pool reports unsupported decimals {}/{}",
                    state.token0_decimals, state.token1_decimals
                ),
            ));
        }

        price_from_ratio_x128(
            state.ratio_x128,
            state.token0_decimals,
            state.token1_decimals,
            route.token_is_base_side,
        )
        .map_err(|reason| PriceError::invalid(token, reason))
    }

    /// Native price from the external feed.
    ///
    /// Rejected when older than the staleness cutoff, or dated further in the
    /// future than [`MAX_FEED_CLOCK_SKEW_SECS`].
    async fn feed_price(&self, token: Address) -> Result<U256, PriceError> {
        let reading = self.feed.latest_price(token).await?;

        let age_secs = reading.age_secs(Utc::now());
        if age_secs < -MAX_FEED_CLOCK_SKEW_SECS {
            return Err(PriceError::read_failed(
                token,
                format!("feed reading is dated {}s in the future", -age_secs),
            ));
        }

        let max_age_secs = self.max_staleness.as_secs();
        if age_secs > 0 && age_secs as u64 > max_age_secs {
            return Err(PriceError::StaleOracleData {
                token,
                age_secs,
                max_age_secs,
            });
        }

        if reading.decimals > MAX_TOKEN_DECIMALS {
            return Err(PriceError::read_failed(
                token,
                format!("feed reports unsupported precision {}", reading.decimals),
            ));
        }

        reading
            .normalized()
            .ok_or_else(|| PriceError::invalid(token, InvalidPrice::Overflow))
    }

    fn validate(&self, token: Address, price: U256) -> Result<U256, PriceError> {
        self.bounds.validate(price).map_err(|reason| {
            warn!("Rejected price for {token}: {reason}");
            PriceError::invalid(token, reason)
        })
    }
}
