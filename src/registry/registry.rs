use std::sync::Arc;

use alloy::primitives::Address;
use arc_swap::ArcSwap;
use log::info;
use rustc_hash::{FxHashMap, FxHashSet};

use super::route::RouteConfig;
use crate::config::Settings;
use crate::error::{PriceError, RegistryError};

/// Immutable view of the registry at one point in time.
///
/// A resolution works off a single snapshot so that both hops of a route see
/// the same configuration even if an admin write lands mid-resolution.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    admin: Address,
    routes: FxHashMap<Address, RouteConfig>,
    reference_tokens: FxHashSet<Address>,
}

impl RouteTable {
    pub fn admin(&self) -> Address {
        self.admin
    }

    pub fn get_route(&self, token: Address) -> Result<RouteConfig, PriceError> {
        self.routes
            .get(&token)
            .copied()
            .ok_or(PriceError::TokenNotConfigured(token))
    }

    pub fn is_reference_token(&self, token: Address) -> bool {
        self.reference_tokens.contains(&token)
    }

    /// Configured tokens, sorted for stable output.
    pub fn tokens(&self) -> Vec<Address> {
        let mut tokens: Vec<Address> = self.routes.keys().copied().collect();
        tokens.sort();
        tokens
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// Owner-controlled price route configuration.
///
/// Reads are lock-free loads of the current [`RouteTable`]. Writes copy the
/// table, apply the change and swap the pointer (read-copy-update), so a reader
/// sees either the old or the new route, never a partial one, and concurrent
/// writers never drop each other's updates.
pub struct RouteRegistry {
    native_asset: Address,
    table: ArcSwap<RouteTable>,
}

impl RouteRegistry {
    pub fn new(native_asset: Address, admin: Address) -> Self {
        Self {
            native_asset,
            table: ArcSwap::from_pointee(RouteTable {
                admin,
                ..Default::default()
            }),
        }
    }

    /// Build a registry seeded with the routes and reference tokens from settings.
    pub fn from_settings(settings: &Settings) -> Result<Self, RegistryError> {
        let admin = settings.lens.admin;
        let registry = Self::new(settings.lens.native_asset, admin);

        for token in &settings.reference_tokens {
            registry.set_reference_eligibility(admin, *token, true)?;
        }
        for route in &settings.routes {
            registry.set_route(
                admin,
                route.token,
                route.pool,
                route.reference_token,
                route.token_is_base_side,
                route.use_external_source,
            )?;
        }

        Ok(registry)
    }

    pub fn native_asset(&self) -> Address {
        self.native_asset
    }

    /// Current configuration snapshot.
    pub fn snapshot(&self) -> Arc<RouteTable> {
        self.table.load_full()
    }

    pub fn get_route(&self, token: Address) -> Result<RouteConfig, PriceError> {
        self.table.load().get_route(token)
    }

    pub fn is_reference_token(&self, token: Address) -> bool {
        self.table.load().is_reference_token(token)
    }

    /// Configured tokens, sorted.
    pub fn routes(&self) -> Vec<Address> {
        self.table.load().tokens()
    }

    /// Configure (or overwrite) how `token` is priced.
    ///
    /// The pool is not checked here; a pool that does not hold the token on the
    /// named side fails on first resolution.
    pub fn set_route(
        &self,
        caller: Address,
        token: Address,
        pool: Address,
        reference_token: Option<Address>,
        token_is_base_side: bool,
        use_external_source: bool,
    ) -> Result<(), RegistryError> {
        if token == self.native_asset {
            return Err(RegistryError::NativeAssetRoute(token));
        }
        let route = RouteConfig::from_parts(
            self.native_asset,
            pool,
            reference_token,
            token_is_base_side,
            use_external_source,
        );

        self.update(caller, |table| {
            table.routes.insert(token, route);
        })?;

        info!("Route for {token} set to {route:?}");
        Ok(())
    }

    /// Add or remove `token` from the reference token set.
    pub fn set_reference_eligibility(
        &self,
        caller: Address,
        token: Address,
        is_eligible: bool,
    ) -> Result<(), RegistryError> {
        self.update(caller, |table| {
            if is_eligible {
                table.reference_tokens.insert(token);
            } else {
                table.reference_tokens.remove(&token);
            }
        })?;

        info!("Reference eligibility for {token} set to {is_eligible}");
        Ok(())
    }

    /// Hand administration over to `new_admin`.
    pub fn set_admin(&self, caller: Address, new_admin: Address) -> Result<(), RegistryError> {
        self.update(caller, |table| {
            table.admin = new_admin;
        })?;

        info!("Registry admin changed to {new_admin}");
        Ok(())
    }

    /// Apply `change` to a copy of the table if `caller` is the admin of the
    /// table being replaced.
    fn update(
        &self,
        caller: Address,
        change: impl Fn(&mut RouteTable),
    ) -> Result<(), RegistryError> {
        let mut authorized = true;
        self.table.rcu(|current| {
            if current.admin != caller {
                authorized = false;
                return Arc::clone(current);
            }
            authorized = true;
            let mut next = RouteTable::clone(current);
            change(&mut next);
            Arc::new(next)
        });

        if authorized {
            Ok(())
        } else {
            Err(RegistryError::Unauthorized { caller })
        }
    }
}
