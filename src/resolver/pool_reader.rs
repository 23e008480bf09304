use std::future::Future;
use std::time::Duration;

use alloy::primitives::{Address, Bytes, U256};
use alloy::providers::{DynProvider, ProviderBuilder, MULTICALL3_ADDRESS};
use alloy::sol_types::SolCall;
use anyhow::{bail, Context, Result};
use log::debug;
use url::Url;

use crate::abis::multicall::IMulticall3::{Call3, Call3Result};
use crate::abis::{IConcentratedPool, IConstantProductPair, IERC20Metadata, IMulticall3};
use crate::config::RpcSettings;
use crate::error::PriceError;
use crate::utils::{reserves_to_ratio_x128, sqrt_price_x96_to_ratio_x128, MAX_TOKEN_DECIMALS};

/// Spot state of a two-asset pool.
///
/// `token0` is the base side and `token1` the quote side. `ratio_x128` is a
/// Q128.128 count of raw token1 units per raw token0 unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolState {
    pub token0: Address,
    pub token1: Address,
    pub token0_decimals: u8,
    pub token1_decimals: u8,
    pub ratio_x128: U256,
}

/// Read access to AMM pool state.
///
/// Implementations report failures as [`PriceError::UnderlyingReadFailed`].
pub trait PoolReader: Send + Sync {
    fn read_pool(&self, pool: Address) -> impl Future<Output = Result<PoolState, PriceError>> + Send;
}

/// Pool reader backed by a JSON-RPC node, batching calls through Multicall3.
///
/// Concentrated-liquidity pools are read through `slot0()`; pairs without it
/// fall back to constant-product `getReserves()`.
#[derive(Clone)]
pub struct OnChainPoolReader {
    provider: DynProvider,
    call_timeout: Duration,
}

impl OnChainPoolReader {
    pub fn new(settings: &RpcSettings) -> Result<Self> {
        let url = Url::parse(&settings.url).context("Invalid RPC URL")?;

        let client = ProviderBuilder::new().connect_http(url);

        Ok(Self {
            provider: DynProvider::new(client),
            call_timeout: settings.call_timeout(),
        })
    }

    async fn aggregate(&self, calls: Vec<Call3>) -> Result<Vec<Call3Result>> {
        let multicall = IMulticall3::new(MULTICALL3_ADDRESS, &self.provider);

        tokio::time::timeout(self.call_timeout, multicall.aggregate3(calls).call())
            .await
            .context("Multicall timeout")?
            .context("Multicall aggregate3 failed")
    }

    async fn fetch_pool_state(&self, pool: Address) -> Result<PoolState> {
        let calls = vec![
            call(pool, IConcentratedPool::token0Call {}.abi_encode()),
            call(pool, IConcentratedPool::token1Call {}.abi_encode()),
            call(pool, IConcentratedPool::slot0Call {}.abi_encode()),
            call(pool, IConstantProductPair::getReservesCall {}.abi_encode()),
        ];

        let results = self.aggregate(calls).await?;
        if results.len() != 4 {
            bail!("Multicall returned {} results, expected 4", results.len());
        }

        let token0 = decode::<IConcentratedPool::token0Call>(&results[0]).context("token0()")?;
        let token1 = decode::<IConcentratedPool::token1Call>(&results[1]).context("token1()")?;

        let from_slot0 = decode::<IConcentratedPool::slot0Call>(&results[2])
            .ok()
            .and_then(|slot0| sqrt_price_x96_to_ratio_x128(U256::from(slot0.sqrtPriceX96)));

        let ratio_x128 = match from_slot0 {
            Some(ratio) => ratio,
            None => {
                let reserves = decode::<IConstantProductPair::getReservesCall>(&results[3])
                    .context("Pool exposes neither slot0() nor getReserves()")?;
                reserves_to_ratio_x128(U256::from(reserves.reserve0), U256::from(reserves.reserve1))
                    .context("Pool reserves are empty")?
            },
        };

        let decimals_calls = vec![
            call(token0, IERC20Metadata::decimalsCall {}.abi_encode()),
            call(token1, IERC20Metadata::decimalsCall {}.abi_encode()),
        ];
        let decimals = self.aggregate(decimals_calls).await?;
        if decimals.len() != 2 {
            bail!("Multicall returned {} results, expected 2", decimals.len());
        }

        let token0_decimals =
            decode::<IERC20Metadata::decimalsCall>(&decimals[0]).context("token0 decimals()")?;
        let token1_decimals =
            decode::<IERC20Metadata::decimalsCall>(&decimals[1]).context("token1 decimals()")?;

        if token0_decimals > MAX_TOKEN_DECIMALS || token1_decimals > MAX_TOKEN_DECIMALS {
            bail!("Unsupported token decimals {token0_decimals}/{token1_decimals}");
        }

        debug!(
            "Pool {pool}: {token0} ({token0_decimals}) / {token1} ({token1_decimals}), ratio_x128 {ratio_x128}"
        );

        Ok(PoolState {
            token0,
            token1,
            token0_decimals,
            token1_decimals,
            ratio_x128,
        })
    }
}

impl PoolReader for OnChainPoolReader {
    async fn read_pool(&self, pool: Address) -> Result<PoolState, PriceError> {
        self.fetch_pool_state(pool)
            .await
            .map_err(|e| PriceError::read_failed(pool, format!("{e:#}")))
    }
}

fn call(target: Address, call_data: Vec<u8>) -> Call3 {
    Call3 {
        target,
        allowFailure: true,
        callData: Bytes::from(call_data),
    }
}

fn decode<C: SolCall>(result: &Call3Result) -> Result<C::Return> {
    if !result.success {
        bail!("call reverted");
    }
    C::abi_decode_returns(&result.returnData).context("undecodable return data")
}
