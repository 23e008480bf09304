use alloy::sol;

sol! {
    /// Concentrated-liquidity pool state (Uniswap V3 layout).
    #[sol(rpc)]
    interface IConcentratedPool {
        function token0() external view returns (address);
        function token1() external view returns (address);
        function slot0() external view returns (
            uint160 sqrtPriceX96,
            int24 tick,
            uint16 observationIndex,
            uint16 observationCardinality,
            uint16 observationCardinalityNext,
            uint8 feeProtocol,
            bool unlocked
        );
    }

    /// Constant-product pair state (Uniswap V2 layout).
    #[sol(rpc)]
    interface IConstantProductPair {
        function getReserves() external view returns (uint112 reserve0, uint112 reserve1, uint32 blockTimestampLast);
    }
}
