pub mod erc20;
pub mod multicall;
pub mod pool;

pub use erc20::IERC20Metadata;
pub use multicall::IMulticall3;
pub use pool::{IConcentratedPool, IConstantProductPair};
