pub mod feed;
pub mod pool_reader;
pub mod price_resolver;

pub use feed::{FeedReading, NoFeed, PriceFeed};
pub use pool_reader::{OnChainPoolReader, PoolReader, PoolState};
pub use price_resolver::PriceResolver;
