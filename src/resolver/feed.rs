use std::future::Future;

use alloy::primitives::{Address, U256};
use chrono::{DateTime, Utc};

use crate::error::PriceError;
use crate::utils::normalize_feed_answer;

/// A native-denominated price reported by an external feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedReading {
    /// Native units per whole token, with `decimals` fractional digits
    pub answer: U256,
    pub decimals: u8,
    pub observed_at: DateTime<Utc>,
}

impl FeedReading {
    /// Answer rescaled to the 18-decimal price scale.
    pub fn normalized(&self) -> Option<U256> {
        normalize_feed_answer(self.answer, self.decimals)
    }

    /// Age of the reading at `now`, in whole seconds. Negative if observed in the future.
    pub fn age_secs(&self, now: DateTime<Utc>) -> i64 {
        now.signed_duration_since(self.observed_at).num_seconds()
    }
}

/// Third-party price source consulted for routes flagged as external.
pub trait PriceFeed: Send + Sync {
    fn latest_price(
        &self,
        token: Address,
    ) -> impl Future<Output = Result<FeedReading, PriceError>> + Send;
}

/// Placeholder feed for resolvers built without an external source.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFeed;

impl PriceFeed for NoFeed {
    async fn latest_price(&self, token: Address) -> Result<FeedReading, PriceError> {
        Err(PriceError::read_failed(token, "no external price feed attached"))
    }
}
