pub mod assets;
pub mod cache;
pub mod collector;
pub mod prices;
pub mod storage;

pub use assets::AssetLookup;
pub use cache::MemoryStore;
pub use collector::Collector;
pub use prices::PriceDeriver;
pub use storage::LocalStorage;

use async_trait::async_trait;

use crate::models::{DydxMarket, PoolPrice, RawPool, TokenUsdPrice};

pub type StoreResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// A sink for per-cycle snapshots. Every save is a full batch; stores keep
/// or drop history as they see fit and are queried through their own
/// concrete interfaces.
#[async_trait]
pub trait Store: Send + Sync {
    fn name(&self) -> &'static str;
    async fn save_pools(&self, pools: &[RawPool]) -> StoreResult;
    async fn save_pool_prices(&self, prices: &[PoolPrice]) -> StoreResult;
    async fn save_usd_prices(&self, prices: &[TokenUsdPrice]) -> StoreResult;
    async fn save_markets(&self, markets: &[DydxMarket]) -> StoreResult;
}
