pub mod market;
pub mod pool;
pub mod price;

pub use market::DydxMarket;
pub use pool::{PoolCoin, RawPool};
pub use price::{PoolPrice, TokenUsdPrice};
