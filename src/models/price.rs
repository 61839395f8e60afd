use serde::{Deserialize, Serialize};

/// Pairwise exchange rate derived from a two-asset pool.
///
/// The two price fields are inverses of each other, except when the pool is
/// one-sided: a zero `price_token0_to_token1` keeps `price_token1_to_token0`
/// clamped at zero so every field stays finite.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PoolPrice {
    pub pool_id: String,
    pub token0_symbol: String,
    pub token0_denom: String,
    pub token0_amount: String,
    pub token1_symbol: String,
    pub token1_denom: String,
    pub token1_amount: String,
    pub price_token0_to_token1: f64,
    pub price_token1_to_token0: f64,
    pub liquidity_usd: f64,
    pub timestamp: i64,
}

/// USD price for a token, averaged across every stablecoin pool it sits in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TokenUsdPrice {
    pub symbol: String,
    pub denom: String,
    pub price_usd: f64,
    pub timestamp: i64,
}
