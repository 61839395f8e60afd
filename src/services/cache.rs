use async_trait::async_trait;
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use super::{Store, StoreResult};
use crate::models::{DydxMarket, PoolPrice, RawPool, TokenUsdPrice};

/// In-memory cache holding the latest full snapshot of every data kind.
///
/// Each save swaps a freshly built map in under a short write lock, so
/// query callers see either the whole previous snapshot or the whole new
/// one, never a mix.
pub struct MemoryStore {
    pools: RwLock<HashMap<String, RawPool>>,
    pool_prices: RwLock<HashMap<String, PoolPrice>>,
    token_pools: RwLock<HashMap<String, Vec<String>>>,
    usd_prices: RwLock<HashMap<String, TokenUsdPrice>>,
    markets: RwLock<Vec<DydxMarket>>,
    block_height: AtomicI64,
    last_update: AtomicI64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenRef {
    pub symbol: String,
    pub denom: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub pools: usize,
    pub pool_prices: usize,
    pub tokens: usize,
    pub usd_prices: usize,
    pub markets: usize,
    pub block_height: i64,
    pub last_update: i64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            pools: RwLock::new(HashMap::new()),
            pool_prices: RwLock::new(HashMap::new()),
            token_pools: RwLock::new(HashMap::new()),
            usd_prices: RwLock::new(HashMap::new()),
            markets: RwLock::new(Vec::new()),
            block_height: AtomicI64::new(0),
            last_update: AtomicI64::new(0),
        }
    }

    fn touch(&self) {
        self.last_update
            .store(chrono::Utc::now().timestamp(), Ordering::Relaxed);
    }

    pub fn set_block_height(&self, height: i64) {
        self.block_height.store(height, Ordering::Relaxed);
    }

    pub fn block_height(&self) -> i64 {
        self.block_height.load(Ordering::Relaxed)
    }

    /// Latest pairwise prices, one per pool.
    pub fn latest_pool_prices(&self) -> Vec<PoolPrice> {
        self.pool_prices.read().values().cloned().collect()
    }

    /// Every pool whose pair contains the given symbol.
    pub fn pools_for_token(&self, symbol: &str) -> Vec<PoolPrice> {
        let ids = match self.token_pools.read().get(symbol) {
            Some(ids) => ids.clone(),
            None => return Vec::new(),
        };
        let prices = self.pool_prices.read();
        ids.iter()
            .filter_map(|id| prices.get(id).cloned())
            .collect()
    }

    pub fn token_price(&self, symbol: &str) -> Option<TokenUsdPrice> {
        self.usd_prices.read().get(symbol).cloned()
    }

    pub fn latest_usd_prices(&self) -> Vec<TokenUsdPrice> {
        self.usd_prices.read().values().cloned().collect()
    }

    pub fn latest_markets(&self) -> Vec<DydxMarket> {
        self.markets.read().clone()
    }

    /// Distinct tokens appearing in the latest pool-price snapshot.
    pub fn unique_tokens(&self) -> Vec<TokenRef> {
        let prices = self.pool_prices.read();
        let mut seen: HashMap<String, String> = HashMap::new();
        for price in prices.values() {
            if !price.token0_symbol.is_empty() {
                seen.entry(price.token0_symbol.clone())
                    .or_insert_with(|| price.token0_denom.clone());
            }
            if !price.token1_symbol.is_empty() {
                seen.entry(price.token1_symbol.clone())
                    .or_insert_with(|| price.token1_denom.clone());
            }
        }
        let mut tokens: Vec<TokenRef> = seen
            .into_iter()
            .map(|(symbol, denom)| TokenRef { symbol, denom })
            .collect();
        tokens.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        tokens
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            pools: self.pools.read().len(),
            pool_prices: self.pool_prices.read().len(),
            tokens: self.token_pools.read().len(),
            usd_prices: self.usd_prices.read().len(),
            markets: self.markets.read().len(),
            block_height: self.block_height(),
            last_update: self.last_update.load(Ordering::Relaxed),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn save_pools(&self, pools: &[RawPool]) -> StoreResult {
        let snapshot: HashMap<String, RawPool> = pools
            .iter()
            .map(|p| (p.id.clone(), p.clone()))
            .collect();
        *self.pools.write() = snapshot;
        self.touch();
        Ok(())
    }

    async fn save_pool_prices(&self, prices: &[PoolPrice]) -> StoreResult {
        let mut snapshot: HashMap<String, PoolPrice> = HashMap::with_capacity(prices.len());
        let mut index: HashMap<String, Vec<String>> = HashMap::new();

        for price in prices {
            if !price.token0_symbol.is_empty() {
                index
                    .entry(price.token0_symbol.clone())
                    .or_default()
                    .push(price.pool_id.clone());
            }
            if !price.token1_symbol.is_empty() {
                index
                    .entry(price.token1_symbol.clone())
                    .or_default()
                    .push(price.pool_id.clone());
            }
            snapshot.insert(price.pool_id.clone(), price.clone());
        }

        *self.pool_prices.write() = snapshot;
        *self.token_pools.write() = index;
        self.touch();
        Ok(())
    }

    async fn save_usd_prices(&self, prices: &[TokenUsdPrice]) -> StoreResult {
        let snapshot: HashMap<String, TokenUsdPrice> = prices
            .iter()
            .map(|p| (p.symbol.clone(), p.clone()))
            .collect();
        *self.usd_prices.write() = snapshot;
        self.touch();
        Ok(())
    }

    async fn save_markets(&self, markets: &[DydxMarket]) -> StoreResult {
        *self.markets.write() = markets.to_vec();
        self.touch();
        Ok(())
    }
}
