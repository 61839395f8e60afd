use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};

use super::cache::MemoryStore;
use super::prices::PriceDeriver;
use super::Store;
use crate::services::assets::AssetLookup;
use crate::sources::dydx::DydxClient;
use crate::sources::osmosis::OsmosisClient;
use crate::sources::EndpointRegistry;

/// Runs the fetch-and-derive cycle: pools and markets through the fallback
/// fetcher, derivation, then a full-batch save into every store.
pub struct Collector {
    osmosis: OsmosisClient,
    dydx: DydxClient,
    registry: Arc<EndpointRegistry>,
    deriver: PriceDeriver,
    cache: Arc<MemoryStore>,
    stores: Vec<Arc<dyn Store>>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct CycleSummary {
    pub pools: usize,
    pub pool_prices: usize,
    pub usd_prices: usize,
    pub markets: usize,
}

impl Collector {
    pub fn new(
        registry: Arc<EndpointRegistry>,
        assets: Arc<AssetLookup>,
        cache: Arc<MemoryStore>,
        stores: Vec<Arc<dyn Store>>,
        request_timeout: Duration,
    ) -> Self {
        Self {
            osmosis: OsmosisClient::new(request_timeout),
            dydx: DydxClient::new(request_timeout),
            registry,
            deriver: PriceDeriver::new(assets),
            cache,
            stores,
        }
    }

    /// One full cycle. A source whose fallback sequence is exhausted is
    /// logged and skipped; the other source and the previously persisted
    /// snapshots are unaffected.
    pub async fn run_cycle(&self) -> CycleSummary {
        let mut summary = CycleSummary::default();

        match self.osmosis.fetch_pools(&self.registry).await {
            Ok(pools) => {
                let pool_prices = self.deriver.pool_prices(&pools);
                // USD derivation failing must not block pairwise prices or
                // raw pool persistence.
                let usd_prices = match self.deriver.usd_prices(&pools) {
                    Ok(prices) => prices,
                    Err(e) => {
                        tracing::warn!("No USD prices this cycle: {}", e);
                        Vec::new()
                    }
                };

                summary.pools = pools.len();
                summary.pool_prices = pool_prices.len();
                summary.usd_prices = usd_prices.len();

                for store in &self.stores {
                    if let Err(e) = store.save_pools(&pools).await {
                        tracing::error!("{}: failed to save pools: {}", store.name(), e);
                    }
                    if let Err(e) = store.save_pool_prices(&pool_prices).await {
                        tracing::error!("{}: failed to save pool prices: {}", store.name(), e);
                    }
                    if !usd_prices.is_empty() {
                        if let Err(e) = store.save_usd_prices(&usd_prices).await {
                            tracing::error!("{}: failed to save USD prices: {}", store.name(), e);
                        }
                    }
                }

                match self.osmosis.fetch_block_height(&self.registry).await {
                    Ok(height) => self.cache.set_block_height(height),
                    Err(e) => tracing::debug!("Block height unavailable: {}", e),
                }
            }
            Err(e) => tracing::warn!("Osmosis fetch skipped this cycle: {}", e),
        }

        match self.dydx.fetch_markets(&self.registry).await {
            Ok(markets) => {
                summary.markets = markets.len();
                for store in &self.stores {
                    if let Err(e) = store.save_markets(&markets).await {
                        tracing::error!("{}: failed to save markets: {}", store.name(), e);
                    }
                }
            }
            Err(e) => tracing::warn!("dYdX fetch skipped this cycle: {}", e),
        }

        summary
    }

    /// Recurring single-flight cycle loop. The loop awaits each cycle, so a
    /// tick that fires while a cycle is still running is skipped rather
    /// than queued.
    pub async fn run_continuous(&self, cycle_secs: u64) {
        let mut ticker = interval(Duration::from_secs(cycle_secs));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            let summary = self.run_cycle().await;
            tracing::info!(
                "✓ Cycle complete: {} pools, {} pool prices, {} USD prices, {} markets",
                summary.pools,
                summary.pool_prices,
                summary.usd_prices,
                summary.markets,
            );
        }
    }
}
