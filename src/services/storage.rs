use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use super::{Store, StoreResult};
use crate::models::{DydxMarket, PoolPrice, RawPool, TokenUsdPrice};

/// File-based snapshot store: one timestamped JSON file per saved batch,
/// grouped by data kind.
pub struct LocalStorage {
    data_dir: PathBuf,
    pools_dir: PathBuf,
    prices_dir: PathBuf,
    usd_dir: PathBuf,
    markets_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize)]
pub struct StorageStats {
    pub pool_files: usize,
    pub price_files: usize,
    pub usd_files: usize,
    pub market_files: usize,
    pub total_size_mb: f64,
}

impl LocalStorage {
    pub fn new(base_dir: &str) -> Self {
        let data_dir = PathBuf::from(base_dir);
        let pools_dir = data_dir.join("pools");
        let prices_dir = data_dir.join("pool_prices");
        let usd_dir = data_dir.join("usd_prices");
        let markets_dir = data_dir.join("markets");

        for dir in [&pools_dir, &prices_dir, &usd_dir, &markets_dir] {
            fs::create_dir_all(dir).ok();
        }

        Self { data_dir, pools_dir, prices_dir, usd_dir, markets_dir }
    }

    fn write_snapshot<T: Serialize>(&self, dir: &Path, prefix: &str, records: &[T]) -> StoreResult {
        let filename = format!("{}_{}.json", prefix, Utc::now().format("%Y-%m-%dT%H-%M-%S"));
        let path = dir.join(&filename);

        let file = File::create(&path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, records)?;

        tracing::debug!("💾 Saved {} {} records -> {}", records.len(), prefix, filename);
        Ok(())
    }

    pub fn stats(&self) -> StorageStats {
        StorageStats {
            pool_files: count_files(&self.pools_dir),
            price_files: count_files(&self.prices_dir),
            usd_files: count_files(&self.usd_dir),
            market_files: count_files(&self.markets_dir),
            total_size_mb: dir_size(&self.data_dir) as f64 / 1024.0 / 1024.0,
        }
    }
}

fn count_files(path: &Path) -> usize {
    fs::read_dir(path).map(|entries| entries.count()).unwrap_or(0)
}

fn dir_size(path: &Path) -> u64 {
    let mut size = 0;
    if let Ok(entries) = fs::read_dir(path) {
        for entry in entries.flatten() {
            if let Ok(meta) = entry.metadata() {
                if meta.is_file() {
                    size += meta.len();
                } else if meta.is_dir() {
                    size += dir_size(&entry.path());
                }
            }
        }
    }
    size
}

#[async_trait]
impl Store for LocalStorage {
    fn name(&self) -> &'static str {
        "local-files"
    }

    async fn save_pools(&self, pools: &[RawPool]) -> StoreResult {
        self.write_snapshot(&self.pools_dir, "pools", pools)
    }

    async fn save_pool_prices(&self, prices: &[PoolPrice]) -> StoreResult {
        self.write_snapshot(&self.prices_dir, "pool_prices", prices)
    }

    async fn save_usd_prices(&self, prices: &[TokenUsdPrice]) -> StoreResult {
        self.write_snapshot(&self.usd_dir, "usd_prices", prices)
    }

    async fn save_markets(&self, markets: &[DydxMarket]) -> StoreResult {
        self.write_snapshot(&self.markets_dir, "markets", markets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_prices() -> Vec<PoolPrice> {
        vec![PoolPrice {
            pool_id: "1".to_string(),
            token0_symbol: "OSMO".to_string(),
            token0_denom: "uosmo".to_string(),
            token0_amount: "1000".to_string(),
            token1_symbol: "ATOM".to_string(),
            token1_denom: "uatom".to_string(),
            token1_amount: "250".to_string(),
            price_token0_to_token1: 0.25,
            price_token1_to_token0: 4.0,
            liquidity_usd: 0.0,
            timestamp: 1_700_000_000,
        }]
    }

    #[tokio::test]
    async fn snapshot_files_land_in_per_kind_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path().to_str().unwrap());

        storage.save_pool_prices(&sample_prices()).await.unwrap();

        let stats = storage.stats();
        assert_eq!(stats.price_files, 1);
        assert_eq!(stats.pool_files, 0);
        assert!(stats.total_size_mb > 0.0);
    }

    #[tokio::test]
    async fn snapshot_content_deserializes_back() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path().to_str().unwrap());

        let batch = sample_prices();
        storage.save_pool_prices(&batch).await.unwrap();

        let entry = fs::read_dir(dir.path().join("pool_prices"))
            .unwrap()
            .next()
            .unwrap()
            .unwrap();
        let content = fs::read_to_string(entry.path()).unwrap();
        let restored: Vec<PoolPrice> = serde_json::from_str(&content).unwrap();
        assert_eq!(restored, batch);
    }
}
