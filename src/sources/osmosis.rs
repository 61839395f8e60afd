use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use super::endpoints::{EndpointKind, EndpointRegistry};
use super::fallback::{collect_pages, fetch_with_fallback, MAX_PAGES};
use super::FetchError;
use crate::models::pool::{PoolsPage, RawPool};

pub const CHAIN: &str = "osmosis";
/// Lightweight request used by the speed test.
pub const SPEED_TEST_PATH: &str = "/osmosis/gamm/v1beta1/pools?pagination.limit=1";

const POOLS_PATH: &str = "/osmosis/gamm/v1beta1/pools";
const BLOCKS_PATH: &str = "/cosmos/base/tendermint/v1beta1/blocks/latest";
const PAGE_LIMIT: usize = 100;

/// LCD client for the Osmosis pool listing.
pub struct OsmosisClient {
    client: Client,
}

impl OsmosisClient {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .expect("reqwest client"),
        }
    }

    /// Fetches the full pool set, falling back through the ranked LCD
    /// endpoints until one of them serves a complete paged listing.
    pub async fn fetch_pools(
        &self,
        registry: &EndpointRegistry,
    ) -> Result<Vec<RawPool>, FetchError> {
        let endpoints = registry.list(CHAIN, EndpointKind::Lcd);
        fetch_with_fallback(&endpoints, |base_url| self.fetch_pools_from(base_url)).await
    }

    async fn fetch_pools_from(&self, base_url: String) -> Result<Vec<RawPool>, FetchError> {
        let pools = collect_pages(MAX_PAGES, |key| self.fetch_pool_page(&base_url, key)).await?;
        tracing::debug!("{} pools from {}", pools.len(), super::hostname(&base_url));
        Ok(pools)
    }

    async fn fetch_pool_page(
        &self,
        base_url: &str,
        key: Option<String>,
    ) -> Result<(Vec<RawPool>, Option<String>), FetchError> {
        let mut url = format!("{}{}?pagination.limit={}", base_url, POOLS_PATH, PAGE_LIMIT);
        if let Some(key) = key {
            url.push_str("&pagination.key=");
            url.push_str(&key);
        }

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        if resp.status() != reqwest::StatusCode::OK {
            return Err(FetchError::Status(resp.status().as_u16()));
        }

        let page: PoolsPage = resp
            .json()
            .await
            .map_err(|e| FetchError::Parse(e.to_string()))?;

        let pools = page.pools.into_iter().map(RawPool::from).collect();
        Ok((pools, page.pagination.next_key))
    }

    /// Latest block height, used as a freshness marker for the cache.
    pub async fn fetch_block_height(
        &self,
        registry: &EndpointRegistry,
    ) -> Result<i64, FetchError> {
        let endpoints = registry.list(CHAIN, EndpointKind::Lcd);
        fetch_with_fallback(&endpoints, |base_url| self.fetch_block_height_from(base_url)).await
    }

    async fn fetch_block_height_from(&self, base_url: String) -> Result<i64, FetchError> {
        let url = format!("{}{}", base_url, BLOCKS_PATH);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        if resp.status() != reqwest::StatusCode::OK {
            return Err(FetchError::Status(resp.status().as_u16()));
        }

        let block: BlockResponse = resp
            .json()
            .await
            .map_err(|e| FetchError::Parse(e.to_string()))?;

        block
            .block
            .header
            .height
            .parse()
            .map_err(|_| FetchError::Parse("non-numeric block height".to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct BlockResponse {
    block: Block,
}

#[derive(Debug, Deserialize)]
struct Block {
    header: BlockHeader,
}

#[derive(Debug, Deserialize)]
struct BlockHeader {
    height: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_block_height_response() {
        let body = r#"{"block": {"header": {"height": "27015443", "chain_id": "osmosis-1"}}}"#;
        let resp: BlockResponse = serde_json::from_str(body).unwrap();
        let height: i64 = resp.block.header.height.parse().unwrap();
        assert_eq!(height, 27015443);
    }
}
