use reqwest::Client;
use std::time::Duration;

use super::endpoints::{EndpointKind, EndpointRegistry};
use super::fallback::fetch_with_fallback;
use super::FetchError;
use crate::models::market::{DydxMarket, MarketsResponse};

pub const CHAIN: &str = "dydx";
/// The markets listing doubles as the speed-test request: it is a single
/// unpaged document.
pub const SPEED_TEST_PATH: &str = "/v4/perpetualMarkets";

const MARKETS_PATH: &str = "/v4/perpetualMarkets";

/// Indexer client for the dYdX perpetual market listing.
pub struct DydxClient {
    client: Client,
}

impl DydxClient {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .expect("reqwest client"),
        }
    }

    pub async fn fetch_markets(
        &self,
        registry: &EndpointRegistry,
    ) -> Result<Vec<DydxMarket>, FetchError> {
        let endpoints = registry.list(CHAIN, EndpointKind::Indexer);
        fetch_with_fallback(&endpoints, |base_url| self.fetch_markets_from(base_url)).await
    }

    async fn fetch_markets_from(&self, base_url: String) -> Result<Vec<DydxMarket>, FetchError> {
        let url = format!("{}{}", base_url, MARKETS_PATH);

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        if resp.status() != reqwest::StatusCode::OK {
            return Err(FetchError::Status(resp.status().as_u16()));
        }

        let listing: MarketsResponse = resp
            .json()
            .await
            .map_err(|e| FetchError::Parse(e.to_string()))?;

        let markets: Vec<DydxMarket> = listing
            .markets
            .into_iter()
            .map(|(ticker, wire)| DydxMarket::from_wire(&ticker, wire))
            .collect();

        if markets.is_empty() {
            return Err(FetchError::NoData("no markets in listing"));
        }

        tracing::debug!("{} markets from {}", markets.len(), super::hostname(&base_url));
        Ok(markets)
    }
}
