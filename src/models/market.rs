use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Response of the indexer's `/v4/perpetualMarkets`, keyed by ticker.
#[derive(Debug, Deserialize)]
pub struct MarketsResponse {
    #[serde(default)]
    pub markets: HashMap<String, WireMarket>,
}

#[derive(Debug, Deserialize)]
pub struct WireMarket {
    #[serde(rename = "clobPairId", default)]
    pub clob_pair_id: String,
    #[serde(default)]
    pub ticker: String,
    #[serde(default)]
    pub status: String,
    #[serde(rename = "oraclePrice", default)]
    pub oracle_price: String,
    #[serde(rename = "volume24H", default)]
    pub volume_24h: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DydxMarket {
    pub market_id: String,
    pub ticker: String,
    pub base_asset: String,
    pub quote_asset: String,
    pub oracle_price: f64,
    pub volume_24h: f64,
    pub status: String,
}

impl DydxMarket {
    pub fn from_wire(ticker_key: &str, wire: WireMarket) -> Self {
        let (base_asset, quote_asset) = split_ticker(ticker_key);
        Self {
            market_id: wire.clob_pair_id,
            ticker: wire.ticker,
            base_asset,
            quote_asset,
            oracle_price: wire.oracle_price.parse().unwrap_or(0.0),
            volume_24h: wire.volume_24h.parse().unwrap_or(0.0),
            status: wire.status,
        }
    }
}

/// Splits a "BASE-QUOTE" ticker, defaulting the quote side to USD.
fn split_ticker(ticker: &str) -> (String, String) {
    match ticker.split_once('-') {
        Some((base, quote)) => (base.to_string(), quote.to_string()),
        None => (ticker.to_string(), "USD".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_ticker_into_base_and_quote() {
        assert_eq!(split_ticker("BTC-USD"), ("BTC".to_string(), "USD".to_string()));
        assert_eq!(split_ticker("ETH"), ("ETH".to_string(), "USD".to_string()));
    }

    #[test]
    fn builds_market_from_indexer_record() {
        let body = r#"{
            "markets": {
                "BTC-USD": {
                    "clobPairId": "0",
                    "ticker": "BTC-USD",
                    "status": "ACTIVE",
                    "oraclePrice": "64250.5",
                    "volume24H": "123456.78"
                }
            }
        }"#;

        let resp: MarketsResponse = serde_json::from_str(body).unwrap();
        let (ticker, wire) = resp.markets.into_iter().next().unwrap();
        let market = DydxMarket::from_wire(&ticker, wire);

        assert_eq!(market.market_id, "0");
        assert_eq!(market.base_asset, "BTC");
        assert_eq!(market.quote_asset, "USD");
        assert_eq!(market.oracle_price, 64250.5);
        assert_eq!(market.volume_24h, 123456.78);
        assert_eq!(market.status, "ACTIVE");
    }

    #[test]
    fn bad_numeric_strings_parse_to_zero() {
        let wire = WireMarket {
            clob_pair_id: "7".to_string(),
            ticker: "FOO-USD".to_string(),
            status: "INITIALIZING".to_string(),
            oracle_price: "not-a-number".to_string(),
            volume_24h: String::new(),
        };
        let market = DydxMarket::from_wire("FOO-USD", wire);
        assert_eq!(market.oracle_price, 0.0);
        assert_eq!(market.volume_24h, 0.0);
    }
}
