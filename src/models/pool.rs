use serde::{Deserialize, Serialize};

/// One page of the LCD `/osmosis/gamm/v1beta1/pools` listing.
#[derive(Debug, Deserialize)]
pub struct PoolsPage {
    #[serde(default)]
    pub pools: Vec<WirePool>,
    #[serde(default)]
    pub pagination: Pagination,
}

#[derive(Debug, Deserialize, Default)]
pub struct Pagination {
    #[serde(default)]
    pub next_key: Option<String>,
}

/// Pool record as the LCD serves it. Non-gamm pool variants decode with
/// empty assets and are skipped at derivation time.
#[derive(Debug, Deserialize)]
pub struct WirePool {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "@type", default)]
    #[allow(dead_code)]
    pub type_url: String,
    #[serde(default)]
    pub pool_assets: Vec<WirePoolAsset>,
    #[serde(default)]
    pub pool_params: WirePoolParams,
    #[serde(default)]
    pub total_shares: WireCoin,
}

#[derive(Debug, Deserialize, Default)]
pub struct WirePoolParams {
    #[serde(default)]
    pub swap_fee: String,
    #[serde(default)]
    pub exit_fee: String,
}

#[derive(Debug, Deserialize)]
pub struct WirePoolAsset {
    pub token: WireCoin,
    #[serde(default)]
    #[allow(dead_code)]
    pub weight: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct WireCoin {
    #[serde(default)]
    pub denom: String,
    #[serde(default)]
    pub amount: String,
}

/// A token reserve inside a pool. Amounts stay as the raw integer strings
/// the chain serves; scaling happens at derivation time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PoolCoin {
    pub denom: String,
    pub amount: String,
}

/// Internal pool snapshot, one representation for every wire variant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawPool {
    pub id: String,
    pub assets: Vec<PoolCoin>,
    pub swap_fee: String,
    pub exit_fee: String,
    pub total_shares: String,
}

impl RawPool {
    pub fn is_two_asset(&self) -> bool {
        self.assets.len() == 2
    }
}

impl From<WirePool> for RawPool {
    fn from(wire: WirePool) -> Self {
        Self {
            id: wire.id,
            assets: wire
                .pool_assets
                .into_iter()
                .map(|a| PoolCoin { denom: a.token.denom, amount: a.token.amount })
                .collect(),
            swap_fee: wire.pool_params.swap_fee,
            exit_fee: wire.pool_params.exit_fee,
            total_shares: wire.total_shares.amount,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_lcd_page() {
        let body = r#"{
            "pools": [{
                "@type": "/osmosis.gamm.v1beta1.Pool",
                "id": "1",
                "pool_params": {"swap_fee": "0.002", "exit_fee": "0.000"},
                "total_shares": {"denom": "gamm/pool/1", "amount": "1000"},
                "pool_assets": [
                    {"token": {"denom": "uosmo", "amount": "500"}, "weight": "5368709120"},
                    {"token": {"denom": "uatom", "amount": "250"}, "weight": "5368709120"}
                ]
            }],
            "pagination": {"next_key": "AAEC", "total": "1200"}
        }"#;

        let page: PoolsPage = serde_json::from_str(body).unwrap();
        assert_eq!(page.pagination.next_key.as_deref(), Some("AAEC"));

        let pool: RawPool = page.pools.into_iter().next().unwrap().into();
        assert_eq!(pool.id, "1");
        assert!(pool.is_two_asset());
        assert_eq!(pool.assets[0].denom, "uosmo");
        assert_eq!(pool.assets[1].amount, "250");
        assert_eq!(pool.swap_fee, "0.002");
        assert_eq!(pool.total_shares, "1000");
    }

    #[test]
    fn decodes_last_page_without_next_key() {
        let body = r#"{"pools": [], "pagination": {"next_key": null, "total": "0"}}"#;
        let page: PoolsPage = serde_json::from_str(body).unwrap();
        assert!(page.pools.is_empty());
        assert!(page.pagination.next_key.is_none());
    }
}
