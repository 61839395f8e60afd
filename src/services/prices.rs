use lazy_static::lazy_static;
use std::collections::HashMap;
use std::sync::Arc;

use crate::models::{PoolPrice, RawPool, TokenUsdPrice};
use crate::services::assets::{AssetLookup, NATIVE_SYMBOL};

lazy_static! {
    /// Recognized stablecoin reserves and their assumed USD value.
    static ref STABLECOINS: HashMap<&'static str, f64> = HashMap::from([
        // USDC
        ("ibc/D189335C6E4A68B513C10AB227BF1C1D38C746766278BA3EEB4FB14124F1D858", 1.0),
        // USDT
        ("ibc/8242AD24008032E457D2E12D46588FD39FB54FB29680C6C7663D296B383C37C4", 1.0),
        // BUSD
        ("ibc/6329DD8CF31A334DD5BE3F68C846C9FE313281362B37686A62343BAC1EB1546D", 1.0),
        // DAI
        ("ibc/0CD3A0285E1341859B5E86B6AB7682F023D03E97607CCC1DC95706411D866DF7", 1.0),
    ]);
}

/// Upper sanity bound for a USD price sample; anything above this is a
/// corrupt reserve reading, not a price.
const MAX_USD_PRICE: f64 = 1e12;

#[derive(Debug)]
pub enum DeriveError {
    NoStablecoinPools,
}

impl std::fmt::Display for DeriveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeriveError::NoStablecoinPools => {
                write!(f, "no stablecoin pools found for USD pricing")
            }
        }
    }
}

impl std::error::Error for DeriveError {}

/// Turns raw pool reserves into prices. Only pools with exactly two assets
/// participate; anything else is skipped whole.
pub struct PriceDeriver {
    assets: Arc<AssetLookup>,
}

impl PriceDeriver {
    pub fn new(assets: Arc<AssetLookup>) -> Self {
        Self { assets }
    }

    /// Stablecoin-anchored USD pricing.
    ///
    /// A pool qualifies when exactly one side is a recognized stablecoin.
    /// Each qualifying pool contributes one price sample for the other
    /// token; the published price per symbol is the unweighted mean of its
    /// samples. The native token's mean is also published to the asset
    /// lookup as the chain's USD reference value.
    pub fn usd_prices(&self, pools: &[RawPool]) -> Result<Vec<TokenUsdPrice>, DeriveError> {
        let mut samples: HashMap<String, (String, Vec<f64>)> = HashMap::new();

        for pool in pools.iter().filter(|p| p.is_two_asset()) {
            let asset0 = &pool.assets[0];
            let asset1 = &pool.assets[1];

            let (stable, other, usd_value) = match (
                STABLECOINS.get(asset0.denom.as_str()),
                STABLECOINS.get(asset1.denom.as_str()),
            ) {
                (Some(value), None) => (asset0, asset1, *value),
                (None, Some(value)) => (asset1, asset0, *value),
                // Neither side or both sides stable: nothing to anchor.
                _ => continue,
            };

            let stable_amount: f64 = stable.amount.parse().unwrap_or(0.0);
            let other_amount: f64 = other.amount.parse().unwrap_or(0.0);
            if stable_amount <= 0.0 || other_amount <= 0.0 {
                continue;
            }

            let stable_display =
                stable_amount / 10f64.powi(self.assets.exponent_of(&stable.denom));
            let other_display = other_amount / 10f64.powi(self.assets.exponent_of(&other.denom));

            let price = stable_display * usd_value / other_display;
            if price <= 0.0 || price >= MAX_USD_PRICE {
                continue;
            }

            let symbol = self.assets.display_symbol(&other.denom);
            samples
                .entry(symbol)
                .or_insert_with(|| (other.denom.clone(), Vec::new()))
                .1
                .push(price);
        }

        let timestamp = chrono::Utc::now().timestamp();
        let mut prices = Vec::with_capacity(samples.len());
        for (symbol, (denom, list)) in samples {
            let mean = list.iter().sum::<f64>() / list.len() as f64;
            if symbol == NATIVE_SYMBOL {
                self.assets.set_native_usd_price(mean);
            }
            prices.push(TokenUsdPrice { symbol, denom, price_usd: mean, timestamp });
        }

        if prices.is_empty() {
            return Err(DeriveError::NoStablecoinPools);
        }
        Ok(prices)
    }

    /// Pairwise exchange rate for every two-asset pool.
    ///
    /// No stablecoin required and no quality filter: each eligible pool
    /// yields exactly one record. A one-sided pool gets both price fields
    /// clamped to zero; the inverse is never allowed to go non-finite.
    pub fn pool_prices(&self, pools: &[RawPool]) -> Vec<PoolPrice> {
        let timestamp = chrono::Utc::now().timestamp();
        let mut prices = Vec::with_capacity(pools.len());
        let mut skipped = 0usize;

        for pool in pools {
            if !pool.is_two_asset() {
                skipped += 1;
                continue;
            }
            let asset0 = &pool.assets[0];
            let asset1 = &pool.assets[1];

            let (amount0, amount1) = match (
                asset0.amount.parse::<f64>(),
                asset1.amount.parse::<f64>(),
            ) {
                (Ok(a0), Ok(a1)) if a0 >= 0.0 && a1 >= 0.0 => (a0, a1),
                _ => {
                    skipped += 1;
                    continue;
                }
            };

            let adjusted0 = amount0 / 10f64.powi(self.assets.exponent_of(&asset0.denom));
            let adjusted1 = amount1 / 10f64.powi(self.assets.exponent_of(&asset1.denom));

            let price_0_to_1 = if adjusted0 > 0.0 { adjusted1 / adjusted0 } else { 0.0 };
            let price_1_to_0 = if price_0_to_1 > 0.0 { 1.0 / price_0_to_1 } else { 0.0 };

            prices.push(PoolPrice {
                pool_id: pool.id.clone(),
                token0_symbol: self.assets.display_symbol(&asset0.denom),
                token0_denom: asset0.denom.clone(),
                token0_amount: asset0.amount.clone(),
                token1_symbol: self.assets.display_symbol(&asset1.denom),
                token1_denom: asset1.denom.clone(),
                token1_amount: asset1.amount.clone(),
                price_token0_to_token1: price_0_to_1,
                price_token1_to_token0: price_1_to_0,
                liquidity_usd: 0.0,
                timestamp,
            });
        }

        if skipped > 0 {
            tracing::debug!("{} pools skipped in pairwise pricing", skipped);
        }
        prices
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PoolCoin;

    const USDC_DENOM: &str =
        "ibc/D189335C6E4A68B513C10AB227BF1C1D38C746766278BA3EEB4FB14124F1D858";
    const USDT_DENOM: &str =
        "ibc/8242AD24008032E457D2E12D46588FD39FB54FB29680C6C7663D296B383C37C4";

    fn pool(id: &str, assets: &[(&str, &str)]) -> RawPool {
        RawPool {
            id: id.to_string(),
            assets: assets
                .iter()
                .map(|(denom, amount)| PoolCoin {
                    denom: denom.to_string(),
                    amount: amount.to_string(),
                })
                .collect(),
            swap_fee: "0.002".to_string(),
            exit_fee: "0.000".to_string(),
            total_shares: "1000".to_string(),
        }
    }

    fn deriver(entries: &[(&str, &str, i32)]) -> PriceDeriver {
        PriceDeriver::new(Arc::new(AssetLookup::with_assets(entries)))
    }

    #[test]
    fn usd_price_anchors_on_the_stable_side() {
        let deriver = deriver(&[(USDC_DENOM, "USDC", 6), ("ufoo", "FOO", 0)]);
        let pools = [pool("1", &[(USDC_DENOM, "100"), ("ufoo", "50")])];

        let prices = deriver.usd_prices(&pools).unwrap();
        assert_eq!(prices.len(), 1);
        assert_eq!(prices[0].symbol, "FOO");
        assert_eq!(prices[0].denom, "ufoo");
        // (100 / 1e6 * 1.0) / 50
        assert!((prices[0].price_usd - 0.000002).abs() < 1e-15);
    }

    #[test]
    fn usd_price_is_the_mean_across_qualifying_pools() {
        let deriver = deriver(&[
            (USDC_DENOM, "USDC", 0),
            (USDT_DENOM, "USDT", 0),
            ("ufoo", "FOO", 0),
        ]);
        // 100/50 = 2.0 and 300/75 = 4.0, mean 3.0
        let pools = [
            pool("1", &[(USDC_DENOM, "100"), ("ufoo", "50")]),
            pool("2", &[("ufoo", "75"), (USDT_DENOM, "300")]),
        ];

        let prices = deriver.usd_prices(&pools).unwrap();
        assert_eq!(prices.len(), 1);
        assert!((prices[0].price_usd - 3.0).abs() < 1e-12);
    }

    #[test]
    fn stable_stable_pools_are_skipped() {
        let deriver = deriver(&[(USDC_DENOM, "USDC", 6), (USDT_DENOM, "USDT", 6)]);
        let pools = [pool("1", &[(USDC_DENOM, "1000"), (USDT_DENOM, "1000")])];
        assert!(matches!(
            deriver.usd_prices(&pools),
            Err(DeriveError::NoStablecoinPools)
        ));
    }

    #[test]
    fn no_stablecoin_pools_is_an_explicit_error() {
        let deriver = deriver(&[("ufoo", "FOO", 6), ("ubar", "BAR", 6)]);
        let pools = [pool("1", &[("ufoo", "10"), ("ubar", "20")])];
        assert!(matches!(
            deriver.usd_prices(&pools),
            Err(DeriveError::NoStablecoinPools)
        ));
    }

    #[test]
    fn native_token_mean_is_published_as_usd_reference() {
        let assets = Arc::new(AssetLookup::with_assets(&[
            (USDC_DENOM, "USDC", 0),
            ("uosmo", "OSMO", 0),
        ]));
        let deriver = PriceDeriver::new(assets.clone());
        let pools = [pool("1", &[(USDC_DENOM, "50"), ("uosmo", "100")])];

        deriver.usd_prices(&pools).unwrap();
        assert!((assets.native_usd_price() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn absurd_prices_are_discarded() {
        let deriver = deriver(&[(USDC_DENOM, "USDC", 0), ("udust", "DUST", 0)]);
        // 1e13 per token, beyond the sanity bound
        let pools = [pool("1", &[(USDC_DENOM, "10000000000000"), ("udust", "1")])];
        assert!(deriver.usd_prices(&pools).is_err());
    }

    #[test]
    fn pairwise_price_and_inverse() {
        let deriver = deriver(&[("ua", "A", 0), ("ub", "B", 0)]);
        let pools = [pool("42", &[("ua", "200"), ("ub", "50")])];

        let prices = deriver.pool_prices(&pools);
        assert_eq!(prices.len(), 1);
        assert_eq!(prices[0].pool_id, "42");
        assert_eq!(prices[0].price_token0_to_token1, 0.25);
        assert_eq!(prices[0].price_token1_to_token0, 4.0);
    }

    #[test]
    fn one_sided_pool_keeps_both_prices_finite() {
        let deriver = deriver(&[("ua", "A", 0), ("ub", "B", 0)]);
        let pools = [pool("7", &[("ua", "0"), ("ub", "50")])];

        let prices = deriver.pool_prices(&pools);
        assert_eq!(prices.len(), 1);
        assert_eq!(prices[0].price_token0_to_token1, 0.0);
        assert_eq!(prices[0].price_token1_to_token0, 0.0);
        assert!(prices[0].price_token1_to_token0.is_finite());
    }

    #[test]
    fn pairwise_scales_by_exponent() {
        let deriver = deriver(&[("uatom", "ATOM", 6), ("uosmo", "OSMO", 6)]);
        // Equal display amounts, price 1.0 both ways
        let pools = [pool("3", &[("uatom", "5000000"), ("uosmo", "5000000")])];

        let prices = deriver.pool_prices(&pools);
        assert_eq!(prices[0].price_token0_to_token1, 1.0);
        assert_eq!(prices[0].price_token1_to_token0, 1.0);
    }

    #[test]
    fn unknown_symbols_fall_back_to_truncated_denoms() {
        let deriver = deriver(&[]);
        let pools = [pool(
            "9",
            &[("ibc/0123456789ABCDEF0123456789ABCDEF", "10"), ("ub", "20")],
        )];

        let prices = deriver.pool_prices(&pools);
        assert_eq!(prices[0].token0_symbol, "ibc/01234567...");
        assert_eq!(prices[0].token1_symbol, "ub");
    }

    #[test]
    fn non_two_asset_pools_produce_no_records() {
        let deriver = deriver(&[("ua", "A", 0), ("ub", "B", 0), ("uc", "C", 0)]);
        let pools = [
            pool("1", &[("ua", "10")]),
            pool("2", &[("ua", "10"), ("ub", "20"), ("uc", "30")]),
        ];
        assert!(deriver.pool_prices(&pools).is_empty());
    }

    #[test]
    fn unparseable_amounts_skip_the_pool() {
        let deriver = deriver(&[("ua", "A", 0), ("ub", "B", 0)]);
        let pools = [
            pool("1", &[("ua", "abc"), ("ub", "20")]),
            pool("2", &[("ua", "-5"), ("ub", "20")]),
            pool("3", &[("ua", "10"), ("ub", "20")]),
        ];

        let prices = deriver.pool_prices(&pools);
        assert_eq!(prices.len(), 1);
        assert_eq!(prices[0].pool_id, "3");
    }
}
