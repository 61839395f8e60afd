use parking_lot::RwLock;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Symbol of the chain's native fee token. Its USD reference value is the
/// only mutable piece of asset metadata.
pub const NATIVE_SYMBOL: &str = "OSMO";

/// Chain-registry assetlist.json shape, reduced to the fields we read.
#[derive(Debug, Deserialize)]
struct AssetList {
    #[serde(default)]
    assets: Vec<AssetEntry>,
}

#[derive(Debug, Deserialize)]
struct AssetEntry {
    #[serde(default)]
    base: String,
    #[serde(default)]
    symbol: String,
    #[serde(default)]
    display: String,
    #[serde(default)]
    denom_units: Vec<DenomUnit>,
}

#[derive(Debug, Deserialize)]
struct DenomUnit {
    #[serde(default)]
    denom: String,
    #[serde(default)]
    exponent: i32,
}

/// Denom to symbol/exponent metadata, loaded once at startup.
pub struct AssetLookup {
    symbols: HashMap<String, String>,
    exponents: HashMap<String, i32>,
    native_usd: RwLock<f64>,
}

impl AssetLookup {
    /// Loads the chain-registry asset list, falling back to a small builtin
    /// table when the file is missing or unreadable.
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str::<AssetList>(&content) {
                Ok(list) => Self::from_asset_list(list),
                Err(e) => {
                    tracing::warn!("Unparseable asset list {}: {}", path.display(), e);
                    Self::builtin()
                }
            },
            Err(_) => {
                tracing::warn!("Asset list {} not found, using builtin table", path.display());
                Self::builtin()
            }
        }
    }

    fn from_asset_list(list: AssetList) -> Self {
        let mut lookup = Self::empty();
        for asset in &list.assets {
            if asset.base.is_empty() {
                continue;
            }
            if !asset.symbol.is_empty() {
                lookup
                    .symbols
                    .insert(asset.base.clone(), asset.symbol.clone());
            }
            // The display unit's exponent converts base amounts to display
            // units.
            if let Some(unit) = asset.denom_units.iter().find(|u| u.denom == asset.display) {
                lookup.exponents.insert(asset.base.clone(), unit.exponent);
            }
        }
        lookup
    }

    /// Known denoms for when no asset list is on disk: the native tokens
    /// plus the recognized stablecoin transfers.
    fn builtin() -> Self {
        Self::with_assets(&[
            ("uosmo", NATIVE_SYMBOL, 6),
            ("uion", "ION", 6),
            (
                "ibc/D189335C6E4A68B513C10AB227BF1C1D38C746766278BA3EEB4FB14124F1D858",
                "USDC",
                6,
            ),
            (
                "ibc/8242AD24008032E457D2E12D46588FD39FB54FB29680C6C7663D296B383C37C4",
                "USDT",
                6,
            ),
            (
                "ibc/6329DD8CF31A334DD5BE3F68C846C9FE313281362B37686A62343BAC1EB1546D",
                "BUSD",
                18,
            ),
            (
                "ibc/0CD3A0285E1341859B5E86B6AB7682F023D03E97607CCC1DC95706411D866DF7",
                "DAI",
                18,
            ),
        ])
    }

    pub fn with_assets(entries: &[(&str, &str, i32)]) -> Self {
        let mut lookup = Self::empty();
        for (denom, symbol, exponent) in entries {
            lookup.symbols.insert(denom.to_string(), symbol.to_string());
            lookup.exponents.insert(denom.to_string(), *exponent);
        }
        lookup
    }

    fn empty() -> Self {
        Self {
            symbols: HashMap::new(),
            exponents: HashMap::new(),
            native_usd: RwLock::new(0.0),
        }
    }

    pub fn symbol_of(&self, denom: &str) -> Option<&str> {
        self.symbols.get(denom).map(|s| s.as_str())
    }

    /// Exponent for base-to-display conversion, 0 when the denom is
    /// unknown (no scaling).
    pub fn exponent_of(&self, denom: &str) -> i32 {
        self.exponents.get(denom).copied().unwrap_or(0)
    }

    /// Symbol for display, with a truncated-denom placeholder for denoms
    /// the registry does not know.
    pub fn display_symbol(&self, denom: &str) -> String {
        match self.symbol_of(denom) {
            Some(symbol) => symbol.to_string(),
            None => truncate_denom(denom),
        }
    }

    pub fn set_native_usd_price(&self, price: f64) {
        *self.native_usd.write() = price;
    }

    pub fn native_usd_price(&self) -> f64 {
        *self.native_usd.read()
    }

    #[allow(dead_code)]
    pub fn usd_to_native(&self, usd: f64) -> f64 {
        let native = self.native_usd_price();
        if native <= 0.0 {
            return 0.0;
        }
        usd / native
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

fn truncate_denom(denom: &str) -> String {
    if denom.chars().count() > 12 {
        let prefix: String = denom.chars().take(12).collect();
        format!("{}...", prefix)
    } else {
        denom.to_string()
    }
}
