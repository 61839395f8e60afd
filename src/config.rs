use serde::Deserialize;
use std::fs;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub refresh: RefreshConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub endpoints: EndpointsConfig,
    #[serde(default)]
    pub assets: AssetsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RefreshConfig {
    /// Fetch-and-derive cycle interval in seconds
    #[serde(default = "default_cycle_secs")]
    pub cycle_secs: u64,
    /// Endpoint speed test interval in seconds
    #[serde(default = "default_speed_test_secs")]
    pub speed_test_secs: u64,
    /// Per-request timeout for data fetches in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Per-probe timeout for speed tests in seconds
    #[serde(default = "default_probe_timeout_secs")]
    pub probe_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EndpointsConfig {
    #[serde(default = "default_osmosis_lcd")]
    pub osmosis_lcd: Vec<String>,
    #[serde(default = "default_dydx_indexer")]
    pub dydx_indexer: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AssetsConfig {
    #[serde(default = "default_assetlist_path")]
    pub assetlist_path: String,
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }
fn default_cycle_secs() -> u64 { 60 }
fn default_speed_test_secs() -> u64 { 600 }
fn default_request_timeout_secs() -> u64 { 10 }
fn default_probe_timeout_secs() -> u64 { 30 }
fn default_enabled() -> bool { true }
fn default_data_dir() -> String { "./data".to_string() }
fn default_assetlist_path() -> String {
    "./data/chain-registry/osmosis/assetlist.json".to_string()
}

fn default_osmosis_lcd() -> Vec<String> {
    [
        "https://lcd.osmosis.zone",
        "https://rest.osmosis.goldenratiostaking.net",
        "https://rest.lavenderfive.com:443/osmosis",
        "https://osmosis-api.polkachu.com",
        "https://osmosis.rest.stakin-nodes.com",
        "https://api-osmosis-01.stakeflow.io",
        "https://osmosis-api.w3coins.io",
        "https://osmosis-rest.publicnode.com",
        "https://community.nuxian-node.ch:6797/osmosis/crpc",
        "https://osmosis-api.stake-town.com",
        "https://public.stakewolle.com/cosmos/osmosis/rest",
        "https://rest.cros-nest.com/osmosis",
        "https://osmosis-api.noders.services",
        "https://osmosis-api.highstakes.ch",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_dydx_indexer() -> Vec<String> {
    [
        "https://indexer.dydx.trade",
        "https://dydx-indexer.kingnodes.com",
        "https://indexer.dydx.nodestake.org",
        "https://dydx-indexer.polkachu.com",
        "https://dydx-indexer.lavenderfive.com:443",
        "https://dydx-mainnet-lcd.autostake.com:443",
        "https://rest-dydx.ecostake.com:443",
        "https://dydx-rest.publicnode.com",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port() }
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            cycle_secs: default_cycle_secs(),
            speed_test_secs: default_speed_test_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            probe_timeout_secs: default_probe_timeout_secs(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { enabled: default_enabled(), data_dir: default_data_dir() }
    }
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            osmosis_lcd: default_osmosis_lcd(),
            dydx_indexer: default_dydx_indexer(),
        }
    }
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self { assetlist_path: default_assetlist_path() }
    }
}

impl Config {
    /// Reads config.toml from the working directory, falling back to
    /// built-in defaults when the file is absent.
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        match fs::read_to_string("config.toml") {
            Ok(content) => {
                let config: Config = toml::from_str(&content)?;
                Ok(config)
            }
            Err(_) => Ok(Config::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_carry_redundant_endpoints() {
        let config = Config::default();
        assert!(config.endpoints.osmosis_lcd.len() > 1);
        assert!(config.endpoints.dydx_indexer.len() > 1);
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [server]
            port = 9000

            [refresh]
            cycle_secs = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.refresh.cycle_secs, 5);
        assert_eq!(config.refresh.speed_test_secs, 600);
        assert!(config.storage.enabled);
    }
}
