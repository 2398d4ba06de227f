use atlas_api::ApiConfig;
use atlas_crawler::{CoinConfig, CrawlConfig, SnapshotsConfig, TokenConfig};
use atlas_rpc::RpcConfig;
use atlas_store::StoreConfig;
use eyre::WrapErr;
use serde::Deserialize;
use std::path::Path;

/// The process configuration, loaded from the JSON file passed as the first
/// argument.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Worker threads of the runtime; 0 lets the runtime decide.
    #[serde(default)]
    pub threads: usize,
    /// The main block crawler.
    #[serde(default)]
    pub crawler: CrawlConfig,
    /// The supply crawler.
    #[serde(default)]
    pub subq: CrawlConfig,
    /// The external document store this process indexes into.
    pub mongo: StoreConfig,
    /// The node to crawl.
    pub rpc: RpcConfig,
    /// The read API.
    #[serde(default)]
    pub api: ApiConfig,
    /// The native coin snapshot.
    #[serde(default)]
    pub coin: CoinConfig,
    /// Token supply snapshots.
    #[serde(default)]
    pub tokens: Vec<TokenConfig>,
}

impl Config {
    /// Reads and parses the config file.
    pub fn load(path: &Path) -> eyre::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&raw).wrap_err_with(|| format!("parsing config {}", path.display()))
    }

    /// The snapshot settings the aggregator consumes.
    pub fn snapshots(&self) -> SnapshotsConfig {
        SnapshotsConfig { coin: self.coin.clone(), tokens: self.tokens.clone() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn parses_a_full_config() {
        let raw = r#"{
            "threads": 4,
            "crawler": { "enabled": true, "interval": "5s", "routines": 5 },
            "subq": { "enabled": true, "interval": "10s", "routines": 5 },
            "mongo": {
                "address": "127.0.0.1:27017",
                "database": "atlas-test",
                "user": "atlas",
                "password": "secret"
            },
            "rpc": { "url": "http://127.0.0.1:8588", "timeout": "60s" },
            "api": { "enabled": false, "port": "3000" },
            "coin": { "symbol": "coin" },
            "tokens": [{
                "symbol": "tok",
                "contract": "0x4b4899a10f3e507db207b0ee2426029efa168a67",
                "source": "0xae3f04584446aa081cd98011f80f19977f8c10e0"
            }]
        }"#;
        let config: Config = serde_json::from_str(raw).unwrap();
        assert_eq!(config.threads, 4);
        assert!(config.crawler.enabled);
        assert_eq!(config.crawler.interval, Duration::from_secs(5));
        assert_eq!(config.subq.interval, Duration::from_secs(10));
        assert_eq!(config.mongo.database, "atlas-test");
        assert_eq!(config.rpc.timeout, Duration::from_secs(60));
        assert_eq!(config.snapshots().tokens.len(), 1);
        assert!(!config.api.enabled);
    }

    #[test]
    fn optional_sections_default() {
        let raw = r#"{
            "mongo": { "address": "localhost:27017", "database": "atlas" },
            "rpc": { "url": "http://127.0.0.1:8588" }
        }"#;
        let config: Config = serde_json::from_str(raw).unwrap();
        assert_eq!(config.threads, 0);
        assert!(!config.crawler.enabled);
        assert!(!config.subq.enabled);
        assert_eq!(config.coin.symbol, "coin");
        assert!(config.tokens.is_empty());
    }
}
