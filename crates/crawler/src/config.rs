use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Schedule and concurrency of one crawler.
///
/// The same shape configures the main crawler (`crawler` section) and the
/// supply crawler (`subq` section).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlConfig {
    /// Whether the crawler runs at all.
    pub enabled: bool,
    /// Pause between passes.
    #[serde(with = "humantime_serde", default = "default_interval")]
    pub interval: Duration,
    /// Maximum number of block workers in flight.
    #[serde(rename = "routines", default = "default_routines")]
    pub max_routines: usize,
}

const fn default_interval() -> Duration {
    Duration::from_secs(5)
}

const fn default_routines() -> usize {
    10
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self { enabled: false, interval: default_interval(), max_routines: default_routines() }
    }
}

/// The per-asset supply snapshots the aggregator maintains.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotsConfig {
    /// The native coin snapshot.
    #[serde(default)]
    pub coin: CoinConfig,
    /// Token snapshots, one per tracked contract.
    #[serde(default)]
    pub tokens: Vec<TokenConfig>,
}

/// The native coin tracked by the supply snapshot job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinConfig {
    /// Symbol of the `sysstores` record.
    pub symbol: String,
}

impl Default for CoinConfig {
    fn default() -> Self {
        Self { symbol: "coin".into() }
    }
}

/// A token whose circulating amount is tracked from its transfer history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenConfig {
    /// Symbol of the `sysstores` record.
    pub symbol: String,
    /// Token contract address.
    pub contract: Address,
    /// Address whose outgoing transfers put tokens into circulation.
    pub source: Address,
}
