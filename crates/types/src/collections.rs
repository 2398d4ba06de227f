//! Names of the document collections the indexer writes to.

/// Canonical blocks, unique on `number` and on `hash`.
pub const BLOCKS: &str = "blocks";
/// Transactions, indexed on `blockNumber`, `hash`, `from`, `to` and
/// `contractAddress`.
pub const TXNS: &str = "transactions";
/// ERC-20 transfers, indexed on `blockNumber`, `hash`, `from`, `to` and
/// `contract`.
pub const TRANSFERS: &str = "tokentransfers";
/// Uncles, unique on `hash`.
pub const UNCLES: &str = "uncles";
/// Blocks superseded by a reorg, unique on `hash`.
pub const FORKED_BLOCKS: &str = "forkedblocks";
/// System records: the sync head sentinel and per-asset supply snapshots.
pub const SYS_STORES: &str = "sysstores";
/// The per-block supply ledger.
pub const SUPPLY: &str = "supply";
/// Aggregated time-series charts, upserted on `chart`.
pub const CHARTS: &str = "charts";
