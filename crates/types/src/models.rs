use alloy::primitives::{Address, Bytes, B256, B64, U256};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::quantity::dec_u256;

/// Symbol of the `sysstores` record that carries the sync head.
pub const SYNC_SYMBOL: &str = "sync";

/// Sync head sentinel written at first initialization. Greater than any real
/// block number, so the first pass always runs as a full first-sync.
pub const SYNC_FRESH: u64 = 1 << 62;

/// Sync head value meaning the store is contiguous down to genesis.
pub const SYNC_CAUGHT_UP: u64 = 0;

/// A canonical block as stored in the `blocks` collection.
///
/// Derived fields (`blockReward`, `unclesReward`, `avgGasPrice`, `txFees`)
/// are computed by the crawler before insertion; a block is never mutated in
/// place afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    /// Height of the block.
    pub number: u64,
    /// Block hash.
    pub hash: B256,
    /// Hash of the parent block.
    pub parent_hash: B256,
    /// Hash of the uncle list.
    pub sha3_uncles: B256,
    /// Address credited with the block reward.
    pub miner: Address,
    /// Block difficulty.
    #[serde(with = "dec_u256")]
    pub difficulty: U256,
    /// Total chain difficulty up to and including this block.
    #[serde(with = "dec_u256")]
    pub total_difficulty: U256,
    /// Block size in bytes.
    pub size: u64,
    /// Gas consumed by all transactions in the block.
    pub gas_used: u64,
    /// Gas limit of the block.
    pub gas_limit: u64,
    /// Proof-of-work nonce.
    pub nonce: B64,
    /// Unix timestamp of the block.
    pub timestamp: u64,
    /// Number of transactions in the block.
    pub tx_count: u64,
    /// Number of uncles referenced by the block.
    pub uncle_count: u64,
    /// Coin minted by this block: base reward plus nephew bonus plus uncle
    /// rewards.
    #[serde(with = "dec_u256")]
    pub block_reward: U256,
    /// Sum of the rewards paid to the block's uncles.
    #[serde(with = "dec_u256")]
    pub uncles_reward: U256,
    /// Mean gas price across the block's transactions.
    #[serde(with = "dec_u256")]
    pub avg_gas_price: U256,
    /// Total `gasPrice × gasUsed` across the block's transactions.
    #[serde(with = "dec_u256")]
    pub tx_fees: U256,
    /// Miner-supplied extra data.
    pub extra_data: Bytes,
}

/// A transaction as stored in the `transactions` collection, including the
/// receipt-derived fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Height of the including block.
    pub block_number: u64,
    /// Transaction hash.
    pub hash: B256,
    /// Sender address.
    pub from: Address,
    /// Recipient address; absent for contract creation.
    #[serde(default)]
    pub to: Option<Address>,
    /// Transferred value in wei.
    #[serde(with = "dec_u256")]
    pub value: U256,
    /// Gas limit of the transaction.
    pub gas: u64,
    /// Gas price in wei.
    #[serde(with = "dec_u256")]
    pub gas_price: U256,
    /// Call data.
    pub input: Bytes,
    /// Sender nonce.
    pub nonce: u64,
    /// Timestamp of the including block.
    pub timestamp: u64,
    /// Gas actually consumed, from the receipt.
    pub gas_used: u64,
    /// Created contract address, from the receipt.
    #[serde(default)]
    pub contract_address: Option<Address>,
    /// Logs emitted by the transaction, from the receipt.
    #[serde(default)]
    pub logs: Vec<TxLog>,
}

/// A log record attached to a stored transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxLog {
    /// Emitting contract.
    pub address: Address,
    /// Indexed topics.
    pub topics: Vec<B256>,
    /// Unindexed payload.
    pub data: Bytes,
}

/// An ERC-20 `transfer(address,uint256)` call decoded from a transaction
/// input, stored in the `tokentransfers` collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenTransfer {
    /// Height of the including block.
    pub block_number: u64,
    /// Hash of the carrying transaction.
    pub hash: B256,
    /// Timestamp of the including block.
    pub timestamp: u64,
    /// Token contract (the transaction recipient).
    pub contract: Address,
    /// Token sender (the transaction sender).
    pub from: Address,
    /// Token recipient, decoded from the first call parameter.
    pub to: Address,
    /// Transferred token amount, decoded from the second call parameter.
    #[serde(with = "dec_u256")]
    pub value: U256,
}

/// An uncle block as stored in the `uncles` collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Uncle {
    /// Height of the canonical block that references this uncle.
    pub block_number: u64,
    /// The uncle's own height.
    pub number: u64,
    /// Uncle hash.
    pub hash: B256,
    /// Hash of the uncle's parent.
    pub parent_hash: B256,
    /// Address credited with the uncle reward.
    pub miner: Address,
    /// Unix timestamp of the uncle.
    pub timestamp: u64,
    /// Reward paid for the uncle.
    #[serde(with = "dec_u256")]
    pub reward: U256,
}

/// One entry of the per-block supply ledger (`supply` collection).
///
/// `supply` is cumulative: `supply(h) = supply(h − 1) + minted(h)`, chained
/// on the parent hash through `hash`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplyBlock {
    /// Block height.
    pub number: u64,
    /// Hash of the canonical block at this height.
    pub hash: B256,
    /// Unix timestamp of the block.
    pub timestamp: u64,
    /// Base block reward including the nephew bonus.
    #[serde(with = "dec_u256")]
    pub block_reward: U256,
    /// Sum of uncle rewards for the block.
    #[serde(with = "dec_u256")]
    pub uncle_rewards: U256,
    /// Total coin minted by the block.
    #[serde(with = "dec_u256")]
    pub minted: U256,
    /// Cumulative supply after this block.
    #[serde(with = "dec_u256")]
    pub supply: U256,
}

/// A system record in the `sysstores` collection.
///
/// The record with [`SYNC_SYMBOL`] carries the back-sync head in `sync[0]`;
/// every other record is a per-asset supply snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SysStore {
    /// Asset symbol, or [`SYNC_SYMBOL`] for the sync record.
    pub symbol: String,
    /// Unix timestamp of the last update.
    pub timestamp: i64,
    /// Aggregate supply of the asset.
    #[serde(with = "dec_u256")]
    pub supply: U256,
    /// Most recent block folded into the snapshot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_block: Option<Block>,
    /// Last known fiat price, maintained externally.
    #[serde(default)]
    pub price: String,
    /// Back-sync head sentinel; see [`SYNC_FRESH`] and [`SYNC_CAUGHT_UP`].
    pub sync: [u64; 1],
}

/// A single-series chart document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineChart {
    /// Chart key, unique within the `charts` collection.
    pub chart: String,
    /// Bucket labels, oldest first.
    pub labels: Vec<String>,
    /// One value per label.
    pub values: Vec<String>,
}

/// A multi-series chart document, one value vector per series.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MLineChart {
    /// Chart key, unique within the `charts` collection.
    pub chart: String,
    /// Bucket labels, oldest first.
    pub labels: Vec<String>,
    /// Values per series, keyed by series name.
    pub values: BTreeMap<String, Vec<String>>,
}

/// Either chart document shape, as stored in the `charts` collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChartDoc {
    /// A single-series chart.
    Line(LineChart),
    /// A multi-series chart.
    MultiLine(MLineChart),
}

impl ChartDoc {
    /// The chart key of either shape.
    pub fn chart(&self) -> &str {
        match self {
            Self::Line(c) => &c.chart,
            Self::MultiLine(c) => &c.chart,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{address, b256};

    #[test]
    fn block_serializes_camel_case_with_decimal_strings() {
        let block = Block {
            number: 42,
            hash: b256!("0x00000000000000000000000000000000000000000000000000000000000000aa"),
            difficulty: U256::from(80_000_000_000u64),
            block_reward: U256::from(8_000_000_000_000_000_000u64),
            ..Default::default()
        };
        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(json["number"], 42);
        assert_eq!(json["blockReward"], "8000000000000000000");
        assert_eq!(json["difficulty"], "80000000000");
        // hashes are lowercase hex
        assert_eq!(
            json["hash"],
            "0x00000000000000000000000000000000000000000000000000000000000000aa"
        );
        let back: Block = serde_json::from_value(json).unwrap();
        assert_eq!(back, block);
    }

    #[test]
    fn addresses_serialize_lowercase() {
        let tx = Transaction {
            from: address!("0xAB5801a7D398351b8bE11C439e05C5b3259aec9B"),
            ..Default::default()
        };
        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["from"], "0xab5801a7d398351b8be11c439e05c5b3259aec9b");
    }

    #[test]
    fn chart_doc_untagged_round_trip() {
        let line = ChartDoc::Line(LineChart {
            chart: "txns".into(),
            labels: vec!["1/01/17".into()],
            values: vec!["3".into()],
        });
        let json = serde_json::to_string(&line).unwrap();
        let back: ChartDoc = serde_json::from_str(&json).unwrap();
        assert_eq!(back, line);

        let mut values = BTreeMap::new();
        values.insert("total".to_string(), vec!["7".to_string()]);
        let multi = ChartDoc::MultiLine(MLineChart {
            chart: "minedblocks".into(),
            labels: vec!["1/01/17".into()],
            values,
        });
        let json = serde_json::to_string(&multi).unwrap();
        let back: ChartDoc = serde_json::from_str(&json).unwrap();
        assert_eq!(back, multi);
        assert_eq!(back.chart(), "minedblocks");
    }

    #[test]
    fn sync_sentinel_is_above_any_height() {
        assert!(SYNC_FRESH > 1u64 << 61);
        assert_eq!(SYNC_CAUGHT_UP, 0);
    }
}
