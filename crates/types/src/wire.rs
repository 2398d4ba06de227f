//! Wire shapes delivered by the JSON-RPC node.
//!
//! Quantities arrive as hex strings and are decoded through
//! [`crate::quantity`]; unknown fields are ignored so the types track the
//! common denominator of Ethereum-style nodes.

use alloy::primitives::{Address, Bytes, B256, B64, U256};
use serde::{Deserialize, Serialize};

use crate::{
    quantity::{hex_u256, hex_u64},
    Block, Transaction, TxLog, Uncle,
};

/// A block as returned by `eth_getBlockByNumber` with full transactions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBlock {
    /// Block height.
    #[serde(with = "hex_u64")]
    pub number: u64,
    /// Block hash.
    pub hash: B256,
    /// Parent hash.
    pub parent_hash: B256,
    /// Hash of the uncle list.
    pub sha3_uncles: B256,
    /// Beneficiary address.
    pub miner: Address,
    /// Block difficulty.
    #[serde(with = "hex_u256", default)]
    pub difficulty: U256,
    /// Total chain difficulty; some nodes omit it on non-canonical reads.
    #[serde(with = "hex_u256", default)]
    pub total_difficulty: U256,
    /// Block size in bytes.
    #[serde(with = "hex_u64", default)]
    pub size: u64,
    /// Gas used by the block.
    #[serde(with = "hex_u64", default)]
    pub gas_used: u64,
    /// Gas limit of the block.
    #[serde(with = "hex_u64", default)]
    pub gas_limit: u64,
    /// Proof-of-work nonce.
    #[serde(default)]
    pub nonce: B64,
    /// Unix timestamp.
    #[serde(with = "hex_u64")]
    pub timestamp: u64,
    /// Miner-supplied extra data.
    #[serde(default)]
    pub extra_data: Bytes,
    /// Full transaction objects.
    #[serde(default)]
    pub transactions: Vec<RawTransaction>,
    /// Hashes of the referenced uncles.
    #[serde(default)]
    pub uncles: Vec<B256>,
}

impl RawBlock {
    /// Splits the wire block into its document form and the raw transaction
    /// and uncle-hash lists the crawler still has to process.
    ///
    /// Derived reward and fee fields start at zero; the crawler assigns them
    /// before the block is persisted.
    pub fn into_parts(self) -> (Block, Vec<RawTransaction>, Vec<B256>) {
        let block = Block {
            number: self.number,
            hash: self.hash,
            parent_hash: self.parent_hash,
            sha3_uncles: self.sha3_uncles,
            miner: self.miner,
            difficulty: self.difficulty,
            total_difficulty: self.total_difficulty,
            size: self.size,
            gas_used: self.gas_used,
            gas_limit: self.gas_limit,
            nonce: self.nonce,
            timestamp: self.timestamp,
            tx_count: self.transactions.len() as u64,
            uncle_count: self.uncles.len() as u64,
            block_reward: U256::ZERO,
            uncles_reward: U256::ZERO,
            avg_gas_price: U256::ZERO,
            tx_fees: U256::ZERO,
            extra_data: self.extra_data,
        };
        (block, self.transactions, self.uncles)
    }
}

/// A transaction object embedded in a [`RawBlock`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTransaction {
    /// Height of the including block.
    #[serde(with = "hex_u64", default)]
    pub block_number: u64,
    /// Transaction hash.
    pub hash: B256,
    /// Sender address.
    pub from: Address,
    /// Recipient address; null for contract creation.
    #[serde(default)]
    pub to: Option<Address>,
    /// Transferred value in wei.
    #[serde(with = "hex_u256", default)]
    pub value: U256,
    /// Gas limit.
    #[serde(with = "hex_u64", default)]
    pub gas: u64,
    /// Gas price in wei.
    #[serde(with = "hex_u256", default)]
    pub gas_price: U256,
    /// Call data.
    #[serde(default)]
    pub input: Bytes,
    /// Sender nonce.
    #[serde(with = "hex_u64", default)]
    pub nonce: u64,
}

impl RawTransaction {
    /// Converts to the stored document form.
    ///
    /// `timestamp` comes from the including block; the receipt-derived fields
    /// are zeroed until the crawler folds the receipt in.
    pub fn into_transaction(self, timestamp: u64) -> Transaction {
        Transaction {
            block_number: self.block_number,
            hash: self.hash,
            from: self.from,
            to: self.to,
            value: self.value,
            gas: self.gas,
            gas_price: self.gas_price,
            input: self.input,
            nonce: self.nonce,
            timestamp,
            gas_used: 0,
            contract_address: None,
            logs: Vec::new(),
        }
    }
}

/// A transaction receipt as returned by `eth_getTransactionReceipt`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawReceipt {
    /// Gas consumed by the transaction.
    #[serde(with = "hex_u64", default)]
    pub gas_used: u64,
    /// Address of the created contract, if any.
    #[serde(default)]
    pub contract_address: Option<Address>,
    /// Emitted logs.
    #[serde(default)]
    pub logs: Vec<TxLog>,
}

/// An uncle header as returned by `eth_getUncleByBlockNumberAndIndex`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawUncle {
    /// The uncle's own height.
    #[serde(with = "hex_u64")]
    pub number: u64,
    /// Uncle hash.
    pub hash: B256,
    /// Parent hash.
    pub parent_hash: B256,
    /// Beneficiary address.
    pub miner: Address,
    /// Unix timestamp.
    #[serde(with = "hex_u64", default)]
    pub timestamp: u64,
}

impl RawUncle {
    /// Converts to the stored document form, attributed to the canonical
    /// block at `block_number` with the given computed `reward`.
    pub fn into_uncle(self, block_number: u64, reward: U256) -> Uncle {
        Uncle {
            block_number,
            number: self.number,
            hash: self.hash,
            parent_hash: self.parent_hash,
            miner: self.miner,
            timestamp: self.timestamp,
            reward,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_a_node_block() {
        let json = r#"{
            "number": "0x2a",
            "hash": "0x00000000000000000000000000000000000000000000000000000000000000aa",
            "parentHash": "0x00000000000000000000000000000000000000000000000000000000000000bb",
            "sha3Uncles": "0x1dcc4de8dec75d7aab85b567b6ccd41ad312451b948a7413f0a142fd40d49347",
            "miner": "0xab5801a7d398351b8be11c439e05c5b3259aec9b",
            "difficulty": "0x12a05f200",
            "totalDifficulty": "0x12a05f200",
            "size": "0x20c",
            "gasUsed": "0x0",
            "gasLimit": "0x8000000",
            "nonce": "0x0000000000000888",
            "timestamp": "0x588b4fc0",
            "extraData": "0x",
            "transactions": [],
            "uncles": [],
            "mixHash": "0x0000000000000000000000000000000000000000000000000000000000000000"
        }"#;
        let raw: RawBlock = serde_json::from_str(json).unwrap();
        assert_eq!(raw.number, 42);
        assert_eq!(raw.gas_limit, 134217728);
        assert_eq!(raw.timestamp, 0x588b4fc0);

        let (block, txns, uncles) = raw.into_parts();
        assert_eq!(block.number, 42);
        assert_eq!(block.tx_count, 0);
        assert!(txns.is_empty());
        assert!(uncles.is_empty());
    }

    #[test]
    fn decodes_a_transaction_with_null_to() {
        let json = r#"{
            "blockNumber": "0x10",
            "hash": "0x00000000000000000000000000000000000000000000000000000000000000cc",
            "from": "0xab5801a7d398351b8be11c439e05c5b3259aec9b",
            "to": null,
            "value": "0x0",
            "gas": "0x5208",
            "gasPrice": "0x4a817c800",
            "input": "0x6060",
            "nonce": "0x1"
        }"#;
        let raw: RawTransaction = serde_json::from_str(json).unwrap();
        assert!(raw.to.is_none());
        assert_eq!(raw.gas, 21000);

        let tx = raw.into_transaction(1485656000);
        assert_eq!(tx.timestamp, 1485656000);
        assert_eq!(tx.gas_used, 0);
    }

    #[test]
    fn empty_quantities_decode_to_zero() {
        let json = r#"{
            "number": "0x1",
            "hash": "0x00000000000000000000000000000000000000000000000000000000000000aa",
            "parentHash": "0x00000000000000000000000000000000000000000000000000000000000000bb",
            "sha3Uncles": "0x1dcc4de8dec75d7aab85b567b6ccd41ad312451b948a7413f0a142fd40d49347",
            "miner": "0xab5801a7d398351b8be11c439e05c5b3259aec9b",
            "difficulty": "0x",
            "timestamp": "0x588b4fc0"
        }"#;
        let raw: RawBlock = serde_json::from_str(json).unwrap();
        assert_eq!(raw.difficulty, U256::ZERO);
        assert_eq!(raw.size, 0);
    }

    #[test]
    fn uncle_conversion_attributes_canonical_height() {
        let raw = RawUncle { number: 199998, ..Default::default() };
        let uncle = raw.into_uncle(200000, U256::ZERO);
        assert_eq!(uncle.block_number, 200000);
        assert_eq!(uncle.number, 199998);
    }
}
