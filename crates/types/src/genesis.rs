//! Constants of the indexed chain's genesis block.
//!
//! The store seeds its collections from these values on first run; the
//! aggregation cursors use [`TIMESTAMP`] as the lower bound of unwindowed
//! queries.

use alloy::primitives::{address, b256, b64, Address, B256, B64, U256};

use crate::Block;

/// Unix timestamp of the genesis block.
pub const TIMESTAMP: u64 = 1485633600;

/// Hash of the genesis block.
pub const HASH: B256 = b256!("0x406f1b7dd39fca54d8c702141851ed8b755463ab5b560e6f19b963b4047418af");

/// `sha3Uncles` of an empty uncle list.
pub const EMPTY_UNCLES: B256 =
    b256!("0x1dcc4de8dec75d7aab85b567b6ccd41ad312451b948a7413f0a142fd40d49347");

/// Difficulty of the genesis block.
pub const DIFFICULTY: u64 = 80_000_000_000;

/// Gas limit of the genesis block.
pub const GAS_LIMIT: u64 = 134_217_728;

/// Proof-of-work nonce of the genesis block.
pub const NONCE: B64 = b64!("0x0000000000000888");

/// Beneficiary recorded in the genesis header.
pub const MINER: Address = address!("0x3333333333333333333333333333333333333333");

/// The genesis block in document form. Height 0 mints nothing, so every
/// derived field is zero and the supply ledger bootstraps from zero.
pub fn block() -> Block {
    Block {
        number: 0,
        hash: HASH,
        parent_hash: B256::ZERO,
        sha3_uncles: EMPTY_UNCLES,
        miner: MINER,
        difficulty: U256::from(DIFFICULTY),
        total_difficulty: U256::from(DIFFICULTY),
        size: 524,
        gas_used: 0,
        gas_limit: GAS_LIMIT,
        nonce: NONCE,
        timestamp: TIMESTAMP,
        tx_count: 0,
        uncle_count: 0,
        block_reward: U256::ZERO,
        uncles_reward: U256::ZERO,
        avg_gas_price: U256::ZERO,
        tx_fees: U256::ZERO,
        extra_data: alloy::primitives::Bytes::from_static(b"JumbucksEE"),
    }
}
