//! A scripted chain for crawler tests: blocks, receipts and uncles served
//! from memory with deterministic hashes, plus helpers to grow the chain
//! and fork its tip.

// not every test binary touches every helper
#![allow(dead_code)]

use alloy::primitives::{Address, Bytes, B256, U256};
use async_trait::async_trait;
use atlas_rpc::{Rpc, RpcError};
use atlas_types::{genesis, RawBlock, RawReceipt, RawTransaction, RawUncle, TRANSFER_SELECTOR};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Seconds between consecutive mock blocks.
pub const BLOCK_INTERVAL: u64 = 88;

/// Deterministic block hash: height tagged with a chain salt, so a forked
/// chain produces different hashes at the same heights.
pub fn block_hash(number: u64, salt: u8) -> B256 {
    if number == 0 {
        return genesis::HASH;
    }
    let mut bytes = [0u8; 32];
    bytes[0] = 0xb1;
    bytes[1] = salt;
    bytes[24..].copy_from_slice(&number.to_be_bytes());
    B256::from(bytes)
}

pub fn tx_hash(tag: u64) -> B256 {
    let mut bytes = [0u8; 32];
    bytes[0] = 0x77;
    bytes[24..].copy_from_slice(&tag.to_be_bytes());
    B256::from(bytes)
}

pub fn transfer_input(to: Address, value: U256) -> Bytes {
    let mut input = Vec::with_capacity(68);
    input.extend_from_slice(&TRANSFER_SELECTOR);
    input.extend_from_slice(&[0u8; 12]);
    input.extend_from_slice(to.as_slice());
    input.extend_from_slice(&value.to_be_bytes::<32>());
    input.into()
}

#[derive(Default)]
struct ChainInner {
    blocks: BTreeMap<u64, RawBlock>,
    receipts: HashMap<B256, RawReceipt>,
    uncles: HashMap<(u64, usize), RawUncle>,
}

/// The mock node.
#[derive(Clone, Default)]
pub struct MockChain {
    inner: Arc<Mutex<ChainInner>>,
}

impl MockChain {
    /// A chain of empty blocks from genesis up to `tip`.
    pub fn with_blocks(tip: u64) -> Self {
        let chain = Self::default();
        for number in 0..=tip {
            chain.push_block(number, 0);
        }
        chain
    }

    /// Appends (or replaces) the block at `number` on the chain identified
    /// by `salt`, linked to the block below it.
    pub fn push_block(&self, number: u64, salt: u8) {
        let mut inner = self.inner.lock();
        let parent_hash = if number == 0 {
            B256::ZERO
        } else {
            inner
                .blocks
                .get(&(number - 1))
                .map(|parent| parent.hash)
                .unwrap_or_else(|| block_hash(number - 1, salt))
        };
        let raw = RawBlock {
            number,
            hash: block_hash(number, salt),
            parent_hash,
            sha3_uncles: genesis::EMPTY_UNCLES,
            miner: Address::repeat_byte(0x33),
            difficulty: U256::from(genesis::DIFFICULTY),
            total_difficulty: U256::from(genesis::DIFFICULTY) * U256::from(number + 1),
            size: 524,
            gas_limit: genesis::GAS_LIMIT,
            nonce: genesis::NONCE,
            timestamp: genesis::TIMESTAMP + number * BLOCK_INTERVAL,
            ..Default::default()
        };
        inner.blocks.insert(number, raw);
    }

    /// Replaces the tip range `from..=tip` with a competing chain.
    pub fn fork_from(&self, from: u64, salt: u8) {
        let tip = self.tip();
        for number in from..=tip {
            self.push_block(number, salt);
        }
    }

    /// Adds a transaction to the block at `number` and registers its
    /// receipt.
    pub fn add_tx(&self, number: u64, tx: RawTransaction, receipt: RawReceipt) {
        let mut inner = self.inner.lock();
        inner.receipts.insert(tx.hash, receipt);
        let block = inner.blocks.get_mut(&number).expect("block exists");
        block.transactions.push(tx);
    }

    /// Registers an uncle at `index` of the block at `number`.
    pub fn add_uncle(&self, number: u64, index: usize, uncle_height: u64) {
        let mut inner = self.inner.lock();
        let hash = {
            let mut bytes = [0u8; 32];
            bytes[0] = 0xcc;
            bytes[24..].copy_from_slice(&uncle_height.to_be_bytes());
            B256::from(bytes)
        };
        let uncle = RawUncle {
            number: uncle_height,
            hash,
            parent_hash: block_hash(uncle_height.saturating_sub(1), 0),
            miner: Address::repeat_byte(0x44),
            timestamp: genesis::TIMESTAMP + uncle_height * BLOCK_INTERVAL,
        };
        inner.uncles.insert((number, index), uncle);
        let block = inner.blocks.get_mut(&number).expect("block exists");
        block.uncles.push(hash);
    }

    pub fn tip(&self) -> u64 {
        self.inner.lock().blocks.last_key_value().map(|(n, _)| *n).unwrap_or(0)
    }
}

#[async_trait]
impl Rpc for MockChain {
    async fn latest_block_number(&self) -> Result<u64, RpcError> {
        Ok(self.tip())
    }

    async fn block_by_height(&self, height: u64) -> Result<RawBlock, RpcError> {
        self.inner.lock().blocks.get(&height).cloned().ok_or(RpcError::NullResult)
    }

    async fn block_by_hash(&self, hash: B256) -> Result<RawBlock, RpcError> {
        self.inner
            .lock()
            .blocks
            .values()
            .find(|block| block.hash == hash)
            .cloned()
            .ok_or(RpcError::NullResult)
    }

    async fn uncle_by_block_number_and_index(
        &self,
        height: u64,
        index: usize,
    ) -> Result<RawUncle, RpcError> {
        self.inner.lock().uncles.get(&(height, index)).cloned().ok_or(RpcError::NullResult)
    }

    async fn tx_receipt(&self, hash: B256) -> Result<RawReceipt, RpcError> {
        self.inner.lock().receipts.get(&hash).cloned().ok_or(RpcError::NullResult)
    }

    async fn ping(&self) -> Result<(), RpcError> {
        Ok(())
    }
}
