//! The in-memory document backend.

use alloy::primitives::{Address, B256, U256};
use async_trait::async_trait;
use atlas_types::{
    collections, genesis, Block, ChartDoc, LineChart, MLineChart, SupplyBlock, SysStore,
    TokenTransfer, Transaction, Uncle, SYNC_CAUGHT_UP, SYNC_FRESH, SYNC_SYMBOL,
};
use chrono::Utc;
use futures::StreamExt;
use parking_lot::RwLock;
use std::{
    collections::{BTreeMap, HashMap},
    ops::Bound,
    sync::Arc,
};
use tracing::info;

use crate::{day_window, DocStream, Store, StoreConfig, StoreError, SyncType};

/// Number of account-scoped documents returned by the account queries.
const ACCOUNT_LIMIT: usize = 25;

/// A thread-safe in-memory document store.
///
/// Collections live behind one `RwLock`; every handle produced by [`Clone`]
/// shares the same documents, which mirrors a pooled connection to an
/// external store.
#[derive(Debug, Clone, Default)]
pub struct MemStore {
    inner: Arc<RwLock<Inner>>,
}

#[derive(Debug, Default)]
struct Inner {
    blocks: BTreeMap<u64, Block>,
    blocks_by_hash: HashMap<B256, u64>,
    txns: Vec<Transaction>,
    transfers: Vec<TokenTransfer>,
    uncles: HashMap<B256, Uncle>,
    forked: HashMap<B256, Block>,
    sysstores: HashMap<String, SysStore>,
    supply: BTreeMap<u64, SupplyBlock>,
    charts: HashMap<String, ChartDoc>,
}

impl Inner {
    fn contains_block(&self, height: u64) -> bool {
        height == 0 || self.blocks.contains_key(&height)
    }

    fn insert_block(&mut self, block: &Block) -> Result<(), StoreError> {
        if self.blocks.contains_key(&block.number) {
            return Err(StoreError::DuplicateKey {
                collection: collections::BLOCKS,
                key: block.number.to_string(),
            });
        }
        if self.blocks_by_hash.contains_key(&block.hash) {
            return Err(StoreError::DuplicateKey {
                collection: collections::BLOCKS,
                key: block.hash.to_string(),
            });
        }
        self.blocks_by_hash.insert(block.hash, block.number);
        self.blocks.insert(block.number, block.clone());
        Ok(())
    }
}

impl MemStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty store standing in for the configured external document
    /// store.
    pub fn open(config: &StoreConfig) -> Self {
        info!(
            database = %config.database,
            address = %config.address,
            "using in-memory document store"
        );
        Self::new()
    }

    fn stream_of<T: Send + 'static>(docs: Vec<T>) -> DocStream<T> {
        futures::stream::iter(docs.into_iter().map(Ok)).boxed()
    }
}

#[async_trait]
impl Store for MemStore {
    async fn is_first_run(&self) -> Result<bool, StoreError> {
        Ok(!self.inner.read().sysstores.contains_key(SYNC_SYMBOL))
    }

    async fn init(&self, coin_symbol: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.write();
        let now = Utc::now().timestamp();

        inner.sysstores.insert(
            SYNC_SYMBOL.to_string(),
            SysStore {
                symbol: SYNC_SYMBOL.to_string(),
                timestamp: now,
                sync: [SYNC_FRESH],
                ..Default::default()
            },
        );

        let genesis_block = genesis::block();
        if let Err(err) = inner.insert_block(&genesis_block) {
            if !err.is_duplicate() {
                return Err(err);
            }
        }

        inner.supply.entry(0).or_insert_with(|| SupplyBlock {
            number: 0,
            hash: genesis::HASH,
            timestamp: genesis::TIMESTAMP,
            ..Default::default()
        });

        if !inner.sysstores.contains_key(coin_symbol) {
            inner.sysstores.insert(
                coin_symbol.to_string(),
                SysStore {
                    symbol: coin_symbol.to_string(),
                    timestamp: now,
                    supply: U256::ZERO,
                    latest_block: Some(genesis_block),
                    ..Default::default()
                },
            );
        }

        info!(coin = coin_symbol, "initialized sync record and genesis documents");
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn index_head(&self) -> Result<[u64; 1], StoreError> {
        self.inner
            .read()
            .sysstores
            .get(SYNC_SYMBOL)
            .map(|record| record.sync)
            .ok_or(StoreError::Uninitialized)
    }

    async fn update_store(&self, block: &Block, sync_type: SyncType) -> Result<(), StoreError> {
        let mut inner = self.inner.write();
        let head = if sync_type.owns_sync_head() {
            // One block behind present means the crawl has met the stored
            // range and the store is contiguous to genesis.
            if inner.contains_block(block.number.saturating_sub(1)) {
                SYNC_CAUGHT_UP
            } else {
                block.number
            }
        } else {
            SYNC_FRESH
        };
        let record =
            inner.sysstores.get_mut(SYNC_SYMBOL).ok_or(StoreError::Uninitialized)?;
        record.sync = [head];
        record.timestamp = Utc::now().timestamp();
        Ok(())
    }

    async fn is_present(&self, height: u64) -> Result<bool, StoreError> {
        Ok(self.inner.read().contains_block(height))
    }

    async fn is_in_db(&self, height: u64, hash: B256) -> Result<(bool, bool), StoreError> {
        match self.inner.read().blocks.get(&height) {
            Some(stored) => Ok((true, stored.hash != hash)),
            None => Ok((false, false)),
        }
    }

    async fn get_block(&self, height: u64) -> Result<Block, StoreError> {
        self.inner.read().blocks.get(&height).cloned().ok_or(StoreError::NotFound)
    }

    async fn purge(&self, height: u64) -> Result<(), StoreError> {
        let mut inner = self.inner.write();
        inner.txns.retain(|tx| tx.block_number != height);
        inner.transfers.retain(|t| t.block_number != height);
        inner.uncles.retain(|_, u| u.block_number != height);
        if let Some(block) = inner.blocks.remove(&height) {
            inner.blocks_by_hash.remove(&block.hash);
        }
        Ok(())
    }

    async fn add_block(&self, block: &Block) -> Result<(), StoreError> {
        self.inner.write().insert_block(block)
    }

    async fn add_transaction(&self, tx: &Transaction) -> Result<(), StoreError> {
        self.inner.write().txns.push(tx.clone());
        Ok(())
    }

    async fn add_token_transfer(&self, transfer: &TokenTransfer) -> Result<(), StoreError> {
        self.inner.write().transfers.push(transfer.clone());
        Ok(())
    }

    async fn add_uncle(&self, uncle: &Uncle) -> Result<(), StoreError> {
        let mut inner = self.inner.write();
        if inner.uncles.contains_key(&uncle.hash) {
            return Err(StoreError::DuplicateKey {
                collection: collections::UNCLES,
                key: uncle.hash.to_string(),
            });
        }
        inner.uncles.insert(uncle.hash, uncle.clone());
        Ok(())
    }

    async fn add_forked_block(&self, block: &Block) -> Result<(), StoreError> {
        let mut inner = self.inner.write();
        if inner.forked.contains_key(&block.hash) {
            return Err(StoreError::DuplicateKey {
                collection: collections::FORKED_BLOCKS,
                key: block.hash.to_string(),
            });
        }
        inner.forked.insert(block.hash, block.clone());
        Ok(())
    }

    async fn add_supply_block(&self, supply_block: &SupplyBlock) -> Result<(), StoreError> {
        let mut inner = self.inner.write();
        if inner.supply.contains_key(&supply_block.number) {
            return Err(StoreError::DuplicateKey {
                collection: collections::SUPPLY,
                key: supply_block.number.to_string(),
            });
        }
        inner.supply.insert(supply_block.number, supply_block.clone());
        Ok(())
    }

    async fn add_line_chart(&self, chart: &LineChart) -> Result<(), StoreError> {
        self.inner
            .write()
            .charts
            .insert(chart.chart.clone(), ChartDoc::Line(chart.clone()));
        Ok(())
    }

    async fn add_ml_chart(&self, chart: &MLineChart) -> Result<(), StoreError> {
        self.inner
            .write()
            .charts
            .insert(chart.chart.clone(), ChartDoc::MultiLine(chart.clone()));
        Ok(())
    }

    async fn latest_supply_block(&self) -> Result<SupplyBlock, StoreError> {
        self.inner
            .read()
            .supply
            .last_key_value()
            .map(|(_, sb)| sb.clone())
            .ok_or(StoreError::NotFound)
    }

    async fn supply_block_by_number(&self, height: u64) -> Result<SupplyBlock, StoreError> {
        self.inner.read().supply.get(&height).cloned().ok_or(StoreError::NotFound)
    }

    async fn remove_supply_block(&self, height: u64) -> Result<(), StoreError> {
        self.inner.write().supply.remove(&height);
        Ok(())
    }

    async fn supply_object(&self, symbol: &str) -> Result<SysStore, StoreError> {
        self.inner.read().sysstores.get(symbol).cloned().ok_or(StoreError::NotFound)
    }

    async fn update_supply(&self, symbol: &str, snapshot: &SysStore) -> Result<(), StoreError> {
        self.inner.write().sysstores.insert(symbol.to_string(), snapshot.clone());
        Ok(())
    }

    async fn store_status(&self) -> Result<SysStore, StoreError> {
        let inner = self.inner.read();
        let mut snapshots: Vec<&SysStore> =
            inner.sysstores.values().filter(|s| s.symbol != SYNC_SYMBOL).collect();
        snapshots.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        snapshots
            .first()
            .map(|s| (*s).clone())
            .or_else(|| inner.sysstores.get(SYNC_SYMBOL).cloned())
            .ok_or(StoreError::NotFound)
    }

    async fn block_by_number(&self, number: u64) -> Result<Block, StoreError> {
        self.inner.read().blocks.get(&number).cloned().ok_or(StoreError::NotFound)
    }

    async fn block_by_hash(&self, hash: B256) -> Result<Block, StoreError> {
        let inner = self.inner.read();
        inner
            .blocks_by_hash
            .get(&hash)
            .and_then(|number| inner.blocks.get(number))
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn latest_block(&self) -> Result<Block, StoreError> {
        self.inner
            .read()
            .blocks
            .last_key_value()
            .map(|(_, b)| b.clone())
            .ok_or(StoreError::NotFound)
    }

    async fn latest_blocks(&self, limit: usize) -> Result<Vec<Block>, StoreError> {
        Ok(self.inner.read().blocks.values().rev().take(limit).cloned().collect())
    }

    async fn latest_forked_blocks(&self, limit: usize) -> Result<Vec<Block>, StoreError> {
        let inner = self.inner.read();
        let mut blocks: Vec<Block> = inner.forked.values().cloned().collect();
        blocks.sort_by(|a, b| b.number.cmp(&a.number));
        blocks.truncate(limit);
        Ok(blocks)
    }

    async fn transaction_by_hash(&self, hash: B256) -> Result<Transaction, StoreError> {
        self.inner
            .read()
            .txns
            .iter()
            .find(|tx| tx.hash == hash)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn latest_transactions(&self, limit: usize) -> Result<Vec<Transaction>, StoreError> {
        let inner = self.inner.read();
        let mut txns = inner.txns.clone();
        txns.sort_by(|a, b| b.block_number.cmp(&a.block_number));
        txns.truncate(limit);
        Ok(txns)
    }

    async fn latest_transactions_by_account(
        &self,
        account: Address,
    ) -> Result<Vec<Transaction>, StoreError> {
        let inner = self.inner.read();
        let mut txns: Vec<Transaction> = inner
            .txns
            .iter()
            .filter(|tx| tx.from == account || tx.to == Some(account))
            .cloned()
            .collect();
        txns.sort_by(|a, b| b.block_number.cmp(&a.block_number));
        txns.truncate(ACCOUNT_LIMIT);
        Ok(txns)
    }

    async fn latest_token_transfers(
        &self,
        limit: usize,
    ) -> Result<Vec<TokenTransfer>, StoreError> {
        let inner = self.inner.read();
        let mut transfers = inner.transfers.clone();
        transfers.sort_by(|a, b| b.block_number.cmp(&a.block_number));
        transfers.truncate(limit);
        Ok(transfers)
    }

    async fn latest_token_transfers_by_account(
        &self,
        account: Address,
    ) -> Result<Vec<TokenTransfer>, StoreError> {
        let inner = self.inner.read();
        let mut transfers: Vec<TokenTransfer> = inner
            .transfers
            .iter()
            .filter(|t| t.from == account || t.to == account)
            .cloned()
            .collect();
        transfers.sort_by(|a, b| b.block_number.cmp(&a.block_number));
        transfers.truncate(ACCOUNT_LIMIT);
        Ok(transfers)
    }

    async fn latest_uncles(&self, limit: usize) -> Result<Vec<Uncle>, StoreError> {
        let inner = self.inner.read();
        let mut uncles: Vec<Uncle> = inner.uncles.values().cloned().collect();
        uncles.sort_by(|a, b| b.block_number.cmp(&a.block_number));
        uncles.truncate(limit);
        Ok(uncles)
    }

    async fn uncle_by_hash(&self, hash: B256) -> Result<Uncle, StoreError> {
        self.inner.read().uncles.get(&hash).cloned().ok_or(StoreError::NotFound)
    }

    async fn txn_count(&self, account: Address) -> Result<u64, StoreError> {
        let inner = self.inner.read();
        Ok(inner
            .txns
            .iter()
            .filter(|tx| tx.from == account || tx.to == Some(account))
            .count() as u64)
    }

    async fn total_txn_count(&self) -> Result<u64, StoreError> {
        Ok(self.inner.read().txns.len() as u64)
    }

    async fn token_transfer_count(&self, account: Address) -> Result<u64, StoreError> {
        let inner = self.inner.read();
        Ok(inner
            .transfers
            .iter()
            .filter(|t| t.from == account || t.to == account)
            .count() as u64)
    }

    async fn total_block_count(&self) -> Result<u64, StoreError> {
        Ok(self.inner.read().blocks.len() as u64)
    }

    async fn total_forked_count(&self) -> Result<u64, StoreError> {
        Ok(self.inner.read().forked.len() as u64)
    }

    async fn total_token_transfer_count(&self) -> Result<u64, StoreError> {
        Ok(self.inner.read().transfers.len() as u64)
    }

    async fn total_uncle_count(&self) -> Result<u64, StoreError> {
        Ok(self.inner.read().uncles.len() as u64)
    }

    async fn chart_data(&self, chart: &str, limit: usize) -> Result<ChartDoc, StoreError> {
        let doc = self.inner.read().charts.get(chart).cloned().ok_or(StoreError::NotFound)?;
        match doc {
            ChartDoc::Line(mut line) if limit > 0 && limit < line.labels.len() => {
                line.labels = line.labels.split_off(line.labels.len() - limit);
                let keep = line.values.len().saturating_sub(limit);
                line.values = line.values.split_off(keep);
                Ok(ChartDoc::Line(line))
            }
            doc => Ok(doc),
        }
    }

    fn blocks_in_window(&self, days: u32) -> DocStream<Block> {
        let (from, to) = day_window(days);
        let docs: Vec<Block> = self
            .inner
            .read()
            .blocks
            .values()
            .filter(|b| (b.timestamp as i64) >= from && (b.timestamp as i64) < to)
            .cloned()
            .collect();
        Self::stream_of(docs)
    }

    fn txns_in_window(&self, days: u32) -> DocStream<Transaction> {
        let (from, to) = day_window(days);
        let mut docs: Vec<Transaction> = self
            .inner
            .read()
            .txns
            .iter()
            .filter(|tx| (tx.timestamp as i64) >= from && (tx.timestamp as i64) < to)
            .cloned()
            .collect();
        docs.sort_by_key(|tx| tx.block_number);
        Self::stream_of(docs)
    }

    fn blocks_from(&self, height: u64) -> DocStream<Block> {
        let docs: Vec<Block> = self
            .inner
            .read()
            .blocks
            .range((Bound::Excluded(height), Bound::Unbounded))
            .map(|(_, b)| b.clone())
            .collect();
        Self::stream_of(docs)
    }

    fn token_transfers_between(
        &self,
        contract: Address,
        source: Address,
        after: i64,
    ) -> DocStream<TokenTransfer> {
        let mut docs: Vec<TokenTransfer> = self
            .inner
            .read()
            .transfers
            .iter()
            .filter(|t| t.contract == contract && t.from == source && (t.timestamp as i64) > after)
            .cloned()
            .collect();
        docs.sort_by_key(|t| t.block_number);
        Self::stream_of(docs)
    }
}
