use alloy::primitives::U256;
use atlas_rewards as rewards;
use atlas_rpc::Rpc;
use atlas_store::{Store, SyncType};
use atlas_types::{RawBlock, RawTransaction, SYNC_CAUGHT_UP, SYNC_FRESH};
use parking_lot::Mutex;
use std::{fmt, ops::Deref, sync::Arc};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::{
    progress::{Progress, Sample},
    ring::{Handoff, Ring},
    Aggregator, CrawlConfig, CrawlError, CrawlState, SnapshotsConfig,
};

/// The main crawler: walks the chain backwards from the tip (or from the
/// resumed back-sync head), persisting every canonical block with its
/// transactions, token transfers and uncles, and resolving reorganizations
/// by moving the superseded block aside and re-syncing the height.
///
/// Cheap to clone; all clones share one state.
#[derive(Clone)]
pub struct Crawler {
    inner: Arc<CrawlerInner>,
}

/// Shared state behind a [`Crawler`] handle.
pub struct CrawlerInner {
    store: Arc<dyn Store>,
    rpc: Arc<dyn Rpc>,
    cfg: CrawlConfig,
    state: CrawlState,
    aggregator: Aggregator,
    coin_symbol: String,
}

#[derive(Debug, Default)]
struct TxTotals {
    gas_price_sum: U256,
    tx_fees: U256,
    transfers: usize,
}

impl Deref for Crawler {
    type Target = CrawlerInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl Crawler {
    /// Builds a crawler over the given store and node.
    pub fn new(
        store: Arc<dyn Store>,
        rpc: Arc<dyn Rpc>,
        cfg: CrawlConfig,
        snapshots: SnapshotsConfig,
    ) -> Self {
        let coin_symbol = snapshots.coin.symbol.clone();
        Self {
            inner: Arc::new(CrawlerInner {
                aggregator: Aggregator::new(Arc::clone(&store), snapshots),
                store,
                rpc,
                cfg,
                state: CrawlState::default(),
                coin_symbol,
            }),
        }
    }

    /// The crawler's state flags, shared with its passes.
    pub fn state(&self) -> &CrawlState {
        &self.state
    }

    /// Pings the node, seeds a fresh store, and keeps crawling on the
    /// configured interval, starting immediately.
    ///
    /// Fails only on startup problems; a failing pass logs and retries on
    /// the next tick.
    pub async fn start(&self) -> Result<(), CrawlError> {
        info!("starting block crawler");
        self.rpc.ping().await?;

        if self.store.is_first_run().await? {
            self.store.init(&self.coin_symbol).await?;
        }

        info!(interval = ?self.cfg.interval, "block refresh interval");

        let crawler = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(crawler.cfg.interval);
            loop {
                ticker.tick().await;
                crawler.tick().await;
            }
        });
        Ok(())
    }

    /// One scheduled pass: sync, then aggregate if the pass left the store
    /// caught up.
    pub async fn tick(&self) {
        if !self.state.begin_pass() {
            return;
        }
        self.sync_loop().await;
        match self.store.index_head().await {
            Ok(head) if head[0] == SYNC_CAUGHT_UP => self.aggregator.run().await,
            Ok(_) => {}
            Err(e) => error!(%e, "error reading index head"),
        }
        self.state.finish_pass();
    }

    /// A single crawl pass over the range the sync record demands.
    pub async fn sync_loop(&self) {
        let index_head = match self.store.index_head().await {
            Ok(head) => head[0],
            Err(e) => {
                error!(%e, "error reading index head");
                return;
            }
        };

        let sync_type;
        let mut current;
        if index_head == SYNC_FRESH {
            sync_type = SyncType::First;
            self.state.set_syncing(true);
            let Some(tip) = self.chain_head().await else {
                self.state.set_syncing(false);
                return;
            };
            current = tip;
        } else if index_head == SYNC_CAUGHT_UP {
            sync_type = SyncType::Top;
            self.state.set_top_syncing(true);
            let Some(tip) = self.chain_head().await else { return };
            current = tip;
        } else if !self.state.syncing() && !self.state.top_syncing() {
            sync_type = SyncType::Back;
            self.state.set_syncing(true);
            current = index_head - 1;
            warn!(height = current, "resuming unfinished sync");
            // the last block of the aborted pass may be half-synced
            if let Err(e) = self.store.purge(current).await {
                warn!(%e, height = current, "error purging resume height");
            }
        } else {
            // a back-sync owns the sync record; crawl the tip without
            // touching its progress
            sync_type = SyncType::None;
            let Some(tip) = self.chain_head().await else { return };
            current = tip;
        }
        debug!(%sync_type, from = current, "starting crawl pass");

        let mut ring = Ring::new(current);
        let progress = Progress::spawn("crawler");

        loop {
            let raw = match self.rpc.block_by_height(current).await {
                Ok(raw) => raw,
                Err(e) => {
                    error!(%e, height = current, "error getting block");
                    break;
                }
            };

            // the reorg check comes before the presence guard, otherwise a
            // mismatched tip would end the pass unresolved
            let (present, mismatched) = match self.store.is_in_db(current, raw.hash).await {
                Ok(answer) => answer,
                Err(e) => {
                    error!(%e, height = current, "error checking block presence");
                    break;
                }
            };

            if present && mismatched {
                let crawler = self.clone();
                let progress = progress.clone();
                ring.enqueue(move |handoff| async move {
                    crawler.sync_forked_block(raw, handoff, sync_type, progress).await;
                });
            } else if !present {
                let crawler = self.clone();
                let progress = progress.clone();
                ring.enqueue(move |handoff| async move {
                    crawler.sync_block(raw, handoff, sync_type, progress).await;
                });
            } else {
                break;
            }

            ring.throttle(self.cfg.max_routines).await;
            if current == 0 {
                break;
            }
            current -= 1;
        }

        drop(progress);
        ring.close_after(current).await;

        if sync_type.is_exclusive() {
            self.state.set_syncing(false);
        }
    }

    async fn chain_head(&self) -> Option<u64> {
        match self.rpc.latest_block_number().await {
            Ok(tip) => Some(tip),
            Err(e) => {
                error!(%e, "error getting chain head");
                None
            }
        }
    }

    /// Indexes one block. Receipt fetches, document inserts and uncle
    /// processing overlap freely across workers; the sync-record update and
    /// the block insert run inside the ring's ordered section.
    async fn sync_block(
        &self,
        raw: RawBlock,
        mut handoff: Handoff<u64>,
        sync_type: SyncType,
        progress: Progress,
    ) {
        let (mut block, txns, uncles) = raw.into_parts();
        let uncle_count = uncles.len();

        let (avg_gas_price, tx_fees, transfers) =
            self.process_transactions(txns, block.timestamp).await;
        let uncle_rewards = self.process_uncles(block.number, uncle_count).await;

        let minted = rewards::base_reward(block.number, uncle_count) + uncle_rewards;
        block.block_reward = minted;
        block.uncles_reward = uncle_rewards;
        block.avg_gas_price = avg_gas_price;
        block.tx_fees = tx_fees;

        let _ = handoff.recv().await;

        if let Err(e) = self.store.update_store(&block, sync_type).await {
            error!(%e, height = block.number, "error updating sync record");
        }
        match self.store.add_block(&block).await {
            Ok(()) => {}
            Err(e) if e.is_duplicate() => {
                debug!(height = block.number, "block already indexed")
            }
            Err(e) => error!(%e, height = block.number, "error adding block"),
        }

        debug!(
            height = block.number,
            txns = block.tx_count,
            transfers,
            uncles = uncle_count,
            "block indexed"
        );
        progress.record(Sample {
            height: block.number,
            txns: block.tx_count as usize,
            transfers,
            uncles: uncle_count,
            minted,
            ..Default::default()
        });

        handoff.send(block.number.saturating_sub(1));
    }

    /// Moves the stored block at the reorged height into the audit
    /// collection, purges the height, and syncs the replacement.
    async fn sync_forked_block(
        &self,
        raw: RawBlock,
        handoff: Handoff<u64>,
        sync_type: SyncType,
        progress: Progress,
    ) {
        let height = raw.number;

        match self.store.get_block(height).await {
            Ok(stored) => {
                warn!(height, head = %raw.hash, forked = %stored.hash, "reorg detected");
                match self.store.add_forked_block(&stored).await {
                    Ok(()) => {}
                    Err(e) if e.is_duplicate() => {
                        debug!(height, "forked block already recorded")
                    }
                    Err(e) => error!(%e, height, "error recording forked block"),
                }
            }
            Err(e) => error!(%e, height, "error reading forked block"),
        }

        if let Err(e) = self.store.purge(height).await {
            warn!(%e, height, "error purging forked height");
        }

        self.sync_block(raw, handoff, sync_type, progress).await;
    }

    /// Fans out over a block's transactions: fetches each receipt, stores
    /// the transaction and any token transfer it carries, and accumulates
    /// the block totals. Returns `(avgGasPrice, txFees, tokenTransfers)`.
    async fn process_transactions(
        &self,
        txns: Vec<RawTransaction>,
        timestamp: u64,
    ) -> (U256, U256, usize) {
        if txns.is_empty() {
            return (U256::ZERO, U256::ZERO, 0);
        }
        let count = txns.len();
        let totals = Arc::new(Mutex::new(TxTotals::default()));
        let mut tasks = JoinSet::new();

        for raw in txns {
            let crawler = self.clone();
            let totals = Arc::clone(&totals);
            tasks.spawn(async move {
                let mut tx = raw.into_transaction(timestamp);

                match crawler.rpc.tx_receipt(tx.hash).await {
                    Ok(receipt) => {
                        tx.gas_used = receipt.gas_used;
                        tx.contract_address = receipt.contract_address;
                        tx.logs = receipt.logs;
                    }
                    Err(e) => error!(%e, hash = %tx.hash, "error getting tx receipt"),
                }

                {
                    let mut totals = totals.lock();
                    totals.gas_price_sum += tx.gas_price;
                    totals.tx_fees += tx.gas_price * U256::from(tx.gas_used);
                }

                if let Some(transfer) = tx.token_transfer() {
                    totals.lock().transfers += 1;
                    if let Err(e) = crawler.store.add_token_transfer(&transfer).await {
                        error!(%e, hash = %tx.hash, "error adding token transfer");
                    }
                }

                if let Err(e) = crawler.store.add_transaction(&tx).await {
                    error!(%e, hash = %tx.hash, "error adding transaction");
                }
            });
        }
        while tasks.join_next().await.is_some() {}

        let totals = totals.lock();
        let avg_gas_price = totals.gas_price_sum / U256::from(count as u64);
        (avg_gas_price, totals.tx_fees, totals.transfers)
    }

    /// Fans out over a block's uncles: fetches each one, stores it with its
    /// computed reward, and returns the reward sum.
    async fn process_uncles(&self, height: u64, count: usize) -> U256 {
        if count == 0 {
            return U256::ZERO;
        }
        let sum = Arc::new(Mutex::new(U256::ZERO));
        let mut tasks = JoinSet::new();

        for index in 0..count {
            let crawler = self.clone();
            let sum = Arc::clone(&sum);
            tasks.spawn(async move {
                let raw = match crawler.rpc.uncle_by_block_number_and_index(height, index).await {
                    Ok(raw) => raw,
                    Err(e) => {
                        error!(%e, height, index, "error getting uncle");
                        return;
                    }
                };
                let reward = rewards::uncle_reward(height, raw.number);
                *sum.lock() += reward;

                let uncle = raw.into_uncle(height, reward);
                match crawler.store.add_uncle(&uncle).await {
                    Ok(()) => {}
                    Err(e) if e.is_duplicate() => {
                        debug!(height, index, "uncle already indexed")
                    }
                    Err(e) => error!(%e, height, index, "error adding uncle"),
                }
            });
        }
        while tasks.join_next().await.is_some() {}

        let total = *sum.lock();
        total
    }
}

impl fmt::Debug for Crawler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Crawler")
            .field("cfg", &self.cfg)
            .field("state", &self.state)
            .field("coin_symbol", &self.coin_symbol)
            .finish_non_exhaustive()
    }
}
