use alloy::primitives::{B256, U256};
use atlas_rewards as rewards;
use atlas_rpc::Rpc;
use atlas_store::{Store, StoreError};
use atlas_types::{RawBlock, SupplyBlock};
use lru::LruCache;
use parking_lot::Mutex;
use std::{fmt, num::NonZeroUsize, ops::Deref, sync::Arc};
use tracing::{debug, error, info, warn};

use crate::{
    progress::{Progress, Sample},
    ring::{Handoff, Ring},
    CrawlConfig, CrawlError, CrawlState,
};

/// Entries kept in the recent-supply-block cache.
const SB_CACHE_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy)]
struct CacheEntry {
    supply: U256,
    hash: B256,
}

/// The supply crawler: a strictly sequential accumulator that walks forward
/// from the indexed supply head, folding each block's minted coin into the
/// cumulative ledger.
///
/// Each block's commit derives from the supply committed at the parent
/// height, so the ring's ordered section covers the whole parent-lookup,
/// reorg-check and insert sequence. A short LRU of recent `(height →
/// {supply, hash})` pairs keeps the parent lookup off the store on the hot
/// path and doubles as the reorg detector: a parent whose stored hash does
/// not match the incoming `parentHash` ends the pass, removes the stale
/// parent, and lets the next pass re-derive it.
///
/// Cheap to clone; all clones share one state.
#[derive(Clone)]
pub struct SupplyCrawler {
    inner: Arc<SupplyInner>,
}

/// Shared state behind a [`SupplyCrawler`] handle.
pub struct SupplyInner {
    store: Arc<dyn Store>,
    rpc: Arc<dyn Rpc>,
    cfg: CrawlConfig,
    state: CrawlState,
    cache: Mutex<LruCache<u64, CacheEntry>>,
    coin_symbol: String,
}

impl Deref for SupplyCrawler {
    type Target = SupplyInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl SupplyCrawler {
    /// Builds a supply crawler over the given store and node.
    pub fn new(
        store: Arc<dyn Store>,
        rpc: Arc<dyn Rpc>,
        cfg: CrawlConfig,
        coin_symbol: String,
    ) -> Self {
        let capacity = NonZeroUsize::new(SB_CACHE_LIMIT).expect("cache limit is non-zero");
        Self {
            inner: Arc::new(SupplyInner {
                store,
                rpc,
                cfg,
                state: CrawlState::default(),
                cache: Mutex::new(LruCache::new(capacity)),
                coin_symbol,
            }),
        }
    }

    /// The crawler's state flags, shared with its passes.
    pub fn state(&self) -> &CrawlState {
        &self.state
    }

    /// Pings the node, seeds a fresh store, and keeps accumulating on the
    /// configured interval, starting immediately.
    pub async fn start(&self) -> Result<(), CrawlError> {
        info!("starting supply crawler");
        self.rpc.ping().await?;

        if self.store.is_first_run().await? {
            self.store.init(&self.coin_symbol).await?;
        }

        info!(interval = ?self.cfg.interval, "supply refresh interval");

        let crawler = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(crawler.cfg.interval);
            loop {
                ticker.tick().await;
                if crawler.state.begin_pass() {
                    crawler.sync_loop().await;
                    crawler.state.finish_pass();
                }
            }
        });
        Ok(())
    }

    /// One ascending pass from the supply head towards the chain tip.
    ///
    /// The pass ends at the tip, on the first upstream failure, or as soon
    /// as a worker raises the reorg flag.
    pub async fn sync_loop(&self) {
        let head = match self.store.latest_supply_block().await {
            Ok(supply_block) => supply_block.number,
            Err(e) if e.is_not_found() => 0,
            Err(e) => {
                error!(%e, "error reading latest supply block");
                return;
            }
        };

        let mut current = if head == 0 {
            debug!("first supply sync, starting at height 1");
            1
        } else {
            head + 1
        };

        let chain_head = match self.rpc.latest_block_number().await {
            Ok(tip) => tip,
            Err(e) => {
                error!(%e, "error getting chain head");
                return;
            }
        };

        self.state.set_reorg(false);
        self.state.set_syncing(true);

        let mut ring = Ring::new(current);
        let progress = Progress::spawn("supply");

        while current <= chain_head && !self.state.reorg() {
            let raw = match self.rpc.block_by_height(current).await {
                Ok(raw) => raw,
                Err(e) => {
                    error!(%e, height = current, "error getting block");
                    break;
                }
            };

            let crawler = self.clone();
            let progress = progress.clone();
            ring.enqueue(move |handoff| async move {
                crawler.sync_block(raw, handoff, progress).await;
            });

            ring.throttle(self.cfg.max_routines).await;
            current += 1;
        }

        drop(progress);
        ring.close_after(current).await;

        self.state.set_syncing(false);
    }

    /// Accumulates one block into the ledger. The uncle fetches overlap
    /// with other workers; everything from the parent lookup to the cache
    /// insert runs inside the ordered section.
    async fn sync_block(&self, raw: RawBlock, mut handoff: Handoff<u64>, progress: Progress) {
        let (block, _, uncle_hashes) = raw.into_parts();
        let number = block.number;

        let uncle_heights = self.uncle_heights(number, uncle_hashes.len()).await;
        let rewards = rewards::accumulate_rewards(number, &uncle_heights);

        let _ = handoff.recv().await;

        let parent = match self.parent_entry(number).await {
            Ok(parent) => parent,
            Err(e) => {
                error!(%e, height = number, "error reading parent supply block");
                // retry this height on the next pass
                handoff.send(number);
                return;
            }
        };

        if parent.hash != block.parent_hash {
            warn!(
                height = number,
                parent = %parent.hash,
                expected = %block.parent_hash,
                "supply reorg detected"
            );
            self.cache.lock().clear();
            if let Err(e) = self.store.remove_supply_block(number - 1).await {
                error!(%e, height = number - 1, "error removing stale supply block");
            }
            self.state.set_reorg(true);
            handoff.send(number - 1);
            return;
        }

        let supply = parent.supply + rewards.minted;
        let supply_block = SupplyBlock {
            number,
            hash: block.hash,
            timestamp: block.timestamp,
            block_reward: rewards.reward,
            uncle_rewards: rewards.uncle_rewards,
            minted: rewards.minted,
            supply,
        };

        match self.store.add_supply_block(&supply_block).await {
            Ok(()) => {}
            Err(e) if e.is_duplicate() => debug!(height = number, "supply block already indexed"),
            Err(e) => error!(%e, height = number, "error adding supply block"),
        }
        self.cache.lock().put(number, CacheEntry { supply, hash: block.hash });

        progress.record(Sample {
            height: number,
            minted: rewards.minted,
            supply,
            ..Default::default()
        });
        handoff.send(number + 1);
    }

    /// The parent's `{supply, hash}`: recent cache first, then the store.
    async fn parent_entry(&self, number: u64) -> Result<CacheEntry, StoreError> {
        let parent_height = number - 1;
        if let Some(entry) = self.cache.lock().get(&parent_height) {
            return Ok(*entry);
        }
        let stored = self.store.supply_block_by_number(parent_height).await?;
        Ok(CacheEntry { supply: stored.supply, hash: stored.hash })
    }

    async fn uncle_heights(&self, height: u64, count: usize) -> Vec<u64> {
        let mut heights = Vec::with_capacity(count);
        for index in 0..count {
            match self.rpc.uncle_by_block_number_and_index(height, index).await {
                Ok(uncle) => heights.push(uncle.number),
                Err(e) => {
                    error!(%e, height, index, "error getting uncle");
                    return heights;
                }
            }
        }
        heights
    }
}

impl fmt::Debug for SupplyCrawler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SupplyCrawler")
            .field("cfg", &self.cfg)
            .field("state", &self.state)
            .field("coin_symbol", &self.coin_symbol)
            .finish_non_exhaustive()
    }
}
