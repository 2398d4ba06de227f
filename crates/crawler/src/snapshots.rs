//! Per-asset supply snapshot jobs.
//!
//! These reduce the stored history into one `sysstores` record per asset:
//! the native coin snapshot folds newly indexed block rewards into the
//! running total, and each configured token folds the transfers its source
//! address has sent since the last snapshot.

use atlas_store::Store;
use atlas_types::{Block, SysStore};
use chrono::Utc;
use futures::StreamExt;
use std::time::Instant;
use tracing::{debug, error};

use crate::{Aggregator, TokenConfig};

impl Aggregator {
    /// Folds blocks above the snapshot head into the native coin supply.
    pub(crate) async fn coin_snapshot(&self) {
        let start = Instant::now();
        let symbol = self.snapshots.coin.symbol.clone();
        debug!(symbol, "start coin supply pass");

        let mut snapshot = match self.store.supply_object(&symbol).await {
            Ok(snapshot) => snapshot,
            Err(e) if e.is_not_found() => {
                SysStore { symbol: symbol.clone(), ..Default::default() }
            }
            Err(e) => {
                error!(%e, symbol, "error reading supply snapshot");
                return;
            }
        };

        let head = snapshot.latest_block.as_ref().map(|block| block.number).unwrap_or(0);
        let mut supply = snapshot.supply;
        let mut latest: Option<Block> = None;

        let mut stream = self.store.blocks_from(head);
        while let Some(block) = stream.next().await {
            match block {
                Ok(block) => {
                    // blockReward carries the block's full minted amount
                    supply += block.block_reward;
                    latest = Some(block);
                }
                Err(e) => {
                    error!(%e, symbol, "error iterating blocks");
                    return;
                }
            }
        }

        if let Some(latest_block) = latest {
            snapshot.supply = supply;
            snapshot.latest_block = Some(latest_block);
            snapshot.timestamp = Utc::now().timestamp();
            if let Err(e) = self.store.update_supply(&symbol, &snapshot).await {
                error!(%e, symbol, "error updating supply snapshot");
            }
        }

        debug!(symbol, elapsed = ?start.elapsed(), "end coin supply pass");
    }

    /// Folds a token's source transfers since the last snapshot into its
    /// circulating supply.
    pub(crate) async fn token_snapshot(&self, token: &TokenConfig) {
        let start = Instant::now();
        debug!(symbol = token.symbol, "start token supply pass");

        let mut snapshot = match self.store.supply_object(&token.symbol).await {
            Ok(snapshot) => snapshot,
            Err(e) if e.is_not_found() => {
                SysStore { symbol: token.symbol.clone(), ..Default::default() }
            }
            Err(e) => {
                error!(%e, symbol = token.symbol, "error reading supply snapshot");
                return;
            }
        };

        let mut supply = snapshot.supply;
        let mut changed = false;

        let mut stream =
            self.store.token_transfers_between(token.contract, token.source, snapshot.timestamp);
        while let Some(transfer) = stream.next().await {
            match transfer {
                Ok(transfer) => {
                    supply += transfer.value;
                    changed = true;
                }
                Err(e) => {
                    error!(%e, symbol = token.symbol, "error iterating token transfers");
                    return;
                }
            }
        }

        if changed {
            snapshot.supply = supply;
            snapshot.timestamp = Utc::now().timestamp();
            if let Err(e) = self.store.update_supply(&token.symbol, &snapshot).await {
                error!(%e, symbol = token.symbol, "error updating supply snapshot");
            }
        }

        debug!(symbol = token.symbol, elapsed = ?start.elapsed(), "end token supply pass");
    }
}
