//! Chart aggregation jobs.
//!
//! Each job streams one store cursor, buckets documents by UTC day, reduces
//! the buckets and upserts the resulting chart documents. Bucket maps sit
//! behind a mutex; the two jobs whose reduction threads running state from
//! block to block (inter-block time) pass that state through ring tokens.

use alloy::primitives::U256;
use atlas_store::Store;
use atlas_types::{Block, LineChart, MLineChart};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use futures::StreamExt;
use parking_lot::Mutex;
use std::{
    collections::{BTreeMap, HashMap},
    fmt,
    sync::Arc,
    time::Instant,
};
use tracing::{debug, error};

use crate::{ring::Ring, SnapshotsConfig};

/// Workers in flight per aggregation pass.
const CHART_ROUTINES: usize = 10;

/// Blocks per rolling blocktime window.
const BLOCKTIME_WINDOW: u32 = 88;

/// Days of history the rolling blocktime chart covers.
const BLOCKTIME_DAYS: u32 = 365;

const DAY_FORMAT: &str = "%-d/%m/%y";
const DAY_PARSE_FORMAT: &str = "%d/%m/%y";
const STAMP_FORMAT: &str = "%-d/%m/%y %H:%M:%S";
const STAMP_PARSE_FORMAT: &str = "%d/%m/%y %H:%M:%S";

/// Runs the chart jobs and the per-asset supply snapshots over the stored
/// history.
pub struct Aggregator {
    pub(crate) store: Arc<dyn Store>,
    pub(crate) snapshots: SnapshotsConfig,
}

#[derive(Debug, Clone, Default)]
struct BlockAgg {
    gas_price: U256,
    gas_limit: U256,
    difficulty: U256,
    blocktime: u64,
    blocks: u64,
}

/// Rolling state of the blocktime chart, threaded through ring tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
struct BlocktimeWindow {
    remaining: u32,
    stamp: String,
    prev: u64,
}

impl BlocktimeWindow {
    fn fresh(prev: u64) -> Self {
        Self { remaining: BLOCKTIME_WINDOW, stamp: String::new(), prev }
    }
}

impl Aggregator {
    /// Builds an aggregator over the store.
    pub fn new(store: Arc<dyn Store>, snapshots: SnapshotsConfig) -> Self {
        Self { store, snapshots }
    }

    /// Runs every aggregation job once.
    pub async fn run(&self) {
        self.chart_txns().await;
        self.chart_blocks().await;
        self.chart_blocktime().await;
        self.chart_mined_blocks().await;
        self.coin_snapshot().await;
        for token in self.snapshots.tokens.clone() {
            self.token_snapshot(&token).await;
        }
    }

    /// Daily transaction counts.
    async fn chart_txns(&self) {
        let start = Instant::now();
        debug!("start txns chart pass");

        let mut buckets: HashMap<String, u64> = HashMap::new();
        let mut stream = self.store.txns_in_window(0);
        while let Some(tx) = stream.next().await {
            match tx {
                Ok(tx) => *buckets.entry(day_key(tx.timestamp)).or_default() += 1,
                Err(e) => {
                    error!(%e, "error iterating transactions");
                    return;
                }
            }
        }

        let labels = sorted_keys(buckets.keys(), DAY_PARSE_FORMAT);
        let values = labels.iter().map(|label| buckets[label].to_string()).collect();
        self.upsert_line(LineChart { chart: "txns".into(), labels, values }).await;

        debug!(elapsed = ?start.elapsed(), "end txns chart pass");
    }

    /// Daily block metric means: gas price, gas limit, difficulty, hashrate
    /// and blocktime, all from one pass over the block history. The
    /// inter-block interval needs the previous block's timestamp, which
    /// rides the ring token.
    async fn chart_blocks(&self) {
        let start = Instant::now();
        debug!("start blocks chart pass");

        let buckets: Arc<Mutex<HashMap<String, BlockAgg>>> = Arc::default();
        let mut ring: Ring<u64> = Ring::new(0);
        let mut stream = self.store.blocks_in_window(0);

        while let Some(block) = stream.next().await {
            let block = match block {
                Ok(block) => block,
                Err(e) => {
                    error!(%e, "error iterating blocks");
                    return;
                }
            };
            let buckets = Arc::clone(&buckets);
            ring.enqueue(move |mut handoff| async move {
                let prev = handoff.recv().await.unwrap_or(0);
                let timestamp = block.timestamp;

                let mut buckets = buckets.lock();
                let agg = buckets.entry(day_key(timestamp)).or_default();
                agg.gas_price += block.avg_gas_price;
                agg.gas_limit += U256::from(block.gas_limit);
                agg.difficulty += block.difficulty;
                agg.blocktime += block_gap(prev, timestamp);
                agg.blocks += 1;
                drop(buckets);

                handoff.send(timestamp);
            });
            ring.throttle(CHART_ROUTINES).await;
        }
        ring.drain().await;

        let (labels, gas_price, gas_limit, difficulty, hashrate, blocktime) = {
            let buckets = buckets.lock();
            let labels = sorted_keys(buckets.keys(), DAY_PARSE_FORMAT);
            let mut gas_price = Vec::with_capacity(labels.len());
            let mut gas_limit = Vec::with_capacity(labels.len());
            let mut difficulty = Vec::with_capacity(labels.len());
            let mut hashrate = Vec::with_capacity(labels.len());
            let mut blocktime = Vec::with_capacity(labels.len());

            for label in &labels {
                let agg = &buckets[label];
                let blocks = U256::from(agg.blocks);
                let avg_difficulty = agg.difficulty / blocks;
                let avg_blocktime = agg.blocktime as f64 / agg.blocks as f64;

                gas_price.push((agg.gas_price / blocks).to_string());
                gas_limit.push((agg.gas_limit / blocks).to_string());
                difficulty.push(avg_difficulty.to_string());
                hashrate.push(format!("{:.0}", u256_to_f64(avg_difficulty) / avg_blocktime));
                blocktime.push(format!("{avg_blocktime:.2}"));
            }
            (labels, gas_price, gas_limit, difficulty, hashrate, blocktime)
        };

        for (chart, values) in [
            ("avggasprice", gas_price),
            ("gaslimit", gas_limit),
            ("difficulty", difficulty),
            ("hashrate", hashrate),
            ("blocktime", blocktime),
        ] {
            self.upsert_line(LineChart { chart: chart.into(), labels: labels.clone(), values })
                .await;
        }

        debug!(elapsed = ?start.elapsed(), "end blocks chart pass");
    }

    /// Mean inter-block interval per contiguous group of 88 blocks over the
    /// trailing year, labelled by the timestamp of each group's first block.
    /// The whole window state rides the ring token.
    async fn chart_blocktime(&self) {
        let start = Instant::now();
        debug!("start blocktime chart pass");

        let buckets: Arc<Mutex<HashMap<String, u64>>> = Arc::default();
        let mut ring: Ring<BlocktimeWindow> = Ring::new(BlocktimeWindow::fresh(0));
        let mut stream = self.store.blocks_in_window(BLOCKTIME_DAYS);

        while let Some(block) = stream.next().await {
            let block = match block {
                Ok(block) => block,
                Err(e) => {
                    error!(%e, "error iterating blocks");
                    return;
                }
            };
            let buckets = Arc::clone(&buckets);
            ring.enqueue(move |mut handoff| async move {
                let timestamp = block.timestamp;
                let mut window =
                    handoff.recv().await.unwrap_or_else(|| BlocktimeWindow::fresh(0));
                if window.remaining == BLOCKTIME_WINDOW {
                    window.stamp = stamp_key(timestamp);
                }

                *buckets.lock().entry(window.stamp.clone()).or_default() +=
                    block_gap(window.prev, timestamp);

                let next = if window.remaining == 0 {
                    BlocktimeWindow::fresh(timestamp)
                } else {
                    BlocktimeWindow {
                        remaining: window.remaining - 1,
                        stamp: window.stamp,
                        prev: timestamp,
                    }
                };
                handoff.send(next);
            });
            ring.throttle(CHART_ROUTINES).await;
        }
        ring.drain().await;

        let (labels, values) = {
            let buckets = buckets.lock();
            let labels = sorted_keys(buckets.keys(), STAMP_PARSE_FORMAT);
            let values = labels
                .iter()
                .map(|label| format!("{:.2}", buckets[label] as f64 / f64::from(BLOCKTIME_WINDOW)))
                .collect();
            (labels, values)
        };

        self.upsert_line(LineChart { chart: "blocktime88".into(), labels, values }).await;

        debug!(elapsed = ?start.elapsed(), "end blocktime chart pass");
    }

    /// Per-miner daily block counts plus a `total` series.
    async fn chart_mined_blocks(&self) {
        let start = Instant::now();
        debug!("start mined blocks chart pass");

        let mut buckets: HashMap<String, HashMap<String, u64>> = HashMap::new();
        let mut stream = self.store.blocks_in_window(0);
        while let Some(block) = stream.next().await {
            match block {
                Ok(block) => {
                    let day = buckets.entry(day_key(block.timestamp)).or_default();
                    *day.entry(miner_key(&block)).or_default() += 1;
                }
                Err(e) => {
                    error!(%e, "error iterating blocks");
                    return;
                }
            }
        }

        let labels = sorted_keys(buckets.keys(), DAY_PARSE_FORMAT);
        let mut values: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (index, label) in labels.iter().enumerate() {
            let day = &buckets[label];
            let mut total = 0u64;
            for (miner, count) in day {
                total += count;
                values
                    .entry(miner.clone())
                    .or_insert_with(|| vec!["0".to_string(); labels.len()])[index] =
                    count.to_string();
            }
            values
                .entry("total".to_string())
                .or_insert_with(|| vec!["0".to_string(); labels.len()])[index] =
                total.to_string();
        }

        let chart = MLineChart { chart: "minedblocks".into(), labels, values };
        if let Err(e) = self.store.add_ml_chart(&chart).await {
            error!(%e, chart = %chart.chart, "error upserting chart");
        }

        debug!(elapsed = ?start.elapsed(), "end mined blocks chart pass");
    }

    pub(crate) async fn upsert_line(&self, chart: LineChart) {
        if let Err(e) = self.store.add_line_chart(&chart).await {
            error!(%e, chart = %chart.chart, "error upserting chart");
        }
    }
}

impl fmt::Debug for Aggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Aggregator").field("snapshots", &self.snapshots).finish_non_exhaustive()
    }
}

fn day_key(timestamp: u64) -> String {
    DateTime::<Utc>::from_timestamp(timestamp as i64, 0)
        .map(|t| t.format(DAY_FORMAT).to_string())
        .unwrap_or_default()
}

fn stamp_key(timestamp: u64) -> String {
    DateTime::<Utc>::from_timestamp(timestamp as i64, 0)
        .map(|t| t.format(STAMP_FORMAT).to_string())
        .unwrap_or_default()
}

/// Sorts bucket labels chronologically; the labels are formatted dates, so
/// lexicographic order would interleave months.
fn sorted_keys<'a>(keys: impl Iterator<Item = &'a String>, format: &str) -> Vec<String> {
    let mut labels: Vec<String> = keys.cloned().collect();
    if format == STAMP_PARSE_FORMAT {
        labels.sort_by_key(|label| {
            NaiveDateTime::parse_from_str(label, format).unwrap_or(NaiveDateTime::MIN)
        });
    } else {
        labels.sort_by_key(|label| {
            NaiveDate::parse_from_str(label, format).unwrap_or(NaiveDate::MIN)
        });
    }
    labels
}

/// Interval between two adjacent blocks of an ascending cursor; the first
/// block of a pass counts as one second.
const fn block_gap(prev: u64, timestamp: u64) -> u64 {
    if prev == 0 {
        1
    } else {
        timestamp.saturating_sub(prev)
    }
}

fn u256_to_f64(value: U256) -> f64 {
    value.to_string().parse().unwrap_or_default()
}

fn miner_key(block: &Block) -> String {
    block.miner.to_string().to_lowercase()
}
