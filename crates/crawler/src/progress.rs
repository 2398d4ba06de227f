//! Batched progress logging for crawler passes.
//!
//! Per-block log lines drown a fast sync, so workers push samples into a
//! channel and a logging task flushes one aggregate line every
//! [`FLUSH_BLOCKS`] blocks or [`FLUSH_SECS`] seconds, plus a final line when
//! the pass drains.

use alloy::primitives::U256;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::info;

const FLUSH_BLOCKS: u64 = 1000;
const FLUSH_SECS: u64 = 60;

/// One committed block's contribution to the progress line.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Sample {
    pub(crate) height: u64,
    pub(crate) txns: usize,
    pub(crate) transfers: usize,
    pub(crate) uncles: usize,
    pub(crate) minted: U256,
    pub(crate) supply: U256,
}

/// Handle workers record samples through; cloned into every worker of a
/// pass. The logging task flushes the remaining tail when the last handle
/// drops.
#[derive(Debug, Clone)]
pub(crate) struct Progress {
    tx: mpsc::UnboundedSender<Sample>,
}

#[derive(Debug, Default)]
struct Totals {
    blocks: u64,
    head: u64,
    txns: usize,
    transfers: usize,
    uncles: usize,
    minted: U256,
    supply: U256,
}

impl Totals {
    fn add(&mut self, sample: &Sample) {
        self.blocks += 1;
        self.head = sample.height;
        self.txns += sample.txns;
        self.transfers += sample.transfers;
        self.uncles += sample.uncles;
        self.minted += sample.minted;
        self.supply = sample.supply;
    }

    fn flush(&mut self, name: &str, started: Instant) {
        if self.blocks == 0 {
            return;
        }
        info!(
            crawler = name,
            blocks = self.blocks,
            head = self.head,
            txns = self.txns,
            transfers = self.transfers,
            uncles = self.uncles,
            minted = %self.minted,
            supply = %self.supply,
            elapsed = ?started.elapsed(),
            "indexed blocks"
        );
        *self = Self::default();
    }
}

impl Progress {
    /// Spawns the logging task for one pass.
    pub(crate) fn spawn(name: &'static str) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<Sample>();
        tokio::spawn(async move {
            let mut totals = Totals::default();
            let mut started = Instant::now();
            let mut ticker = tokio::time::interval(Duration::from_secs(FLUSH_SECS));
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            ticker.tick().await;
            loop {
                tokio::select! {
                    sample = rx.recv() => match sample {
                        Some(sample) => {
                            totals.add(&sample);
                            if totals.blocks >= FLUSH_BLOCKS {
                                totals.flush(name, started);
                                started = Instant::now();
                            }
                        }
                        None => {
                            totals.flush(name, started);
                            break;
                        }
                    },
                    _ = ticker.tick() => {
                        totals.flush(name, started);
                        started = Instant::now();
                    }
                }
            }
        });
        Self { tx }
    }

    /// Records one committed block.
    pub(crate) fn record(&self, sample: Sample) {
        let _ = self.tx.send(sample);
    }
}
