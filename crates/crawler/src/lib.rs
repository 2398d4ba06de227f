//! Block ingestion for the atlas chain indexer.
//!
//! Two cooperating state machines do the heavy lifting: the main
//! [`Crawler`] walks the chain backwards from the tip, persisting blocks,
//! transactions, token transfers and uncles and resolving reorgs by
//! purge-and-resync; the [`SupplyCrawler`] walks forward from the indexed
//! head, chaining per-block minted coin into a cumulative supply ledger.
//! Both are built on the [`ring`] module's handoff ring, which lets a
//! bounded number of workers fetch in parallel while their commit sections
//! run in strict height order. The [`Aggregator`] reduces the stored history
//! into chart documents and per-asset supply snapshots after each caught-up
//! pass.

#![warn(
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    clippy::missing_const_for_fn,
    rustdoc::all
)]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![deny(unused_must_use, rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

mod charts;
pub use charts::Aggregator;

mod config;
pub use config::{CoinConfig, CrawlConfig, SnapshotsConfig, TokenConfig};

mod crawler;
pub use crawler::{Crawler, CrawlerInner};

mod error;
pub use error::CrawlError;

mod progress;

pub mod ring;

mod snapshots;

mod state;
pub use state::CrawlState;

mod supply;
pub use supply::{SupplyCrawler, SupplyInner};
