//! Document and wire types for the atlas chain indexer.
//!
//! The indexer materializes chain data into document collections. This crate
//! defines the stored document shapes (blocks, transactions, token transfers,
//! uncles, supply ledger entries, charts), the wire shapes delivered by the
//! JSON-RPC node, and the conversions between them. Quantities that can
//! overflow 64 bits are carried as [`alloy::primitives::U256`] and cross the
//! store boundary as base-10 decimal strings; addresses and hashes cross it
//! as lowercase `0x` hex.

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

pub mod collections;

pub mod genesis;

mod models;
pub use models::{
    Block, ChartDoc, LineChart, MLineChart, SupplyBlock, SysStore, TokenTransfer, Transaction,
    TxLog, Uncle, SYNC_CAUGHT_UP, SYNC_FRESH, SYNC_SYMBOL,
};

pub mod quantity;

mod transfer;
pub use transfer::TRANSFER_SELECTOR;

mod wire;
pub use wire::{RawBlock, RawReceipt, RawTransaction, RawUncle};
