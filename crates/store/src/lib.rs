//! Storage for the atlas chain indexer.
//!
//! The crawlers and the read API depend on the narrow [`Store`] capability
//! trait; this crate also ships [`MemStore`], a thread-safe in-memory
//! document backend with the same collection semantics an external document
//! store provides: unique indexes surface duplicate-key errors, absent
//! documents surface [`StoreError::NotFound`], purges are bulk and
//! idempotent, and chart writes are upserts.

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

mod config;
pub use config::StoreConfig;

mod error;
pub use error::StoreError;

mod mem;
pub use mem::MemStore;

mod sync_type;
pub use sync_type::SyncType;

mod traits;
pub use traits::{DocStream, Store};

mod window;
pub use window::day_window;
