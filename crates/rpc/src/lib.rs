//! JSON-RPC access to the crawled node.
//!
//! The crawlers depend on the [`Rpc`] capability trait; [`RpcClient`] is the
//! production implementation, a thin typed layer over HTTP JSON-RPC. All
//! quantities cross this boundary as hex strings and are decoded into the
//! wire types of [`atlas_types`].

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

mod client;
pub use client::{RpcClient, RpcConfig};

mod error;
pub use error::RpcError;

mod traits;
pub use traits::Rpc;
