//! The HTTP read API: a thin query layer over the stored documents.
//!
//! Every endpoint is a GET; list endpoints clamp their `limit` segment to
//! [`MAX_LIMIT`] and answer `{"items": [...], "total": N}`; failures answer
//! `{"error": "..."}` with a matching status code.

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
pub use config::ApiConfig;

mod error;
pub use error::ApiError;

mod routes;
pub use routes::{router, serve, MAX_LIMIT};
