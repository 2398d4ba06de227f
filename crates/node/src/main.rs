//! The atlas indexer process.
//!
//! Wires the configured services over one shared store and node client: the
//! main block crawler, the supply crawler, and the read API. Each starts
//! independently from its `enabled` flag; startup failures are fatal,
//! anything later is logged and retried by the owning service.

#![deny(unused_must_use, rust_2018_idioms)]

mod config;

use atlas_crawler::{Crawler, SupplyCrawler};
use atlas_rpc::{Rpc, RpcClient};
use atlas_store::{MemStore, Store};
use clap::Parser;
use config::Config;
use std::{path::PathBuf, sync::Arc};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Chain indexer: block crawler, supply ledger and read API.
#[derive(Debug, Parser)]
#[command(name = "atlas", version)]
struct Args {
    /// Path to the JSON config file.
    config: PathBuf,
}

fn main() -> eyre::Result<()> {
    init_tracing();

    let args = Args::parse();
    info!(config = %args.config.display(), "loading config");
    let config = Config::load(&args.config)?;

    let mut builder = tokio::runtime::Builder::new_multi_thread();
    if config.threads > 0 {
        info!(threads = config.threads, "sizing runtime");
        builder.worker_threads(config.threads);
    }
    builder.enable_all().build()?.block_on(run(config))
}

/// `DEBUG=1` turns on verbose logs; `RUST_LOG` overrides entirely.
fn init_tracing() {
    let default = if std::env::var("DEBUG").map(|v| v == "1").unwrap_or(false) {
        "debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn run(config: Config) -> eyre::Result<()> {
    let store: Arc<dyn Store> = Arc::new(MemStore::open(&config.mongo));
    store.ping().await?;

    let rpc: Arc<dyn Rpc> = Arc::new(RpcClient::new(&config.rpc)?);

    let mut running = false;

    if config.crawler.enabled {
        let crawler = Crawler::new(
            Arc::clone(&store),
            Arc::clone(&rpc),
            config.crawler.clone(),
            config.snapshots(),
        );
        crawler.start().await?;
        running = true;
    }

    if config.subq.enabled {
        let supply = SupplyCrawler::new(
            Arc::clone(&store),
            Arc::clone(&rpc),
            config.subq.clone(),
            config.coin.symbol.clone(),
        );
        supply.start().await?;
        running = true;
    }

    if config.api.enabled {
        let store = Arc::clone(&store);
        let api_config = config.api.clone();
        tokio::spawn(async move {
            if let Err(e) = atlas_api::serve(store, &api_config).await {
                error!(%e, "api server failed");
            }
        });
        running = true;
    }

    if !running {
        eyre::bail!("nothing enabled in config: turn on crawler, subq, or api");
    }

    info!("atlas is running");
    tokio::signal::ctrl_c().await?;
    info!("shutting down");
    Ok(())
}
