use alloy::primitives::B256;
use async_trait::async_trait;
use atlas_types::{RawBlock, RawReceipt, RawUncle};

use crate::RpcError;

/// The node capabilities the crawlers depend on.
#[async_trait]
pub trait Rpc: Send + Sync + 'static {
    /// Height of the chain tip.
    async fn latest_block_number(&self) -> Result<u64, RpcError>;

    /// The block at `height` with full transaction objects.
    async fn block_by_height(&self, height: u64) -> Result<RawBlock, RpcError>;

    /// The block with `hash` with full transaction objects.
    async fn block_by_hash(&self, hash: B256) -> Result<RawBlock, RpcError>;

    /// The `index`-th uncle of the block at `height`.
    async fn uncle_by_block_number_and_index(
        &self,
        height: u64,
        index: usize,
    ) -> Result<RawUncle, RpcError>;

    /// The receipt of the transaction with `hash`.
    async fn tx_receipt(&self, hash: B256) -> Result<RawReceipt, RpcError>;

    /// Round-trips the node.
    async fn ping(&self) -> Result<(), RpcError>;
}
