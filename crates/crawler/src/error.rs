use atlas_rpc::RpcError;
use atlas_store::StoreError;

/// Failures that abort a crawler at startup.
///
/// Mid-pass failures never surface here; they are logged and the pass
/// retries on the next tick.
#[derive(Debug, thiserror::Error)]
pub enum CrawlError {
    /// The node is unreachable or broken.
    #[error(transparent)]
    Rpc(#[from] RpcError),
    /// The store rejected initialization.
    #[error(transparent)]
    Store(#[from] StoreError),
}
