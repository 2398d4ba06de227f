/// Errors surfaced by [`crate::Store`] implementations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No document matched the query.
    #[error("document not found")]
    NotFound,
    /// An insert collided with a unique index. Crawler ticks racing over the
    /// same height hit this; callers treat it as benign.
    #[error("duplicate key in {collection}: {key}")]
    DuplicateKey {
        /// Collection whose unique index rejected the write.
        collection: &'static str,
        /// Rendering of the offending key.
        key: String,
    },
    /// The sync record is missing; [`crate::Store::init`] has not run.
    #[error("store is not initialized")]
    Uninitialized,
    /// The backend itself failed.
    #[error("store backend: {0}")]
    Backend(String),
}

impl StoreError {
    /// Whether this is a missing-document read.
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }

    /// Whether this is a unique-index collision.
    pub const fn is_duplicate(&self) -> bool {
        matches!(self, Self::DuplicateKey { .. })
    }
}
