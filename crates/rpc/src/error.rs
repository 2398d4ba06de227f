/// Errors surfaced by the JSON-RPC client.
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    /// The HTTP round trip failed (dial, timeout, or bad transport).
    #[error("rpc transport: {0}")]
    Transport(#[from] reqwest::Error),
    /// The node answered with an error object.
    #[error("rpc node error {code}: {message}")]
    Node {
        /// JSON-RPC error code.
        code: i64,
        /// Human-readable message from the node.
        message: String,
    },
    /// The node answered `null` where a document was expected, e.g. a block
    /// beyond the tip.
    #[error("rpc result is null")]
    NullResult,
    /// The node answered with something the wire types cannot decode.
    #[error("rpc decode: {0}")]
    Decode(String),
    /// The endpoint URL is malformed.
    #[error("rpc url: {0}")]
    Url(#[from] url::ParseError),
}

impl RpcError {
    /// Whether the failure is a missing document rather than a broken node.
    pub const fn is_null_result(&self) -> bool {
        matches!(self, Self::NullResult)
    }
}
