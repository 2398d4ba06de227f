use serde::{Deserialize, Serialize};

/// Listener settings of the read API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Whether the API serves at all.
    pub enabled: bool,
    /// TCP port to listen on.
    pub port: String,
}
