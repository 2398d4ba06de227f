use serde::{Deserialize, Serialize};

/// Connection parameters for an external document store.
///
/// [`crate::MemStore`] carries its documents in process and only logs these
/// values; a networked [`crate::Store`] implementation dials with them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Username, empty for unauthenticated stores.
    #[serde(default)]
    pub user: String,
    /// Password, empty for unauthenticated stores.
    #[serde(default)]
    pub password: String,
    /// Database name.
    pub database: String,
    /// Host and port of the store.
    pub address: String,
}
