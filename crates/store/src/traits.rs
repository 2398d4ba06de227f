use alloy::primitives::{Address, B256};
use async_trait::async_trait;
use atlas_types::{
    Block, ChartDoc, LineChart, MLineChart, SupplyBlock, SysStore, TokenTransfer, Transaction,
    Uncle,
};
use futures::stream::BoxStream;

use crate::{StoreError, SyncType};

/// A streaming cursor over one collection.
pub type DocStream<T> = BoxStream<'static, Result<T, StoreError>>;

/// The store capabilities the crawlers and the read API depend on.
///
/// Implementations are internally concurrency-safe; the only globally
/// contended document is the sync record, which every writer addresses
/// through its `symbol == "sync"` filter.
#[async_trait]
pub trait Store: Send + Sync + 'static {
    /// Whether no sync record exists yet.
    async fn is_first_run(&self) -> Result<bool, StoreError>;

    /// Seeds the store: the sync record at the fresh sentinel, the genesis
    /// block, and the baseline supply records for `coin_symbol`.
    async fn init(&self, coin_symbol: &str) -> Result<(), StoreError>;

    /// Round-trips the backend.
    async fn ping(&self) -> Result<(), StoreError>;

    /// Reads the sync head from the sync record.
    async fn index_head(&self) -> Result<[u64; 1], StoreError>;

    /// Advances the sync head for a committed block according to the crawl
    /// mode; see [`SyncType`].
    async fn update_store(&self, block: &Block, sync_type: SyncType) -> Result<(), StoreError>;

    /// Whether the canonical block at `height` is stored. Height 0 is always
    /// present.
    async fn is_present(&self, height: u64) -> Result<bool, StoreError>;

    /// Presence and hash agreement of the block at `height` in a single
    /// round trip: `(present, mismatched)`.
    async fn is_in_db(&self, height: u64, hash: B256) -> Result<(bool, bool), StoreError>;

    /// Reads the canonical block at `height`.
    async fn get_block(&self, height: u64) -> Result<Block, StoreError>;

    /// Bulk-removes the block at `height` along with its transactions, token
    /// transfers and uncles. Absent documents are ignored.
    async fn purge(&self, height: u64) -> Result<(), StoreError>;

    /// Inserts a canonical block.
    async fn add_block(&self, block: &Block) -> Result<(), StoreError>;

    /// Inserts a transaction.
    async fn add_transaction(&self, tx: &Transaction) -> Result<(), StoreError>;

    /// Inserts a token transfer.
    async fn add_token_transfer(&self, transfer: &TokenTransfer) -> Result<(), StoreError>;

    /// Inserts an uncle.
    async fn add_uncle(&self, uncle: &Uncle) -> Result<(), StoreError>;

    /// Inserts a superseded block into the forked-blocks audit collection.
    async fn add_forked_block(&self, block: &Block) -> Result<(), StoreError>;

    /// Appends one entry to the supply ledger.
    async fn add_supply_block(&self, supply_block: &SupplyBlock) -> Result<(), StoreError>;

    /// Upserts a single-series chart on its `chart` key.
    async fn add_line_chart(&self, chart: &LineChart) -> Result<(), StoreError>;

    /// Upserts a multi-series chart on its `chart` key.
    async fn add_ml_chart(&self, chart: &MLineChart) -> Result<(), StoreError>;

    /// The highest supply ledger entry.
    async fn latest_supply_block(&self) -> Result<SupplyBlock, StoreError>;

    /// The supply ledger entry at `height`.
    async fn supply_block_by_number(&self, height: u64) -> Result<SupplyBlock, StoreError>;

    /// Removes the supply ledger entry at `height`; absent entries are
    /// ignored.
    async fn remove_supply_block(&self, height: u64) -> Result<(), StoreError>;

    /// Reads the per-asset supply snapshot for `symbol`.
    async fn supply_object(&self, symbol: &str) -> Result<SysStore, StoreError>;

    /// Upserts the per-asset supply snapshot for `symbol`.
    async fn update_supply(&self, symbol: &str, snapshot: &SysStore) -> Result<(), StoreError>;

    /// The status document served by the read API: the coin supply snapshot
    /// when one exists, the sync record otherwise.
    async fn store_status(&self) -> Result<SysStore, StoreError>;

    /// The canonical block at `number`.
    async fn block_by_number(&self, number: u64) -> Result<Block, StoreError>;

    /// The canonical block with `hash`.
    async fn block_by_hash(&self, hash: B256) -> Result<Block, StoreError>;

    /// The highest stored block.
    async fn latest_block(&self) -> Result<Block, StoreError>;

    /// The `limit` highest stored blocks, descending.
    async fn latest_blocks(&self, limit: usize) -> Result<Vec<Block>, StoreError>;

    /// The `limit` most recent forked blocks, descending by height.
    async fn latest_forked_blocks(&self, limit: usize) -> Result<Vec<Block>, StoreError>;

    /// The transaction with `hash`.
    async fn transaction_by_hash(&self, hash: B256) -> Result<Transaction, StoreError>;

    /// The `limit` most recent transactions, descending by height.
    async fn latest_transactions(&self, limit: usize) -> Result<Vec<Transaction>, StoreError>;

    /// The 25 most recent transactions sent or received by `account`.
    async fn latest_transactions_by_account(
        &self,
        account: Address,
    ) -> Result<Vec<Transaction>, StoreError>;

    /// The `limit` most recent token transfers, descending by height.
    async fn latest_token_transfers(
        &self,
        limit: usize,
    ) -> Result<Vec<TokenTransfer>, StoreError>;

    /// The 25 most recent token transfers sent or received by `account`.
    async fn latest_token_transfers_by_account(
        &self,
        account: Address,
    ) -> Result<Vec<TokenTransfer>, StoreError>;

    /// The `limit` most recent uncles, descending by canonical height.
    async fn latest_uncles(&self, limit: usize) -> Result<Vec<Uncle>, StoreError>;

    /// The uncle with `hash`.
    async fn uncle_by_hash(&self, hash: B256) -> Result<Uncle, StoreError>;

    /// Number of transactions sent or received by `account`.
    async fn txn_count(&self, account: Address) -> Result<u64, StoreError>;

    /// Total number of stored transactions.
    async fn total_txn_count(&self) -> Result<u64, StoreError>;

    /// Number of token transfers sent or received by `account`.
    async fn token_transfer_count(&self, account: Address) -> Result<u64, StoreError>;

    /// Total number of stored blocks.
    async fn total_block_count(&self) -> Result<u64, StoreError>;

    /// Total number of stored forked blocks.
    async fn total_forked_count(&self) -> Result<u64, StoreError>;

    /// Total number of stored token transfers.
    async fn total_token_transfer_count(&self) -> Result<u64, StoreError>;

    /// Total number of stored uncles.
    async fn total_uncle_count(&self) -> Result<u64, StoreError>;

    /// The chart document with key `chart`; single-series charts are
    /// truncated to their trailing `limit` samples when `limit` is nonzero.
    async fn chart_data(&self, chart: &str, limit: usize) -> Result<ChartDoc, StoreError>;

    /// Cursor over blocks whose timestamps fall in the trailing `days`
    /// window (`0` = since genesis), ascending by height.
    fn blocks_in_window(&self, days: u32) -> DocStream<Block>;

    /// Cursor over transactions whose timestamps fall in the trailing `days`
    /// window (`0` = since genesis), ascending by height.
    fn txns_in_window(&self, days: u32) -> DocStream<Transaction>;

    /// Cursor over blocks above `height`, ascending.
    fn blocks_from(&self, height: u64) -> DocStream<Block>;

    /// Cursor over transfers of `contract` tokens sent by `source` after the
    /// `after` timestamp, ascending.
    fn token_transfers_between(
        &self,
        contract: Address,
        source: Address,
        after: i64,
    ) -> DocStream<TokenTransfer>;
}
