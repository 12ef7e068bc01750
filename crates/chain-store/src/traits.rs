//! The `ChainStore` trait: the persistence contract the chain/mempool engine
//! is built against (component C5).
//!
//! Every method maps to one `(PartitionKey, RowKey)` operation (or a small
//! set of them) from the table layout: `get`, `query`, `create`/`upsert`,
//! `delete`. Concrete backends ([`crate::memory::MemoryStore`],
//! [`crate::rocks::RocksStore`]) differ only in how they persist rows, never
//! in this contract.

use chain_core::codec::Hash32;
use chain_core::types::{TxIn, TxOut};

use crate::error::StoreError;
use crate::record::{BlockRecord, TransactionRecord};

pub trait ChainStore: Send + Sync {
    /// The `(CURRENT, 0×64)` tip sentinel.
    fn get_tip(&self) -> Result<Option<BlockRecord>, StoreError>;
    fn put_tip(&self, record: &BlockRecord) -> Result<(), StoreError>;
    fn delete_tip(&self) -> Result<(), StoreError>;

    /// The `(HISTORY, block_hash)` row.
    fn get_block_history(&self, hash: &Hash32) -> Result<Option<BlockRecord>, StoreError>;
    fn put_block_history(&self, record: &BlockRecord) -> Result<(), StoreError>;
    fn delete_block_history(&self, hash: &Hash32) -> Result<(), StoreError>;

    /// Point read of a `transaction` row by `txid`, independent of which
    /// block partition it lives under.
    fn get_transaction(&self, txid: &Hash32) -> Result<Option<TransactionRecord>, StoreError>;
    fn put_transaction(&self, record: &TransactionRecord) -> Result<(), StoreError>;
    fn delete_transaction(&self, txid: &Hash32) -> Result<(), StoreError>;
    fn query_transactions_by_block(&self, block_hash: &Hash32) -> Result<Vec<TransactionRecord>, StoreError>;
    /// All rows tagged with the mempool sentinel `block_hash`.
    fn query_mempool_transactions(&self) -> Result<Vec<TransactionRecord>, StoreError>;

    fn get_vins(&self, txid: &Hash32) -> Result<Vec<TxIn>, StoreError>;
    fn put_vin(&self, txid: &Hash32, vin: &TxIn) -> Result<(), StoreError>;
    fn delete_vins(&self, txid: &Hash32) -> Result<(), StoreError>;
    /// Spent-check: the vin (if any) that references `(utxo_txid, utxo_vout)`.
    fn find_spending_vin(&self, utxo_txid: &Hash32, utxo_vout: u32) -> Result<Option<TxIn>, StoreError>;

    fn get_output(&self, txid: &Hash32, vout: u32) -> Result<Option<TxOut>, StoreError>;
    fn get_outputs(&self, txid: &Hash32) -> Result<Vec<TxOut>, StoreError>;
    fn put_output(&self, txid: &Hash32, output: &TxOut) -> Result<(), StoreError>;
    fn delete_outputs(&self, txid: &Hash32) -> Result<(), StoreError>;
}
