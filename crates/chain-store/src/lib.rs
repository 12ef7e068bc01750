//! Partitioned key/value persistence adapter for the chain engine core
//! (component C5).

pub mod error;
pub mod keys;
pub mod memory;
pub mod record;
pub mod rocks;
pub mod traits;

pub use error::StoreError;
pub use keys::{PartitionKey, RowKey};
pub use memory::MemoryStore;
pub use record::{BlockRecord, TransactionRecord};
pub use rocks::RocksStore;
pub use traits::ChainStore;
