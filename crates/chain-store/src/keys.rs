//! `PartitionKey`/`RowKey` pairs (component C5).
//!
//! Every row in every table is addressed by a `(PartitionKey, RowKey)` pair.
//! Positional rows (a transaction's vins/outputs) use a row key that is
//! strictly 20 decimal digits, zero-padded, so lexicographic order matches
//! numeric order when a backend iterates a partition's rows in key order.

use chain_core::codec::Hash32;
use chain_core::constants::ROW_KEY_DIGITS;

/// The `block` table's two partitions: the tip sentinel and the append-only
/// history of every accepted block.
pub const PARTITION_CURRENT: &str = "CURRENT";
pub const PARTITION_HISTORY: &str = "HISTORY";

/// A table partition key: `"CURRENT"`/`"HISTORY"` for `block`, a block hash
/// for `transaction`, or a txid for `transaction_vin`/`transaction_output`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PartitionKey(pub String);

/// A table row key: the tip sentinel, a block hash, a txid, or a zero-padded
/// positional index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowKey(pub String);

impl PartitionKey {
    pub fn current() -> Self {
        Self(PARTITION_CURRENT.to_string())
    }

    pub fn history() -> Self {
        Self(PARTITION_HISTORY.to_string())
    }

    pub fn hash(hash: &Hash32) -> Self {
        Self(hash.to_hex())
    }
}

impl RowKey {
    pub fn sentinel() -> Self {
        Self(sentinel_hex())
    }

    pub fn hash(hash: &Hash32) -> Self {
        Self(hash.to_hex())
    }

    /// 20-digit zero-padded decimal encoding of a positional index.
    pub fn position(n: u32) -> Self {
        Self(format!("{:0width$}", n, width = ROW_KEY_DIGITS))
    }
}

fn sentinel_hex() -> String {
    "00".repeat(32)
}
