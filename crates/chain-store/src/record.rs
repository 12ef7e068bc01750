//! Row shapes for the `block` and `transaction` tables.
//!
//! `transaction_vin`/`transaction_output` rows are the engine's own
//! [`chain_core::types::TxIn`]/[`chain_core::types::TxOut`] values; those
//! types already carry the denormalized fields (`n`, `spent_txid`,
//! `block_hash`, …) a row needs, so no separate row type is defined for them.

use serde::{Deserialize, Serialize};

use chain_core::codec::Hash32;

/// A `block` table row: header fields plus height. Transactions are not
/// materialized here — they live in the `transaction` table, keyed by this
/// block's hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRecord {
    pub hash: Hash32,
    pub previous_hash: Hash32,
    pub merkle_root: Hash32,
    pub height: u16,
    pub version: u32,
    pub timestamp: u32,
    pub nonce: u32,
    pub bits: u32,
}

/// A `transaction` table row: header-level transaction fields. Vins and
/// outputs are reassembled from their own tables by `txid`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub txid: Hash32,
    pub version: u32,
    pub locktime: u32,
    pub fee: u64,
    pub block_hash: Hash32,
    pub block_height: u32,
}
