//! Reassembles `Block`/`Transaction` values from their store rows for read
//! endpoints. These are plain struct literals, not [`Transaction::new`]/
//! [`Block::new`] calls — the rows were already validated on write, and
//! re-running identifier recomputation on every read would be wasted work.

use chain_core::codec::Hash32;
use chain_core::types::{Block, Transaction};
use chain_store::{BlockRecord, ChainStore, TransactionRecord};

use crate::error::ChainError;

pub fn transaction_from_record(store: &dyn ChainStore, record: TransactionRecord) -> Result<Transaction, ChainError> {
    let vin = store.get_vins(&record.txid)?;
    let outputs = store.get_outputs(&record.txid)?;
    Ok(Transaction {
        txid: record.txid,
        version: record.version,
        locktime: record.locktime,
        fee: record.fee,
        vin,
        outputs,
        block_hash: record.block_hash,
        block_height: record.block_height,
    })
}

pub fn block_from_record(store: &dyn ChainStore, record: BlockRecord) -> Result<Block, ChainError> {
    let tx_records = store.query_transactions_by_block(&record.hash)?;
    let mut transactions: Vec<Transaction> =
        tx_records.into_iter().map(|r| transaction_from_record(store, r)).collect::<Result<_, _>>()?;
    // The transaction table doesn't persist in-block position; the only
    // ordering constraint the model cares about on reassembly is coinbase
    // first. Ties among non-coinbase transactions break by txid.
    transactions.sort_by(|a, b| match (a.is_coinbase(), b.is_coinbase()) {
        (true, false) => std::cmp::Ordering::Less,
        (false, true) => std::cmp::Ordering::Greater,
        _ => a.txid.to_hex().cmp(&b.txid.to_hex()),
    });
    Ok(Block {
        hash: record.hash,
        previous_hash: record.previous_hash,
        merkle_root: record.merkle_root,
        height: record.height,
        version: record.version,
        timestamp: record.timestamp,
        nonce: record.nonce,
        bits: record.bits,
        transactions,
    })
}

pub fn hash_from_query(raw: &str) -> Result<Hash32, ChainError> {
    Hash32::from_hex(raw).map_err(|_| ChainError::BadRequest(format!("{raw} is not a 64-hex-char id")))
}
