//! Mempool admission pipeline (component C7).
//!
//! Same per-input UTXO existence/spent-check/script evaluation as block
//! acceptance (§4.6), minus proof-of-work and the `bits`/subsidy checks,
//! plus a value-balance requirement across the whole transaction.

use chain_script::eval_script;
use chain_store::{ChainStore, TransactionRecord};

use chain_core::constants::{MEMPOOL_BLOCK_HASH_SENTINEL, MEMPOOL_BLOCK_HEIGHT_SENTINEL};
use chain_core::codec::Hash32;
use chain_core::types::Transaction;

use crate::error::EngineError;

/// Run §4.7 against `tx`: reject coinbase, resolve/check every input's
/// UTXO, verify its script with `timestamp = now`, enforce the value
/// balance, tag the mempool sentinels, and persist. Returns the
/// mempool-tagged transaction.
pub fn admit_to_mempool(
    store: &dyn ChainStore,
    mut tx: Transaction,
    now: i64,
) -> Result<Transaction, EngineError> {
    if tx.is_coinbase() {
        return Err(EngineError::CoinbaseInMempool);
    }

    let txid = tx.txid;
    let mut input_total: u64 = 0;

    for index in 0..tx.vin.len() {
        let (utxo_txid, utxo_vout) = (tx.vin[index].utxo_txid, tx.vin[index].utxo_vout);

        if store.find_spending_vin(&utxo_txid, utxo_vout)?.is_some() {
            return Err(EngineError::UtxoAlreadySpent { index, txid: utxo_txid.to_hex(), vout: utxo_vout });
        }

        let utxo = store
            .get_output(&utxo_txid, utxo_vout)?
            .ok_or(EngineError::MissingUtxo { index, txid: utxo_txid.to_hex(), vout: utxo_vout })?;

        let utxo_script_pubkey_bytes = utxo.script_pubkey.bytes();
        let script_sig_bytes = tx.vin[index].script_sig.bytes();
        eval_script(&script_sig_bytes, &utxo_script_pubkey_bytes, &tx, index, &utxo_script_pubkey_bytes, now)
            .map_err(|source| EngineError::ScriptFailed { index, source })?;

        input_total = input_total
            .checked_add(utxo.value)
            .ok_or(EngineError::ValueImbalance { inputs: u64::MAX, outputs_plus_fee: 0 })?;

        let input = &mut tx.vin[index];
        input.utxo_block_hash = utxo.block_hash;
        input.utxo_script_pubkey = Some(utxo.script_pubkey.hex.clone());
        input.utxo_value = Some(utxo.value);
        input.script_type = utxo.script_type;
        input.spent_txid = Some(txid);
        input.spent_block_hash = Some(Hash32::from_internal(MEMPOOL_BLOCK_HASH_SENTINEL));
    }

    let output_total: u64 = tx.outputs.iter().map(|o| o.value).sum();
    let outputs_plus_fee = output_total
        .checked_add(tx.fee)
        .ok_or(EngineError::ValueImbalance { inputs: input_total, outputs_plus_fee: u64::MAX })?;
    if input_total != outputs_plus_fee {
        return Err(EngineError::ValueImbalance { inputs: input_total, outputs_plus_fee });
    }

    tx.block_hash = Hash32::from_internal(MEMPOOL_BLOCK_HASH_SENTINEL);
    tx.block_height = MEMPOOL_BLOCK_HEIGHT_SENTINEL;

    for output in tx.outputs.iter_mut() {
        output.block_hash = Some(tx.block_hash);
        output.txid = Some(txid);
    }

    store.put_transaction(&TransactionRecord {
        txid: tx.txid,
        version: tx.version,
        locktime: tx.locktime,
        fee: tx.fee,
        block_hash: tx.block_hash,
        block_height: tx.block_height,
    })?;
    for vin in &tx.vin {
        store.put_vin(&tx.txid, vin)?;
    }
    for output in &tx.outputs {
        store.put_output(&tx.txid, output)?;
    }

    Ok(tx)
}
