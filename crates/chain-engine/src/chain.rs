//! Block acceptance pipeline (component C6).

use std::collections::HashSet;

use chain_core::codec::Hash32;
use chain_core::types::{Block, Transaction, TxOut};
use chain_script::eval_script;
use chain_store::{BlockRecord, ChainStore, TransactionRecord};

use crate::config::EngineConfig;
use crate::error::EngineError;

/// Run §4.6 against `block`: validate linkage, `bits`, subsidy, every
/// input's UTXO existence/spent-check/script, then persist. Returns the
/// accepted block with `height` populated on it and on every transaction.
pub fn create_block(store: &dyn ChainStore, config: &EngineConfig, mut block: Block) -> Result<Block, EngineError> {
    let tip = store.get_tip()?;

    let height = match &tip {
        None => {
            if !block.previous_hash.is_zero() {
                return Err(EngineError::NoTipAndNotGenesis);
            }
            0u16
        }
        Some(tip) => {
            if block.previous_hash != tip.hash {
                return Err(EngineError::PreviousHashMismatch {
                    supplied: block.previous_hash.to_hex(),
                    tip: tip.hash.to_hex(),
                });
            }
            tip.height + 1
        }
    };

    if block.bits != config.bits {
        return Err(EngineError::BitsMismatch { supplied: block.bits, configured: config.bits });
    }

    // Outputs created earlier in this same block, visible to later inputs
    // before any row is persisted.
    let mut in_block_outputs: std::collections::HashMap<(Hash32, u32), TxOut> = std::collections::HashMap::new();
    let mut in_block_spent: HashSet<(Hash32, u32)> = HashSet::new();

    for tx in block.transactions.iter_mut() {
        if tx.is_coinbase() {
            let subsidy = tx.outputs[0].value;
            if subsidy != config.subsidy {
                return Err(EngineError::SubsidyMismatch { supplied: subsidy, configured: config.subsidy });
            }
        } else {
            validate_and_denormalize_inputs(
                store,
                tx,
                block.hash,
                block.timestamp as i64,
                &mut in_block_outputs,
                &mut in_block_spent,
            )?;
        }

        let txid = tx.txid;
        for output in tx.outputs.iter_mut() {
            output.block_hash = Some(block.hash);
            output.txid = Some(txid);
            let n = output.n.expect("constructed transactions always assign output positions");
            in_block_outputs.insert((txid, n), output.clone());
        }

        tx.block_hash = block.hash;
        tx.block_height = height as u32;
    }

    block.height = height;

    persist_block(store, &block)?;

    Ok(block)
}

fn validate_and_denormalize_inputs(
    store: &dyn ChainStore,
    tx: &mut Transaction,
    block_hash: Hash32,
    timestamp: i64,
    in_block_outputs: &mut std::collections::HashMap<(Hash32, u32), TxOut>,
    in_block_spent: &mut HashSet<(Hash32, u32)>,
) -> Result<(), EngineError> {
    let txid = tx.txid;
    for index in 0..tx.vin.len() {
        let (utxo_txid, utxo_vout) = (tx.vin[index].utxo_txid, tx.vin[index].utxo_vout);

        if in_block_spent.contains(&(utxo_txid, utxo_vout))
            || store.find_spending_vin(&utxo_txid, utxo_vout)?.is_some()
        {
            return Err(EngineError::UtxoAlreadySpent { index, txid: utxo_txid.to_hex(), vout: utxo_vout });
        }

        let utxo = match in_block_outputs.get(&(utxo_txid, utxo_vout)) {
            Some(output) => output.clone(),
            None => store
                .get_output(&utxo_txid, utxo_vout)?
                .ok_or(EngineError::MissingUtxo { index, txid: utxo_txid.to_hex(), vout: utxo_vout })?,
        };

        let utxo_script_pubkey_bytes = utxo.script_pubkey.bytes();

        let script_sig_bytes = tx.vin[index].script_sig.bytes();
        eval_script(&script_sig_bytes, &utxo_script_pubkey_bytes, tx, index, &utxo_script_pubkey_bytes, timestamp)
            .map_err(|source| EngineError::ScriptFailed { index, source })?;

        let input = &mut tx.vin[index];
        input.utxo_block_hash = utxo.block_hash;
        input.utxo_script_pubkey = Some(utxo.script_pubkey.hex.clone());
        input.utxo_value = Some(utxo.value);
        input.script_type = utxo.script_type;
        input.spent_txid = Some(txid);
        input.spent_block_hash = Some(block_hash);

        in_block_spent.insert((utxo_txid, utxo_vout));
    }
    Ok(())
}

fn persist_block(store: &dyn ChainStore, block: &Block) -> Result<(), EngineError> {
    let record = BlockRecord {
        hash: block.hash,
        previous_hash: block.previous_hash,
        merkle_root: block.merkle_root,
        height: block.height,
        version: block.version,
        timestamp: block.timestamp,
        nonce: block.nonce,
        bits: block.bits,
    };

    store.put_tip(&record)?;
    store.put_block_history(&record)?;

    for tx in &block.transactions {
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
    }

    Ok(())
}

/// Run the `delete_block` operation: remove the target block's
/// transactions/vins/outputs and its `HISTORY` row, rewinding the `CURRENT`
/// sentinel to the previous block (or clearing it if the target is
/// genesis).
pub fn delete_block(store: &dyn ChainStore, hash: &Hash32) -> Result<(), EngineError> {
    let target = store.get_block_history(hash)?.ok_or(EngineError::NoTipToDelete)?;
    let txs = store.query_transactions_by_block(hash)?;

    for tx in &txs {
        store.delete_vins(&tx.txid)?;
        store.delete_outputs(&tx.txid)?;
        store.delete_transaction(&tx.txid)?;
    }
    store.delete_block_history(hash)?;

    let tip = store.get_tip()?.ok_or(EngineError::NoTipToDelete)?;
    if tip.hash == *hash {
        if target.previous_hash.is_zero() {
            store.delete_tip()?;
        } else {
            let previous = store.get_block_history(&target.previous_hash)?.ok_or(EngineError::NoTipToDelete)?;
            store.put_tip(&previous)?;
        }
    }

    Ok(())
}
