//! Sighash message construction (component C3).
//!
//! For the input under validation, every other `TxIn` is serialized with a
//! zero-length `scriptSig`; the input under validation gets the referenced
//! output's `scriptPubKey` substituted in. The sighash-type selector (read
//! off the trailing byte of the signature being checked) is appended as a
//! 4-byte little-endian value and the whole preimage is hashed with
//! `dSHA256` — the same double-hash convention used for `txid`/`block_hash`
//! everywhere else in this codec, so that [`chain_core::crypto::verify_ecdsa`]
//! (which applies no further hashing) sees the same final message the
//! original block-explorer recomputed.

use chain_core::codec::{compact_size, dsha256, u32_le};
use chain_core::serialize::txout_raw;
use chain_core::types::Transaction;

/// Build the 32-byte sighash message for `tx`'s input `index`, as if that
/// input's `scriptSig` were the referenced output's `scriptPubKey` and every
/// other input's `scriptSig` were empty.
pub fn sighash_message(
    tx: &Transaction,
    index: usize,
    utxo_script_pubkey: &[u8],
    sighash_type: u32,
) -> [u8; 32] {
    let mut preimage = Vec::new();
    preimage.extend_from_slice(&u32_le(tx.version));
    preimage.extend_from_slice(&compact_size(tx.vin.len() as u64));
    for (i, input) in tx.vin.iter().enumerate() {
        preimage.extend_from_slice(&input.utxo_txid.to_internal());
        preimage.extend_from_slice(&u32_le(input.utxo_vout));
        let script: &[u8] = if i == index { utxo_script_pubkey } else { &[] };
        preimage.extend_from_slice(&compact_size(script.len() as u64));
        preimage.extend_from_slice(script);
        preimage.extend_from_slice(&u32_le(input.sequence));
    }
    preimage.extend_from_slice(&compact_size(tx.outputs.len() as u64));
    for out in &tx.outputs {
        preimage.extend_from_slice(&txout_raw(out));
    }
    preimage.extend_from_slice(&u32_le(tx.locktime));
    preimage.extend_from_slice(&u32_le(sighash_type));
    dsha256(&preimage)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chain_core::codec::{dsha256_display, Hash32};
    use chain_core::script_asm::script_to_asm;
    use chain_core::types::{ScriptPair, Transaction, TxIn, TxOut};

    fn script_pair(bytes: &[u8]) -> ScriptPair {
        ScriptPair { asm: script_to_asm(bytes).unwrap(), hex: hex::encode(bytes) }
    }

    fn sample_tx() -> Transaction {
        let vin = vec![TxIn {
            utxo_txid: Hash32([0x11; 32]),
            utxo_vout: 0,
            sequence: 0xFFFF_FFFF,
            script_sig: script_pair(&[]),
            utxo_block_hash: None,
            utxo_script_pubkey: None,
            utxo_value: None,
            script_type: None,
            spent_txid: None,
            spent_block_hash: None,
            n: None,
        }];
        let outputs = vec![TxOut {
            value: 100,
            script_pubkey: script_pair(&[0x51]),
            script_type: None,
            block_hash: None,
            txid: None,
            n: None,
        }];
        let raw = chain_core::serialize::tx_legacy_raw(1, &vin, &outputs, 0);
        let txid = dsha256_display(&raw);
        Transaction::new(txid, 1, 0, 0, vin, outputs).unwrap()
    }

    #[test]
    fn message_changes_with_sighash_type() {
        let tx = sample_tx();
        let m1 = sighash_message(&tx, 0, &[0x76, 0xa9], 0x01);
        let m2 = sighash_message(&tx, 0, &[0x76, 0xa9], 0x02);
        assert_ne!(m1, m2);
    }

    #[test]
    fn message_changes_with_substituted_script() {
        let tx = sample_tx();
        let m1 = sighash_message(&tx, 0, &[0x76, 0xa9], 0x01);
        let m2 = sighash_message(&tx, 0, &[0x51], 0x01);
        assert_ne!(m1, m2);
    }

    #[test]
    fn message_is_deterministic() {
        let tx = sample_tx();
        let m1 = sighash_message(&tx, 0, &[0x76, 0xa9], 0x01);
        let m2 = sighash_message(&tx, 0, &[0x76, 0xa9], 0x01);
        assert_eq!(m1, m2);
    }
}
