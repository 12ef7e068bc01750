//! Raw byte serialization for block headers and transactions (component C4,
//! layout used by `types.rs`'s callers): the exact byte streams that feed
//! `dSHA256` to produce `block_hash`/`txid`.

use crate::codec::{compact_size, u32_le, u64_le, Hash32};
use crate::types::{TxIn, TxOut};

/// `version∥prev_hash_le∥merkle_le∥time∥bits_le∥nonce`, all 4-byte
/// little-endian except the two 32-byte hashes, which are byte-reversed
/// from their big-endian display form before being written.
pub fn block_header_raw(
    version: u32,
    previous_hash: &Hash32,
    merkle_root: &Hash32,
    timestamp: u32,
    bits: u32,
    nonce: u32,
) -> Vec<u8> {
    let mut out = Vec::with_capacity(4 + 32 + 32 + 4 + 4 + 4);
    out.extend_from_slice(&u32_le(version));
    out.extend_from_slice(&previous_hash.to_internal());
    out.extend_from_slice(&merkle_root.to_internal());
    out.extend_from_slice(&u32_le(timestamp));
    out.extend_from_slice(&u32_le(bits));
    out.extend_from_slice(&u32_le(nonce));
    out
}

/// `version∥compact_size(|vin|)∥Σ vin_raw∥compact_size(|out|)∥Σ out_raw∥locktime`.
pub fn tx_legacy_raw(version: u32, vin: &[TxIn], outputs: &[TxOut], locktime: u32) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&u32_le(version));
    out.extend_from_slice(&compact_size(vin.len() as u64));
    for input in vin {
        out.extend_from_slice(&txin_raw(input));
    }
    out.extend_from_slice(&compact_size(outputs.len() as u64));
    for output in outputs {
        out.extend_from_slice(&txout_raw(output));
    }
    out.extend_from_slice(&u32_le(locktime));
    out
}

/// `utxo_txid_le∥utxo_vout∥compact_size(|scriptsig|)∥scriptsig∥sequence`.
pub fn txin_raw(input: &TxIn) -> Vec<u8> {
    let script = input.script_sig.bytes();
    let mut out = Vec::with_capacity(32 + 4 + 9 + script.len() + 4);
    out.extend_from_slice(&input.utxo_txid.to_internal());
    out.extend_from_slice(&u32_le(input.utxo_vout));
    out.extend_from_slice(&compact_size(script.len() as u64));
    out.extend_from_slice(&script);
    out.extend_from_slice(&u32_le(input.sequence));
    out
}

/// `value(8B LE)∥compact_size(|scriptpubkey|)∥scriptpubkey`.
pub fn txout_raw(output: &TxOut) -> Vec<u8> {
    let script = output.script_pubkey.bytes();
    let mut out = Vec::with_capacity(8 + 9 + script.len());
    out.extend_from_slice(&u64_le(output.value));
    out.extend_from_slice(&compact_size(script.len() as u64));
    out.extend_from_slice(&script);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script_type::ScriptType;
    use crate::types::ScriptPair;

    fn script_pair(bytes: &[u8]) -> ScriptPair {
        ScriptPair {
            asm: crate::script_asm::script_to_asm(bytes).unwrap(),
            hex: hex::encode(bytes),
        }
    }

    #[test]
    fn txout_raw_layout() {
        let out = TxOut {
            value: 42,
            script_pubkey: script_pair(&[0x51]),
            script_type: Some(ScriptType::Custom),
            block_hash: None,
            txid: None,
            n: None,
        };
        let raw = txout_raw(&out);
        assert_eq!(&raw[0..8], &42u64.to_le_bytes());
        assert_eq!(raw[8], 1);
        assert_eq!(raw[9], 0x51);
    }

    #[test]
    fn txin_raw_reverses_utxo_txid() {
        let txid = Hash32([0x01; 32]);
        let input = TxIn {
            utxo_txid: txid,
            utxo_vout: 7,
            sequence: 0xFFFF_FFFF,
            script_sig: script_pair(&[0x51]),
            utxo_block_hash: None,
            utxo_script_pubkey: None,
            utxo_value: None,
            script_type: None,
            spent_txid: None,
            spent_block_hash: None,
            n: None,
        };
        let raw = txin_raw(&input);
        assert_eq!(&raw[0..32], &txid.to_internal());
        assert_eq!(&raw[32..36], &7u32.to_le_bytes());
    }

    #[test]
    fn block_header_raw_field_order() {
        let prev = Hash32([0xAB; 32]);
        let root = Hash32([0xCD; 32]);
        let raw = block_header_raw(1, &prev, &root, 100, 0x1d00ffff, 9);
        assert_eq!(raw.len(), 4 + 32 + 32 + 4 + 4 + 4);
        assert_eq!(&raw[0..4], &1u32.to_le_bytes());
        assert_eq!(&raw[4..36], &prev.to_internal());
        assert_eq!(&raw[36..68], &root.to_internal());
        assert_eq!(&raw[68..72], &100u32.to_le_bytes());
        assert_eq!(&raw[72..76], &0x1d00ffffu32.to_le_bytes());
        assert_eq!(&raw[76..80], &9u32.to_le_bytes());
    }
}
