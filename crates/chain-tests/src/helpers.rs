//! Fixtures shared by the end-to-end tests: coinbase/spending-transaction
//! builders and a P2PKH signer, all going through the same entity-model
//! constructors the HTTP surface uses so every fixture is as strictly
//! validated as a real request body.

use chain_core::codec::{dsha256_display, Hash32};
use chain_core::constants::COINBASE_VOUT_SENTINEL;
use chain_core::script_asm::script_to_asm;
use chain_core::serialize::{block_header_raw, tx_legacy_raw};
use chain_core::types::{Block, ScriptPair, Transaction, TxIn, TxOut};
use chain_script::sighash_message;
use secp256k1::{Message, PublicKey, Secp256k1, SecretKey};

pub fn script_pair(bytes: &[u8]) -> ScriptPair {
    ScriptPair { asm: script_to_asm(bytes).unwrap(), hex: hex::encode(bytes) }
}

pub const OP_TRUE: u8 = 0x51;

/// A single-input, single-output coinbase transaction paying `value` to an
/// anyone-can-spend (`OP_TRUE`) output.
pub fn coinbase_tx(value: u64) -> Transaction {
    let vin = vec![TxIn {
        utxo_txid: Hash32::ZERO,
        utxo_vout: COINBASE_VOUT_SENTINEL,
        sequence: 0xFFFF_FFFF,
        script_sig: script_pair(&[OP_TRUE]),
        utxo_block_hash: None,
        utxo_script_pubkey: None,
        utxo_value: None,
        script_type: None,
        spent_txid: None,
        spent_block_hash: None,
        n: None,
    }];
    let outputs = vec![TxOut {
        value,
        script_pubkey: script_pair(&[OP_TRUE]),
        script_type: None,
        block_hash: None,
        txid: None,
        n: None,
    }];
    let raw = tx_legacy_raw(1, &vin, &outputs, 0);
    let txid = dsha256_display(&raw);
    Transaction::new(txid, 1, 0, 0, vin, outputs).unwrap()
}

/// A single-transaction block whose merkle root is just that transaction's
/// own txid, paying the coinbase subsidy and linking to `previous_hash`.
pub fn block_with_coinbase(previous_hash: Hash32, subsidy: u64, bits: u32, timestamp: u32) -> Block {
    let tx = coinbase_tx(subsidy);
    let header_raw = block_header_raw(1, &previous_hash, &tx.txid, timestamp, bits, 0);
    let hash = dsha256_display(&header_raw);
    Block::new(hash, previous_hash, tx.txid, 1, timestamp, bits, 0, vec![tx]).unwrap()
}

/// A secp256k1 keypair and its HASH160-derived P2PKH `scriptPubKey`, for
/// building a spendable output and later signing an input against it.
pub struct Payee {
    pub secret: SecretKey,
    pub script_pubkey: Vec<u8>,
}

impl Payee {
    pub fn new(seed: u8) -> Self {
        let secp = Secp256k1::new();
        let secret = SecretKey::from_slice(&[seed; 32]).unwrap();
        let public = PublicKey::from_secret_key(&secp, &secret);
        let pubkey_hash = chain_core::crypto::hash160(&public.serialize());
        let mut script_pubkey = vec![0x76, 0xa9, 0x14]; // OP_DUP OP_HASH160 <20>
        script_pubkey.extend_from_slice(&pubkey_hash);
        script_pubkey.extend_from_slice(&[0x88, 0xac]); // OP_EQUALVERIFY OP_CHECKSIG
        Self { secret, script_pubkey }
    }

    /// DER-sign `tx`'s input `index` against this payee's `scriptPubKey`,
    /// optionally forcing a high-S signature to exercise the low-S cutoff.
    pub fn sign(&self, tx: &Transaction, index: usize, force_high_s: bool) -> Vec<u8> {
        let secp = Secp256k1::new();
        let message = sighash_message(tx, index, &self.script_pubkey, 0x01);
        let msg = Message::from_digest_slice(&message).unwrap();
        let mut sig = secp.sign_ecdsa(&msg, &self.secret);
        sig.normalize_s();
        if force_high_s {
            // Flip to the high-S representative: n - s.
            let mut sig_bytes = [0u8; 64];
            sig_bytes.copy_from_slice(&sig.serialize_compact());
            let s = num_complement(&sig_bytes[32..64]);
            sig_bytes[32..64].copy_from_slice(&s);
            sig = secp256k1::ecdsa::Signature::from_compact(&sig_bytes).unwrap();
        }
        let mut der = sig.serialize_der().to_vec();
        der.push(0x01);

        let public = PublicKey::from_secret_key(&secp, &self.secret);
        let pubkey_bytes = public.serialize();

        let mut script_sig = Vec::new();
        script_sig.push(der.len() as u8);
        script_sig.extend_from_slice(&der);
        script_sig.push(pubkey_bytes.len() as u8);
        script_sig.extend_from_slice(&pubkey_bytes);
        script_sig
    }
}

/// `SECP256K1_ORDER - s`, producing the high-S sibling of a low-S scalar.
fn num_complement(s: &[u8]) -> [u8; 32] {
    const ORDER: [u8; 32] = [
        0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xfe, 0xba, 0xae,
        0xdc, 0xe6, 0xaf, 0x48, 0xa0, 0x3b, 0xbf, 0xd2, 0x5e, 0x8c, 0xd0, 0x36, 0x41, 0x41,
    ];
    let mut out = [0u8; 32];
    let mut borrow = 0i16;
    for i in (0..32).rev() {
        let mut diff = ORDER[i] as i16 - s[i] as i16 - borrow;
        if diff < 0 {
            diff += 256;
            borrow = 1;
        } else {
            borrow = 0;
        }
        out[i] = diff as u8;
    }
    out
}
