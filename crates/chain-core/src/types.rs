//! Entity model: `Block`, `Transaction`, `TxIn`, `TxOut` (component C4).
//!
//! Construction validates every invariant in this module's contract before
//! the value is returned; there is no way to obtain an entity value that
//! fails identifier recomputation, has a denormalized field supplied by a
//! caller, or violates the coinbase-sentinel rules.

use serde::{Deserialize, Serialize};

use crate::codec::{dsha256_display, Hash32};
use crate::constants::{COINBASE_TXID_SENTINEL, COINBASE_VOUT_SENTINEL};
use crate::error::EntityError;
use crate::merkle::merkle_root;
use crate::script_asm::{asm_to_script, script_to_asm};
use crate::script_type::{classify, ScriptType};
use crate::serialize::{block_header_raw, tx_legacy_raw, txin_raw, txout_raw};

/// Exactly one of `asm`/`hex` is supplied by a caller; the other is derived
/// and both are stored so later reads never need to re-derive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptPair {
    pub asm: String,
    pub hex: String,
}

impl ScriptPair {
    /// Build a pair from caller input where at most one of `asm`/`hex` is
    /// `Some`; the other is derived and checked to round-trip.
    pub fn from_either(
        field: &'static str,
        asm_field: &'static str,
        hex_field: &'static str,
        asm: Option<String>,
        hex: Option<String>,
    ) -> Result<Self, EntityError> {
        match (asm, hex) {
            (Some(asm), None) => {
                let bytes = asm_to_script(&asm).map_err(|_| EntityError::ScriptPairMismatch { field })?;
                let derived_hex = hex::encode(&bytes);
                let round_trip = script_to_asm(&bytes).map_err(|_| EntityError::ScriptPairMismatch { field })?;
                if round_trip != asm {
                    return Err(EntityError::ScriptPairMismatch { field });
                }
                Ok(Self { asm, hex: derived_hex })
            }
            (None, Some(hex)) => {
                let bytes = hex::decode(&hex).map_err(|_| EntityError::ScriptPairMismatch { field })?;
                let derived_asm = script_to_asm(&bytes).map_err(|_| EntityError::ScriptPairMismatch { field })?;
                Ok(Self { asm: derived_asm, hex })
            }
            (Some(_), Some(_)) | (None, None) => Err(EntityError::ScriptPairAmbiguous { asm_field, hex_field }),
        }
    }

    pub fn bytes(&self) -> Vec<u8> {
        hex::decode(&self.hex).expect("hex form is always valid once constructed")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxIn {
    pub utxo_txid: Hash32,
    pub utxo_vout: u32,
    pub sequence: u32,
    pub script_sig: ScriptPair,

    // Denormalized, engine-owned. Must be `None` at caller-construction time.
    pub utxo_block_hash: Option<Hash32>,
    pub utxo_script_pubkey: Option<String>,
    pub utxo_value: Option<u64>,
    pub script_type: Option<ScriptType>,
    pub spent_txid: Option<Hash32>,
    pub spent_block_hash: Option<Hash32>,
    pub n: Option<u32>,
}

impl TxIn {
    pub fn is_coinbase_sentinel(&self) -> bool {
        self.utxo_txid.0 == COINBASE_TXID_SENTINEL && self.utxo_vout == COINBASE_VOUT_SENTINEL
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOut {
    pub value: u64,
    pub script_pubkey: ScriptPair,
    pub script_type: Option<ScriptType>,
    pub block_hash: Option<Hash32>,
    pub txid: Option<Hash32>,
    pub n: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub txid: Hash32,
    pub version: u32,
    pub locktime: u32,
    pub fee: u64,
    pub vin: Vec<TxIn>,
    pub outputs: Vec<TxOut>,
    pub block_hash: Hash32,
    pub block_height: u32,
}

impl Transaction {
    /// Construct and fully validate a transaction from caller-supplied
    /// fields. `block_hash`/`block_height` are left at the mempool
    /// sentinel; the chain/mempool engine assigns the real values.
    pub fn new(
        supplied_txid: Hash32,
        version: u32,
        locktime: u32,
        fee: u64,
        mut vin: Vec<TxIn>,
        mut outputs: Vec<TxOut>,
    ) -> Result<Self, EntityError> {
        if vin.is_empty() {
            return Err(EntityError::EmptyInputs);
        }
        if outputs.is_empty() {
            return Err(EntityError::EmptyOutputs);
        }
        for vin in vin.iter() {
            if vin.utxo_block_hash.is_some()
                || vin.utxo_script_pubkey.is_some()
                || vin.utxo_value.is_some()
                || vin.script_type.is_some()
                || vin.spent_txid.is_some()
                || vin.spent_block_hash.is_some()
                || vin.n.is_some()
            {
                return Err(EntityError::DenormalizedFieldSupplied("vin"));
            }
        }
        let any_sentinel = vin.iter().any(|v| v.is_coinbase_sentinel());
        if any_sentinel && vin.len() != 1 {
            return Err(EntityError::CoinbaseInputCount(vin.len()));
        }
        let is_coinbase = any_sentinel;
        if !is_coinbase {
            for (i, input) in vin.iter().enumerate() {
                if input.is_coinbase_sentinel() {
                    return Err(EntityError::NullOutpointInRegularInput(i));
                }
            }
        }
        for out in &outputs {
            if out.value == 0 {
                return Err(EntityError::ZeroValueOutput(out.value));
            }
            if out.block_hash.is_some() || out.txid.is_some() || out.n.is_some() {
                return Err(EntityError::DenormalizedFieldSupplied("output"));
            }
        }

        for (i, input) in vin.iter_mut().enumerate() {
            input.n = Some(i as u32);
        }
        for (i, out) in outputs.iter_mut().enumerate() {
            out.n = Some(i as u32);
            out.script_type = Some(classify(&out.script_pubkey.bytes(), is_coinbase));
        }

        let raw = tx_legacy_raw(version, &vin, &outputs, locktime);
        let recomputed = dsha256_display(&raw);
        if recomputed != supplied_txid {
            return Err(EntityError::TxidMismatch {
                supplied: supplied_txid.to_hex(),
                recomputed: recomputed.to_hex(),
            });
        }

        Ok(Self {
            txid: recomputed,
            version,
            locktime,
            fee,
            vin,
            outputs,
            block_hash: Hash32::ZERO,
            block_height: crate::constants::MEMPOOL_BLOCK_HEIGHT_SENTINEL,
        })
    }

    pub fn is_coinbase(&self) -> bool {
        self.vin.len() == 1 && self.vin[0].is_coinbase_sentinel()
    }

    pub fn legacy_raw(&self) -> Vec<u8> {
        tx_legacy_raw(self.version, &self.vin, &self.outputs, self.locktime)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub hash: Hash32,
    pub previous_hash: Hash32,
    pub merkle_root: Hash32,
    pub height: u16,
    pub version: u32,
    pub timestamp: u32,
    pub nonce: u32,
    pub bits: u32,
    pub transactions: Vec<Transaction>,
}

impl Block {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        supplied_hash: Hash32,
        previous_hash: Hash32,
        supplied_merkle_root: Hash32,
        version: u32,
        timestamp: u32,
        bits: u32,
        nonce: u32,
        transactions: Vec<Transaction>,
    ) -> Result<Self, EntityError> {
        if transactions.is_empty() {
            return Err(EntityError::EmptyTransactions);
        }
        if !transactions[0].is_coinbase() {
            return Err(EntityError::FirstTxNotCoinbase);
        }

        let raw = block_header_raw(version, &previous_hash, &supplied_merkle_root, timestamp, bits, nonce);
        let recomputed_hash = dsha256_display(&raw);
        if recomputed_hash != supplied_hash {
            return Err(EntityError::BlockHashMismatch {
                supplied: supplied_hash.to_hex(),
                recomputed: recomputed_hash.to_hex(),
            });
        }

        let txids: Vec<Hash32> = transactions.iter().map(|t| t.txid).collect();
        let recomputed_root = merkle_root(&txids);
        if recomputed_root != supplied_merkle_root {
            return Err(EntityError::MerkleRootMismatch {
                supplied: supplied_merkle_root.to_hex(),
                recomputed: recomputed_root.to_hex(),
            });
        }

        if !crate::target::hash_within_target(&recomputed_hash.0, bits) {
            return Err(EntityError::ProofOfWorkExceedsTarget(recomputed_hash.to_hex()));
        }

        Ok(Self {
            hash: recomputed_hash,
            previous_hash,
            merkle_root: recomputed_root,
            height: 0,
            version,
            timestamp,
            nonce,
            bits,
            transactions,
        })
    }

    pub fn header_raw(&self) -> Vec<u8> {
        block_header_raw(self.version, &self.previous_hash, &self.merkle_root, self.timestamp, self.bits, self.nonce)
    }
}
