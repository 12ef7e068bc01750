//! Wire-shaped request bodies and the conversions into/out of
//! the entity model. Requests carry the asm/hex script pair as two optional
//! fields exactly as the entity model requires ("exactly one of
//! `script_sig_asm`/`script_sig_hex` is supplied"); responses serialize the
//! entity model's own `Serialize` impls directly, since those already carry
//! both derived forms plus every engine-populated denormalized field.

use serde::Deserialize;

use chain_core::codec::Hash32;
use chain_core::error::EntityError;
use chain_core::types::{Block, ScriptPair, Transaction, TxIn, TxOut};

use crate::error::ChainError;

#[derive(Debug, Deserialize)]
pub struct BlockRequest {
    pub hash: String,
    pub previous_hash: String,
    pub merkle_root: String,
    pub version: u32,
    pub timestamp: u32,
    pub bits: String,
    pub nonce: u32,
    pub transactions: Vec<TransactionRequest>,
}

#[derive(Debug, Deserialize)]
pub struct TransactionRequest {
    pub txid: String,
    pub version: u32,
    #[serde(default)]
    pub locktime: u32,
    #[serde(default)]
    pub fee: u64,
    pub vin: Vec<TxInRequest>,
    pub outputs: Vec<TxOutRequest>,
}

#[derive(Debug, Deserialize)]
pub struct TxInRequest {
    pub utxo_txid: String,
    pub utxo_vout: u32,
    #[serde(default = "default_sequence")]
    pub sequence: u32,
    #[serde(default)]
    pub script_sig_asm: Option<String>,
    #[serde(default)]
    pub script_sig_hex: Option<String>,
}

fn default_sequence() -> u32 {
    0xFFFF_FFFF
}

#[derive(Debug, Deserialize)]
pub struct TxOutRequest {
    pub value: u64,
    #[serde(default)]
    pub script_pubkey_asm: Option<String>,
    #[serde(default)]
    pub script_pubkey_hex: Option<String>,
}

fn parse_hash(field: &'static str, s: &str) -> Result<Hash32, ChainError> {
    Hash32::from_hex(s).map_err(|source| ChainError::Entity(EntityError::Codec { field, source }))
}

fn parse_bits(s: &str) -> Result<u32, ChainError> {
    let trimmed = s.trim_start_matches("0x");
    u32::from_str_radix(trimmed, 16).map_err(|_| ChainError::BadRequest(format!("bits {s} is not 8 hex chars")))
}

impl TxInRequest {
    fn into_txin(self) -> Result<TxIn, ChainError> {
        let utxo_txid = parse_hash("utxo_txid", &self.utxo_txid)?;
        let script_sig =
            ScriptPair::from_either("script_sig", "script_sig_asm", "script_sig_hex", self.script_sig_asm, self.script_sig_hex)?;
        Ok(TxIn {
            utxo_txid,
            utxo_vout: self.utxo_vout,
            sequence: self.sequence,
            script_sig,
            utxo_block_hash: None,
            utxo_script_pubkey: None,
            utxo_value: None,
            script_type: None,
            spent_txid: None,
            spent_block_hash: None,
            n: None,
        })
    }
}

impl TxOutRequest {
    fn into_txout(self) -> Result<TxOut, ChainError> {
        let script_pubkey = ScriptPair::from_either(
            "script_pubkey",
            "script_pubkey_asm",
            "script_pubkey_hex",
            self.script_pubkey_asm,
            self.script_pubkey_hex,
        )?;
        Ok(TxOut { value: self.value, script_pubkey, script_type: None, block_hash: None, txid: None, n: None })
    }
}

impl TransactionRequest {
    pub fn into_transaction(self) -> Result<Transaction, ChainError> {
        let txid = parse_hash("txid", &self.txid)?;
        let vin: Vec<TxIn> = self.vin.into_iter().map(TxInRequest::into_txin).collect::<Result<_, _>>()?;
        let outputs: Vec<TxOut> = self.outputs.into_iter().map(TxOutRequest::into_txout).collect::<Result<_, _>>()?;
        let tx = Transaction::new(txid, self.version, self.locktime, self.fee, vin, outputs)?;
        Ok(tx)
    }
}

impl BlockRequest {
    pub fn into_block(self) -> Result<Block, ChainError> {
        let hash = parse_hash("hash", &self.hash)?;
        let previous_hash = parse_hash("previous_hash", &self.previous_hash)?;
        let merkle_root = parse_hash("merkle_root", &self.merkle_root)?;
        let bits = parse_bits(&self.bits)?;
        let transactions: Vec<Transaction> =
            self.transactions.into_iter().map(TransactionRequest::into_transaction).collect::<Result<_, _>>()?;
        let block = Block::new(hash, previous_hash, merkle_root, self.version, self.timestamp, bits, self.nonce, transactions)?;
        Ok(block)
    }
}
