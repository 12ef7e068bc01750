//! Chain/mempool engine error taxonomy. Every variant maps onto
//! one of the error kinds the external interface surfaces as a `400`.

use thiserror::Error;

use chain_core::error::EntityError;
use chain_script::ScriptError;
use chain_store::StoreError;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Entity(#[from] EntityError),

    #[error(transparent)]
    Script(#[from] ScriptError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("no blocks exist yet; the first accepted block must be genesis")]
    NoTipAndNotGenesis,

    #[error("previous_hash {supplied} does not match current tip {tip}")]
    PreviousHashMismatch { supplied: String, tip: String },

    #[error("bits 0x{supplied:08x} does not match the configured floor 0x{configured:08x}")]
    BitsMismatch { supplied: u32, configured: u32 },

    #[error("coinbase output value {supplied} does not match the configured subsidy {configured}")]
    SubsidyMismatch { supplied: u64, configured: u64 },

    #[error("input {index} references a UTXO that does not exist: {txid}:{vout}")]
    MissingUtxo { index: usize, txid: String, vout: u32 },

    #[error("input {index} references an already-spent UTXO: {txid}:{vout}")]
    UtxoAlreadySpent { index: usize, txid: String, vout: u32 },

    #[error("input {index} failed script evaluation: {source}")]
    ScriptFailed { index: usize, #[source] source: ScriptError },

    #[error("a coinbase transaction may not be submitted to the mempool")]
    CoinbaseInMempool,

    #[error("mempool transaction input/output value imbalance: inputs={inputs} outputs_plus_fee={outputs_plus_fee}")]
    ValueImbalance { inputs: u64, outputs_plus_fee: u64 },

    #[error("the current tip sentinel is absent; there is nothing to delete")]
    NoTipToDelete,
}
