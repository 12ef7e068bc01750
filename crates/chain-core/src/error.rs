//! Error types for the byte codec and entity model.
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("non-hex character in: {0}")] NotHex(String),
    #[error("expected {expected} bytes, got {got}")] WrongLength { expected: usize, got: usize },
    #[error("compact-size encoding is not minimal")] NonMinimalCompactSize,
    #[error("unexpected end of buffer reading {0}")] UnexpectedEof(&'static str),
}

/// Shape and identifier errors raised at entity construction (mapped to 400s).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EntityError {
    #[error("{field}: {source}")] Codec { field: &'static str, #[source] source: CodecError },
    #[error("denormalized field supplied by caller: {0}")] DenormalizedFieldSupplied(&'static str),
    #[error("exactly one of {asm_field}/{hex_field} must be supplied")] ScriptPairAmbiguous {
        asm_field: &'static str,
        hex_field: &'static str,
    },
    #[error("{field} does not round-trip between asm and hex forms")] ScriptPairMismatch { field: &'static str },
    #[error("transaction has no inputs")] EmptyInputs,
    #[error("transaction has no outputs")] EmptyOutputs,
    #[error("block has no transactions")] EmptyTransactions,
    #[error("output value must be at least 1, got {0}")] ZeroValueOutput(u64),
    #[error("non-coinbase input {0} uses the coinbase sentinel outpoint")] NullOutpointInRegularInput(usize),
    #[error("coinbase transaction must have exactly one input")] CoinbaseInputCount(usize),
    #[error("first transaction in block is not coinbase")] FirstTxNotCoinbase,
    #[error("recomputed txid {recomputed} does not match supplied {supplied}")] TxidMismatch {
        supplied: String,
        recomputed: String,
    },
    #[error("recomputed block hash {recomputed} does not match supplied {supplied}")] BlockHashMismatch {
        supplied: String,
        recomputed: String,
    },
    #[error("recomputed merkle root {recomputed} does not match supplied {supplied}")] MerkleRootMismatch {
        supplied: String,
        recomputed: String,
    },
    #[error("block hash {0} exceeds the target implied by bits")] ProofOfWorkExceedsTarget(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codec_error_display() {
        let e = CodecError::WrongLength { expected: 32, got: 31 };
        assert_eq!(e.to_string(), "expected 32 bytes, got 31");
    }

    #[test]
    fn entity_error_wraps_codec_error() {
        let e = EntityError::Codec {
            field: "previous_hash",
            source: CodecError::NotHex("zz".into()),
        };
        assert!(e.to_string().contains("previous_hash"));
    }
}
