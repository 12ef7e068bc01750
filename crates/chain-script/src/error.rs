//! Script VM error taxonomy. Every variant here
//! surfaces as a `400` at the chain/mempool engine boundary).

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScriptError {
    #[error("stack underflow evaluating {0}")]
    StackUnderflow(&'static str),
    #[error("unknown or unimplemented opcode 0x{0:02x}")]
    UnknownOpcode(u8),
    #[error("truncated push at script offset {0}")]
    TruncatedPush(usize),
    #[error("OP_RETURN reached")]
    OpReturn,
    #[error("OP_VERIFY failed")]
    VerifyFailed,
    #[error("OP_EQUALVERIFY failed")]
    EqualVerifyFailed,
    #[error("OP_NUMEQUALVERIFY failed")]
    NumEqualVerifyFailed,
    #[error("OP_CHECKSIGVERIFY failed")]
    CheckSigVerifyFailed,
    #[error("script number exceeds the 4-byte bound")]
    NumberOverflow,
    #[error("final stack does not hold exactly one true value")]
    NotTrueAtEnd,
}
