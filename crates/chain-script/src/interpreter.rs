//! Stack-machine Script interpreter (component C3): evaluates
//! `scriptSig ∥ scriptPubKey` over the required opcode subset.

use chain_core::constants::VALID_SIGHASH_BYTES;
use chain_core::crypto::{hash160, hash256, ripemd160, sha1, sha256, verify_ecdsa};
use chain_core::types::Transaction;

use crate::error::ScriptError;
use crate::number::{cast_to_bool, decode_num, encode_num};
use crate::sighash::sighash_message;

const OP_PUSHDATA1: u8 = 0x4c;
const OP_PUSHDATA2: u8 = 0x4d;
const OP_PUSHDATA4: u8 = 0x4e;
const OP_1NEGATE: u8 = 0x4f;
const OP_1: u8 = 0x51;
const OP_16: u8 = 0x60;

const OP_NOP: u8 = 0x61;
const OP_VERIFY: u8 = 0x69;
const OP_RETURN: u8 = 0x6a;
const OP_TOALTSTACK: u8 = 0x6b;
const OP_FROMALTSTACK: u8 = 0x6c;
const OP_2DROP: u8 = 0x6d;
const OP_2DUP: u8 = 0x6e;
const OP_3DUP: u8 = 0x6f;
const OP_DROP: u8 = 0x75;
const OP_DUP: u8 = 0x76;
const OP_OVER: u8 = 0x78;
const OP_ROT: u8 = 0x7b;
const OP_SWAP: u8 = 0x7c;
const OP_EQUAL: u8 = 0x87;
const OP_EQUALVERIFY: u8 = 0x88;
const OP_1ADD: u8 = 0x8b;
const OP_1SUB: u8 = 0x8c;
const OP_NEGATE: u8 = 0x8f;
const OP_ABS: u8 = 0x90;
const OP_NOT: u8 = 0x91;
const OP_0NOTEQUAL: u8 = 0x92;
const OP_ADD: u8 = 0x93;
const OP_SUB: u8 = 0x94;
const OP_BOOLAND: u8 = 0x9a;
const OP_BOOLOR: u8 = 0x9b;
const OP_NUMEQUAL: u8 = 0x9c;
const OP_NUMEQUALVERIFY: u8 = 0x9d;
const OP_LESSTHAN: u8 = 0x9f;
const OP_GREATERTHAN: u8 = 0xa0;
const OP_MIN: u8 = 0xa3;
const OP_MAX: u8 = 0xa4;
const OP_RIPEMD160: u8 = 0xa6;
const OP_SHA1: u8 = 0xa7;
const OP_SHA256: u8 = 0xa8;
const OP_HASH160: u8 = 0xa9;
const OP_HASH256: u8 = 0xaa;
const OP_CHECKSIG: u8 = 0xac;
const OP_CHECKSIGVERIFY: u8 = 0xad;
const OP_NOP1: u8 = 0xb0;
const OP_NOP10: u8 = 0xb9;

/// Evaluate `script_sig ∥ script_pubkey` for `tx`'s input `input_index`,
/// verifying any `OP_CHECKSIG`/`OP_CHECKSIGVERIFY` against the sighash
/// message for that input. `timestamp` is the block's timestamp (or
/// wall-clock time for mempool admission), used for the low-S cutoff.
///
/// Succeeds iff the final stack holds exactly one item and that item casts
/// to `true`.
pub fn eval_script(
    script_sig: &[u8],
    script_pubkey: &[u8],
    tx: &Transaction,
    input_index: usize,
    utxo_script_pubkey: &[u8],
    timestamp: i64,
) -> Result<(), ScriptError> {
    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut alt: Vec<Vec<u8>> = Vec::new();

    let ctx = CheckSigCtx { tx, input_index, utxo_script_pubkey, timestamp };
    run(script_sig, &mut stack, &mut alt, &ctx)?;
    run(script_pubkey, &mut stack, &mut alt, &ctx)?;

    if stack.len() != 1 || !cast_to_bool(&stack[0]) {
        return Err(ScriptError::NotTrueAtEnd);
    }
    Ok(())
}

struct CheckSigCtx<'a> {
    tx: &'a Transaction,
    input_index: usize,
    utxo_script_pubkey: &'a [u8],
    timestamp: i64,
}

fn run(
    script: &[u8],
    stack: &mut Vec<Vec<u8>>,
    alt: &mut Vec<Vec<u8>>,
    ctx: &CheckSigCtx<'_>,
) -> Result<(), ScriptError> {
    let mut i = 0;
    while i < script.len() {
        let op = script[i];
        match op {
            0x00 => {
                stack.push(Vec::new());
                i += 1;
            }
            1..=0x4b => {
                let len = op as usize;
                let data = script.get(i + 1..i + 1 + len).ok_or(ScriptError::TruncatedPush(i))?;
                stack.push(data.to_vec());
                i += 1 + len;
            }
            OP_PUSHDATA1 => {
                let len = *script.get(i + 1).ok_or(ScriptError::TruncatedPush(i))? as usize;
                let data = script.get(i + 2..i + 2 + len).ok_or(ScriptError::TruncatedPush(i))?;
                stack.push(data.to_vec());
                i += 2 + len;
            }
            OP_PUSHDATA2 => {
                let len_bytes = script.get(i + 1..i + 3).ok_or(ScriptError::TruncatedPush(i))?;
                let len = u16::from_le_bytes(len_bytes.try_into().unwrap()) as usize;
                let data = script.get(i + 3..i + 3 + len).ok_or(ScriptError::TruncatedPush(i))?;
                stack.push(data.to_vec());
                i += 3 + len;
            }
            OP_PUSHDATA4 => {
                let len_bytes = script.get(i + 1..i + 5).ok_or(ScriptError::TruncatedPush(i))?;
                let len = u32::from_le_bytes(len_bytes.try_into().unwrap()) as usize;
                let data = script.get(i + 5..i + 5 + len).ok_or(ScriptError::TruncatedPush(i))?;
                stack.push(data.to_vec());
                i += 5 + len;
            }
            OP_1NEGATE => {
                stack.push(encode_num(-1));
                i += 1;
            }
            n if (OP_1..=OP_16).contains(&n) => {
                stack.push(encode_num((n - OP_1 + 1) as i64));
                i += 1;
            }
            OP_NOP | OP_NOP1..=OP_NOP10 => i += 1,
            OP_RETURN => return Err(ScriptError::OpReturn),
            OP_VERIFY => {
                let top = pop(stack, "OP_VERIFY")?;
                if !cast_to_bool(&top) {
                    return Err(ScriptError::VerifyFailed);
                }
                i += 1;
            }
            OP_DUP => {
                let top = top(stack, "OP_DUP")?.clone();
                stack.push(top);
                i += 1;
            }
            OP_DROP => {
                pop(stack, "OP_DROP")?;
                i += 1;
            }
            OP_2DROP => {
                pop(stack, "OP_2DROP")?;
                pop(stack, "OP_2DROP")?;
                i += 1;
            }
            OP_2DUP => {
                let len = stack.len();
                if len < 2 {
                    return Err(ScriptError::StackUnderflow("OP_2DUP"));
                }
                stack.push(stack[len - 2].clone());
                stack.push(stack[len - 1].clone());
                i += 1;
            }
            OP_3DUP => {
                let len = stack.len();
                if len < 3 {
                    return Err(ScriptError::StackUnderflow("OP_3DUP"));
                }
                stack.push(stack[len - 3].clone());
                stack.push(stack[len - 2].clone());
                stack.push(stack[len - 1].clone());
                i += 1;
            }
            OP_SWAP => {
                let len = stack.len();
                if len < 2 {
                    return Err(ScriptError::StackUnderflow("OP_SWAP"));
                }
                stack.swap(len - 1, len - 2);
                i += 1;
            }
            OP_OVER => {
                let len = stack.len();
                if len < 2 {
                    return Err(ScriptError::StackUnderflow("OP_OVER"));
                }
                stack.push(stack[len - 2].clone());
                i += 1;
            }
            OP_ROT => {
                let len = stack.len();
                if len < 3 {
                    return Err(ScriptError::StackUnderflow("OP_ROT"));
                }
                let item = stack.remove(len - 3);
                stack.push(item);
                i += 1;
            }
            OP_TOALTSTACK => {
                let top = pop(stack, "OP_TOALTSTACK")?;
                alt.push(top);
                i += 1;
            }
            OP_FROMALTSTACK => {
                let top = alt.pop().ok_or(ScriptError::StackUnderflow("OP_FROMALTSTACK"))?;
                stack.push(top);
                i += 1;
            }
            OP_EQUAL => {
                let b = pop(stack, "OP_EQUAL")?;
                let a = pop(stack, "OP_EQUAL")?;
                stack.push(encode_num(i64::from(a == b)));
                i += 1;
            }
            OP_EQUALVERIFY => {
                let b = pop(stack, "OP_EQUALVERIFY")?;
                let a = pop(stack, "OP_EQUALVERIFY")?;
                if a != b {
                    return Err(ScriptError::EqualVerifyFailed);
                }
                i += 1;
            }
            _ if is_arith(op) => {
                apply_arith(op, stack)?;
                i += 1;
            }
            OP_RIPEMD160 => {
                let top = pop(stack, "OP_RIPEMD160")?;
                stack.push(ripemd160(&top).to_vec());
                i += 1;
            }
            OP_SHA1 => {
                let top = pop(stack, "OP_SHA1")?;
                stack.push(sha1(&top).to_vec());
                i += 1;
            }
            OP_SHA256 => {
                let top = pop(stack, "OP_SHA256")?;
                stack.push(sha256(&top).to_vec());
                i += 1;
            }
            OP_HASH160 => {
                let top = pop(stack, "OP_HASH160")?;
                stack.push(hash160(&top).to_vec());
                i += 1;
            }
            OP_HASH256 => {
                let top = pop(stack, "OP_HASH256")?;
                stack.push(hash256(&top).to_vec());
                i += 1;
            }
            OP_CHECKSIG => {
                let ok = check_sig(stack, ctx)?;
                stack.push(if ok { encode_num(1) } else { Vec::new() });
                i += 1;
            }
            OP_CHECKSIGVERIFY => {
                let ok = check_sig(stack, ctx)?;
                if !ok {
                    return Err(ScriptError::CheckSigVerifyFailed);
                }
                i += 1;
            }
            other => return Err(ScriptError::UnknownOpcode(other)),
        }
    }
    Ok(())
}

fn is_arith(op: u8) -> bool {
    matches!(
        op,
        OP_1ADD
            | OP_1SUB
            | OP_NEGATE
            | OP_ABS
            | OP_NOT
            | OP_0NOTEQUAL
            | OP_ADD
            | OP_SUB
            | OP_BOOLAND
            | OP_BOOLOR
            | OP_NUMEQUAL
            | OP_NUMEQUALVERIFY
            | OP_LESSTHAN
            | OP_GREATERTHAN
            | OP_MIN
            | OP_MAX
    )
}

fn apply_arith(op: u8, stack: &mut Vec<Vec<u8>>) -> Result<(), ScriptError> {
    match op {
        OP_1ADD => unary_apply(stack, "OP_1ADD", |n| n + 1),
        OP_1SUB => unary_apply(stack, "OP_1SUB", |n| n - 1),
        OP_NEGATE => unary_apply(stack, "OP_NEGATE", |n| -n),
        OP_ABS => unary_apply(stack, "OP_ABS", |n| n.abs()),
        OP_NOT => unary_apply(stack, "OP_NOT", |n| i64::from(n == 0)),
        OP_0NOTEQUAL => unary_apply(stack, "OP_0NOTEQUAL", |n| i64::from(n != 0)),
        OP_ADD => binary_apply(stack, "OP_ADD", |a, b| a + b),
        OP_SUB => binary_apply(stack, "OP_SUB", |a, b| a - b),
        OP_BOOLAND => binary_apply(stack, "OP_BOOLAND", |a, b| i64::from(a != 0 && b != 0)),
        OP_BOOLOR => binary_apply(stack, "OP_BOOLOR", |a, b| i64::from(a != 0 || b != 0)),
        OP_NUMEQUAL => binary_apply(stack, "OP_NUMEQUAL", |a, b| i64::from(a == b)),
        OP_LESSTHAN => binary_apply(stack, "OP_LESSTHAN", |a, b| i64::from(a < b)),
        OP_GREATERTHAN => binary_apply(stack, "OP_GREATERTHAN", |a, b| i64::from(a > b)),
        OP_MIN => binary_apply(stack, "OP_MIN", i64::min),
        OP_MAX => binary_apply(stack, "OP_MAX", i64::max),
        OP_NUMEQUALVERIFY => {
            let b = pop_num(stack, "OP_NUMEQUALVERIFY")?;
            let a = pop_num(stack, "OP_NUMEQUALVERIFY")?;
            if a != b {
                return Err(ScriptError::NumEqualVerifyFailed);
            }
            Ok(())
        }
        _ => unreachable!("is_arith guards this dispatch"),
    }
}

fn unary_apply(stack: &mut Vec<Vec<u8>>, label: &'static str, f: impl Fn(i64) -> i64) -> Result<(), ScriptError> {
    let n = pop_num(stack, label)?;
    stack.push(encode_num(f(n)));
    Ok(())
}

fn binary_apply(
    stack: &mut Vec<Vec<u8>>,
    label: &'static str,
    f: impl Fn(i64, i64) -> i64,
) -> Result<(), ScriptError> {
    let b = pop_num(stack, label)?;
    let a = pop_num(stack, label)?;
    stack.push(encode_num(f(a, b)));
    Ok(())
}

fn pop_num(stack: &mut Vec<Vec<u8>>, label: &'static str) -> Result<i64, ScriptError> {
    let item = pop(stack, label)?;
    decode_num(&item)
}

fn pop(stack: &mut Vec<Vec<u8>>, label: &'static str) -> Result<Vec<u8>, ScriptError> {
    stack.pop().ok_or(ScriptError::StackUnderflow(label))
}

fn top<'a>(stack: &'a [Vec<u8>], label: &'static str) -> Result<&'a Vec<u8>, ScriptError> {
    stack.last().ok_or(ScriptError::StackUnderflow(label))
}

fn check_sig(stack: &mut Vec<Vec<u8>>, ctx: &CheckSigCtx<'_>) -> Result<bool, ScriptError> {
    let pubkey = pop(stack, "OP_CHECKSIG")?;
    let sig = pop(stack, "OP_CHECKSIG")?;
    if sig.is_empty() || pubkey.is_empty() {
        return Ok(false);
    }
    let Some(&sighash_byte) = sig.last() else { return Ok(false) };
    if !VALID_SIGHASH_BYTES.contains(&sighash_byte) {
        return Ok(false);
    }
    let message = sighash_message(ctx.tx, ctx.input_index, ctx.utxo_script_pubkey, sighash_byte as u32);
    Ok(verify_ecdsa(&pubkey, &sig, &message, ctx.timestamp))
}
