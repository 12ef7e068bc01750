//! Cryptography primitives: hash functions and strict ECDSA/DER signature
//! verification over secp256k1 (component C2).

use ripemd::Ripemd160;
use secp256k1::ecdsa::Signature;
use secp256k1::{Message, PublicKey, Secp256k1};
use sha1::Sha1;
use sha2::{Digest, Sha256};

use crate::constants::{
    LOW_S_CUTOFF_UNIX, MAX_SIG_BYTES, MIN_SIG_BYTES, SECP256K1_HALF_ORDER, SECP256K1_ORDER,
    VALID_SIGHASH_BYTES,
};

pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

pub fn sha1(data: &[u8]) -> [u8; 20] {
    Sha1::digest(data).into()
}

pub fn ripemd160(data: &[u8]) -> [u8; 20] {
    Ripemd160::digest(data).into()
}

/// `RIPEMD160(SHA256(data))`, the hash Bitcoin uses for `P2PKH`/`P2WPKH` payloads.
pub fn hash160(data: &[u8]) -> [u8; 20] {
    ripemd160(&sha256(data))
}

/// `SHA256(SHA256(data))`, identical in math to [`crate::codec::dsha256`] but
/// exposed here alongside the other primitives for callers reaching only
/// for the crypto module.
pub fn hash256(data: &[u8]) -> [u8; 32] {
    sha256(&sha256(data))
}

/// Verify a Script `OP_CHECKSIG`-style signature against a pre-hashed
/// 32-byte message.
///
/// `sig` is the raw signature bytes *including* the trailing sighash-type
/// byte, exactly as it appears inside a `scriptSig` push. `timestamp` is
/// the timestamp of the block (or wall-clock time, for mempool admission)
/// under validation, used for the low-S historical cutoff.
///
/// Returns `false` for every structural violation described in the
/// signature-checking contract; this function never panics on attacker
/// controlled input.
pub fn verify_ecdsa(pubkey: &[u8], sig: &[u8], message32: &[u8; 32], timestamp: i64) -> bool {
    if sig.len() < MIN_SIG_BYTES || sig.len() > MAX_SIG_BYTES {
        return false;
    }
    let (der, sighash_byte) = sig.split_at(sig.len() - 1);
    if !VALID_SIGHASH_BYTES.contains(&sighash_byte[0]) {
        return false;
    }
    if !is_valid_pubkey_shape(pubkey) {
        return false;
    }
    let Some((r, s)) = parse_der_signature(der) else {
        return false;
    };
    let Some(r32) = pad_to_32(&r) else { return false };
    let Some(mut s32) = pad_to_32(&s) else { return false };
    if is_zero(&r32) || !is_less_than(&r32, &SECP256K1_ORDER) {
        return false;
    }
    if is_zero(&s32) || !is_less_than(&s32, &SECP256K1_ORDER) {
        return false;
    }
    if is_greater_than(&s32, &SECP256K1_HALF_ORDER) {
        if timestamp >= LOW_S_CUTOFF_UNIX {
            return false;
        }
        s32 = sub_mod(&SECP256K1_ORDER, &s32);
    }

    let mut compact = [0u8; 64];
    compact[..32].copy_from_slice(&r32);
    compact[32..].copy_from_slice(&s32);

    let Ok(signature) = Signature::from_compact(&compact) else { return false };
    let Ok(public_key) = PublicKey::from_slice(pubkey) else { return false };
    let Ok(message) = Message::from_digest_slice(message32) else { return false };

    let secp = Secp256k1::verification_only();
    secp.verify_ecdsa(&message, &signature, &public_key).is_ok()
}

fn is_valid_pubkey_shape(pubkey: &[u8]) -> bool {
    match pubkey.len() {
        33 => pubkey[0] == 0x02 || pubkey[0] == 0x03,
        65 => pubkey[0] == 0x04,
        _ => false,
    }
}

/// Parse a `0x30 len 0x02 r_len r 0x02 s_len s` DER signature (sighash byte
/// already stripped), rejecting non-minimal lengths, negative integers, and
/// superfluous leading zero bytes. Returns the raw (unpadded) big-endian
/// integer bytes of `r` and `s`.
fn parse_der_signature(der: &[u8]) -> Option<(Vec<u8>, Vec<u8>)> {
    if der.len() < 2 || der[0] != 0x30 {
        return None;
    }
    let total_len = der[1];
    if total_len & 0x80 != 0 {
        return None; // long-form length, never needed at these sizes
    }
    if 2 + total_len as usize != der.len() {
        return None;
    }
    let (r, pos) = parse_der_integer(der, 2)?;
    let (s, pos) = parse_der_integer(der, pos)?;
    if pos != der.len() {
        return None;
    }
    Some((r, s))
}

fn parse_der_integer(buf: &[u8], pos: usize) -> Option<(Vec<u8>, usize)> {
    if buf.get(pos) != Some(&0x02) {
        return None;
    }
    let len = *buf.get(pos + 1)? as usize;
    if len == 0 {
        return None;
    }
    let start = pos + 2;
    let bytes = buf.get(start..start + len)?;
    if bytes[0] & 0x80 != 0 {
        return None; // would encode a negative integer
    }
    if bytes.len() > 1 && bytes[0] == 0x00 && bytes[1] & 0x80 == 0 {
        return None; // superfluous leading zero
    }
    Some((bytes.to_vec(), start + len))
}

fn pad_to_32(bytes: &[u8]) -> Option<[u8; 32]> {
    if bytes.len() > 32 {
        return None;
    }
    let mut out = [0u8; 32];
    out[32 - bytes.len()..].copy_from_slice(bytes);
    Some(out)
}

fn is_zero(bytes: &[u8; 32]) -> bool {
    bytes.iter().all(|b| *b == 0)
}

fn is_less_than(a: &[u8; 32], b: &[u8; 32]) -> bool {
    a < b
}

fn is_greater_than(a: &[u8; 32], b: &[u8; 32]) -> bool {
    a > b
}

/// `a - b`, assuming `a >= b`, as 32-byte big-endian arrays.
fn sub_mod(a: &[u8; 32], b: &[u8; 32]) -> [u8; 32] {
    let mut out = [0u8; 32];
    let mut borrow: i16 = 0;
    for i in (0..32).rev() {
        let mut diff = a[i] as i16 - b[i] as i16 - borrow;
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash160_is_ripemd_of_sha256() {
        let data = b"test";
        assert_eq!(hash160(data), ripemd160(&sha256(data)));
    }

    #[test]
    fn hash256_matches_double_sha256() {
        let data = b"test";
        assert_eq!(hash256(data), sha256(&sha256(data)));
    }

    #[test]
    fn sha1_known_vector() {
        let digest = sha1(b"abc");
        assert_eq!(hex::encode(digest), "a9993e364706816aba3e25717850c26c9cd0d89");
    }

    #[test]
    fn ripemd160_known_vector() {
        let digest = ripemd160(b"");
        assert_eq!(hex::encode(digest), "9c1185a5c5e9fc54612808977ee8f548b2258d31");
    }

    #[test]
    fn verify_ecdsa_rejects_too_short_signature() {
        assert!(!verify_ecdsa(&[0x02; 33], &[0u8; 8], &[0u8; 32], 0));
    }

    #[test]
    fn verify_ecdsa_rejects_too_long_signature() {
        assert!(!verify_ecdsa(&[0x02; 33], &[0u8; 74], &[0u8; 32], 0));
    }

    #[test]
    fn verify_ecdsa_rejects_bad_pubkey_shape() {
        let sig = vec![0x30, 0x06, 0x02, 0x01, 0x01, 0x02, 0x01, 0x01, 0x01];
        assert!(!verify_ecdsa(&[0x05; 33], &sig, &[0u8; 32], 0));
        assert!(!verify_ecdsa(&[0x02; 10], &sig, &[0u8; 32], 0));
    }

    #[test]
    fn verify_ecdsa_rejects_der_with_superfluous_leading_zero() {
        // r = 0x00 0x01 (superfluous: 0x01's top bit is clear)
        let sig = vec![0x30, 0x07, 0x02, 0x02, 0x00, 0x01, 0x02, 0x01, 0x01, 0x01];
        assert!(!verify_ecdsa(&[0x02; 33], &sig, &[0u8; 32], 0));
    }

    #[test]
    fn verify_ecdsa_rejects_negative_integer() {
        // r's first byte has the top bit set with no padding zero byte.
        let sig = vec![0x30, 0x06, 0x02, 0x01, 0x80, 0x02, 0x01, 0x01, 0x01];
        assert!(!verify_ecdsa(&[0x02; 33], &sig, &[0u8; 32], 0));
    }

    #[test]
    fn end_to_end_sign_and_verify_low_s() {
        let secp = Secp256k1::new();
        let secret = secp256k1::SecretKey::from_slice(&[0x11; 32]).unwrap();
        let public = PublicKey::from_secret_key(&secp, &secret);
        let msg_bytes = hash256(b"message");
        let message = Message::from_digest_slice(&msg_bytes).unwrap();
        let mut sig = secp.sign_ecdsa(&message, &secret);
        sig.normalize_s();
        let mut der = sig.serialize_der().to_vec();
        der.push(0x01); // SIGHASH_ALL
        assert!(verify_ecdsa(&public.serialize(), &der, &msg_bytes, 2_000_000_000));
    }

    #[test]
    fn end_to_end_tampered_message_fails() {
        let secp = Secp256k1::new();
        let secret = secp256k1::SecretKey::from_slice(&[0x22; 32]).unwrap();
        let public = PublicKey::from_secret_key(&secp, &secret);
        let msg_bytes = hash256(b"message");
        let message = Message::from_digest_slice(&msg_bytes).unwrap();
        let mut sig = secp.sign_ecdsa(&message, &secret);
        sig.normalize_s();
        let mut der = sig.serialize_der().to_vec();
        der.push(0x01);
        let wrong_message = hash256(b"different message");
        assert!(!verify_ecdsa(&public.serialize(), &der, &wrong_message, 2_000_000_000));
    }

    #[test]
    fn end_to_end_wrong_signer_fails() {
        let secp = Secp256k1::new();
        let secret = secp256k1::SecretKey::from_slice(&[0x33; 32]).unwrap();
        let other_secret = secp256k1::SecretKey::from_slice(&[0x44; 32]).unwrap();
        let other_public = PublicKey::from_secret_key(&secp, &other_secret);
        let msg_bytes = hash256(b"message");
        let message = Message::from_digest_slice(&msg_bytes).unwrap();
        let mut sig = secp.sign_ecdsa(&message, &secret);
        sig.normalize_s();
        let mut der = sig.serialize_der().to_vec();
        der.push(0x01);
        assert!(!verify_ecdsa(&other_public.serialize(), &der, &msg_bytes, 2_000_000_000));
    }

    #[test]
    fn sub_mod_computes_difference() {
        let diff = sub_mod(&SECP256K1_ORDER, &SECP256K1_HALF_ORDER);
        assert!(is_greater_than(&diff, &[0u8; 32]));
    }
}
