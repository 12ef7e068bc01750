//! Byte codec: fixed-width little-endian integers, compact-size varints,
//! hex (de)serialization, and double-SHA-256 hashing (component C1).

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

use crate::error::CodecError;

/// A 32-byte identifier, rendered as a 64-character lowercase hex string.
///
/// The bytes stored here are in *display* order (the order a block explorer
/// would print, and the order used for equality/caller comparisons). Raw
/// on-wire serialization reverses these bytes; see [`Hash32::to_internal`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Hash32(pub [u8; 32]);

impl Hash32 {
    /// The all-zero hash, used for the genesis `previous_hash` and the
    /// coinbase/mempool sentinel outpoint.
    pub const ZERO: Self = Self([0u8; 32]);

    pub fn from_hex(s: &str) -> Result<Self, CodecError> {
        if s.len() != 64 {
            return Err(CodecError::WrongLength { expected: 64, got: s.len() });
        }
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes).map_err(|_| CodecError::NotHex(s.to_string()))?;
        Ok(Self(bytes))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// Byte-reversed form used when embedding this hash into a raw byte
    /// stream (block header `prev_hash`/`merkle_root`, vin `utxo_txid`).
    pub fn to_internal(&self) -> [u8; 32] {
        reverse_array(&self.0)
    }

    /// Inverse of [`Hash32::to_internal`]: build a display-order hash from
    /// bytes read off the wire.
    pub fn from_internal(bytes: [u8; 32]) -> Self {
        Self(reverse_array(&bytes))
    }
}

impl fmt::Debug for Hash32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash32({})", self.to_hex())
    }
}

impl fmt::Display for Hash32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Hash32 {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Hash32 {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Hash32::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

fn reverse_array(bytes: &[u8; 32]) -> [u8; 32] {
    let mut out = [0u8; 32];
    for (i, b) in bytes.iter().rev().enumerate() {
        out[i] = *b;
    }
    out
}

/// Reverse the byte order of a hex string (used for the display `⇄` internal swap).
pub fn reverse_hex_bytes(hex_str: &str) -> Result<String, CodecError> {
    if hex_str.len() % 2 != 0 {
        return Err(CodecError::NotHex(hex_str.to_string()));
    }
    let bytes = hex::decode(hex_str).map_err(|_| CodecError::NotHex(hex_str.to_string()))?;
    Ok(hex::encode(bytes.iter().rev().copied().collect::<Vec<u8>>()))
}

/// Double SHA-256, returning the raw (internal-order) digest.
pub fn dsha256(data: &[u8]) -> [u8; 32] {
    let first = Sha256::digest(data);
    Sha256::digest(first).into()
}

/// Double SHA-256 as a displayed [`Hash32`] (byte-reversed digest).
pub fn dsha256_display(data: &[u8]) -> Hash32 {
    Hash32::from_internal(dsha256(data))
}

/// Encode `n` as exactly `width` little-endian bytes.
pub fn int_le(n: u64, width: usize) -> Vec<u8> {
    n.to_le_bytes()[..width].to_vec()
}

pub fn u32_le(n: u32) -> [u8; 4] {
    n.to_le_bytes()
}

pub fn u64_le(n: u64) -> [u8; 8] {
    n.to_le_bytes()
}

/// Bitcoin's variable-length integer: 1/3/5/9-byte prefix keyed on magnitude.
pub fn compact_size(n: u64) -> Vec<u8> {
    if n < 0xFD {
        vec![n as u8]
    } else if n <= 0xFFFF {
        let mut v = vec![0xFD];
        v.extend_from_slice(&(n as u16).to_le_bytes());
        v
    } else if n <= 0xFFFF_FFFF {
        let mut v = vec![0xFE];
        v.extend_from_slice(&(n as u32).to_le_bytes());
        v
    } else {
        let mut v = vec![0xFF];
        v.extend_from_slice(&n.to_le_bytes());
        v
    }
}

/// Decode a compact-size integer from the front of `data`, returning the
/// value and the number of bytes consumed. Rejects any encoding that is
/// not the shortest legal one for its value.
pub fn read_compact_size(data: &[u8]) -> Result<(u64, usize), CodecError> {
    let first = *data.first().ok_or(CodecError::UnexpectedEof("compact_size prefix"))?;
    match first {
        0xFD => {
            let bytes = data.get(1..3).ok_or(CodecError::UnexpectedEof("compact_size u16"))?;
            let value = u16::from_le_bytes(bytes.try_into().unwrap()) as u64;
            if value < 0xFD {
                return Err(CodecError::NonMinimalCompactSize);
            }
            Ok((value, 3))
        }
        0xFE => {
            let bytes = data.get(1..5).ok_or(CodecError::UnexpectedEof("compact_size u32"))?;
            let value = u32::from_le_bytes(bytes.try_into().unwrap()) as u64;
            if value <= 0xFFFF {
                return Err(CodecError::NonMinimalCompactSize);
            }
            Ok((value, 5))
        }
        0xFF => {
            let bytes = data.get(1..9).ok_or(CodecError::UnexpectedEof("compact_size u64"))?;
            let value = u64::from_le_bytes(bytes.try_into().unwrap());
            if value <= 0xFFFF_FFFF {
                return Err(CodecError::NonMinimalCompactSize);
            }
            Ok((value, 9))
        }
        n => Ok((n as u64, 1)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn hash32_zero_is_zero() {
        assert!(Hash32::ZERO.is_zero());
    }

    #[test]
    fn hash32_hex_round_trip() {
        let h = Hash32([0xAB; 32]);
        let s = h.to_hex();
        assert_eq!(s.len(), 64);
        assert_eq!(Hash32::from_hex(&s).unwrap(), h);
    }

    #[test]
    fn hash32_rejects_wrong_length() {
        assert!(Hash32::from_hex("ab").is_err());
    }

    #[test]
    fn hash32_rejects_non_hex() {
        let bad = "z".repeat(64);
        assert!(Hash32::from_hex(&bad).is_err());
    }

    #[test]
    fn internal_round_trip_reverses_twice() {
        let mut bytes = [0u8; 32];
        bytes[0] = 1;
        bytes[1] = 2;
        bytes[2] = 3;
        bytes[3] = 4;
        let h = Hash32(bytes);
        let internal = h.to_internal();
        assert_eq!(Hash32::from_internal(internal), h);
    }

    #[test]
    fn dsha256_is_double_sha256() {
        let data = b"hello";
        let expected = Sha256::digest(Sha256::digest(data));
        assert_eq!(dsha256(data), expected.as_slice());
    }

    #[test]
    fn dsha256_display_is_reversed_digest() {
        let data = b"hello";
        let raw = dsha256(data);
        let mut reversed = raw;
        reversed.reverse();
        assert_eq!(dsha256_display(data).0, reversed);
    }

    #[test]
    fn compact_size_boundaries() {
        assert_eq!(compact_size(0x00), vec![0x00]);
        assert_eq!(compact_size(0xFC), vec![0xFC]);
        assert_eq!(compact_size(0xFD)[0], 0xFD);
        assert_eq!(compact_size(0xFFFF)[0], 0xFD);
        assert_eq!(compact_size(0x1_0000)[0], 0xFE);
        assert_eq!(compact_size(0xFFFF_FFFF)[0], 0xFE);
        assert_eq!(compact_size(0x1_0000_0000)[0], 0xFF);
    }

    #[test]
    fn compact_size_round_trip_boundaries() {
        for n in [0u64, 0xFC, 0xFD, 0x100, 0xFFFF, 0x10000, 0x10001, 0xFFFF_FFFF, 0x1_0000_0000] {
            let enc = compact_size(n);
            let (decoded, used) = read_compact_size(&enc).unwrap();
            assert_eq!(decoded, n);
            assert_eq!(used, enc.len());
        }
    }

    #[test]
    fn compact_size_rejects_non_minimal_encodings() {
        // 0xFD prefix encoding a value that fits in one byte.
        assert!(read_compact_size(&[0xFD, 0x05, 0x00]).is_err());
        // 0xFE prefix encoding a value that fits in the 0xFD range.
        assert!(read_compact_size(&[0xFE, 0xFF, 0x00, 0x00, 0x00]).is_err());
        // 0xFF prefix encoding a value that fits in the 0xFE range.
        let mut buf = vec![0xFF];
        buf.extend_from_slice(&100u64.to_le_bytes());
        assert!(read_compact_size(&buf).is_err());
    }

    #[test]
    fn u32_le_round_trip() {
        assert_eq!(u32::from_le_bytes(u32_le(0xDEADBEEF)), 0xDEADBEEF);
    }

    proptest! {
        #[test]
        fn compact_size_round_trip_arbitrary(n: u64) {
            let enc = compact_size(n);
            let (decoded, used) = read_compact_size(&enc).unwrap();
            prop_assert_eq!(decoded, n);
            prop_assert_eq!(used, enc.len());
        }
    }
}
