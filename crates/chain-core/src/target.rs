//! Compact difficulty target ("bits") decoding and proof-of-work check.
//!
//! `bits` packs a target as `mantissa · 256^(exponent−3)`: the high byte is
//! the exponent, the remaining three bytes are the mantissa, matching
//! Bitcoin's compact representation. The expanded target is a 256-bit
//! unsigned integer in big-endian byte order, which is all the comparison
//! below needs — no bignum crate required.

/// Expand `bits` into the full 256-bit target it represents, as 32
/// big-endian bytes.
pub fn bits_to_target(bits: u32) -> [u8; 32] {
    let exponent = (bits >> 24) as i32;
    let mantissa = (bits & 0x00ff_ffff) as u64;
    let mut out = [0u8; 32];

    // The mantissa's 3 bytes occupy [exponent-3, exponent-1] counting from
    // the most-significant byte of a byte-length-`exponent` integer, i.e.
    // big-endian offset `32 - exponent` from the start of `out`.
    let mantissa_bytes = mantissa.to_be_bytes(); // 8 bytes, value in the low 3
    for (i, byte) in mantissa_bytes[5..8].iter().enumerate() {
        let shift = exponent - 3 + (2 - i as i32);
        if shift < 0 || shift >= 32 {
            continue;
        }
        let idx = 31 - shift as usize;
        out[idx] = *byte;
    }
    out
}

/// `int(hash) <= target(bits)`, comparing both as big-endian 256-bit
/// unsigned integers.
pub fn hash_within_target(hash: &[u8; 32], bits: u32) -> bool {
    hash.as_slice() <= bits_to_target(bits).as_slice()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mainnet_genesis_bits_accepts_mainnet_genesis_hash() {
        // Bitcoin mainnet genesis hash has 5 leading zero bytes, comfortably
        // under the 0x1d00ffff target (whose own leading run is 4 zero bytes).
        let mut hash = [0xffu8; 32];
        hash[0] = 0x00;
        hash[1] = 0x00;
        hash[2] = 0x00;
        hash[3] = 0x00;
        hash[4] = 0x00;
        assert!(hash_within_target(&hash, 0x1d00ffff));
    }

    #[test]
    fn harder_bits_rejects_easier_hash() {
        let easy_hash = [0xffu8; 32];
        assert!(!hash_within_target(&easy_hash, 0x1d00ffff));
    }

    #[test]
    fn exponent_three_places_mantissa_at_low_bytes() {
        // exponent = 3: mantissa occupies the low 3 bytes unshifted.
        let target = bits_to_target(0x03_12_34_56);
        assert_eq!(&target[29..32], &[0x12, 0x34, 0x56]);
        assert_eq!(&target[0..29], &[0u8; 29]);
    }

    #[test]
    fn exponent_above_three_shifts_left() {
        // exponent = 4: mantissa shifted left by one byte from the tail.
        let target = bits_to_target(0x04_12_34_56);
        assert_eq!(&target[28..31], &[0x12, 0x34, 0x56]);
        assert_eq!(target[31], 0x00);
    }

    #[test]
    fn zero_hash_always_within_target() {
        assert!(hash_within_target(&[0u8; 32], 0x1e000000));
    }

    #[test]
    fn min_allowed_bits_is_easiest_configured_floor() {
        // bits = 1e000000 is the minimum (easiest) allowed floor.
        let target = bits_to_target(0x1e00_0000);
        assert_ne!(target, [0u8; 32]);
    }

    #[test]
    fn higher_mantissa_is_easier_target_at_same_exponent() {
        let low = bits_to_target(0x1d00_1000);
        let high = bits_to_target(0x1d00_ffff);
        assert!(low.as_slice() < high.as_slice());
    }
}
