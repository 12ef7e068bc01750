//! Bitcoin Script "script number" rules: minimal-length little-endian
//! integers with the sign bit in the top bit of the last byte, bounded to
//! 4 bytes in this profile (arithmetic is defined on 32-bit
//! signed minimally-encoded little-endian integers").

use crate::error::ScriptError;

const MAX_NUM_BYTES: usize = 4;

/// Decode a stack item as a script number. An empty byte-string is `0`.
pub fn decode_num(bytes: &[u8]) -> Result<i64, ScriptError> {
    if bytes.is_empty() {
        return Ok(0);
    }
    if bytes.len() > MAX_NUM_BYTES {
        return Err(ScriptError::NumberOverflow);
    }
    let mut result: i64 = 0;
    for (i, b) in bytes.iter().enumerate() {
        result |= (*b as i64) << (8 * i);
    }
    let last = bytes.len() - 1;
    if bytes[last] & 0x80 != 0 {
        result &= !(0x80i64 << (8 * last));
        result = -result;
    }
    Ok(result)
}

/// Encode an integer as a minimal-length little-endian script number.
pub fn encode_num(n: i64) -> Vec<u8> {
    if n == 0 {
        return Vec::new();
    }
    let negative = n < 0;
    let mut absval = n.unsigned_abs();
    let mut out = Vec::new();
    while absval > 0 {
        out.push((absval & 0xff) as u8);
        absval >>= 8;
    }
    if out.last().copied().unwrap_or(0) & 0x80 != 0 {
        out.push(if negative { 0x80 } else { 0x00 });
    } else if negative {
        *out.last_mut().unwrap() |= 0x80;
    }
    out
}

/// Bitcoin-convention boolean cast: false iff empty or a signed zero
/// (`0x00` or `0x80`), true otherwise.
pub fn cast_to_bool(item: &[u8]) -> bool {
    !matches!(item, [] | [0x00] | [0x80])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_encodes_to_empty() {
        assert_eq!(encode_num(0), Vec::<u8>::new());
        assert_eq!(decode_num(&[]).unwrap(), 0);
    }

    #[test]
    fn positive_round_trip() {
        for n in [1i64, 16, 127, 128, 255, 256, 70_000, i32::MAX as i64] {
            let enc = encode_num(n);
            assert_eq!(decode_num(&enc).unwrap(), n);
        }
    }

    #[test]
    fn negative_round_trip() {
        for n in [-1i64, -16, -127, -128, -255, -256, -70_000, i32::MIN as i64 + 1] {
            let enc = encode_num(n);
            assert_eq!(decode_num(&enc).unwrap(), n);
        }
    }

    #[test]
    fn cast_to_bool_rules() {
        assert!(!cast_to_bool(&[]));
        assert!(!cast_to_bool(&[0x00]));
        assert!(!cast_to_bool(&[0x80]));
        assert!(cast_to_bool(&[0x01]));
        assert!(cast_to_bool(&[0x00, 0x01]));
    }

    #[test]
    fn overflow_past_four_bytes_is_rejected() {
        assert!(decode_num(&[0x01, 0x02, 0x03, 0x04, 0x05]).is_err());
    }

    #[test]
    fn one_and_negative_one_are_distinct() {
        assert_eq!(encode_num(1), vec![0x01]);
        assert_eq!(encode_num(-1), vec![0x81]);
    }
}
