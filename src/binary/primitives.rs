//! Bit-level codecs for Ion binary's four integer sub-encodings (`spec.md`
//! §4.1): `UInt`, `Int` (sign-magnitude), `VarUInt`, `VarInt`.

use num_bigint::{BigInt, BigUint, Sign};
use num_traits::Zero;

use crate::error::{IonError, IonResult};

/// Default cap on decoded `VarUInt`/`VarInt` byte length (spec.md §4.1).
pub const MAX_VAR_LEN: usize = 10;

/// Decodes a `VarUInt` from `bytes`, returning the value and the number of
/// bytes consumed. The top bit of each byte is the "last byte" marker.
pub fn decode_var_uint(bytes: &[u8]) -> IonResult<(u64, usize)> {
    let mut value: u64 = 0;
    for (i, &b) in bytes.iter().enumerate() {
        if i >= MAX_VAR_LEN {
            return Err(IonError::syntax(0, "VarUInt exceeds maximum length"));
        }
        value = (value << 7) | (b & 0x7F) as u64;
        if b & 0x80 != 0 {
            return Ok((value, i + 1));
        }
    }
    Err(IonError::UnexpectedEof { offset: 0 })
}

/// Minimum-length `VarUInt` encoding of `value`.
pub fn encode_var_uint(value: u64) -> Vec<u8> {
    let mut digits = Vec::new();
    let mut v = value;
    loop {
        digits.push((v & 0x7F) as u8);
        v >>= 7;
        if v == 0 {
            break;
        }
    }
    digits.reverse();
    let len = digits.len();
    digits[len - 1] |= 0x80;
    digits
}

/// Decodes a `VarInt`: like `VarUInt` but byte 0 reserves bit 6 for sign and
/// contributes only 6 magnitude bits.
///
/// The magnitude is accumulated in a `u64` rather than directly negated as
/// an `i64`: `-2^63` encodes a magnitude of exactly `2^63`, which has no
/// positive `i64` representation, so naively negating an `i64` accumulator
/// would overflow on that boundary value (`spec.md` §8, boundary ±2^63).
pub fn decode_var_int(bytes: &[u8]) -> IonResult<(i64, usize)> {
    if bytes.is_empty() {
        return Err(IonError::UnexpectedEof { offset: 0 });
    }
    let negative = bytes[0] & 0x40 != 0;
    let mut magnitude: u64 = (bytes[0] & 0x3F) as u64;
    if bytes[0] & 0x80 != 0 {
        return Ok((var_int_value(magnitude, negative)?, 1));
    }
    for (i, &b) in bytes.iter().enumerate().skip(1) {
        if i >= MAX_VAR_LEN {
            return Err(IonError::syntax(0, "VarInt exceeds maximum length"));
        }
        magnitude = (magnitude << 7) | (b & 0x7F) as u64;
        if b & 0x80 != 0 {
            return Ok((var_int_value(magnitude, negative)?, i + 1));
        }
    }
    Err(IonError::UnexpectedEof { offset: 0 })
}

/// Combines a `VarInt` magnitude and sign into an `i64`, handling the
/// `-2^63` sentinel magnitude that has no positive `i64` counterpart.
fn var_int_value(magnitude: u64, negative: bool) -> IonResult<i64> {
    const MIN_MAGNITUDE: u64 = 1u64 << 63;
    if negative {
        if magnitude == MIN_MAGNITUDE {
            Ok(i64::MIN)
        } else {
            i64::try_from(magnitude)
                .map(|m| -m)
                .map_err(|_| IonError::syntax(0, "VarInt magnitude out of range"))
        }
    } else {
        i64::try_from(magnitude).map_err(|_| IonError::syntax(0, "VarInt magnitude out of range"))
    }
}

/// Minimum-length `VarInt` encoding of `value`.
pub fn encode_var_int(value: i64) -> Vec<u8> {
    let negative = value < 0;
    let magnitude = value.unsigned_abs();
    let mut digits = Vec::new();
    let mut v = magnitude;
    loop {
        digits.push((v & 0x7F) as u8);
        v >>= 7;
        if v == 0 {
            break;
        }
    }
    digits.reverse();
    // Byte 0 only carries 6 magnitude bits; if the 7th bit of the leading
    // digit is set, a zero-magnitude sign byte is prefixed.
    if digits[0] & 0x40 != 0 {
        digits.insert(0, 0);
    }
    digits[0] |= if negative { 0x40 } else { 0 };
    let len = digits.len();
    digits[len - 1] |= 0x80;
    digits
}

/// Decodes a plain big-endian unsigned `UInt` body of exactly `len` bytes.
pub fn decode_uint(bytes: &[u8]) -> BigUint {
    if bytes.is_empty() {
        BigUint::zero()
    } else {
        BigUint::from_bytes_be(bytes)
    }
}

/// Minimum big-endian byte sequence for `value` (empty for zero).
pub fn encode_uint(value: &BigUint) -> Vec<u8> {
    if value.is_zero() {
        Vec::new()
    } else {
        value.to_bytes_be()
    }
}

/// Decodes a sign-magnitude `Int` body: bit 7 of byte 0 is the sign.
/// Rejects negative zero, which is invalid on the wire (`spec.md` §6.1).
pub fn decode_int(bytes: &[u8]) -> IonResult<BigInt> {
    if bytes.is_empty() {
        return Ok(BigInt::zero());
    }
    let negative = bytes[0] & 0x80 != 0;
    let mut magnitude_bytes = bytes.to_vec();
    magnitude_bytes[0] &= 0x7F;
    let magnitude = BigUint::from_bytes_be(&magnitude_bytes);
    if negative && magnitude.is_zero() {
        return Err(IonError::syntax(0, "negative zero Int is not allowed on the wire"));
    }
    let sign = if negative {
        Sign::Minus
    } else if magnitude.is_zero() {
        Sign::NoSign
    } else {
        Sign::Plus
    };
    Ok(BigInt::from_biguint(sign, magnitude))
}

/// Sign-magnitude encoding of `value` (empty for zero). A negative `value`
/// that is numerically zero (possible since [`BigInt`] normalizes sign away
/// from zero magnitudes) still encodes to the canonical empty form — binary
/// Ion's `Int` sub-encoding has no representation for negative zero
/// (`spec.md` §4.1), so a decimal coefficient or timestamp fraction
/// coefficient with a negative-zero sign bit silently loses that sign on
/// the wire.
pub fn encode_int(value: &BigInt) -> Vec<u8> {
    if value.is_zero() {
        return Vec::new();
    }
    let (sign, magnitude) = value.clone().into_parts();
    let mut bytes = magnitude.to_bytes_be();
    if bytes[0] & 0x80 != 0 {
        bytes.insert(0, 0);
    }
    if sign == Sign::Minus {
        bytes[0] |= 0x80;
    }
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn var_uint_known_vectors() {
        assert_eq!(encode_var_uint(0), vec![0x80]);
        assert_eq!(encode_var_uint(127), vec![0xFF]);
        assert_eq!(encode_var_uint(128), vec![0x01, 0x80]);
        assert_eq!(decode_var_uint(&[0x81]).unwrap(), (1, 1));
        assert_eq!(decode_var_uint(&[0x01, 0x80]).unwrap(), (128, 2));
    }

    #[test]
    fn var_int_known_vectors() {
        assert_eq!(encode_var_int(0), vec![0x80]);
        assert_eq!(encode_var_int(-1), vec![0xC1]);
        assert_eq!(decode_var_int(&[0xC1]).unwrap(), (-1, 1));
        assert_eq!(decode_var_int(&encode_var_int(-128)).unwrap().0, -128);
    }

    #[test]
    fn var_int_min_i64_does_not_overflow_on_negation() {
        let encoded = encode_var_int(i64::MIN);
        assert_eq!(decode_var_int(&encoded).unwrap().0, i64::MIN);
        assert_eq!(decode_var_int(&encode_var_int(i64::MAX)).unwrap().0, i64::MAX);
    }

    #[test]
    fn uint_round_trip_and_min_length() {
        let v = BigUint::from(300u32);
        let encoded = encode_uint(&v);
        assert_eq!(encoded, vec![0x01, 0x2C]);
        assert_eq!(decode_uint(&encoded), v);
        assert_eq!(encode_uint(&BigUint::zero()), Vec::<u8>::new());
    }

    #[test]
    fn int_round_trip_and_negative_zero_rejected() {
        let v = BigInt::from(-300);
        let encoded = encode_int(&v);
        assert_eq!(decode_int(&encoded).unwrap(), v);
        assert!(decode_int(&[0x80]).is_err());
        assert_eq!(decode_int(&[]).unwrap(), BigInt::zero());
    }

    #[test]
    fn negative_zero_int_collapses_to_canonical_empty_encoding() {
        let negative_zero = BigInt::from_biguint(Sign::Minus, BigUint::zero());
        assert_eq!(encode_int(&negative_zero), Vec::<u8>::new());
    }

    proptest! {
        #[test]
        fn var_uint_round_trips(u in 0u64..(1u64 << 56)) {
            let encoded = encode_var_uint(u);
            let (decoded, len) = decode_var_uint(&encoded).unwrap();
            prop_assert_eq!(decoded, u);
            prop_assert_eq!(len, encoded.len());
        }

        #[test]
        fn var_int_round_trips(i in any::<i64>()) {
            let encoded = encode_var_int(i);
            let (decoded, len) = decode_var_int(&encoded).unwrap();
            prop_assert_eq!(decoded, i);
            prop_assert_eq!(len, encoded.len());
        }

        #[test]
        fn uint_round_trips(bytes in prop::collection::vec(any::<u8>(), 0..16)) {
            let v = BigUint::from_bytes_be(&bytes);
            let encoded = encode_uint(&v);
            prop_assert_eq!(decode_uint(&encoded), v);
        }

        #[test]
        fn int_round_trips(n in any::<i64>()) {
            let v = BigInt::from(n);
            let encoded = encode_int(&v);
            prop_assert_eq!(decode_int(&encoded).unwrap(), v);
        }
    }
}
