//! Arbitrary-precision signed integer, per `spec.md` §3/§4.1.

use num_bigint::{BigInt, Sign};
use num_traits::{ToPrimitive, Zero};

/// Which representation an [`Int`] is currently stored in. `spec.md` §3
/// requires exposing "the narrowest losslessly correct size"; `I64` covers
/// both the fits-in-32 and fits-in-64 cases (an `i64` already holds every
/// 32-bit value losslessly, so a third storage variant would just be dead
/// weight — callers that want to know whether a value fits in 32 bits use
/// [`Int::as_i32`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntSize {
    I64,
    BigInt,
}

/// An arbitrary-precision signed integer.
#[derive(Debug, Clone)]
pub enum Int {
    I64(i64),
    BigInt(BigInt),
}

impl Int {
    pub fn size(&self) -> IntSize {
        match self {
            Int::I64(_) => IntSize::I64,
            Int::BigInt(_) => IntSize::BigInt,
        }
    }

    /// Returns the value as an `i32`, or `None` if it doesn't fit.
    pub fn as_i32(&self) -> Option<i32> {
        self.as_i64().and_then(|v| i32::try_from(v).ok())
    }

    /// Returns the value as an `i64`, or `None` if it doesn't fit.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Int::I64(v) => Some(*v),
            Int::BigInt(v) => v.to_i64(),
        }
    }

    /// Returns the value as a [`BigInt`]. This accessor never fails: every
    /// `Int` can be losslessly widened to arbitrary precision.
    pub fn as_big_int(&self) -> BigInt {
        match self {
            Int::I64(v) => BigInt::from(*v),
            Int::BigInt(v) => v.clone(),
        }
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Int::I64(v) => *v == 0,
            Int::BigInt(v) => v.is_zero(),
        }
    }

    pub fn is_negative(&self) -> bool {
        match self {
            Int::I64(v) => *v < 0,
            Int::BigInt(v) => v.sign() == Sign::Minus,
        }
    }

    /// Normalize a `BigInt` that fits in an `i64` down to `Int::I64`. Used
    /// by the binary reader after decoding a sign-magnitude body, since a
    /// value that decodes to e.g. 8 magnitude bytes may still fit in 64
    /// bits.
    pub fn normalize(value: BigInt) -> Int {
        match value.to_i64() {
            Some(v) => Int::I64(v),
            None => Int::BigInt(value),
        }
    }
}

impl From<i64> for Int {
    fn from(value: i64) -> Self {
        Int::I64(value)
    }
}

impl From<i32> for Int {
    fn from(value: i32) -> Self {
        Int::I64(value as i64)
    }
}

impl From<BigInt> for Int {
    fn from(value: BigInt) -> Self {
        Int::normalize(value)
    }
}

impl PartialEq for Int {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Int::I64(a), Int::I64(b)) => a == b,
            _ => self.as_big_int() == other.as_big_int(),
        }
    }
}

impl Eq for Int {}

impl std::fmt::Display for Int {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Int::I64(v) => write!(f, "{v}"),
            Int::BigInt(v) => write!(f, "{v}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_demotes_small_bigint() {
        let i = Int::normalize(BigInt::from(42));
        assert_eq!(i.size(), IntSize::I64);
        assert_eq!(i.as_i64(), Some(42));
    }

    #[test]
    fn normalize_keeps_large_bigint() {
        let huge = BigInt::from(i64::MAX) * BigInt::from(10);
        let i = Int::normalize(huge.clone());
        assert_eq!(i.size(), IntSize::BigInt);
        assert_eq!(i.as_big_int(), huge);
        assert_eq!(i.as_i64(), None);
    }

    #[test]
    fn equality_ignores_storage_variant() {
        assert_eq!(Int::I64(42), Int::BigInt(BigInt::from(42)));
    }
}
