//! Arbitrary-precision signed decimal, per `spec.md` §3/§4.2.
//!
//! Stored as sign-magnitude (mirroring the binary wire encoding of the
//! coefficient, `spec.md` §4.1's `Int`) rather than a signed `BigInt`
//! coefficient, so that a zero coefficient can still carry a sign and
//! `0.`/`-0.` round-trip as distinct values (`spec.md` §9 Open Questions).

use std::cmp::Ordering;
use std::str::FromStr;

use num_bigint::BigUint;
use num_traits::Zero;

use crate::error::{IonError, IonResult};

/// `value = (-1)^negative * magnitude * 10^exponent`.
#[derive(Debug, Clone)]
pub struct Decimal {
    negative: bool,
    magnitude: BigUint,
    exponent: i32,
}

impl Decimal {
    pub fn new(negative: bool, magnitude: BigUint, exponent: i32) -> Self {
        Decimal {
            negative,
            magnitude,
            exponent,
        }
    }

    pub fn zero() -> Self {
        Decimal {
            negative: false,
            magnitude: BigUint::zero(),
            exponent: 0,
        }
    }

    pub fn from_i64(value: i64) -> Self {
        Decimal {
            negative: value < 0,
            magnitude: BigUint::from(value.unsigned_abs()),
            exponent: 0,
        }
    }

    pub fn magnitude(&self) -> &BigUint {
        &self.magnitude
    }

    pub fn exponent(&self) -> i32 {
        self.exponent
    }

    /// The sign bit as stored, independent of whether the magnitude is
    /// zero. Use [`Decimal::is_negative`] for a value-level sign test that
    /// treats `-0` as non-negative for ordering purposes.
    pub fn sign_bit(&self) -> bool {
        self.negative
    }

    pub fn is_negative(&self) -> bool {
        self.negative && !self.magnitude.is_zero()
    }

    pub fn is_zero(&self) -> bool {
        self.magnitude.is_zero()
    }

    /// Number of significant (coefficient) digits, i.e. the decimal's
    /// declared precision.
    pub fn precision(&self) -> usize {
        if self.magnitude.is_zero() {
            1
        } else {
            self.magnitude.to_str_radix(10).len()
        }
    }

    /// Parses Ion decimal text: `[-]digits[.digits][(D|d)[+|-]digits]`.
    pub fn parse(text: &str) -> IonResult<Decimal> {
        let bytes = text.as_bytes();
        if bytes.is_empty() {
            return Err(IonError::syntax(0, "empty decimal literal"));
        }
        let mut i = 0;
        let negative = bytes[0] == b'-';
        if negative || bytes[0] == b'+' {
            i += 1;
        }
        let int_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == int_start {
            return Err(IonError::syntax(0, "decimal requires at least one digit"));
        }
        let mut digits = String::from(&text[int_start..i]);
        let mut fractional_digit_count: i32 = 0;
        if i < bytes.len() && bytes[i] == b'.' {
            i += 1;
            let frac_start = i;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
            fractional_digit_count = (i - frac_start) as i32;
            digits.push_str(&text[frac_start..i]);
        }
        let mut d_exponent: i32 = 0;
        if i < bytes.len() && (bytes[i] == b'd' || bytes[i] == b'D') {
            i += 1;
            let exp_str = &text[i..];
            d_exponent = exp_str
                .parse::<i32>()
                .map_err(|_| IonError::syntax(i as u64, "malformed decimal exponent"))?;
            i = bytes.len();
        }
        if i != bytes.len() {
            return Err(IonError::syntax(i as u64, "trailing characters in decimal"));
        }
        // Drop leading zeros from the digit string when computing the
        // magnitude, but keep `digits.len()` (via fractional_digit_count)
        // driving the exponent so trailing zero precision survives.
        let magnitude = BigUint::from_str(&digits)
            .map_err(|_| IonError::syntax(0, "malformed decimal coefficient"))?;
        let exponent = d_exponent - fractional_digit_count;
        Ok(Decimal {
            negative,
            magnitude,
            exponent,
        })
    }

    /// Produces the canonical Ion text form (`spec.md` §4.2's `format`
    /// rules).
    pub fn format(&self) -> String {
        let sign = if self.negative { "-" } else { "" };
        if self.magnitude.is_zero() {
            return match self.exponent.cmp(&0) {
                Ordering::Equal => format!("{sign}0."),
                Ordering::Greater => format!("{sign}0d{}", self.exponent),
                Ordering::Less => format!("{sign}0.{}", "0".repeat((-self.exponent) as usize)),
            };
        }
        let digits = self.magnitude.to_str_radix(10);
        let ndigits = digits.len() as i32;
        match self.exponent.cmp(&0) {
            Ordering::Equal => format!("{sign}{digits}."),
            Ordering::Greater => format!("{sign}{digits}d{}", self.exponent),
            Ordering::Less => {
                let point = ndigits + self.exponent;
                if point > 0 {
                    let (int_part, frac_part) = digits.split_at(point as usize);
                    format!("{sign}{int_part}.{frac_part}")
                } else {
                    let (first, rest) = digits.split_at(1);
                    let new_exponent = self.exponent + ndigits - 1;
                    if rest.is_empty() {
                        format!("{sign}{first}d{new_exponent}")
                    } else {
                        format!("{sign}{first}.{rest}d{new_exponent}")
                    }
                }
            }
        }
    }

    /// Adjusts the exponent only, equivalent to multiplying by `10^k` with
    /// no rounding.
    pub fn shift_l(&self, k: i32) -> Decimal {
        Decimal {
            exponent: self.exponent + k,
            ..self.clone()
        }
    }

    /// Adjusts the exponent only, equivalent to dividing by `10^k` with no
    /// rounding.
    pub fn shift_r(&self, k: i32) -> Decimal {
        self.shift_l(-k)
    }

    /// Retains the leftmost `precision` significant digits, discarding the
    /// rest without rounding.
    pub fn truncate(&self, precision: usize) -> Decimal {
        let digits = self.magnitude.to_str_radix(10);
        if digits.len() <= precision || precision == 0 {
            return self.clone();
        }
        let dropped = digits.len() - precision;
        let kept = &digits[..precision];
        let magnitude = BigUint::from_str(kept).unwrap_or_else(|_| BigUint::zero());
        Decimal {
            negative: self.negative,
            magnitude,
            exponent: self.exponent + dropped as i32,
        }
    }

    pub fn neg(&self) -> Decimal {
        Decimal {
            negative: !self.negative,
            ..self.clone()
        }
    }

    pub fn abs(&self) -> Decimal {
        Decimal {
            negative: false,
            ..self.clone()
        }
    }

    fn common_exponent(a: &Decimal, b: &Decimal) -> i32 {
        a.exponent.min(b.exponent)
    }

    fn rescaled_magnitude(&self, target_exponent: i32) -> BigUint {
        debug_assert!(target_exponent <= self.exponent);
        let shift = (self.exponent - target_exponent) as u32;
        &self.magnitude * BigUint::from(10u8).pow(shift)
    }

    pub fn add(&self, other: &Decimal) -> Decimal {
        let exponent = Self::common_exponent(self, other);
        let a = self.rescaled_magnitude(exponent);
        let b = other.rescaled_magnitude(exponent);
        signed_sum(self.negative, &a, other.negative, &b, exponent)
    }

    pub fn sub(&self, other: &Decimal) -> Decimal {
        self.add(&other.neg())
    }

    pub fn mul(&self, other: &Decimal) -> Decimal {
        Decimal {
            negative: self.negative ^ other.negative,
            magnitude: &self.magnitude * &other.magnitude,
            exponent: self.exponent + other.exponent,
        }
    }

    /// Rescales both operands to a common exponent and compares
    /// coefficients, so `1.0` and `1.00` compare equal.
    pub fn compare(&self, other: &Decimal) -> Ordering {
        let exponent = Self::common_exponent(self, other);
        let a = self.rescaled_magnitude(exponent);
        let b = other.rescaled_magnitude(exponent);
        let a_is_zero = a.is_zero();
        let b_is_zero = b.is_zero();
        let a_sign = !a_is_zero && self.negative;
        let b_sign = !b_is_zero && other.negative;
        match (a_sign, b_sign) {
            (false, true) => Ordering::Greater,
            (true, false) => Ordering::Less,
            (false, false) => a.cmp(&b),
            (true, true) => b.cmp(&a),
        }
    }
}

fn signed_sum(
    a_neg: bool,
    a: &BigUint,
    b_neg: bool,
    b: &BigUint,
    exponent: i32,
) -> Decimal {
    if a_neg == b_neg {
        Decimal {
            negative: a_neg,
            magnitude: a + b,
            exponent,
        }
    } else if a >= b {
        Decimal {
            negative: a_neg,
            magnitude: a - b,
            exponent,
        }
    } else {
        Decimal {
            negative: b_neg,
            magnitude: b - a,
            exponent,
        }
    }
}

impl PartialEq for Decimal {
    fn eq(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Equal
    }
}

impl Eq for Decimal {}

impl PartialOrd for Decimal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.compare(other))
    }
}

impl Ord for Decimal {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other)
    }
}

impl FromStr for Decimal {
    type Err = IonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::parse(s)
    }
}

impl std::fmt::Display for Decimal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.format())
    }
}
