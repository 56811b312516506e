//! Arbitrary-precision signed integer used for amounts, fees and ABI numbers.
//!
//! Parsing always takes an explicit base; nothing is inferred from the digits
//! a string happens to contain. The only prefix rule is the serde one: an
//! RPC quantity starting with `0x` is hex, anything else must be decimal.

use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Rem, Sub};
use std::str::FromStr;

use num_bigint::{BigInt as Inner, Sign};
use num_traits::{Num, One, Signed, ToPrimitive, Zero};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::PrimitiveError;
use crate::hexutil::{encode_hex, strip_0x};

/// Immutable arbitrary-precision integer.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BigInt(Inner);

impl BigInt {
    pub fn zero() -> Self {
        Self(Inner::zero())
    }

    pub fn one() -> Self {
        Self(Inner::one())
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_negative()
    }

    /// Number of bits needed for the magnitude (0 for zero).
    pub fn bits(&self) -> u64 {
        self.0.bits()
    }

    pub fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    pub fn pow(&self, exp: u32) -> Self {
        Self(num_traits::pow(self.0.clone(), exp as usize))
    }

    /// `2^exp`.
    pub fn pow2(exp: usize) -> Self {
        Self(Inner::one() << exp)
    }

    pub fn checked_div(&self, rhs: &BigInt) -> Option<BigInt> {
        if rhs.is_zero() {
            return None;
        }
        Some(Self(&self.0 / &rhs.0))
    }

    /// Parses `text` in the given radix. An optional leading `-` is allowed;
    /// every other character must be a digit of `radix`.
    pub fn from_str_radix(text: &str, radix: u32) -> Result<Self, PrimitiveError> {
        let (negative, digits) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text),
        };
        if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
            return Err(PrimitiveError::InvalidNumber(format!(
                "'{text}' is not a base-{radix} number"
            )));
        }
        let magnitude = Inner::from_str_radix(digits, radix)
            .map_err(|e| PrimitiveError::InvalidNumber(format!("{text}: {e}")))?;
        Ok(Self(if negative { -magnitude } else { magnitude }))
    }

    pub fn from_dec_str(text: &str) -> Result<Self, PrimitiveError> {
        Self::from_str_radix(text, 10)
    }

    /// Parses a hex quantity with optional `0x` prefix and optional leading
    /// `-`. A bare `0x` is zero, the same as an empty RLP byte string.
    pub fn from_hex_str(text: &str) -> Result<Self, PrimitiveError> {
        let (negative, rest) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text),
        };
        let digits = strip_0x(rest);
        if digits.is_empty() {
            return Ok(Self::zero());
        }
        // The sign may only precede the prefix.
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(PrimitiveError::InvalidNumber(format!(
                "'{text}' is not a hex quantity"
            )));
        }
        let value = Self::from_str_radix(digits, 16)?;
        Ok(if negative { -value } else { value })
    }

    /// Unsigned big-endian interpretation of `bytes`.
    pub fn from_be_bytes(bytes: &[u8]) -> Self {
        Self(Inner::from_bytes_be(Sign::Plus, bytes))
    }

    /// Two's-complement big-endian interpretation of `bytes`.
    pub fn from_twos_complement_bytes(bytes: &[u8]) -> Self {
        if bytes.is_empty() {
            return Self::zero();
        }
        Self(Inner::from_signed_bytes_be(bytes))
    }

    /// Shortest big-endian representation, empty for zero. This is the form
    /// RLP uses for every integer.
    pub fn to_minimal_be_bytes(&self) -> Result<Vec<u8>, PrimitiveError> {
        if self.is_negative() {
            return Err(PrimitiveError::NegativeValue);
        }
        if self.is_zero() {
            return Ok(Vec::new());
        }
        Ok(self.0.to_bytes_be().1)
    }

    /// Unsigned big-endian bytes left-padded to exactly `width` bytes.
    pub fn to_be_bytes(&self, width: usize) -> Result<Vec<u8>, PrimitiveError> {
        let magnitude = self.to_minimal_be_bytes()?;
        if magnitude.len() > width {
            return Err(PrimitiveError::Overflow(width * 8));
        }
        let mut out = vec![0u8; width - magnitude.len()];
        out.extend_from_slice(&magnitude);
        Ok(out)
    }

    /// Two's-complement big-endian bytes at exactly `width` bytes.
    pub fn to_twos_complement_bytes(&self, width: usize) -> Result<Vec<u8>, PrimitiveError> {
        if width == 0 {
            return Err(PrimitiveError::Overflow(0));
        }
        if !self.fits_signed(width * 8) {
            return Err(PrimitiveError::Overflow(width * 8));
        }
        let minimal = self.0.to_signed_bytes_be();
        let fill = if self.is_negative() { 0xff } else { 0x00 };
        let mut out = vec![fill; width - minimal.len()];
        out.extend_from_slice(&minimal);
        Ok(out)
    }

    /// True when the value is in `0..2^bits`.
    pub fn fits_unsigned(&self, bits: usize) -> bool {
        !self.is_negative() && self.bits() <= bits as u64
    }

    /// True when the value is in `-2^(bits-1)..2^(bits-1)`.
    pub fn fits_signed(&self, bits: usize) -> bool {
        if bits == 0 {
            return self.is_zero();
        }
        let bound = Inner::one() << (bits - 1);
        self.0 < bound && self.0 >= -bound
    }

    /// Minimal `0x`-prefixed hex (`0x0` for zero, `-0x..` for negatives).
    pub fn to_hex(&self) -> String {
        let digits = self.0.magnitude().to_str_radix(16);
        if self.is_negative() {
            format!("-0x{digits}")
        } else {
            format!("0x{digits}")
        }
    }

    /// Hex left-padded to `width` bytes. Negative values are written in
    /// two's complement at that width.
    pub fn to_hex_padded(&self, width: usize) -> Result<String, PrimitiveError> {
        let bytes = if self.is_negative() {
            self.to_twos_complement_bytes(width)?
        } else {
            self.to_be_bytes(width)?
        };
        Ok(encode_hex(bytes))
    }

    pub fn to_u64(&self) -> Result<u64, PrimitiveError> {
        if self.is_negative() {
            return Err(PrimitiveError::NegativeValue);
        }
        self.0.to_u64().ok_or(PrimitiveError::Overflow(64))
    }

    pub fn to_u128(&self) -> Result<u128, PrimitiveError> {
        if self.is_negative() {
            return Err(PrimitiveError::NegativeValue);
        }
        self.0.to_u128().ok_or(PrimitiveError::Overflow(128))
    }

    pub fn to_usize(&self) -> Result<usize, PrimitiveError> {
        if self.is_negative() {
            return Err(PrimitiveError::NegativeValue);
        }
        self.0
            .to_usize()
            .ok_or(PrimitiveError::Overflow(usize::BITS as usize))
    }

    pub fn as_inner(&self) -> &Inner {
        &self.0
    }
}

macro_rules! impl_from_primitive {
    ($($t:ty),*) => {
        $(
            impl From<$t> for BigInt {
                fn from(value: $t) -> Self {
                    Self(Inner::from(value))
                }
            }
        )*
    };
}

impl_from_primitive!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128);

impl From<Inner> for BigInt {
    fn from(value: Inner) -> Self {
        Self(value)
    }
}

macro_rules! impl_binary_op {
    ($trait:ident, $method:ident) => {
        impl $trait<BigInt> for BigInt {
            type Output = BigInt;
            fn $method(self, rhs: BigInt) -> BigInt {
                BigInt(self.0.$method(rhs.0))
            }
        }

        impl<'a> $trait<&'a BigInt> for &'a BigInt {
            type Output = BigInt;
            fn $method(self, rhs: &'a BigInt) -> BigInt {
                BigInt((&self.0).$method(&rhs.0))
            }
        }

        impl $trait<u64> for BigInt {
            type Output = BigInt;
            fn $method(self, rhs: u64) -> BigInt {
                BigInt(self.0.$method(Inner::from(rhs)))
            }
        }

        impl $trait<u64> for &BigInt {
            type Output = BigInt;
            fn $method(self, rhs: u64) -> BigInt {
                BigInt((&self.0).$method(Inner::from(rhs)))
            }
        }
    };
}

impl_binary_op!(Add, add);
impl_binary_op!(Sub, sub);
impl_binary_op!(Mul, mul);
impl_binary_op!(Div, div);
impl_binary_op!(Rem, rem);

impl Neg for BigInt {
    type Output = BigInt;
    fn neg(self) -> BigInt {
        BigInt(-self.0)
    }
}

impl PartialEq<u64> for BigInt {
    fn eq(&self, other: &u64) -> bool {
        self.0 == Inner::from(*other)
    }
}

impl fmt::Display for BigInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Decimal, like `Display`.
impl FromStr for BigInt {
    type Err = PrimitiveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_dec_str(s)
    }
}

impl Serialize for BigInt {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

struct BigIntVisitor;

impl<'de> Visitor<'de> for BigIntVisitor {
    type Value = BigInt;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a 0x-prefixed hex quantity, a decimal string or an integer")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<BigInt, E> {
        Ok(BigInt::from(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<BigInt, E> {
        Ok(BigInt::from(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<BigInt, E> {
        let unsigned = v.strip_prefix('-').unwrap_or(v);
        let parsed = if unsigned.starts_with("0x") || unsigned.starts_with("0X") {
            BigInt::from_hex_str(v)
        } else {
            BigInt::from_dec_str(v)
        };
        parsed.map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for BigInt {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(BigIntVisitor)
    }
}
