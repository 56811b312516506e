//! Unwrapping decoded [`AbiValue`] trees into native Rust values.
//!
//! Implement [`FromAbi`] for a struct to materialize a tuple into it; any
//! target without an implementation can fall back to `AbiValue` itself or
//! `Vec<AbiValue>`.

use eth_primitives::{Address, BigInt};

use crate::error::AbiError;
use crate::value::{AbiValue, FunctionRef};

pub trait FromAbi: Sized {
    fn from_abi(value: AbiValue) -> Result<Self, AbiError>;
}

/// Dynamic `bytes` or `bytesN`, unwrapped as a plain byte vector.
///
/// `Vec<u8>` already means "array of uint8" through the generic `Vec<T>`
/// impl, so byte strings get their own wrapper.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Bytes(pub Vec<u8>);

fn mismatch(expected: &str, actual: &AbiValue) -> AbiError {
    AbiError::TypeMismatch {
        expected: expected.to_string(),
        actual: actual.kind(),
    }
}

impl FromAbi for AbiValue {
    fn from_abi(value: AbiValue) -> Result<Self, AbiError> {
        Ok(value)
    }
}

impl FromAbi for BigInt {
    fn from_abi(value: AbiValue) -> Result<Self, AbiError> {
        match value {
            AbiValue::Uint(_, n) | AbiValue::Int(_, n) => Ok(n),
            other => Err(mismatch("integer", &other)),
        }
    }
}

macro_rules! impl_from_abi_unsigned {
    ($($t:ty => $to:ident),*) => {
        $(impl FromAbi for $t {
            fn from_abi(value: AbiValue) -> Result<Self, AbiError> {
                let n = BigInt::from_abi(value)?;
                n.$to()
                    .ok()
                    .and_then(|v| <$t>::try_from(v).ok())
                    .ok_or_else(|| {
                        AbiError::ValueOutOfRange(format!("{n} does not fit {}", stringify!($t)))
                    })
            }
        })*
    };
}

impl_from_abi_unsigned!(u16 => to_u64, u32 => to_u64, u64 => to_u64, u128 => to_u128, usize => to_usize);

impl FromAbi for bool {
    fn from_abi(value: AbiValue) -> Result<Self, AbiError> {
        match value {
            AbiValue::Bool(b) => Ok(b),
            other => Err(mismatch("bool", &other)),
        }
    }
}

impl FromAbi for Address {
    fn from_abi(value: AbiValue) -> Result<Self, AbiError> {
        match value {
            AbiValue::Address(a) => Ok(a),
            other => Err(mismatch("address", &other)),
        }
    }
}

impl FromAbi for String {
    fn from_abi(value: AbiValue) -> Result<Self, AbiError> {
        match value {
            AbiValue::String(s) => Ok(s),
            other => Err(mismatch("string", &other)),
        }
    }
}

impl FromAbi for Bytes {
    fn from_abi(value: AbiValue) -> Result<Self, AbiError> {
        match value {
            AbiValue::Bytes(b) | AbiValue::FixedBytes(b) => Ok(Bytes(b)),
            other => Err(mismatch("bytes", &other)),
        }
    }
}

impl<const N: usize> FromAbi for [u8; N] {
    fn from_abi(value: AbiValue) -> Result<Self, AbiError> {
        match value {
            AbiValue::FixedBytes(b) | AbiValue::Bytes(b) => {
                let len = b.len();
                b.try_into().map_err(|_| AbiError::TypeMismatch {
                    expected: format!("bytes{N}"),
                    actual: format!("bytes{len}"),
                })
            }
            other => Err(mismatch(&format!("bytes{N}"), &other)),
        }
    }
}

impl FromAbi for FunctionRef {
    fn from_abi(value: AbiValue) -> Result<Self, AbiError> {
        match value {
            AbiValue::Function(f) => Ok(f),
            other => Err(mismatch("function", &other)),
        }
    }
}

/// Any array, or a tuple read as an ordered collection.
impl<T: FromAbi> FromAbi for Vec<T> {
    fn from_abi(value: AbiValue) -> Result<Self, AbiError> {
        match value {
            AbiValue::Array(children)
            | AbiValue::FixedArray(children)
            | AbiValue::Tuple(children) => children.into_iter().map(T::from_abi).collect(),
            other => Err(mismatch("array", &other)),
        }
    }
}

/// Splits a tuple (or fixed array) into exactly `arity` children.
pub fn tuple_children(value: AbiValue, arity: usize) -> Result<Vec<AbiValue>, AbiError> {
    match value {
        AbiValue::Tuple(children) | AbiValue::FixedArray(children) => {
            if children.len() != arity {
                return Err(AbiError::ArityMismatch {
                    expected: arity,
                    actual: children.len(),
                });
            }
            Ok(children)
        }
        other => Err(mismatch("tuple", &other)),
    }
}

macro_rules! impl_from_abi_tuple {
    ($arity:literal; $($name:ident),+) => {
        impl<$($name: FromAbi),+> FromAbi for ($($name,)+) {
            fn from_abi(value: AbiValue) -> Result<Self, AbiError> {
                let mut children = tuple_children(value, $arity)?.into_iter();
                Ok(($(
                    $name::from_abi(children.next().ok_or(AbiError::ArityMismatch {
                        expected: $arity,
                        actual: 0,
                    })?)?,
                )+))
            }
        }
    };
}

impl_from_abi_tuple!(1; A);
impl_from_abi_tuple!(2; A, B);
impl_from_abi_tuple!(3; A, B, C);
impl_from_abi_tuple!(4; A, B, C, D);
impl_from_abi_tuple!(5; A, B, C, D, E);
impl_from_abi_tuple!(6; A, B, C, D, E, F);

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Transfer {
        to: Address,
        amount: BigInt,
    }

    impl FromAbi for Transfer {
        fn from_abi(value: AbiValue) -> Result<Self, AbiError> {
            let (to, amount) = <(Address, BigInt)>::from_abi(value)?;
            Ok(Transfer { to, amount })
        }
    }

    #[test]
    fn materializes_struct_from_tuple() {
        let to = Address([0x11; 20]);
        let value = AbiValue::Tuple(vec![to.into(), AbiValue::uint(42u64)]);
        assert_eq!(
            Transfer::from_abi(value).unwrap(),
            Transfer {
                to,
                amount: BigInt::from(42u64)
            }
        );
    }

    #[test]
    fn narrows_integers_with_range_check() {
        assert_eq!(u64::from_abi(AbiValue::uint(7u64)).unwrap(), 7);
        assert!(u16::from_abi(AbiValue::uint(70_000u64)).is_err());
        assert!(u64::from_abi(AbiValue::int(-1i64)).is_err());
    }

    #[test]
    fn nested_collections() {
        let value = AbiValue::Array(vec![
            AbiValue::Array(vec![1u8.into(), 2u8.into()]),
            AbiValue::Array(vec![3u8.into()]),
        ]);
        let native: Vec<Vec<u64>> = FromAbi::from_abi(value).unwrap();
        assert_eq!(native, vec![vec![1, 2], vec![3]]);
    }

    #[test]
    fn byte_strings() {
        assert_eq!(
            Bytes::from_abi(AbiValue::bytes(vec![1, 2])).unwrap(),
            Bytes(vec![1, 2])
        );
        let fixed: [u8; 2] = FromAbi::from_abi(AbiValue::fixed_bytes(vec![9, 8])).unwrap();
        assert_eq!(fixed, [9, 8]);
        assert!(<[u8; 3]>::from_abi(AbiValue::fixed_bytes(vec![9, 8])).is_err());
    }

    #[test]
    fn tuple_arity_is_checked() {
        let value = AbiValue::Tuple(vec![true.into()]);
        assert_eq!(
            <(bool, bool)>::from_abi(value),
            Err(AbiError::ArityMismatch {
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn wrong_kind_is_a_mismatch() {
        assert!(matches!(
            bool::from_abi(AbiValue::string("no")),
            Err(AbiError::TypeMismatch { .. })
        ));
    }
}
