//! The closed set of ABI values.

use std::fmt;

use eth_primitives::{hexutil::encode_hex, Address, BigInt};

use crate::error::AbiError;
use crate::types::{AbiType, WORD};

/// A contract function reference: the `function` ABI type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FunctionRef {
    pub address: Address,
    pub selector: [u8; 4],
}

impl FunctionRef {
    pub fn new(address: Address, selector: [u8; 4]) -> Self {
        Self { address, selector }
    }

    /// `address ‖ selector`, 24 bytes.
    pub fn to_bytes(&self) -> [u8; 24] {
        let mut out = [0u8; 24];
        out[..20].copy_from_slice(self.address.as_bytes());
        out[20..].copy_from_slice(&self.selector);
        out
    }
}

/// One ABI value.
///
/// Integer variants carry their declared bit width. Arrays and tuples own
/// their children outright, so cloning a value never aliases slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiValue {
    Uint(usize, BigInt),
    Int(usize, BigInt),
    Bool(bool),
    Address(Address),
    /// `bytesN`; the length of the vector is N.
    FixedBytes(Vec<u8>),
    Bytes(Vec<u8>),
    String(String),
    Function(FunctionRef),
    Tuple(Vec<AbiValue>),
    FixedArray(Vec<AbiValue>),
    Array(Vec<AbiValue>),
}

impl AbiValue {
    /// A `uint256`. Narrower widths are applied when the value is matched
    /// against a signature.
    pub fn uint(value: impl Into<BigInt>) -> Self {
        AbiValue::Uint(256, value.into())
    }

    /// An `int256`.
    pub fn int(value: impl Into<BigInt>) -> Self {
        AbiValue::Int(256, value.into())
    }

    pub fn fixed_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        AbiValue::FixedBytes(bytes.into())
    }

    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Self {
        AbiValue::Bytes(bytes.into())
    }

    pub fn string(text: impl Into<String>) -> Self {
        AbiValue::String(text.into())
    }

    pub fn is_dynamic(&self) -> bool {
        match self {
            AbiValue::Bytes(_) | AbiValue::String(_) | AbiValue::Array(_) => true,
            AbiValue::Tuple(children) | AbiValue::FixedArray(children) => {
                children.iter().any(AbiValue::is_dynamic)
            }
            _ => false,
        }
    }

    /// Head bytes: 32 for a dynamic value, the whole encoding otherwise.
    pub fn head_size(&self) -> usize {
        if self.is_dynamic() {
            return WORD;
        }
        match self {
            AbiValue::Tuple(children) | AbiValue::FixedArray(children) => {
                children.iter().map(AbiValue::head_size).sum()
            }
            _ => WORD,
        }
    }

    /// Short name of the variant, used in mismatch errors.
    pub fn kind(&self) -> String {
        match self {
            AbiValue::Uint(bits, _) => format!("uint{bits}"),
            AbiValue::Int(bits, _) => format!("int{bits}"),
            AbiValue::Bool(_) => "bool".into(),
            AbiValue::Address(_) => "address".into(),
            AbiValue::FixedBytes(b) => format!("bytes{}", b.len()),
            AbiValue::Bytes(_) => "bytes".into(),
            AbiValue::String(_) => "string".into(),
            AbiValue::Function(_) => "function".into(),
            AbiValue::Tuple(children) => format!("tuple of {}", children.len()),
            AbiValue::FixedArray(children) => format!("fixed array of {}", children.len()),
            AbiValue::Array(_) => "array".into(),
        }
    }

    /// Checks this value against `ty` and returns it re-tagged with the
    /// declared widths.
    ///
    /// Integers must fit the declared width (unsigned types reject negatives,
    /// signed types use the two's-complement range), `bytesN` needs exactly N
    /// bytes and containers need the declared arity. Nothing is truncated.
    pub fn conform(self, ty: &AbiType) -> Result<AbiValue, AbiError> {
        let mismatch = |value: &AbiValue| AbiError::TypeMismatch {
            expected: ty.to_string(),
            actual: value.kind(),
        };

        match (ty, self) {
            (AbiType::Uint(bits), AbiValue::Uint(_, n) | AbiValue::Int(_, n)) => {
                if n.is_negative() {
                    return Err(AbiError::ValueOutOfRange(format!(
                        "{n} is negative for {ty}"
                    )));
                }
                if !n.fits_unsigned(*bits) {
                    return Err(AbiError::ValueOutOfRange(format!("{n} overflows {ty}")));
                }
                Ok(AbiValue::Uint(*bits, n))
            }
            (AbiType::Int(bits), AbiValue::Uint(_, n) | AbiValue::Int(_, n)) => {
                if !n.fits_signed(*bits) {
                    return Err(AbiError::ValueOutOfRange(format!("{n} overflows {ty}")));
                }
                Ok(AbiValue::Int(*bits, n))
            }
            (AbiType::Bool, v @ AbiValue::Bool(_))
            | (AbiType::Address, v @ AbiValue::Address(_))
            | (AbiType::String, v @ AbiValue::String(_))
            | (AbiType::Function, v @ AbiValue::Function(_)) => Ok(v),
            (AbiType::FixedBytes(size), AbiValue::FixedBytes(b) | AbiValue::Bytes(b)) => {
                if b.len() != *size {
                    return Err(AbiError::ValueOutOfRange(format!(
                        "{} bytes given for {ty}",
                        b.len()
                    )));
                }
                Ok(AbiValue::FixedBytes(b))
            }
            (AbiType::Bytes, AbiValue::Bytes(b) | AbiValue::FixedBytes(b)) => {
                Ok(AbiValue::Bytes(b))
            }
            (AbiType::Tuple(types), AbiValue::Tuple(children)) => {
                Ok(AbiValue::Tuple(conform_all(types.iter(), children)?))
            }
            (
                AbiType::FixedArray(element, length),
                AbiValue::FixedArray(children) | AbiValue::Array(children),
            ) => {
                if children.len() != *length {
                    return Err(AbiError::ArityMismatch {
                        expected: *length,
                        actual: children.len(),
                    });
                }
                let types = std::iter::repeat_n(element.as_ref(), *length);
                Ok(AbiValue::FixedArray(conform_all(types, children)?))
            }
            (AbiType::Array(element), AbiValue::Array(children) | AbiValue::FixedArray(children)) => {
                let types = std::iter::repeat_n(element.as_ref(), children.len());
                Ok(AbiValue::Array(conform_all(types, children)?))
            }
            (_, other) => Err(mismatch(&other)),
        }
    }
}

/// Conforms `values` pairwise against `types`, checking arity first.
pub(crate) fn conform_all<'a>(
    types: impl ExactSizeIterator<Item = &'a AbiType>,
    values: Vec<AbiValue>,
) -> Result<Vec<AbiValue>, AbiError> {
    if types.len() != values.len() {
        return Err(AbiError::ArityMismatch {
            expected: types.len(),
            actual: values.len(),
        });
    }
    types
        .zip(values)
        .map(|(ty, value)| value.conform(ty))
        .collect()
}

impl fmt::Display for AbiValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbiValue::Uint(_, n) | AbiValue::Int(_, n) => write!(f, "{n}"),
            AbiValue::Bool(b) => write!(f, "{b}"),
            AbiValue::Address(a) => write!(f, "{a}"),
            AbiValue::FixedBytes(b) | AbiValue::Bytes(b) => f.write_str(&encode_hex(b)),
            AbiValue::String(s) => write!(f, "{s:?}"),
            AbiValue::Function(func) => f.write_str(&encode_hex(func.to_bytes())),
            AbiValue::Tuple(children) => write_list(f, "(", children, ")"),
            AbiValue::FixedArray(children) | AbiValue::Array(children) => {
                write_list(f, "[", children, "]")
            }
        }
    }
}

fn write_list(
    f: &mut fmt::Formatter<'_>,
    open: &str,
    children: &[AbiValue],
    close: &str,
) -> fmt::Result {
    f.write_str(open)?;
    for (i, child) in children.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{child}")?;
    }
    f.write_str(close)
}

macro_rules! impl_from_unsigned {
    ($($t:ty),*) => {
        $(impl From<$t> for AbiValue {
            fn from(value: $t) -> Self {
                AbiValue::uint(value)
            }
        })*
    };
}

macro_rules! impl_from_signed {
    ($($t:ty),*) => {
        $(impl From<$t> for AbiValue {
            fn from(value: $t) -> Self {
                AbiValue::int(value)
            }
        })*
    };
}

impl_from_unsigned!(u8, u16, u32, u64, u128, usize);
impl_from_signed!(i8, i16, i32, i64, i128);

/// Non-negative values become `uint256`, negative ones `int256`.
impl From<BigInt> for AbiValue {
    fn from(value: BigInt) -> Self {
        if value.is_negative() {
            AbiValue::Int(256, value)
        } else {
            AbiValue::Uint(256, value)
        }
    }
}

impl From<bool> for AbiValue {
    fn from(value: bool) -> Self {
        AbiValue::Bool(value)
    }
}

impl From<Address> for AbiValue {
    fn from(value: Address) -> Self {
        AbiValue::Address(value)
    }
}

impl From<&str> for AbiValue {
    fn from(value: &str) -> Self {
        AbiValue::String(value.to_string())
    }
}

impl From<String> for AbiValue {
    fn from(value: String) -> Self {
        AbiValue::String(value)
    }
}

impl From<Vec<u8>> for AbiValue {
    fn from(value: Vec<u8>) -> Self {
        AbiValue::Bytes(value)
    }
}

impl<const N: usize> From<[u8; N]> for AbiValue {
    fn from(value: [u8; N]) -> Self {
        AbiValue::FixedBytes(value.to_vec())
    }
}

impl From<FunctionRef> for AbiValue {
    fn from(value: FunctionRef) -> Self {
        AbiValue::Function(value)
    }
}
