use eth_primitives::PrimitiveError;
use thiserror::Error;

/// ABI signature parsing, encoding and decoding errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AbiError {
    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error("unsupported type: {0}")]
    UnsupportedType(String),

    #[error("fixed-size array of length 0: {0}")]
    ZeroLengthArray(String),

    #[error("arity mismatch: expected {expected} values, got {actual}")]
    ArityMismatch { expected: usize, actual: usize },

    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    #[error("value out of range: {0}")]
    ValueOutOfRange(String),

    #[error("data too short: need {needed} bytes at offset {offset}, have {available}")]
    DataTooShort {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error(transparent)]
    Primitive(#[from] PrimitiveError),
}
