use thiserror::Error;

/// Errors raised while parsing or encoding Ethereum primitive values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PrimitiveError {
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    #[error("hex blob has odd length {0}")]
    OddLengthHex(usize),

    #[error("invalid length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("bad address checksum: got {given}, expected {expected}")]
    BadChecksum { given: String, expected: String },

    #[error("invalid number: {0}")]
    InvalidNumber(String),

    #[error("value does not fit in {0} bits")]
    Overflow(usize),

    #[error("negative value where unsigned expected")]
    NegativeValue,

    #[error("rlp decode error: {0}")]
    Rlp(String),

    #[error("unknown unit: {0}")]
    UnknownUnit(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_invalid_hex() {
        let err = PrimitiveError::InvalidHex("0xzz".into());
        assert_eq!(err.to_string(), "invalid hex: 0xzz");
    }

    #[test]
    fn display_invalid_length() {
        let err = PrimitiveError::InvalidLength {
            expected: 20,
            actual: 19,
        };
        assert_eq!(
            err.to_string(),
            "invalid length: expected 20 bytes, got 19"
        );
    }

    #[test]
    fn display_overflow() {
        let err = PrimitiveError::Overflow(8);
        assert_eq!(err.to_string(), "value does not fit in 8 bits");
    }

    #[test]
    fn display_rlp() {
        let err = PrimitiveError::Rlp("input too short".into());
        assert_eq!(err.to_string(), "rlp decode error: input too short");
    }

    #[test]
    fn error_trait_is_implemented() {
        let err: Box<dyn std::error::Error> = Box::new(PrimitiveError::NegativeValue);
        assert!(err.to_string().contains("negative"));
    }
}
