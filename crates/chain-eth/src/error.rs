use eth_abi::AbiError;
use eth_primitives::PrimitiveError;
use thiserror::Error;

/// Ethereum key, signing and transaction errors.
#[derive(Debug, Error)]
pub enum EthError {
    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error("invalid transaction: {0}")]
    InvalidTransaction(String),

    #[error("unsupported transaction type: 0x{0:02x}")]
    UnsupportedTxType(u8),

    #[error("typed transaction has no chain id")]
    MissingChainId,

    #[error("logic error: {0}")]
    Logic(String),

    #[error("signing error: {0}")]
    SigningError(String),

    #[error(transparent)]
    Primitive(#[from] PrimitiveError),

    #[error(transparent)]
    Abi(#[from] AbiError),

    #[error("rpc error: {0}")]
    Rpc(#[from] RpcError),
}

/// Failures reported by an [`EthRpc`](crate::rpc::EthRpc) implementation.
///
/// `MethodNotFound` is kept apart so callers can fall back to another
/// method when a node lacks one.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RpcError {
    #[error("method not found: {0}")]
    MethodNotFound(String),

    #[error("node returned error {code}: {message}")]
    General { code: i64, message: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("transport failure: {0}")]
    Transport(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_invalid_private_key() {
        let err = EthError::InvalidPrivateKey("key too short".into());
        assert_eq!(err.to_string(), "invalid private key: key too short");
    }

    #[test]
    fn display_invalid_transaction() {
        let err = EthError::InvalidTransaction("expected 9 fields".into());
        assert_eq!(err.to_string(), "invalid transaction: expected 9 fields");
    }

    #[test]
    fn display_unsupported_tx_type() {
        let err = EthError::UnsupportedTxType(0x7e);
        assert_eq!(err.to_string(), "unsupported transaction type: 0x7e");
    }

    #[test]
    fn display_missing_chain_id() {
        assert_eq!(
            EthError::MissingChainId.to_string(),
            "typed transaction has no chain id"
        );
    }

    #[test]
    fn display_signing_error() {
        let err = EthError::SigningError("invalid signature".into());
        assert_eq!(err.to_string(), "signing error: invalid signature");
    }

    #[test]
    fn primitive_errors_pass_through() {
        let err: EthError = PrimitiveError::NegativeValue.into();
        assert_eq!(err.to_string(), "negative value where unsigned expected");
    }

    #[test]
    fn display_rpc_errors() {
        let err: EthError = RpcError::MethodNotFound("eth_feeHistory".into()).into();
        assert_eq!(err.to_string(), "rpc error: method not found: eth_feeHistory");

        let err = RpcError::General {
            code: -32000,
            message: "nonce too low".into(),
        };
        assert_eq!(err.to_string(), "node returned error -32000: nonce too low");
    }

    #[test]
    fn error_trait_is_implemented() {
        let err: Box<dyn std::error::Error> =
            Box::new(EthError::InvalidPrivateKey("test".into()));
        assert!(err.to_string().contains("test"));
    }

    #[test]
    fn debug_format_works() {
        let err = EthError::UnsupportedTxType(4);
        let debug = format!("{:?}", err);
        assert!(debug.contains("UnsupportedTxType"));
    }
}
