use eth_primitives::hexutil::{decode_hex, encode_hex};
use eth_primitives::BigInt;
use serde::{Deserialize, Serialize};

use crate::error::EthError;

/// A `(v, r, s)` signature as carried by transactions and messages.
///
/// What `v` means depends on the context: `27/28` for messages and
/// pre-EIP-155 transactions, `chain_id * 2 + 35/36` for EIP-155, and the bare
/// parity for typed transactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    pub v: BigInt,
    pub r: BigInt,
    pub s: BigInt,
}

impl Signature {
    pub fn new(v: impl Into<BigInt>, r: BigInt, s: BigInt) -> Self {
        Self { v: v.into(), r, s }
    }

    /// `r ‖ s ‖ v`, 65 bytes. `v` must fit one byte.
    pub fn to_bytes(&self) -> Result<[u8; 65], EthError> {
        let mut out = [0u8; 65];
        let r = self.r.to_be_bytes(32)?;
        let s = self.s.to_be_bytes(32)?;
        let v = self.v.to_be_bytes(1).map_err(|_| {
            EthError::InvalidSignature(format!("v = {} does not fit in one byte", self.v))
        })?;
        out[..32].copy_from_slice(&r);
        out[32..64].copy_from_slice(&s);
        out[64] = v[0];
        Ok(out)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, EthError> {
        if bytes.len() != 65 {
            return Err(EthError::InvalidSignature(format!(
                "expected 65 bytes, got {}",
                bytes.len()
            )));
        }
        Ok(Self {
            r: BigInt::from_be_bytes(&bytes[..32]),
            s: BigInt::from_be_bytes(&bytes[32..64]),
            v: BigInt::from(bytes[64]),
        })
    }

    pub fn to_hex(&self) -> Result<String, EthError> {
        Ok(encode_hex(self.to_bytes()?))
    }

    pub fn from_hex(input: &str) -> Result<Self, EthError> {
        Self::from_bytes(&decode_hex(input)?)
    }
}
