//! Signed messages.
//!
//! Wallets disagree on what exactly gets hashed before a message is signed,
//! so every operation takes a [`MessageFormat`]. The free functions use
//! [`MessageFormat::GethLike`], the EIP-191 `personal_sign` layout.

use eth_primitives::hexutil::encode_hex;
use eth_primitives::{Address, BigInt, Hash};
use serde::Serialize;
use sha3::{Digest, Keccak256};
use tracing::debug;

use crate::error::EthError;
use crate::key::{recover_address, PrivateKey};
use crate::signature::Signature;

const PREFIX: &[u8] = b"\x19Ethereum Signed Message:\n";

/// How a message is turned into the hash that gets signed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MessageFormat {
    /// `keccak256(prefix + len(message) + message)`, as geth does.
    #[default]
    GethLike,
    /// `keccak256(prefix + "32" + keccak256(message))`.
    InnerHashed,
    /// `keccak256(message)` with no prefix.
    Unformatted,
}

impl MessageFormat {
    pub fn hash(self, message: &[u8]) -> Hash {
        let mut hasher = Keccak256::new();
        match self {
            MessageFormat::GethLike => {
                hasher.update(PREFIX);
                hasher.update(message.len().to_string().as_bytes());
                hasher.update(message);
            }
            MessageFormat::InnerHashed => {
                hasher.update(PREFIX);
                hasher.update(b"32");
                hasher.update(Keccak256::digest(message));
            }
            MessageFormat::Unformatted => hasher.update(message),
        }
        let mut out = [0u8; 32];
        out.copy_from_slice(&hasher.finalize());
        Hash(out)
    }

    /// Signs the hash of `message`; `v` is 27 or 28.
    pub fn sign(self, message: &[u8], key: &PrivateKey) -> Result<Signature, EthError> {
        let raw = key.sign_hash(&self.hash(message))?;
        Ok(Signature::new(
            BigInt::from(u64::from(raw.recovery_id % 2) + 27),
            raw.r,
            raw.s,
        ))
    }

    /// The address that produced `signature` over `message`. Accepts `v` as
    /// 27/28 or as the bare parity 0/1.
    pub fn recover(self, message: &[u8], signature: &Signature) -> Result<Address, EthError> {
        let parity = if signature.v == 0u64 || signature.v == 27u64 {
            0
        } else if signature.v == 1u64 || signature.v == 28u64 {
            1
        } else {
            return Err(EthError::InvalidSignature(format!(
                "message signature v = {} is not 27 or 28",
                signature.v
            )));
        };
        recover_address(&self.hash(message), &signature.r, &signature.s, parity)
    }

    pub fn verify(
        self,
        message: &[u8],
        signature: &Signature,
        signer: &Address,
    ) -> Result<bool, EthError> {
        Ok(self.recover(message, signature)? == *signer)
    }
}

/// `keccak256("\x19Ethereum Signed Message:\n" + len(message) + message)`
pub fn hash_message(message: &[u8]) -> Hash {
    MessageFormat::GethLike.hash(message)
}

/// Signs `message` the way wallets do for `personal_sign`; `v` is 27 or 28.
pub fn sign_message(message: &[u8], key: &PrivateKey) -> Result<Signature, EthError> {
    MessageFormat::GethLike.sign(message, key)
}

pub fn recover_message(message: &[u8], signature: &Signature) -> Result<Address, EthError> {
    MessageFormat::GethLike.recover(message, signature)
}

pub fn verify_message(
    message: &[u8],
    signature: &Signature,
    signer: &Address,
) -> Result<bool, EthError> {
    MessageFormat::GethLike.verify(message, signature, signer)
}

/// A message together with its claimed signer and signature.
///
/// Changing the message drops the signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedMessage {
    format: MessageFormat,
    message: Vec<u8>,
    from: Option<Address>,
    signature: Option<Signature>,
}

/// The JSON shape wallets such as MEW export for a signed message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageEnvelope {
    /// Checksummed signer, empty when unsigned.
    pub address: String,
    pub msg: String,
    /// `r ‖ s ‖ v` hex, empty when unsigned.
    pub sig: String,
    pub version: String,
    pub signer: String,
}

impl SignedMessage {
    pub fn new(format: MessageFormat, message: impl Into<Vec<u8>>) -> Self {
        Self {
            format,
            message: message.into(),
            from: None,
            signature: None,
        }
    }

    /// Attaches a signature received from elsewhere, claimed to be by `from`.
    pub fn with_signature(mut self, from: Address, signature: Signature) -> Self {
        self.from = Some(from);
        self.signature = Some(signature);
        self
    }

    pub fn format(&self) -> MessageFormat {
        self.format
    }

    pub fn message(&self) -> &[u8] {
        &self.message
    }

    pub fn set_message(&mut self, message: impl Into<Vec<u8>>) {
        let message = message.into();
        if message != self.message {
            self.message = message;
            self.signature = None;
        }
    }

    pub fn signer(&self) -> Option<&Address> {
        self.from.as_ref()
    }

    pub fn signature(&self) -> Option<&Signature> {
        self.signature.as_ref()
    }

    pub fn is_signed(&self) -> bool {
        self.signature.is_some()
    }

    pub fn hash(&self) -> Hash {
        self.format.hash(&self.message)
    }

    /// Signs with `key` and records its address as the signer.
    pub fn sign(&mut self, key: &PrivateKey) -> Result<Signature, EthError> {
        let signature = self.format.sign(&self.message, key)?;
        let from = key.address()?;
        debug!(format = ?self.format, signer = %from.checksummed(), "signed message");
        self.from = Some(from);
        self.signature = Some(signature.clone());
        Ok(signature)
    }

    /// Whether the signature recovers to the claimed signer. False when
    /// either is missing.
    pub fn verify(&self) -> Result<bool, EthError> {
        match (&self.from, &self.signature) {
            (Some(from), Some(signature)) => self.format.verify(&self.message, signature, from),
            _ => Ok(false),
        }
    }

    pub fn to_envelope(&self) -> Result<MessageEnvelope, EthError> {
        let sig = match &self.signature {
            Some(signature) => signature.to_hex()?,
            None => String::new(),
        };
        Ok(MessageEnvelope {
            address: self.from.map(|a| a.checksummed()).unwrap_or_default(),
            msg: encode_hex(&self.message),
            sig,
            version: "1".into(),
            signer: env!("CARGO_PKG_NAME").into(),
        })
    }
}
