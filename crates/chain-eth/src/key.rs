//! secp256k1 keys and the raw sign/recover primitive.

use std::fmt;

use eth_primitives::hexutil::decode_hex_fixed;
use eth_primitives::{Address, BigInt, Hash};
use k256::ecdsa::signature::hazmat::PrehashSigner;
use k256::ecdsa::{RecoveryId, Signature as EcdsaSignature, SigningKey, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::{FieldBytes, PublicKey};
use rand::rngs::OsRng;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::EthError;

/// Output of the EC-sign primitive, before any transaction-specific `v`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSignature {
    pub r: BigInt,
    pub s: BigInt,
    /// 0 or 1: the parity of the ephemeral point's y coordinate.
    pub recovery_id: u8,
}

/// A secp256k1 private key. The scalar is wiped on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey([u8; 32]);

impl PrivateKey {
    /// Rejects zero and scalars at or above the curve order.
    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self, EthError> {
        SigningKey::from_bytes(bytes.into())
            .map_err(|e| EthError::InvalidPrivateKey(e.to_string()))?;
        Ok(Self(*bytes))
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, EthError> {
        let mut key: [u8; 32] = bytes.try_into().map_err(|_| {
            EthError::InvalidPrivateKey(format!("expected 32 bytes, got {}", bytes.len()))
        })?;
        let parsed = Self::from_bytes(&key);
        key.zeroize();
        parsed
    }

    /// 64 hex digits, `0x` optional.
    pub fn from_hex(input: &str) -> Result<Self, EthError> {
        let mut key = decode_hex_fixed::<32>(input)
            .map_err(|e| EthError::InvalidPrivateKey(e.to_string()))?;
        let parsed = Self::from_bytes(&key);
        key.zeroize();
        parsed
    }

    /// A fresh key from the operating system's CSPRNG.
    pub fn generate() -> Self {
        let signing_key = SigningKey::random(&mut OsRng);
        Self(signing_key.to_bytes().into())
    }

    pub fn to_bytes(&self) -> [u8; 32] {
        self.0
    }

    fn signing_key(&self) -> Result<SigningKey, EthError> {
        SigningKey::from_bytes((&self.0).into())
            .map_err(|e| EthError::InvalidPrivateKey(e.to_string()))
    }

    /// Uncompressed SEC1 public key: `0x04 ‖ x ‖ y`.
    pub fn public_key(&self) -> Result<[u8; 65], EthError> {
        let signing_key = self.signing_key()?;
        Ok(uncompressed(signing_key.verifying_key()))
    }

    pub fn address(&self) -> Result<Address, EthError> {
        Ok(address_of_uncompressed(&self.public_key()?))
    }

    /// Signs a 32-byte prehash with deterministic (RFC 6979) low-s ECDSA.
    pub fn sign_hash(&self, hash: &Hash) -> Result<RawSignature, EthError> {
        let signing_key = self.signing_key()?;
        let (signature, recovery_id): (EcdsaSignature, RecoveryId) = signing_key
            .sign_prehash(hash.as_bytes())
            .map_err(|e| EthError::SigningError(e.to_string()))?;

        Ok(RawSignature {
            r: BigInt::from_be_bytes(&signature.r().to_bytes()),
            s: BigInt::from_be_bytes(&signature.s().to_bytes()),
            recovery_id: recovery_id.is_y_odd() as u8,
        })
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey(..)")
    }
}

/// Recovers the signer address from a prehash, `r`, `s` and the y parity.
pub fn recover_address(
    hash: &Hash,
    r: &BigInt,
    s: &BigInt,
    parity: u8,
) -> Result<Address, EthError> {
    if parity > 1 {
        return Err(EthError::InvalidSignature(format!("parity {parity} is not 0 or 1")));
    }
    let r = scalar_bytes(r, "r")?;
    let s = scalar_bytes(s, "s")?;
    let signature = EcdsaSignature::from_scalars(r, s)
        .map_err(|e| EthError::InvalidSignature(e.to_string()))?;
    let recovery_id = RecoveryId::new(parity == 1, false);

    let verifying_key =
        VerifyingKey::recover_from_prehash(hash.as_bytes(), &signature, recovery_id)
            .map_err(|e| EthError::InvalidSignature(e.to_string()))?;
    Ok(address_of_uncompressed(&uncompressed(&verifying_key)))
}

fn scalar_bytes(value: &BigInt, name: &str) -> Result<FieldBytes, EthError> {
    let bytes = value
        .to_be_bytes(32)
        .map_err(|e| EthError::InvalidSignature(format!("{name}: {e}")))?;
    Ok(FieldBytes::clone_from_slice(&bytes))
}

fn uncompressed(verifying_key: &VerifyingKey) -> [u8; 65] {
    let point = PublicKey::from(verifying_key).to_encoded_point(false);
    let mut out = [0u8; 65];
    out.copy_from_slice(point.as_bytes());
    out
}

/// Keccak-256 of the 64-byte key (without the 0x04 prefix), low 20 bytes.
fn address_of_uncompressed(public_key: &[u8; 65]) -> Address {
    let mut xy = [0u8; 64];
    xy.copy_from_slice(&public_key[1..]);
    Address::from_public_key_bytes(&xy)
}
