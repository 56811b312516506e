//! Byte-level Ethereum primitives shared by the ABI and transaction crates.
//!
//! This crate provides:
//! - An arbitrary-precision integer with explicit-base parsing
//! - 20-byte addresses with EIP-55 checksums and 32-byte Keccak-256 hashes
//! - The RLP codec
//! - Ether unit conversion

pub mod address;
pub mod bigint;
pub mod error;
pub mod hash;
pub mod hexutil;
pub mod rlp;
pub mod units;

pub use address::Address;
pub use bigint::BigInt;
pub use error::PrimitiveError;
pub use hash::{keccak256, Hash};
