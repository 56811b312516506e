//! Ethereum keys, transactions and node interaction.
//!
//! This crate provides:
//! - secp256k1 private keys, signing and address recovery
//! - The legacy, EIP-2930, EIP-1559 and EIP-4844 transaction kinds with
//!   signing, wire encoding and decoding
//! - Fee estimation against an [`EthRpc`] node, including EIP-1559 base fee
//!   prediction
//! - Message signing in the geth, inner-hashed and raw Keccak formats
//! - ERC-20 call data (transfer, approve, balanceOf) and `Transfer` logs

pub mod access_list;
pub mod erc20;
pub mod error;
pub mod fees;
pub mod key;
pub mod message;
pub mod rpc;
pub mod signature;
pub mod transaction;

pub use access_list::{AccessList, AccessListItem};
pub use error::{EthError, RpcError};
pub use fees::{next_block_base_fee, Eip1559Config, FeeBump};
pub use key::PrivateKey;
pub use message::{MessageEnvelope, MessageFormat, SignedMessage};
pub use rpc::{Block, CallRequest, EthRpc, Log, RpcTransaction};
pub use signature::Signature;
pub use transaction::{contract_address, Transaction, TxBody, TxType};
