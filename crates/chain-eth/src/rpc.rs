//! The node-facing collaborator and the JSON shapes it exchanges.
//!
//! No transport lives here: implement [`EthRpc`] over whatever HTTP or IPC
//! client the application uses.

use eth_primitives::hexutil::decode_hex;
use eth_primitives::{Address, BigInt, Hash};
use serde::{Deserialize, Serialize};

use crate::access_list::AccessList;
use crate::error::{EthError, RpcError};

/// The JSON-RPC methods that transaction building and broadcasting use.
pub trait EthRpc {
    /// `eth_chainId`.
    fn chain_id(&self) -> Result<u64, RpcError>;

    /// `eth_estimateGas`.
    fn estimate_gas(&self, request: &CallRequest) -> Result<u64, RpcError>;

    /// `eth_gasPrice`.
    fn gas_price(&self) -> Result<BigInt, RpcError>;

    /// `eth_getBlockByNumber("latest", false)`.
    fn latest_block(&self) -> Result<Block, RpcError>;

    /// Average priority fee paid over recent blocks.
    fn average_tip(&self) -> Result<BigInt, RpcError>;

    /// `eth_getTransactionCount(address, "pending")`.
    fn transaction_count(&self, address: &Address) -> Result<BigInt, RpcError>;

    /// `eth_sendRawTransaction`; returns the transaction hash.
    fn send_raw_transaction(&self, raw: &[u8]) -> Result<Hash, RpcError>;
}

/// Request object for `eth_call` and `eth_estimateGas`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas: Option<BigInt>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<BigInt>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_fee_per_gas: Option<BigInt>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_priority_fee_per_gas: Option<BigInt>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<BigInt>,
    /// `0x`-prefixed call data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

/// The block header fields fee estimation needs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub number: BigInt,
    #[serde(default)]
    pub hash: Option<Hash>,
    pub gas_limit: BigInt,
    pub gas_used: BigInt,
    /// Absent before London.
    #[serde(default)]
    pub base_fee_per_gas: Option<BigInt>,
    #[serde(default)]
    pub timestamp: Option<BigInt>,
}

impl Block {
    pub fn is_eip1559(&self) -> bool {
        self.base_fee_per_gas.is_some()
    }
}

/// A transaction object as returned by `eth_getTransactionByHash`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcTransaction {
    /// Missing on nodes that predate typed transactions; treated as legacy.
    #[serde(rename = "type", default)]
    pub tx_type: Option<BigInt>,
    #[serde(default)]
    pub hash: Option<Hash>,
    #[serde(default)]
    pub from: Option<Address>,
    pub nonce: BigInt,
    pub gas: BigInt,
    #[serde(default)]
    pub gas_price: Option<BigInt>,
    #[serde(default)]
    pub max_fee_per_gas: Option<BigInt>,
    #[serde(default)]
    pub max_priority_fee_per_gas: Option<BigInt>,
    #[serde(default)]
    pub max_fee_per_blob_gas: Option<BigInt>,
    #[serde(default)]
    pub to: Option<Address>,
    pub value: BigInt,
    #[serde(default)]
    pub input: Option<String>,
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub chain_id: Option<BigInt>,
    #[serde(default)]
    pub access_list: Option<AccessList>,
    #[serde(default)]
    pub blob_versioned_hashes: Option<Vec<Hash>>,
    #[serde(default)]
    pub v: Option<BigInt>,
    #[serde(default)]
    pub r: Option<BigInt>,
    #[serde(default)]
    pub s: Option<BigInt>,
}

impl RpcTransaction {
    /// `input` if present and non-empty, otherwise `data`.
    pub fn call_data(&self) -> Option<&str> {
        self.input
            .as_deref()
            .filter(|d| !d.is_empty())
            .or(self.data.as_deref())
    }
}

/// A log entry as returned by `eth_getLogs` and in receipts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Log {
    /// Contract that emitted the log.
    pub address: Address,
    pub topics: Vec<Hash>,
    /// `0x`-prefixed data.
    pub data: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_number: Option<BigInt>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<Hash>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_index: Option<BigInt>,
    /// Set when a reorg dropped the block that held the log.
    #[serde(default)]
    pub removed: bool,
}

impl Log {
    pub fn data_bytes(&self) -> Result<Vec<u8>, EthError> {
        Ok(decode_hex(&self.data)?)
    }
}
