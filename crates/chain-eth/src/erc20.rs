use eth_abi::AbiValue;
use eth_primitives::{Address, BigInt};

use crate::error::EthError;
use crate::rpc::Log;

pub const TRANSFER: &str = "transfer(address,uint256)";
pub const APPROVE: &str = "approve(address,uint256)";
pub const BALANCE_OF: &str = "balanceOf(address)";
pub const TRANSFER_EVENT: &str = "Transfer(address indexed from,address indexed to,uint256 value)";

/// A decoded `Transfer` log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferLog {
    pub token: Address,
    pub from: Address,
    pub to: Address,
    pub value: BigInt,
}

/// Encodes an ERC-20 `transfer(address,uint256)` call.
///
/// # Returns
///
/// The complete calldata (4-byte selector + 64 bytes of ABI-encoded params).
pub fn encode_transfer(to: &Address, amount: &BigInt) -> Result<Vec<u8>, EthError> {
    let params = [AbiValue::Address(*to), AbiValue::uint(amount.clone())];
    Ok(eth_abi::encode_call(TRANSFER, &params)?)
}

/// Encodes an ERC-20 `balanceOf(address)` call.
pub fn encode_balance_of(owner: &Address) -> Result<Vec<u8>, EthError> {
    Ok(eth_abi::encode_call(BALANCE_OF, &[AbiValue::Address(*owner)])?)
}

/// Encodes an ERC-20 `approve(address,uint256)` call.
pub fn encode_approve(spender: &Address, amount: &BigInt) -> Result<Vec<u8>, EthError> {
    let params = [AbiValue::Address(*spender), AbiValue::uint(amount.clone())];
    Ok(eth_abi::encode_call(APPROVE, &params)?)
}

/// Decodes the `uint256` returned by `balanceOf` and similar views.
pub fn decode_balance(data: &[u8]) -> Result<BigInt, EthError> {
    Ok(eth_abi::decode_as::<BigInt>("(uint256)", data)?)
}

/// Reads a `Transfer` log. Fails for logs of any other event.
pub fn decode_transfer_log(log: &Log) -> Result<TransferLog, EthError> {
    let event = eth_abi::decode_log(TRANSFER_EVENT, &log.topics, &log.data_bytes()?)?;
    Ok(TransferLog {
        token: log.address,
        from: event.get_as("from")?,
        to: event.get_as("to")?,
        value: event.get_as("value")?,
    })
}
