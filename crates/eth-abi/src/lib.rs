//! Solidity ABI encoding and decoding driven by textual signatures.
//!
//! ```text
//! encode_call("transfer(address,uint256)", &[to.into(), amount.into()])
//! ```
//!
//! Values are checked against the signature before anything is written:
//! out-of-range integers, wrong byte lengths and arity mismatches are errors.
//! Event logs decode through [`decode_log`].

pub mod codec;
pub mod error;
pub mod event;
pub mod native;
pub mod signature;
pub mod types;
pub mod value;

pub use error::AbiError;
pub use event::{DecodedEvent, DecodedParam, EventParam, EventSignature};
pub use native::{Bytes, FromAbi};
pub use signature::FunctionSignature;
pub use types::AbiType;
pub use value::{AbiValue, FunctionRef};

use eth_primitives::Hash;
use tracing::debug;

use value::conform_all;

/// The 4-byte selector of `signature`.
pub fn selector(signature: &str) -> Result<[u8; 4], AbiError> {
    Ok(FunctionSignature::parse(signature)?.selector())
}

/// Encodes `values` as the argument tuple of `signature`, without selector.
pub fn encode(signature: &str, values: &[AbiValue]) -> Result<Vec<u8>, AbiError> {
    let parsed = FunctionSignature::parse(signature)?;
    encode_arguments(&parsed, values)
}

/// Selector followed by the encoded arguments.
pub fn encode_call(signature: &str, values: &[AbiValue]) -> Result<Vec<u8>, AbiError> {
    let parsed = FunctionSignature::parse(signature)?;
    let mut out = parsed.selector().to_vec();
    out.extend(encode_arguments(&parsed, values)?);
    debug!(signature = %parsed, len = out.len(), "encoded call data");
    Ok(out)
}

/// Decodes `data` as the argument tuple of `signature`.
pub fn decode(signature: &str, data: &[u8]) -> Result<Vec<AbiValue>, AbiError> {
    let parsed = FunctionSignature::parse(signature)?;
    codec::decode_sequence(&parsed.inputs, data, 0)
}

/// Decodes call data, checking that it starts with the selector of
/// `signature`.
pub fn decode_call(signature: &str, data: &[u8]) -> Result<Vec<AbiValue>, AbiError> {
    let parsed = FunctionSignature::parse(signature)?;
    let selector = parsed.selector();
    match data.get(..4) {
        Some(prefix) if prefix == selector => codec::decode_sequence(&parsed.inputs, &data[4..], 0),
        Some(prefix) => Err(AbiError::InvalidData(format!(
            "selector 0x{} does not match {parsed} (0x{})",
            hex::encode(prefix),
            hex::encode(selector)
        ))),
        None => Err(AbiError::DataTooShort {
            offset: 0,
            needed: 4,
            available: data.len(),
        }),
    }
}

/// Decodes and unwraps into a native type. A single result unwraps to the
/// value itself; several results unwrap as a tuple.
pub fn decode_as<T: FromAbi>(signature: &str, data: &[u8]) -> Result<T, AbiError> {
    let mut values = decode(signature, data)?;
    if values.len() == 1 {
        if let Some(value) = values.pop() {
            return T::from_abi(value);
        }
    }
    T::from_abi(AbiValue::Tuple(values))
}

/// The first topic of logs emitted by the event `declaration`.
pub fn event_topic(declaration: &str) -> Result<Hash, AbiError> {
    Ok(EventSignature::parse(declaration)?.topic())
}

/// Decodes a log against an event declaration such as
/// `Transfer(address indexed from,address indexed to,uint256 value)`.
pub fn decode_log(declaration: &str, topics: &[Hash], data: &[u8]) -> Result<DecodedEvent, AbiError> {
    EventSignature::parse(declaration)?.decode_log(topics, data)
}

fn encode_arguments(parsed: &FunctionSignature, values: &[AbiValue]) -> Result<Vec<u8>, AbiError> {
    let conformed = conform_all(parsed.inputs.iter(), values.to_vec())?;
    codec::encode_sequence(&conformed)
}
