//! Event signatures and log decoding.
//!
//! A log carries its event's signature hash as the first topic, one topic
//! per `indexed` parameter, and every other parameter ABI-encoded in `data`.
//! Indexed parameters of a reference type (strings, bytes, arrays, tuples)
//! are stored as the Keccak-256 of their encoding, so they decode to that
//! 32-byte hash rather than the original value.

use std::fmt;

use eth_primitives::{keccak256, Hash};
use tracing::trace;

use crate::codec;
use crate::error::AbiError;
use crate::native::FromAbi;
use crate::types::{split_tuple, AbiType};
use crate::value::AbiValue;

/// Topics after the signature hash.
pub const MAX_INDEXED: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventParam {
    /// Empty when the declaration leaves the parameter unnamed.
    pub name: String,
    pub ty: AbiType,
    pub indexed: bool,
}

/// A parsed event declaration such as
/// `Transfer(address indexed from,address indexed to,uint256 value)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventSignature {
    pub name: String,
    pub params: Vec<EventParam>,
}

/// One decoded parameter, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedParam {
    pub name: String,
    pub indexed: bool,
    pub value: AbiValue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedEvent {
    pub name: String,
    pub params: Vec<DecodedParam>,
}

impl EventSignature {
    /// Each parameter is a type token optionally followed by `indexed` and
    /// a name, separated by spaces. Type tokens themselves contain no spaces.
    pub fn parse(text: &str) -> Result<Self, AbiError> {
        let invalid = |reason: &str| AbiError::InvalidSignature(format!("{text}: {reason}"));

        let text = text.trim();
        let open = text.find('(').ok_or_else(|| invalid("missing '('"))?;
        let name = &text[..open];
        if !is_identifier(name) {
            return Err(invalid("bad event name"));
        }

        let mut params = Vec::new();
        for part in split_tuple(&text[open..])? {
            let mut words = part.split_whitespace();
            let ty = words.next().ok_or_else(|| invalid("empty parameter"))?;
            let mut param = EventParam {
                name: String::new(),
                ty: AbiType::parse(ty)?,
                indexed: false,
            };
            for word in words {
                match word {
                    "indexed" if !param.indexed && param.name.is_empty() => param.indexed = true,
                    word if param.name.is_empty() && word != "indexed" && is_identifier(word) => {
                        param.name = word.to_string();
                    }
                    _ => return Err(invalid(&format!("unexpected '{word}' after {ty}"))),
                }
            }
            params.push(param);
        }

        if params.iter().filter(|p| p.indexed).count() > MAX_INDEXED {
            return Err(invalid("more than three indexed parameters"));
        }

        Ok(Self {
            name: name.to_string(),
            params,
        })
    }

    /// `Transfer(address,address,uint256)`: types only, as hashed.
    pub fn canonical(&self) -> String {
        let types = self.params.iter().map(|p| p.ty.clone()).collect();
        format!("{}{}", self.name, AbiType::Tuple(types))
    }

    /// The signature hash a log carries as its first topic.
    pub fn topic(&self) -> Hash {
        keccak256(self.canonical())
    }

    /// Decodes a log emitted by this event. Fails if the first topic is not
    /// [`EventSignature::topic`] or the topic count does not match the
    /// indexed parameters.
    pub fn decode_log(&self, topics: &[Hash], data: &[u8]) -> Result<DecodedEvent, AbiError> {
        let (first, indexed_topics) = topics
            .split_first()
            .ok_or_else(|| AbiError::InvalidData("log has no topics".into()))?;
        if *first != self.topic() {
            return Err(AbiError::InvalidData(format!(
                "topic {first} is not the hash of {}",
                self.canonical()
            )));
        }
        let expected = self.params.iter().filter(|p| p.indexed).count();
        if indexed_topics.len() != expected {
            return Err(AbiError::InvalidData(format!(
                "{} has {expected} indexed parameters, log has {} topics after the signature",
                self.canonical(),
                indexed_topics.len()
            )));
        }
        trace!(event = %self.name, topics = topics.len(), data = data.len(), "decoding log");

        let data_types = self.params.iter().filter(|p| !p.indexed).map(|p| &p.ty);
        let mut data_values = codec::decode_sequence(data_types, data, 0)?.into_iter();
        let mut indexed_topics = indexed_topics.iter();

        let mut params = Vec::with_capacity(self.params.len());
        for param in &self.params {
            let value = if param.indexed {
                let topic = indexed_topics.next().ok_or_else(|| missing(param))?;
                decode_topic(&param.ty, topic)?
            } else {
                data_values.next().ok_or_else(|| missing(param))?
            };
            params.push(DecodedParam {
                name: param.name.clone(),
                indexed: param.indexed,
                value,
            });
        }

        Ok(DecodedEvent {
            name: self.name.clone(),
            params,
        })
    }
}

impl fmt::Display for EventSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", param.ty)?;
            if param.indexed {
                f.write_str(" indexed")?;
            }
            if !param.name.is_empty() {
                write!(f, " {}", param.name)?;
            }
        }
        f.write_str(")")
    }
}

impl DecodedEvent {
    /// The value of the parameter called `name`.
    pub fn get(&self, name: &str) -> Option<&AbiValue> {
        self.params
            .iter()
            .find(|p| p.name == name)
            .map(|p| &p.value)
    }

    /// [`DecodedEvent::get`] unwrapped into a native type.
    pub fn get_as<T: FromAbi>(&self, name: &str) -> Result<T, AbiError> {
        let value = self
            .get(name)
            .ok_or_else(|| AbiError::InvalidData(format!("{} has no parameter {name}", self.name)))?;
        T::from_abi(value.clone())
    }

    pub fn values(&self) -> Vec<AbiValue> {
        self.params.iter().map(|p| p.value.clone()).collect()
    }
}

/// Value types are stored in the topic as their own word; anything else
/// is stored hashed.
fn decode_topic(ty: &AbiType, topic: &Hash) -> Result<AbiValue, AbiError> {
    let stored_directly = matches!(
        ty,
        AbiType::Uint(_)
            | AbiType::Int(_)
            | AbiType::Bool
            | AbiType::Address
            | AbiType::FixedBytes(_)
            | AbiType::Function
    );
    if !stored_directly {
        return Ok(AbiValue::FixedBytes(topic.as_bytes().to_vec()));
    }
    codec::decode_sequence([ty], topic.as_bytes(), 0)?
        .pop()
        .ok_or_else(|| AbiError::InvalidData(format!("empty topic decode for {ty}")))
}

fn missing(param: &EventParam) -> AbiError {
    AbiError::InvalidData(format!("no value for parameter {} {}", param.ty, param.name))
}

fn is_identifier(word: &str) -> bool {
    let mut chars = word.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}
