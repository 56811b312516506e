//! Recursive Length Prefix codec over a plain byte-string / list tree.
//!
//! Length prefixes are produced and validated by [`alloy_rlp::Header`], so
//! every encoding is canonical and any non-canonical or truncated input is a
//! hard decode error.

use alloy_rlp::Header;

use crate::address::Address;
use crate::bigint::BigInt;
use crate::error::PrimitiveError;
use crate::hash::Hash;
use crate::hexutil::decode_hex;

/// Deepest list nesting accepted by the decoder.
pub const MAX_DEPTH: usize = 128;

/// An RLP item: a byte string or a list of items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    Bytes(Vec<u8>),
    List(Vec<Item>),
}

impl Item {
    /// The empty byte string (`0x80`), also the encoding of integer zero
    /// and of a missing recipient.
    pub fn empty() -> Self {
        Item::Bytes(Vec::new())
    }

    /// Integer item: minimal big-endian bytes, empty for zero.
    pub fn uint(value: &BigInt) -> Result<Self, PrimitiveError> {
        Ok(Item::Bytes(value.to_minimal_be_bytes()?))
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.length());
        self.encode_to(&mut out);
        out
    }

    pub fn encode_to(&self, out: &mut Vec<u8>) {
        match self {
            Item::Bytes(bytes) if bytes.len() == 1 && bytes[0] < 0x80 => out.push(bytes[0]),
            Item::Bytes(bytes) => {
                Header {
                    list: false,
                    payload_length: bytes.len(),
                }
                .encode(out);
                out.extend_from_slice(bytes);
            }
            Item::List(items) => {
                Header {
                    list: true,
                    payload_length: payload_length(items),
                }
                .encode(out);
                for item in items {
                    item.encode_to(out);
                }
            }
        }
    }

    /// Encoded length including the prefix.
    pub fn length(&self) -> usize {
        match self {
            Item::Bytes(bytes) if bytes.len() == 1 && bytes[0] < 0x80 => 1,
            Item::Bytes(bytes) => {
                let header = Header {
                    list: false,
                    payload_length: bytes.len(),
                };
                header.length() + bytes.len()
            }
            Item::List(items) => {
                let payload_length = payload_length(items);
                let header = Header {
                    list: true,
                    payload_length,
                };
                header.length() + payload_length
            }
        }
    }

    pub fn as_bytes(&self) -> Result<&[u8], PrimitiveError> {
        match self {
            Item::Bytes(bytes) => Ok(bytes),
            Item::List(_) => Err(PrimitiveError::Rlp("expected byte string, got list".into())),
        }
    }

    pub fn as_list(&self) -> Result<&[Item], PrimitiveError> {
        match self {
            Item::List(items) => Ok(items),
            Item::Bytes(_) => Err(PrimitiveError::Rlp("expected list, got byte string".into())),
        }
    }

    /// Reads a canonical integer (no leading zero byte).
    pub fn as_bigint(&self) -> Result<BigInt, PrimitiveError> {
        let bytes = self.as_bytes()?;
        if bytes.first() == Some(&0) {
            return Err(PrimitiveError::Rlp("integer has leading zero byte".into()));
        }
        Ok(BigInt::from_be_bytes(bytes))
    }

    pub fn as_u64(&self) -> Result<u64, PrimitiveError> {
        let value = self.as_bigint()?;
        value
            .to_u64()
            .map_err(|_| PrimitiveError::Rlp(format!("integer {value} does not fit in u64")))
    }

    /// Reads a 20-byte address, or `None` for the empty string.
    pub fn as_optional_address(&self) -> Result<Option<Address>, PrimitiveError> {
        let bytes = self.as_bytes()?;
        if bytes.is_empty() {
            return Ok(None);
        }
        Address::from_slice(bytes).map(Some)
    }

    pub fn as_address(&self) -> Result<Address, PrimitiveError> {
        Address::from_slice(self.as_bytes()?)
    }

    pub fn as_hash(&self) -> Result<Hash, PrimitiveError> {
        Hash::from_slice(self.as_bytes()?)
    }
}

fn payload_length(items: &[Item]) -> usize {
    items.iter().map(Item::length).sum()
}

impl From<u64> for Item {
    fn from(value: u64) -> Self {
        // Strip leading zeros for minimal encoding.
        let bytes = value.to_be_bytes();
        let start = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
        Item::Bytes(bytes[start..].to_vec())
    }
}

impl From<bool> for Item {
    fn from(value: bool) -> Self {
        Item::from(u64::from(value))
    }
}

impl From<Vec<u8>> for Item {
    fn from(bytes: Vec<u8>) -> Self {
        Item::Bytes(bytes)
    }
}

impl From<&[u8]> for Item {
    fn from(bytes: &[u8]) -> Self {
        Item::Bytes(bytes.to_vec())
    }
}

impl From<&str> for Item {
    fn from(text: &str) -> Self {
        Item::Bytes(text.as_bytes().to_vec())
    }
}

impl From<Vec<Item>> for Item {
    fn from(items: Vec<Item>) -> Self {
        Item::List(items)
    }
}

impl From<Address> for Item {
    fn from(address: Address) -> Self {
        Item::Bytes(address.0.to_vec())
    }
}

impl From<Option<Address>> for Item {
    fn from(address: Option<Address>) -> Self {
        address.map_or_else(Item::empty, Item::from)
    }
}

impl From<Hash> for Item {
    fn from(hash: Hash) -> Self {
        Item::Bytes(hash.0.to_vec())
    }
}

pub fn encode(item: &Item) -> Vec<u8> {
    item.encode()
}

/// Decodes exactly one item; trailing bytes are an error.
pub fn decode(data: &[u8]) -> Result<Item, PrimitiveError> {
    let mut buf = data;
    let item = decode_item(&mut buf, 0)?;
    if !buf.is_empty() {
        return Err(PrimitiveError::Rlp(format!(
            "{} trailing bytes after item",
            buf.len()
        )));
    }
    Ok(item)
}

/// Decodes a concatenation of top-level items.
pub fn decode_all(data: &[u8]) -> Result<Vec<Item>, PrimitiveError> {
    let mut buf = data;
    let mut items = Vec::new();
    while !buf.is_empty() {
        items.push(decode_item(&mut buf, 0)?);
    }
    Ok(items)
}

pub fn decode_hex_items(input: &str) -> Result<Vec<Item>, PrimitiveError> {
    decode_all(&decode_hex(input)?)
}

fn decode_item(buf: &mut &[u8], depth: usize) -> Result<Item, PrimitiveError> {
    let header = Header::decode(buf).map_err(|e| PrimitiveError::Rlp(e.to_string()))?;
    if buf.len() < header.payload_length {
        return Err(PrimitiveError::Rlp(format!(
            "payload of {} bytes truncated to {}",
            header.payload_length,
            buf.len()
        )));
    }
    let (payload, rest) = buf.split_at(header.payload_length);
    *buf = rest;

    if !header.list {
        return Ok(Item::Bytes(payload.to_vec()));
    }

    if depth >= MAX_DEPTH {
        return Err(PrimitiveError::Rlp(format!(
            "list nesting deeper than {MAX_DEPTH}"
        )));
    }

    let mut inner = payload;
    let mut items = Vec::new();
    while !inner.is_empty() {
        items.push(decode_item(&mut inner, depth + 1)?);
    }
    Ok(Item::List(items))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enc(item: Item) -> String {
        hex::encode(item.encode())
    }

    #[test]
    fn known_vectors() {
        assert_eq!(enc(Item::from("dog")), "83646f67");
        assert_eq!(
            enc(Item::List(vec![Item::from("cat"), Item::from("dog")])),
            "c88363617484646f67"
        );
        assert_eq!(enc(Item::empty()), "80");
        assert_eq!(enc(Item::List(vec![])), "c0");
        assert_eq!(enc(Item::from(0u64)), "80");
        assert_eq!(enc(Item::from(vec![0u8])), "00");
        assert_eq!(enc(Item::from(15u64)), "0f");
        assert_eq!(enc(Item::from(1024u64)), "820400");
        assert_eq!(enc(Item::from(true)), "01");
        assert_eq!(enc(Item::from(false)), "80");
    }

    #[test]
    fn set_theoretic_nesting() {
        // [ [], [[]], [ [], [[]] ] ]
        let empty = || Item::List(vec![]);
        let item = Item::List(vec![
            empty(),
            Item::List(vec![empty()]),
            Item::List(vec![empty(), Item::List(vec![empty()])]),
        ]);
        assert_eq!(enc(item.clone()), "c7c0c1c0c3c0c1c0");
        assert_eq!(decode(&item.encode()).unwrap(), item);
    }

    #[test]
    fn long_string_prefix() {
        let text = "Lorem ipsum dolor sit amet, consectetur adipisicing elit";
        let encoded = Item::from(text).encode();
        assert_eq!(&encoded[..2], &[0xb8, 0x38]);
        assert_eq!(&encoded[2..], text.as_bytes());
    }

    #[test]
    fn string_length_boundary() {
        let s55 = Item::from(vec![0xaa; 55]).encode();
        assert_eq!(s55[0], 0xb7);
        assert_eq!(s55.len(), 56);

        let s56 = Item::from(vec![0xaa; 56]).encode();
        assert_eq!(&s56[..2], &[0xb8, 56]);
        assert_eq!(s56.len(), 58);
    }

    #[test]
    fn list_length_boundary() {
        // 55 single-byte items give a 55-byte payload.
        let l55 = Item::List(vec![Item::from(1u64); 55]).encode();
        assert_eq!(l55[0], 0xf7);

        let l56 = Item::List(vec![Item::from(1u64); 56]).encode();
        assert_eq!(&l56[..2], &[0xf8, 56]);
    }

    #[test]
    fn bigint_items() {
        let zero = Item::uint(&BigInt::zero()).unwrap();
        assert_eq!(zero, Item::empty());
        let big = BigInt::from_hex_str("0x0100000000000000000000").unwrap();
        let item = Item::uint(&big).unwrap();
        assert_eq!(item.as_bigint().unwrap(), big);
        assert!(Item::uint(&BigInt::from(-1i64)).is_err());
    }

    #[test]
    fn decode_rejects_truncated_input() {
        assert!(decode(&hex::decode("83646f").unwrap()).is_err());
        assert!(decode(&hex::decode("c883636174").unwrap()).is_err());
        assert!(decode(&[0xb8]).is_err());
    }

    #[test]
    fn decode_rejects_non_canonical_prefixes() {
        // Single byte below 0x80 wrapped in a string prefix.
        assert!(decode(&[0x81, 0x05]).is_err());
        // Long form used for a short string.
        assert!(decode(&[0xb8, 0x01, 0xaa]).is_err());
    }

    #[test]
    fn decode_rejects_trailing_bytes() {
        assert!(decode(&[0x80, 0x80]).is_err());
        assert_eq!(decode_all(&[0x80, 0x80]).unwrap().len(), 2);
    }

    #[test]
    fn decode_rejects_excessive_nesting() {
        let mut item = Item::List(vec![]);
        for _ in 0..=MAX_DEPTH {
            item = Item::List(vec![item]);
        }
        assert!(decode(&item.encode()).is_err());
    }

    #[test]
    fn integer_accessors_reject_leading_zero() {
        assert!(Item::from(vec![0u8, 1]).as_u64().is_err());
        assert_eq!(Item::from(vec![1u8, 0]).as_u64().unwrap(), 256);
        assert!(Item::from(vec![1u8; 9]).as_u64().is_err());
    }

    #[test]
    fn optional_address() {
        assert_eq!(Item::empty().as_optional_address().unwrap(), None);
        let address = Address([0x11; 20]);
        assert_eq!(
            Item::from(address).as_optional_address().unwrap(),
            Some(address)
        );
        assert_eq!(Item::from(Some(address)), Item::from(address));
        assert!(Item::from(vec![1u8; 19]).as_optional_address().is_err());
    }

    #[test]
    fn concatenated_hex_items() {
        let items = decode_hex_items("0x02c0").unwrap();
        assert_eq!(items, vec![Item::from(vec![2u8]), Item::List(vec![])]);
    }
}
