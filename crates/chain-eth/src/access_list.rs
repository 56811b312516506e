//! EIP-2930 access lists.

use eth_primitives::rlp::Item;
use eth_primitives::{Address, Hash};
use serde::{Deserialize, Serialize};

use crate::error::EthError;

/// One `(address, storageKeys)` entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessListItem {
    pub address: Address,
    pub storage_keys: Vec<Hash>,
}

/// Addresses and storage slots a transaction declares up front.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessList(pub Vec<AccessListItem>);

impl AccessList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, address: Address, storage_keys: Vec<Hash>) {
        self.0.push(AccessListItem {
            address,
            storage_keys,
        });
    }

    /// `[[address, [key, ...]], ...]`; an empty list encodes as `0xc0`.
    pub fn to_rlp(&self) -> Item {
        Item::List(
            self.0
                .iter()
                .map(|entry| {
                    Item::List(vec![
                        Item::from(entry.address),
                        Item::List(entry.storage_keys.iter().copied().map(Item::from).collect()),
                    ])
                })
                .collect(),
        )
    }

    pub fn from_rlp(item: &Item) -> Result<Self, EthError> {
        let entries = item.as_list()?;
        let mut list = Vec::with_capacity(entries.len());
        for entry in entries {
            let pair = entry.as_list()?;
            let [address, keys] = pair else {
                return Err(EthError::InvalidTransaction(format!(
                    "access list entry has {} fields, expected 2",
                    pair.len()
                )));
            };
            let storage_keys = keys
                .as_list()?
                .iter()
                .map(Item::as_hash)
                .collect::<Result<Vec<_>, _>>()?;
            list.push(AccessListItem {
                address: address.as_address()?,
                storage_keys,
            });
        }
        Ok(Self(list))
    }
}

impl From<Vec<AccessListItem>> for AccessList {
    fn from(items: Vec<AccessListItem>) -> Self {
        Self(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eth_primitives::rlp;

    #[test]
    fn empty_list_is_c0() {
        assert_eq!(AccessList::new().to_rlp().encode(), vec![0xc0]);
    }

    #[test]
    fn entry_layout() {
        let mut list = AccessList::new();
        list.push(Address([0xaa; 20]), vec![Hash([0x01; 32])]);
        let encoded = list.to_rlp().encode();
        // the entry payload is 55 bytes (0x94 address, 0xe1 key list), so the
        // outer list needs a long-form prefix
        assert_eq!(&encoded[..3], &[0xf8, 56, 0xf7]);
        assert_eq!(encoded[3], 0x94);
        assert_eq!(encoded[24], 0xe1);
        assert_eq!(encoded[25], 0xa0);
        assert_eq!(encoded.len(), 2 + 56);

        let decoded = AccessList::from_rlp(&rlp::decode(&encoded).unwrap()).unwrap();
        assert_eq!(decoded, list);
    }

    #[test]
    fn malformed_entries_are_rejected() {
        let bad = Item::List(vec![Item::List(vec![Item::from(Address::ZERO)])]);
        assert!(AccessList::from_rlp(&bad).is_err());

        let short_key = Item::List(vec![Item::List(vec![
            Item::from(Address::ZERO),
            Item::List(vec![Item::from(vec![1u8, 2])]),
        ])]);
        assert!(AccessList::from_rlp(&short_key).is_err());
    }

    #[test]
    fn serde_uses_rpc_field_names() {
        let json = r#"[{"address":"0x000000000000000000000000000000000000dead","storageKeys":["0x0000000000000000000000000000000000000000000000000000000000000001"]}]"#;
        let list: AccessList = serde_json::from_str(json).unwrap();
        assert_eq!(list.0.len(), 1);
        assert_eq!(list.0[0].storage_keys[0].as_bytes()[31], 1);
    }
}
