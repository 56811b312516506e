use eth_primitives::rlp::Item;
use eth_primitives::BigInt;

use super::{field_count, TxCommon, TxType};
use crate::access_list::AccessList;
use crate::error::EthError;

/// Type 1: a legacy-priced transaction with an access list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessListTx {
    pub common: TxCommon,
    pub gas_price: BigInt,
    pub access_list: AccessList,
}

impl AccessListTx {
    pub(crate) const FIELDS: usize = 8;

    /// `[chainId, nonce, gasPrice, gasLimit, to, value, data, accessList]`
    pub(crate) fn payload(&self, chain_id: u64) -> Result<Vec<Item>, EthError> {
        let mut items = Vec::with_capacity(Self::FIELDS + 3);
        items.push(Item::from(chain_id));
        items.push(Item::from(self.common.nonce));
        items.push(Item::uint(&self.gas_price)?);
        items.push(Item::from(self.common.gas_limit));
        items.extend(self.common.call_items()?);
        items.push(self.access_list.to_rlp());
        Ok(items)
    }

    pub(crate) fn from_payload(fields: &[Item]) -> Result<Self, EthError> {
        let [chain_id, nonce, gas_price, gas_limit, to, value, data, access_list] = fields else {
            return Err(field_count(TxType::AccessList, Self::FIELDS, fields.len()));
        };
        Ok(Self {
            common: TxCommon {
                chain_id: Some(chain_id.as_u64()?),
                nonce: nonce.as_u64()?,
                gas_limit: gas_limit.as_u64()?,
                to: to.as_optional_address()?,
                value: value.as_bigint()?,
                data: data.as_bytes()?.to_vec(),
            },
            gas_price: gas_price.as_bigint()?,
            access_list: AccessList::from_rlp(access_list)?,
        })
    }
}
