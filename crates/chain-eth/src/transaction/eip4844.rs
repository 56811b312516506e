use eth_primitives::rlp::Item;
use eth_primitives::{BigInt, Hash};

use super::{field_count, TxCommon, TxType};
use crate::access_list::AccessList;
use crate::error::EthError;

/// Type 3: a dynamic-fee transaction that also pays for blob space.
///
/// Only the versioned hashes are carried. The blob sidecar travels in the
/// network wrapper, which is not modelled here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlobTx {
    pub common: TxCommon,
    pub max_priority_fee_per_gas: BigInt,
    pub max_fee_per_gas: BigInt,
    pub access_list: AccessList,
    pub max_fee_per_blob_gas: BigInt,
    pub blob_versioned_hashes: Vec<Hash>,
}

impl BlobTx {
    pub(crate) const FIELDS: usize = 11;

    /// `[chainId, nonce, tip, feeCap, gasLimit, to, value, data, accessList,
    /// maxFeePerBlobGas, blobVersionedHashes]`
    pub(crate) fn payload(&self, chain_id: u64) -> Result<Vec<Item>, EthError> {
        let mut items = Vec::with_capacity(Self::FIELDS + 3);
        items.push(Item::from(chain_id));
        items.push(Item::from(self.common.nonce));
        items.push(Item::uint(&self.max_priority_fee_per_gas)?);
        items.push(Item::uint(&self.max_fee_per_gas)?);
        items.push(Item::from(self.common.gas_limit));
        items.extend(self.common.call_items()?);
        items.push(self.access_list.to_rlp());
        items.push(Item::uint(&self.max_fee_per_blob_gas)?);
        items.push(Item::List(
            self.blob_versioned_hashes
                .iter()
                .copied()
                .map(Item::from)
                .collect(),
        ));
        Ok(items)
    }

    pub(crate) fn from_payload(fields: &[Item]) -> Result<Self, EthError> {
        let [chain_id, nonce, tip, fee_cap, gas_limit, to, value, data, access_list, blob_fee, hashes] =
            fields
        else {
            return Err(field_count(TxType::Blob, Self::FIELDS, fields.len()));
        };
        let blob_versioned_hashes = hashes
            .as_list()?
            .iter()
            .map(Item::as_hash)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            common: TxCommon {
                chain_id: Some(chain_id.as_u64()?),
                nonce: nonce.as_u64()?,
                gas_limit: gas_limit.as_u64()?,
                to: to.as_optional_address()?,
                value: value.as_bigint()?,
                data: data.as_bytes()?.to_vec(),
            },
            max_priority_fee_per_gas: tip.as_bigint()?,
            max_fee_per_gas: fee_cap.as_bigint()?,
            access_list: AccessList::from_rlp(access_list)?,
            max_fee_per_blob_gas: blob_fee.as_bigint()?,
            blob_versioned_hashes,
        })
    }
}
