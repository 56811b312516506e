use eth_primitives::rlp::Item;
use eth_primitives::BigInt;

use super::{field_count, TxCommon, TxType};
use crate::error::EthError;

/// Pre-EIP-2718 transaction: a bare RLP list, chain id folded into `v`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LegacyTx {
    pub common: TxCommon,
    pub gas_price: BigInt,
}

impl LegacyTx {
    pub(crate) const FIELDS: usize = 6;

    /// `[nonce, gasPrice, gasLimit, to, value, data]`
    pub(crate) fn payload(&self) -> Result<Vec<Item>, EthError> {
        let mut items = Vec::with_capacity(Self::FIELDS + 3);
        items.push(Item::from(self.common.nonce));
        items.push(Item::uint(&self.gas_price)?);
        items.push(Item::from(self.common.gas_limit));
        items.extend(self.common.call_items()?);
        Ok(items)
    }

    pub(crate) fn from_payload(fields: &[Item]) -> Result<Self, EthError> {
        let [nonce, gas_price, gas_limit, to, value, data] = fields else {
            return Err(field_count(TxType::Legacy, Self::FIELDS, fields.len()));
        };
        Ok(Self {
            common: TxCommon {
                chain_id: None,
                nonce: nonce.as_u64()?,
                gas_limit: gas_limit.as_u64()?,
                to: to.as_optional_address()?,
                value: value.as_bigint()?,
                data: data.as_bytes()?.to_vec(),
            },
            gas_price: gas_price.as_bigint()?,
        })
    }
}

/// `v` values that carry no chain id.
pub(crate) fn is_unprotected_v(v: &BigInt) -> bool {
    [27u64, 28, 0, 1].iter().any(|candidate| *v == *candidate)
}

/// The chain id folded into an EIP-155 `v`, or `None` for 27/28/0/1.
pub(crate) fn chain_id_from_v(v: &BigInt) -> Result<Option<u64>, EthError> {
    if is_unprotected_v(v) {
        return Ok(None);
    }
    if *v < BigInt::from(35u64) {
        return Err(EthError::InvalidSignature(format!(
            "legacy v = {v} is neither 27/28 nor an EIP-155 value"
        )));
    }
    let chain_id = ((v - 35u64) / 2u64)
        .to_u64()
        .map_err(|_| EthError::InvalidSignature(format!("chain id in v = {v} overflows u64")))?;
    Ok(Some(chain_id))
}

/// The chain id an unsigned legacy encoding keeps in `v`. 0 and the
/// pre-EIP-155 markers 27/28 mean none.
pub(crate) fn chain_id_from_unsigned_v(v: &BigInt) -> Result<Option<u64>, EthError> {
    if [0u64, 27, 28].iter().any(|marker| *v == *marker) {
        return Ok(None);
    }
    let chain_id = v
        .to_u64()
        .map_err(|_| EthError::InvalidTransaction(format!("chain id {v} overflows u64")))?;
    Ok(Some(chain_id))
}

/// Recovery parity for a legacy `v`: an even `v` means parity 1.
///
/// Holds for 27/28 and for `chain_id * 2 + 35/36`; 0/1 are flipped too.
pub(crate) fn parity_from_v(v: &BigInt) -> u8 {
    if (v % 2u64).is_zero() {
        1
    } else {
        0
    }
}
