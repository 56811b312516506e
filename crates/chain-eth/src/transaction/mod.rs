//! The four transaction kinds, their signing payloads and wire envelopes.
//!
//! A [`Transaction`] is either unsigned or carries a [`Signature`]. Any
//! setter that changes a field drops the signature, so a signed value always
//! matches the payload it was signed over.

mod eip1559;
mod eip2930;
mod eip4844;
mod legacy;

use std::fmt;

use eth_primitives::hexutil::{decode_hex, encode_hex};
use eth_primitives::rlp::{self, Item};
use eth_primitives::units::{format_units, parse_units, Unit};
use eth_primitives::{keccak256, Address, BigInt, Hash};
use tracing::{debug, trace};

pub use eip1559::DynamicFeeTx;
pub use eip2930::AccessListTx;
pub use eip4844::BlobTx;
pub use legacy::LegacyTx;

use crate::access_list::AccessList;
use crate::error::{EthError, RpcError};
use crate::fees::{next_block_base_fee, Eip1559Config, FeeBump};
use crate::key::{recover_address, PrivateKey};
use crate::rpc::{CallRequest, EthRpc, RpcTransaction};
use crate::signature::Signature;

/// EIP-2718 transaction type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TxType {
    Legacy = 0,
    AccessList = 1,
    DynamicFee = 2,
    Blob = 3,
}

impl TxType {
    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn is_typed(self) -> bool {
        self != TxType::Legacy
    }
}

impl TryFrom<u8> for TxType {
    type Error = EthError;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        match id {
            0 => Ok(TxType::Legacy),
            1 => Ok(TxType::AccessList),
            2 => Ok(TxType::DynamicFee),
            3 => Ok(TxType::Blob),
            other => Err(EthError::UnsupportedTxType(other)),
        }
    }
}

impl fmt::Display for TxType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TxType::Legacy => "legacy",
            TxType::AccessList => "access-list",
            TxType::DynamicFee => "dynamic-fee",
            TxType::Blob => "blob",
        };
        f.write_str(name)
    }
}

/// Fields shared by every kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TxCommon {
    /// Required before typed transactions can be encoded or signed. For
    /// legacy transactions `None` means no EIP-155 replay protection.
    pub chain_id: Option<u64>,
    pub nonce: u64,
    pub gas_limit: u64,
    /// `None` deploys a contract.
    pub to: Option<Address>,
    /// Wei.
    pub value: BigInt,
    pub data: Vec<u8>,
}

impl TxCommon {
    /// `[to, value, data]`, in the order every kind lays them out.
    fn call_items(&self) -> Result<[Item; 3], EthError> {
        Ok([
            Item::from(self.to),
            Item::uint(&self.value)?,
            Item::from(self.data.clone()),
        ])
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxBody {
    Legacy(LegacyTx),
    AccessList(AccessListTx),
    DynamicFee(DynamicFeeTx),
    Blob(BlobTx),
}

impl TxBody {
    pub fn tx_type(&self) -> TxType {
        match self {
            TxBody::Legacy(_) => TxType::Legacy,
            TxBody::AccessList(_) => TxType::AccessList,
            TxBody::DynamicFee(_) => TxType::DynamicFee,
            TxBody::Blob(_) => TxType::Blob,
        }
    }

    pub fn common(&self) -> &TxCommon {
        match self {
            TxBody::Legacy(tx) => &tx.common,
            TxBody::AccessList(tx) => &tx.common,
            TxBody::DynamicFee(tx) => &tx.common,
            TxBody::Blob(tx) => &tx.common,
        }
    }

    fn common_mut(&mut self) -> &mut TxCommon {
        match self {
            TxBody::Legacy(tx) => &mut tx.common,
            TxBody::AccessList(tx) => &mut tx.common,
            TxBody::DynamicFee(tx) => &mut tx.common,
            TxBody::Blob(tx) => &mut tx.common,
        }
    }

    /// Payload items without the signature. Legacy ignores `chain_id`.
    fn typed_payload(&self, chain_id: u64) -> Result<Vec<Item>, EthError> {
        match self {
            TxBody::Legacy(tx) => tx.payload(),
            TxBody::AccessList(tx) => tx.payload(chain_id),
            TxBody::DynamicFee(tx) => tx.payload(chain_id),
            TxBody::Blob(tx) => tx.payload(chain_id),
        }
    }
}

/// An Ethereum transaction of any kind, signed or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    body: TxBody,
    signature: Option<Signature>,
}

impl Default for Transaction {
    fn default() -> Self {
        Self::legacy()
    }
}

impl From<TxBody> for Transaction {
    fn from(body: TxBody) -> Self {
        Self {
            body,
            signature: None,
        }
    }
}

/// Replaces `slot` and drops the signature if the value differs.
fn touch<T: PartialEq>(slot: &mut T, value: T, signature: &mut Option<Signature>) {
    if *slot != value {
        *slot = value;
        *signature = None;
    }
}

pub(crate) fn field_count(kind: TxType, expected: usize, actual: usize) -> EthError {
    EthError::InvalidTransaction(format!(
        "{kind} transaction has {actual} fields, expected {expected}"
    ))
}

impl Transaction {
    pub fn legacy() -> Self {
        TxBody::Legacy(LegacyTx::default()).into()
    }

    pub fn eip2930() -> Self {
        TxBody::AccessList(AccessListTx::default()).into()
    }

    pub fn eip1559() -> Self {
        TxBody::DynamicFee(DynamicFeeTx::default()).into()
    }

    pub fn eip4844() -> Self {
        TxBody::Blob(BlobTx::default()).into()
    }

    /// An empty unsigned transaction of the given kind.
    pub fn new(kind: TxType) -> Self {
        match kind {
            TxType::Legacy => Self::legacy(),
            TxType::AccessList => Self::eip2930(),
            TxType::DynamicFee => Self::eip1559(),
            TxType::Blob => Self::eip4844(),
        }
    }

    pub fn body(&self) -> &TxBody {
        &self.body
    }

    pub fn tx_type(&self) -> TxType {
        self.body.tx_type()
    }

    pub fn chain_id(&self) -> Option<u64> {
        self.body.common().chain_id
    }

    pub fn nonce(&self) -> u64 {
        self.body.common().nonce
    }

    pub fn gas_limit(&self) -> u64 {
        self.body.common().gas_limit
    }

    pub fn to(&self) -> Option<Address> {
        self.body.common().to
    }

    pub fn value(&self) -> &BigInt {
        &self.body.common().value
    }

    pub fn data(&self) -> &[u8] {
        &self.body.common().data
    }

    /// The gas price for legacy and access-list kinds, the fee cap
    /// (`maxFeePerGas`) for dynamic-fee and blob kinds.
    pub fn gas_price(&self) -> &BigInt {
        match &self.body {
            TxBody::Legacy(tx) => &tx.gas_price,
            TxBody::AccessList(tx) => &tx.gas_price,
            TxBody::DynamicFee(tx) => &tx.max_fee_per_gas,
            TxBody::Blob(tx) => &tx.max_fee_per_gas,
        }
    }

    /// `maxPriorityFeePerGas`, for dynamic-fee and blob kinds.
    pub fn priority_fee(&self) -> Option<&BigInt> {
        match &self.body {
            TxBody::DynamicFee(tx) => Some(&tx.max_priority_fee_per_gas),
            TxBody::Blob(tx) => Some(&tx.max_priority_fee_per_gas),
            TxBody::Legacy(_) | TxBody::AccessList(_) => None,
        }
    }

    pub fn access_list(&self) -> Option<&AccessList> {
        match &self.body {
            TxBody::AccessList(tx) => Some(&tx.access_list),
            TxBody::DynamicFee(tx) => Some(&tx.access_list),
            TxBody::Blob(tx) => Some(&tx.access_list),
            TxBody::Legacy(_) => None,
        }
    }

    pub fn max_fee_per_blob_gas(&self) -> Option<&BigInt> {
        match &self.body {
            TxBody::Blob(tx) => Some(&tx.max_fee_per_blob_gas),
            _ => None,
        }
    }

    pub fn blob_versioned_hashes(&self) -> Option<&[Hash]> {
        match &self.body {
            TxBody::Blob(tx) => Some(&tx.blob_versioned_hashes),
            _ => None,
        }
    }

    /// Gas price for legacy and access-list kinds, fee cap plus tip for the
    /// others.
    pub fn total_gas_price(&self) -> BigInt {
        match &self.body {
            TxBody::Legacy(tx) => tx.gas_price.clone(),
            TxBody::AccessList(tx) => tx.gas_price.clone(),
            TxBody::DynamicFee(tx) => &tx.max_fee_per_gas + &tx.max_priority_fee_per_gas,
            TxBody::Blob(tx) => &tx.max_fee_per_gas + &tx.max_priority_fee_per_gas,
        }
    }

    // ---- setters ----

    pub fn with_chain_id(mut self, chain_id: Option<u64>) -> Self {
        touch(
            &mut self.body.common_mut().chain_id,
            chain_id,
            &mut self.signature,
        );
        self
    }

    pub fn with_nonce(mut self, nonce: u64) -> Self {
        touch(&mut self.body.common_mut().nonce, nonce, &mut self.signature);
        self
    }

    pub fn with_gas_limit(mut self, gas_limit: u64) -> Self {
        touch(
            &mut self.body.common_mut().gas_limit,
            gas_limit,
            &mut self.signature,
        );
        self
    }

    pub fn with_to(mut self, to: Option<Address>) -> Self {
        touch(&mut self.body.common_mut().to, to, &mut self.signature);
        self
    }

    pub fn with_value(mut self, value: BigInt) -> Self {
        touch(&mut self.body.common_mut().value, value, &mut self.signature);
        self
    }

    /// Sets the value from a decimal amount in `unit`, e.g. `("0.5", Ether)`.
    pub fn with_value_fmt(self, amount: &str, unit: Unit) -> Result<Self, EthError> {
        let value = parse_units(amount, unit)?;
        if value.is_negative() {
            return Err(EthError::InvalidTransaction(format!(
                "value '{amount}' is negative"
            )));
        }
        Ok(self.with_value(value))
    }

    /// The value in `unit`, keeping at most `decimals` fractional digits.
    pub fn value_fmt(&self, decimals: usize, unit: Unit) -> String {
        format_units(self.value(), decimals, unit)
    }

    pub fn with_data(mut self, data: impl Into<Vec<u8>>) -> Self {
        touch(
            &mut self.body.common_mut().data,
            data.into(),
            &mut self.signature,
        );
        self
    }

    pub fn with_data_hex(self, data: &str) -> Result<Self, EthError> {
        Ok(self.with_data(decode_hex(data)?))
    }

    /// Sets the gas price, or the fee cap for dynamic-fee and blob kinds.
    pub fn with_gas_price(mut self, price: BigInt) -> Self {
        let slot = match &mut self.body {
            TxBody::Legacy(tx) => &mut tx.gas_price,
            TxBody::AccessList(tx) => &mut tx.gas_price,
            TxBody::DynamicFee(tx) => &mut tx.max_fee_per_gas,
            TxBody::Blob(tx) => &mut tx.max_fee_per_gas,
        };
        touch(slot, price, &mut self.signature);
        self
    }

    pub fn with_priority_fee(mut self, tip: BigInt) -> Result<Self, EthError> {
        let slot = match &mut self.body {
            TxBody::DynamicFee(tx) => &mut tx.max_priority_fee_per_gas,
            TxBody::Blob(tx) => &mut tx.max_priority_fee_per_gas,
            other => return Err(unsupported_field("priority fee", other.tx_type())),
        };
        touch(slot, tip, &mut self.signature);
        Ok(self)
    }

    pub fn with_access_list(mut self, access_list: AccessList) -> Result<Self, EthError> {
        let slot = match &mut self.body {
            TxBody::AccessList(tx) => &mut tx.access_list,
            TxBody::DynamicFee(tx) => &mut tx.access_list,
            TxBody::Blob(tx) => &mut tx.access_list,
            TxBody::Legacy(_) => return Err(unsupported_field("access list", TxType::Legacy)),
        };
        touch(slot, access_list, &mut self.signature);
        Ok(self)
    }

    pub fn with_max_fee_per_blob_gas(mut self, fee: BigInt) -> Result<Self, EthError> {
        let kind = self.tx_type();
        let TxBody::Blob(tx) = &mut self.body else {
            return Err(unsupported_field("blob gas fee", kind));
        };
        touch(&mut tx.max_fee_per_blob_gas, fee, &mut self.signature);
        Ok(self)
    }

    pub fn with_blob_versioned_hashes(mut self, hashes: Vec<Hash>) -> Result<Self, EthError> {
        let kind = self.tx_type();
        let TxBody::Blob(tx) = &mut self.body else {
            return Err(unsupported_field("blob hashes", kind));
        };
        touch(&mut tx.blob_versioned_hashes, hashes, &mut self.signature);
        Ok(self)
    }

    pub fn add_blob_versioned_hash(mut self, hash: Hash) -> Result<Self, EthError> {
        let kind = self.tx_type();
        let TxBody::Blob(tx) = &mut self.body else {
            return Err(unsupported_field("blob hashes", kind));
        };
        tx.blob_versioned_hashes.push(hash);
        self.signature = None;
        Ok(self)
    }

    /// Attaches an externally produced signature. Its shape is checked
    /// (non-zero 256-bit `r` and `s`, a `v` this kind can carry) but not that
    /// it matches the payload; [`Transaction::ec_recover`] tells who signed.
    pub fn with_signature(mut self, signature: Signature) -> Result<Self, EthError> {
        check_signature(self.tx_type(), &signature)?;
        self.signature = Some(signature);
        Ok(self)
    }

    pub fn signature(&self) -> Option<&Signature> {
        self.signature.as_ref()
    }

    pub fn is_signed(&self) -> bool {
        self.signature.is_some()
    }

    /// Whether the signature binds a chain id. Typed kinds always do; a
    /// legacy transaction does when its `v` is an EIP-155 value, or before
    /// signing when it has a chain id.
    pub fn is_replay_protected(&self) -> bool {
        match (&self.body, &self.signature) {
            (TxBody::Legacy(_), Some(signature)) => !legacy::is_unprotected_v(&signature.v),
            (TxBody::Legacy(tx), None) => tx.common.chain_id.is_some(),
            _ => true,
        }
    }

    // ---- encoding ----

    fn signing_payload(&self, chain_id: Option<u64>) -> Result<Vec<u8>, EthError> {
        match (&self.body, chain_id) {
            (TxBody::Legacy(tx), None) => Ok(Item::List(tx.payload()?).encode()),
            (TxBody::Legacy(tx), Some(id)) => {
                let mut items = tx.payload()?;
                items.extend([Item::from(id), Item::empty(), Item::empty()]);
                Ok(Item::List(items).encode())
            }
            (body, Some(id)) => Ok(envelope(body.tx_type(), body.typed_payload(id)?)),
            (_, None) => Err(EthError::MissingChainId),
        }
    }

    /// The bytes whose hash gets signed. `chain_id` overrides the stored
    /// one; a legacy transaction without either signs the pre-EIP-155 form.
    pub fn encode_for_signing(&self, chain_id: Option<u64>) -> Result<Vec<u8>, EthError> {
        self.signing_payload(chain_id.or(self.chain_id()))
    }

    pub fn signing_hash(&self, chain_id: Option<u64>) -> Result<Hash, EthError> {
        Ok(keccak256(self.encode_for_signing(chain_id)?))
    }

    /// The wire encoding: a bare list for legacy, `type ‖ rlp(fields)` for
    /// typed kinds. Unsigned transactions get zero `r` and `s`; an unsigned
    /// legacy transaction puts its chain id (or 0) in `v`.
    pub fn encode(&self) -> Result<Vec<u8>, EthError> {
        let (v, r, s) = match &self.signature {
            Some(signature) => (
                Item::uint(&signature.v)?,
                Item::uint(&signature.r)?,
                Item::uint(&signature.s)?,
            ),
            None => {
                let v = match (&self.body, self.chain_id()) {
                    (TxBody::Legacy(_), Some(id)) => Item::from(id),
                    _ => Item::empty(),
                };
                (v, Item::empty(), Item::empty())
            }
        };

        match &self.body {
            TxBody::Legacy(tx) => {
                let mut items = tx.payload()?;
                items.extend([v, r, s]);
                Ok(Item::List(items).encode())
            }
            body => {
                let chain_id = self.chain_id().ok_or(EthError::MissingChainId)?;
                let mut items = body.typed_payload(chain_id)?;
                items.extend([v, r, s]);
                Ok(envelope(body.tx_type(), items))
            }
        }
    }

    /// `0x`-prefixed [`Transaction::encode`].
    pub fn encode_hex(&self) -> Result<String, EthError> {
        Ok(encode_hex(self.encode()?))
    }

    /// Keccak-256 of the wire encoding.
    pub fn hash(&self) -> Result<Hash, EthError> {
        Ok(keccak256(self.encode()?))
    }

    /// Parses a wire encoding. A leading byte of `0xc0` or above is a legacy
    /// list; `0x01..=0x03` select a typed kind; anything else is rejected.
    pub fn decode(raw: &[u8]) -> Result<Self, EthError> {
        let Some(&first) = raw.first() else {
            return Err(EthError::InvalidTransaction("empty input".into()));
        };

        if first >= 0xc0 {
            let item = rlp::decode(raw)?;
            let fields = item.as_list()?;
            let (payload, signature) = split_signature(TxType::Legacy, fields, LegacyTx::FIELDS)?;
            let mut tx = LegacyTx::from_payload(payload)?;
            tx.common.chain_id = match (&signature, fields.get(LegacyTx::FIELDS)) {
                (Some(signature), _) => legacy::chain_id_from_v(&signature.v)?,
                (None, Some(v)) => legacy::chain_id_from_unsigned_v(&v.as_bigint()?)?,
                (None, None) => None,
            };
            return Ok(Self {
                body: TxBody::Legacy(tx),
                signature,
            });
        }

        let kind = match TxType::try_from(first) {
            Ok(TxType::Legacy) => return Err(EthError::UnsupportedTxType(first)),
            other => other?,
        };
        trace!(%kind, len = raw.len(), "decoding typed transaction");

        let item = rlp::decode(&raw[1..])?;
        let fields = item.as_list()?;
        let payload_len = match kind {
            TxType::Legacy => LegacyTx::FIELDS,
            TxType::AccessList => AccessListTx::FIELDS,
            TxType::DynamicFee => DynamicFeeTx::FIELDS,
            TxType::Blob => BlobTx::FIELDS,
        };
        let (payload, signature) = split_signature(kind, fields, payload_len)?;
        let body = match kind {
            TxType::AccessList => TxBody::AccessList(AccessListTx::from_payload(payload)?),
            TxType::DynamicFee => TxBody::DynamicFee(DynamicFeeTx::from_payload(payload)?),
            TxType::Blob => TxBody::Blob(BlobTx::from_payload(payload)?),
            TxType::Legacy => return Err(EthError::UnsupportedTxType(first)),
        };
        Ok(Self { body, signature })
    }

    /// Hex input, `0x` optional.
    pub fn decode_hex(input: &str) -> Result<Self, EthError> {
        Self::decode(&decode_hex(input)?)
    }

    // ---- signing ----

    /// Signs with `key`. A `chain_id` replaces the stored one once signing
    /// succeeds; typed kinds fail with [`EthError::MissingChainId`] when
    /// neither is set. On error the transaction is left as it was.
    pub fn sign(&mut self, key: &PrivateKey, chain_id: Option<u64>) -> Result<(), EthError> {
        let chain_id = chain_id.or(self.chain_id());
        let hash = keccak256(self.signing_payload(chain_id)?);
        let raw = key.sign_hash(&hash)?;

        let parity = u64::from(raw.recovery_id % 2);
        let v = match (self.tx_type(), chain_id) {
            (TxType::Legacy, None) => BigInt::from(u64::from(raw.recovery_id) + 27),
            (TxType::Legacy, Some(id)) => BigInt::from(id) * 2u64 + (parity + 35),
            _ => BigInt::from(parity),
        };
        debug!(kind = %self.tx_type(), ?chain_id, %v, "signed transaction");

        self.body.common_mut().chain_id = chain_id;
        self.signature = Some(Signature::new(v, raw.r, raw.s));
        Ok(())
    }

    /// The signer's address, or [`Address::ZERO`] when unsigned.
    pub fn ec_recover(&self) -> Result<Address, EthError> {
        let Some(signature) = &self.signature else {
            return Ok(Address::ZERO);
        };

        let (chain_id, parity) = match self.tx_type() {
            TxType::Legacy => (
                legacy::chain_id_from_v(&signature.v)?,
                legacy::parity_from_v(&signature.v),
            ),
            _ => (
                Some(self.chain_id().ok_or(EthError::MissingChainId)?),
                u8::from(!(&signature.v % 2u64).is_zero()),
            ),
        };
        let hash = keccak256(self.signing_payload(chain_id)?);
        trace!(kind = %self.tx_type(), parity, "recovering signer");
        recover_address(&hash, &signature.r, &signature.s, parity)
    }

    /// Where a signed contract-creation transaction deploys to;
    /// [`Address::ZERO`] if unsigned or addressed to an account.
    pub fn deploy_address(&self) -> Result<Address, EthError> {
        if !self.is_signed() || self.to().is_some() {
            return Ok(Address::ZERO);
        }
        Ok(contract_address(&self.ec_recover()?, self.nonce()))
    }

    // ---- node interaction ----

    /// Builds a transaction from an `eth_getTransactionByHash` result.
    pub fn from_rpc(rpc: &RpcTransaction) -> Result<Self, EthError> {
        let kind = match &rpc.tx_type {
            None => TxType::Legacy,
            Some(id) => {
                let id = id.to_u64()?;
                let id = u8::try_from(id).map_err(|_| {
                    EthError::InvalidTransaction(format!("transaction type {id} out of range"))
                })?;
                TxType::try_from(id)?
            }
        };

        let data = match rpc.call_data() {
            Some(hex) => decode_hex(hex)?,
            None => Vec::new(),
        };
        let mut common = TxCommon {
            chain_id: rpc.chain_id.as_ref().map(BigInt::to_u64).transpose()?,
            nonce: rpc.nonce.to_u64()?,
            gas_limit: rpc.gas.to_u64()?,
            to: rpc.to,
            value: rpc.value.clone(),
            data,
        };

        let signature = match (&rpc.r, &rpc.s) {
            (Some(r), Some(s)) if !(r.is_zero() && s.is_zero()) => Some(Signature::new(
                rpc.v.clone().unwrap_or_default(),
                r.clone(),
                s.clone(),
            )),
            _ => None,
        };
        if let Some(signature) = &signature {
            check_signature(kind, signature)?;
        }
        if let (TxType::Legacy, Some(signature)) = (kind, &signature) {
            common.chain_id = legacy::chain_id_from_v(&signature.v)?;
        }

        let gas_price = rpc.gas_price.clone().unwrap_or_default();
        let fee_cap = rpc
            .max_fee_per_gas
            .clone()
            .unwrap_or_else(|| gas_price.clone());
        let tip = rpc.max_priority_fee_per_gas.clone().unwrap_or_default();
        let access_list = rpc.access_list.clone().unwrap_or_default();

        let body = match kind {
            TxType::Legacy => TxBody::Legacy(LegacyTx { common, gas_price }),
            TxType::AccessList => TxBody::AccessList(AccessListTx {
                common,
                gas_price,
                access_list,
            }),
            TxType::DynamicFee => TxBody::DynamicFee(DynamicFeeTx {
                common,
                max_priority_fee_per_gas: tip,
                max_fee_per_gas: fee_cap,
                access_list,
            }),
            TxType::Blob => TxBody::Blob(BlobTx {
                common,
                max_priority_fee_per_gas: tip,
                max_fee_per_gas: fee_cap,
                access_list,
                max_fee_per_blob_gas: rpc.max_fee_per_blob_gas.clone().unwrap_or_default(),
                blob_versioned_hashes: rpc.blob_versioned_hashes.clone().unwrap_or_default(),
            }),
        };
        Ok(Self { body, signature })
    }

    /// The `eth_estimateGas` request for this transaction. Zero gas and fee
    /// fields are left out so the node picks them.
    pub fn to_call_request(&self, from: Option<Address>) -> CallRequest {
        let non_zero = |value: &BigInt| (!value.is_zero()).then(|| value.clone());
        let mut request = CallRequest {
            from,
            to: self.to(),
            gas: (self.gas_limit() != 0).then(|| BigInt::from(self.gas_limit())),
            value: non_zero(self.value()),
            data: (!self.data().is_empty()).then(|| encode_hex(self.data())),
            ..Default::default()
        };
        match self.priority_fee() {
            Some(tip) => {
                request.max_fee_per_gas = non_zero(self.gas_price());
                request.max_priority_fee_per_gas = non_zero(tip);
            }
            None => request.gas_price = non_zero(self.gas_price()),
        }
        request
    }

    /// Fills gas limit and fees from the node, each raised by `bump`
    /// (rounded down).
    ///
    /// Legacy and access-list kinds take `eth_gasPrice`. Dynamic-fee and
    /// blob kinds take the predicted next base fee as the fee cap and the
    /// average recent tip as the priority fee.
    pub fn use_rpc_estimates_with_bump<R: EthRpc + ?Sized>(
        &mut self,
        rpc: &R,
        from: Option<Address>,
        bump: FeeBump,
    ) -> Result<(), EthError> {
        let estimate = rpc.estimate_gas(&self.to_call_request(from))?;
        let gas_limit = bump.bump_gas(estimate);
        touch(
            &mut self.body.common_mut().gas_limit,
            gas_limit,
            &mut self.signature,
        );

        match &mut self.body {
            TxBody::Legacy(LegacyTx { gas_price, .. })
            | TxBody::AccessList(AccessListTx { gas_price, .. }) => {
                let price = bump.bump_fee(&rpc.gas_price()?);
                debug!(estimate, gas_limit, %price, "applied legacy fee estimates");
                touch(gas_price, price, &mut self.signature);
            }
            TxBody::DynamicFee(DynamicFeeTx {
                max_priority_fee_per_gas,
                max_fee_per_gas,
                ..
            })
            | TxBody::Blob(BlobTx {
                max_priority_fee_per_gas,
                max_fee_per_gas,
                ..
            }) => {
                // the activation block is irrelevant for a chain already past London
                let base = next_block_base_fee(&rpc.latest_block()?, &Eip1559Config::sepolia());
                let fee_cap = bump.bump_fee(&base);
                let tip = bump.bump_fee(&rpc.average_tip()?);
                debug!(estimate, gas_limit, %fee_cap, %tip, "applied dynamic fee estimates");
                touch(max_fee_per_gas, fee_cap, &mut self.signature);
                touch(max_priority_fee_per_gas, tip, &mut self.signature);
            }
        }
        Ok(())
    }

    /// Sets the nonce to the pending transaction count of `address`.
    pub fn nonce_from_rpc<R: EthRpc + ?Sized>(
        &mut self,
        rpc: &R,
        address: &Address,
    ) -> Result<(), EthError> {
        let count = rpc.transaction_count(address)?;
        let nonce = count.to_u64().map_err(|_| {
            RpcError::InvalidResponse(format!("transaction count {count} does not fit in u64"))
        })?;
        touch(&mut self.body.common_mut().nonce, nonce, &mut self.signature);
        Ok(())
    }

    /// Broadcasts the signed encoding and returns the node's hash.
    pub fn send<R: EthRpc + ?Sized>(&self, rpc: &R) -> Result<Hash, EthError> {
        if !self.is_signed() {
            return Err(EthError::Logic("cannot send an unsigned transaction".into()));
        }
        let raw = self.encode()?;
        debug!(kind = %self.tx_type(), len = raw.len(), "sending raw transaction");
        Ok(rpc.send_raw_transaction(&raw)?)
    }
}

fn unsupported_field(field: &str, kind: TxType) -> EthError {
    EthError::Logic(format!("{kind} transactions have no {field}"))
}

fn envelope(kind: TxType, items: Vec<Item>) -> Vec<u8> {
    let list = Item::List(items);
    let mut out = Vec::with_capacity(1 + list.length());
    out.push(kind.id());
    list.encode_to(&mut out);
    out
}

/// Splits `payload ‖ v, r, s`. Zero `r` and `s` read as unsigned.
fn split_signature(
    kind: TxType,
    fields: &[Item],
    payload_len: usize,
) -> Result<(&[Item], Option<Signature>), EthError> {
    let [payload @ .., v, r, s] = fields else {
        return Err(field_count(kind, payload_len + 3, fields.len()));
    };
    if payload.len() != payload_len {
        return Err(field_count(kind, payload_len + 3, fields.len()));
    }
    let (r, s) = (r.as_bigint()?, s.as_bigint()?);
    if r.is_zero() && s.is_zero() {
        return Ok((payload, None));
    }
    let signature = Signature::new(v.as_bigint()?, r, s);
    check_signature(kind, &signature)?;
    Ok((payload, Some(signature)))
}

/// Rejects signatures no signer could have produced for `kind`: a zero or
/// wider than 256-bit `r` or `s`, a typed `v` other than 0/1, or a legacy `v`
/// that is neither 27/28/0/1 nor an EIP-155 value.
fn check_signature(kind: TxType, signature: &Signature) -> Result<(), EthError> {
    for (name, scalar) in [("r", &signature.r), ("s", &signature.s)] {
        if scalar.is_zero() || !scalar.fits_unsigned(256) {
            return Err(EthError::InvalidSignature(format!(
                "{name} = {scalar} is not a valid scalar"
            )));
        }
    }
    match kind {
        TxType::Legacy => legacy::chain_id_from_v(&signature.v).map(|_| ()),
        _ if signature.v == 0u64 || signature.v == 1u64 => Ok(()),
        _ => Err(EthError::InvalidSignature(format!(
            "v = {} is not a {kind} parity",
            signature.v
        ))),
    }
}

/// `keccak256(rlp([sender, nonce]))[12..]`
pub fn contract_address(sender: &Address, nonce: u64) -> Address {
    let encoded = Item::List(vec![Item::from(*sender), Item::from(nonce)]).encode();
    let hash = keccak256(encoded);
    let mut out = [0u8; 20];
    out.copy_from_slice(&hash.as_bytes()[12..]);
    Address(out)
}
