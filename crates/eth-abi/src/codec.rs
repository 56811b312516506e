//! Head/tail encoding and decoding.
//!
//! A sequence of values (top-level arguments, tuple members or array
//! elements) is laid out as all heads followed by all tails. A static value
//! is its own head. A dynamic value puts a 32-byte offset in the head,
//! measured from the start of the sequence, and its data in the tail.

use eth_primitives::{Address, BigInt};
use tracing::trace;

use crate::error::AbiError;
use crate::types::{AbiType, WORD};
use crate::value::{AbiValue, FunctionRef};

/// Encodes a sequence of already-conformed values.
pub fn encode_sequence(values: &[AbiValue]) -> Result<Vec<u8>, AbiError> {
    let heads_len: usize = values.iter().map(AbiValue::head_size).sum();
    let mut heads = Vec::with_capacity(heads_len);
    let mut tails = Vec::new();

    for value in values {
        if value.is_dynamic() {
            heads.extend_from_slice(&usize_word(heads_len + tails.len()));
            encode_value(value, &mut tails)?;
        } else {
            encode_value(value, &mut heads)?;
        }
    }

    heads.extend_from_slice(&tails);
    Ok(heads)
}

/// Appends the encoding of one value: its whole static form, or for dynamic
/// values the block an offset points at.
fn encode_value(value: &AbiValue, out: &mut Vec<u8>) -> Result<(), AbiError> {
    match value {
        AbiValue::Uint(_, n) => out.extend_from_slice(&n.to_be_bytes(WORD)?),
        // Always sign-extended to the full word, whatever the declared width.
        AbiValue::Int(_, n) => out.extend_from_slice(&n.to_twos_complement_bytes(WORD)?),
        AbiValue::Bool(b) => out.extend_from_slice(&usize_word(usize::from(*b))),
        AbiValue::Address(address) => {
            out.extend_from_slice(&[0u8; 12]);
            out.extend_from_slice(address.as_bytes());
        }
        AbiValue::FixedBytes(bytes) => {
            if bytes.is_empty() || bytes.len() > WORD {
                return Err(AbiError::ValueOutOfRange(format!(
                    "bytes{} is not a valid fixed size",
                    bytes.len()
                )));
            }
            extend_padded(out, bytes);
        }
        AbiValue::Bytes(bytes) => {
            out.extend_from_slice(&usize_word(bytes.len()));
            extend_padded(out, bytes);
        }
        AbiValue::String(text) => {
            out.extend_from_slice(&usize_word(text.len()));
            extend_padded(out, text.as_bytes());
        }
        AbiValue::Function(func) => extend_padded(out, &func.to_bytes()),
        AbiValue::Tuple(children) | AbiValue::FixedArray(children) => {
            out.extend(encode_sequence(children)?);
        }
        AbiValue::Array(children) => {
            out.extend_from_slice(&usize_word(children.len()));
            out.extend(encode_sequence(children)?);
        }
    }
    Ok(())
}

/// Decodes a sequence of `types` whose heads start at `base`.
pub fn decode_sequence<'a>(
    types: impl IntoIterator<Item = &'a AbiType>,
    data: &[u8],
    base: usize,
) -> Result<Vec<AbiValue>, AbiError> {
    let mut head = base;
    let mut values = Vec::new();
    for ty in types {
        let (value, consumed) = decode_slot(ty, data, base, head)?;
        head += consumed;
        values.push(value);
    }
    Ok(values)
}

/// Decodes the value whose head sits at `head` inside the sequence starting
/// at `base`.
///
/// Returns the head bytes consumed: 32 for an offset slot, the static width
/// otherwise. Tail bytes never advance the sibling head cursor.
pub fn decode_slot(
    ty: &AbiType,
    data: &[u8],
    base: usize,
    head: usize,
) -> Result<(AbiValue, usize), AbiError> {
    if ty.is_dynamic() {
        let offset = read_usize(data, head)?;
        let at = base
            .checked_add(offset)
            .ok_or_else(|| AbiError::InvalidData(format!("offset {offset} overflows")))?;
        trace!(%ty, head, at, "following offset");
        Ok((decode_at(ty, data, at)?, WORD))
    } else {
        Ok((decode_at(ty, data, head)?, ty.head_size()?))
    }
}

/// Decodes a value whose own encoding starts at `at`.
fn decode_at(ty: &AbiType, data: &[u8], at: usize) -> Result<AbiValue, AbiError> {
    match ty {
        AbiType::Uint(bits) => {
            let n = BigInt::from_be_bytes(read_word(data, at)?);
            if !n.fits_unsigned(*bits) {
                return Err(dirty(ty, at));
            }
            Ok(AbiValue::Uint(*bits, n))
        }
        AbiType::Int(bits) => {
            let n = BigInt::from_twos_complement_bytes(read_word(data, at)?);
            if !n.fits_signed(*bits) {
                return Err(dirty(ty, at));
            }
            Ok(AbiValue::Int(*bits, n))
        }
        AbiType::Bool => {
            let word = read_word(data, at)?;
            match (zeroed(&word[..31]), word[31]) {
                (true, 0) => Ok(AbiValue::Bool(false)),
                (true, 1) => Ok(AbiValue::Bool(true)),
                _ => Err(dirty(ty, at)),
            }
        }
        AbiType::Address => {
            let word = read_word(data, at)?;
            if !zeroed(&word[..12]) {
                return Err(dirty(ty, at));
            }
            Ok(AbiValue::Address(Address::from_slice(&word[12..])?))
        }
        AbiType::FixedBytes(size) => {
            let word = read_word(data, at)?;
            if !zeroed(&word[*size..]) {
                return Err(dirty(ty, at));
            }
            Ok(AbiValue::FixedBytes(word[..*size].to_vec()))
        }
        AbiType::Function => {
            let word = read_word(data, at)?;
            if !zeroed(&word[24..]) {
                return Err(dirty(ty, at));
            }
            let mut selector = [0u8; 4];
            selector.copy_from_slice(&word[20..24]);
            Ok(AbiValue::Function(FunctionRef::new(
                Address::from_slice(&word[..20])?,
                selector,
            )))
        }
        AbiType::Bytes => Ok(AbiValue::Bytes(read_length_prefixed(data, at)?.to_vec())),
        AbiType::String => {
            let raw = read_length_prefixed(data, at)?;
            let text = std::str::from_utf8(raw)
                .map_err(|e| AbiError::InvalidData(format!("string at {at}: {e}")))?;
            Ok(AbiValue::String(text.to_string()))
        }
        AbiType::Tuple(types) => Ok(AbiValue::Tuple(decode_sequence(types, data, at)?)),
        AbiType::FixedArray(element, length) => {
            ensure_room(element, *length, data, at)?;
            let types = std::iter::repeat_n(element.as_ref(), *length);
            Ok(AbiValue::FixedArray(decode_sequence(types, data, at)?))
        }
        AbiType::Array(element) => {
            let count = read_usize(data, at)?;
            let start = at + WORD;
            ensure_room(element, count, data, start)?;
            let types = std::iter::repeat_n(element.as_ref(), count);
            Ok(AbiValue::Array(decode_sequence(types, data, start)?))
        }
    }
}

fn read_word(data: &[u8], at: usize) -> Result<&[u8], AbiError> {
    read_exact(data, at, WORD)
}

fn read_exact(data: &[u8], at: usize, needed: usize) -> Result<&[u8], AbiError> {
    at.checked_add(needed)
        .and_then(|end| data.get(at..end))
        .ok_or(AbiError::DataTooShort {
            offset: at,
            needed,
            available: data.len().saturating_sub(at),
        })
}

fn read_usize(data: &[u8], at: usize) -> Result<usize, AbiError> {
    BigInt::from_be_bytes(read_word(data, at)?)
        .to_usize()
        .map_err(|_| AbiError::InvalidData(format!("length or offset at {at} is too large")))
}

/// A length word followed by that many bytes. Trailing padding is not
/// required to be present.
fn read_length_prefixed(data: &[u8], at: usize) -> Result<&[u8], AbiError> {
    let length = read_usize(data, at)?;
    read_exact(data, at + WORD, length)
}

/// Refuses element counts whose heads alone would run past the data, so a
/// hostile count cannot force a huge allocation.
fn ensure_room(element: &AbiType, count: usize, data: &[u8], at: usize) -> Result<(), AbiError> {
    let needed = element
        .head_size()?
        .checked_mul(count)
        .ok_or_else(|| AbiError::InvalidData(format!("element count {count} overflows")))?;
    read_exact(data, at, needed).map(|_| ())
}

fn usize_word(value: usize) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[WORD - 8..].copy_from_slice(&(value as u64).to_be_bytes());
    word
}

fn extend_padded(out: &mut Vec<u8>, bytes: &[u8]) {
    out.extend_from_slice(bytes);
    let rem = bytes.len() % WORD;
    if rem != 0 {
        out.extend(std::iter::repeat_n(0u8, WORD - rem));
    }
}

fn zeroed(bytes: &[u8]) -> bool {
    bytes.iter().all(|&b| b == 0)
}

fn dirty(ty: &AbiType, at: usize) -> AbiError {
    AbiError::InvalidData(format!("non-canonical {ty} word at {at}"))
}
