//! Hex string helpers shared by every primitive parser.
//!
//! Input accepts an optional `0x`/`0X` prefix. Output always carries `0x`.

use crate::error::PrimitiveError;

/// Strips an optional `0x` or `0X` prefix.
pub fn strip_0x(input: &str) -> &str {
    input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
        .unwrap_or(input)
}

/// Decodes a hex blob, rejecting odd lengths and non-hex characters.
pub fn decode_hex(input: &str) -> Result<Vec<u8>, PrimitiveError> {
    let digits = strip_0x(input);
    if digits.len() % 2 != 0 {
        return Err(PrimitiveError::OddLengthHex(digits.len()));
    }
    hex::decode(digits).map_err(|e| PrimitiveError::InvalidHex(format!("{input}: {e}")))
}

/// Decodes a hex blob that must be exactly `N` bytes long.
pub fn decode_hex_fixed<const N: usize>(input: &str) -> Result<[u8; N], PrimitiveError> {
    let bytes = decode_hex(input)?;
    let mut out = [0u8; N];
    if bytes.len() != N {
        return Err(PrimitiveError::InvalidLength {
            expected: N,
            actual: bytes.len(),
        });
    }
    out.copy_from_slice(&bytes);
    Ok(out)
}

/// Encodes bytes as a `0x`-prefixed lowercase hex string.
pub fn encode_hex(bytes: impl AsRef<[u8]>) -> String {
    format!("0x{}", hex::encode(bytes))
}
