use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::PrimitiveError;
use crate::hash::keccak256;
use crate::hexutil::{encode_hex, strip_0x};

/// A 20-byte Ethereum account address.
///
/// `Display` prints the EIP-55 checksummed form; [`Address::to_hex`] prints
/// lowercase.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Address(pub [u8; 20]);

impl Address {
    pub const ZERO: Address = Address([0u8; 20]);

    /// Parses a hex address (optional `0x`).
    ///
    /// All-lowercase and all-uppercase inputs carry no checksum and are
    /// accepted as is. Mixed case must match EIP-55 exactly.
    pub fn from_hex(input: &str) -> Result<Self, PrimitiveError> {
        let hex_part = strip_0x(input);

        if hex_part.len() != 40 {
            return Err(PrimitiveError::InvalidLength {
                expected: 20,
                actual: hex_part.len() / 2,
            });
        }

        if !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(PrimitiveError::InvalidHex(format!(
                "address contains non-hex characters: {input}"
            )));
        }

        let mut bytes = [0u8; 20];
        hex::decode_to_slice(hex_part, &mut bytes)
            .map_err(|e| PrimitiveError::InvalidHex(e.to_string()))?;
        let address = Self(bytes);

        let is_all_lower = hex_part.chars().all(|c| !c.is_ascii_uppercase());
        let is_all_upper = hex_part.chars().all(|c| !c.is_ascii_lowercase());
        if is_all_lower || is_all_upper {
            return Ok(address);
        }

        let expected = address.checksummed();
        if &expected[2..] != hex_part {
            return Err(PrimitiveError::BadChecksum {
                given: input.to_string(),
                expected,
            });
        }
        Ok(address)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, PrimitiveError> {
        let arr: [u8; 20] = bytes.try_into().map_err(|_| PrimitiveError::InvalidLength {
            expected: 20,
            actual: bytes.len(),
        })?;
        Ok(Self(arr))
    }

    /// Address owning an uncompressed public key (64 bytes, no `0x04`
    /// prefix): the low 20 bytes of its Keccak-256.
    pub fn from_public_key_bytes(xy: &[u8; 64]) -> Self {
        let hash = keccak256(xy);
        let mut out = [0u8; 20];
        out.copy_from_slice(&hash.0[12..]);
        Self(out)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }

    /// Lowercase `0x`-prefixed hex.
    pub fn to_hex(&self) -> String {
        encode_hex(self.0)
    }

    /// EIP-55 mixed-case checksum encoding.
    pub fn checksummed(&self) -> String {
        let hex_part = hex::encode(self.0);
        // EIP-55: hash the lowercase hex address (without 0x).
        let hash = keccak256(hex_part.as_bytes());

        let mut checksummed = String::with_capacity(42);
        checksummed.push_str("0x");

        for (i, c) in hex_part.chars().enumerate() {
            if c.is_ascii_digit() {
                checksummed.push(c);
                continue;
            }
            let byte = hash.0[i / 2];
            let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0f };
            if nibble >= 8 {
                checksummed.push(c.to_ascii_uppercase());
            } else {
                checksummed.push(c);
            }
        }

        checksummed
    }
}

/// Checks that `address` is well formed and, when mixed case, carries a
/// valid EIP-55 checksum.
pub fn validate_address(address: &str) -> bool {
    Address::from_hex(address).is_ok()
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

impl FromStr for Address {
    type Err = PrimitiveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.checksummed())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.checksummed())
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.checksummed())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Address::from_hex(&text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eip55_checksum_known_addresses() {
        // Test vectors from EIP-55.
        let cases = [
            "0x52908400098527886E0F7030069857D2E4169EE7",
            "0x8617E340B3D01FA5F11F306F4090FD50E238070D",
            "0xde709f2102306220921060314715629080e2fb77",
            "0x27b1fdb04752bbc536007a920d24acb045561c26",
            "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed",
            "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359",
            "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB",
            "0xD1220A0cf47c7B9Be7A2E6BA89F429762e7b9aDb",
        ];

        for expected in &cases {
            let address = Address::from_hex(expected).unwrap();
            assert_eq!(&address.checksummed(), expected, "checksum mismatch");
        }
    }

    #[test]
    fn lowercase_and_checksummed_forms_are_equal() {
        let upper = Address::from_hex("0x52908400098527886E0F7030069857D2E4169EE7").unwrap();
        let lower = Address::from_hex("0x52908400098527886e0f7030069857d2e4169ee7").unwrap();
        assert_eq!(upper, lower);
    }

    #[test]
    fn any_single_flipped_case_is_rejected() {
        let good = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";
        for (i, c) in good.char_indices().skip(2) {
            if !c.is_ascii_alphabetic() {
                continue;
            }
            let flipped: String = good
                .char_indices()
                .map(|(j, ch)| {
                    if j != i {
                        ch
                    } else if ch.is_ascii_uppercase() {
                        ch.to_ascii_lowercase()
                    } else {
                        ch.to_ascii_uppercase()
                    }
                })
                .collect();
            assert!(
                matches!(
                    Address::from_hex(&flipped),
                    Err(PrimitiveError::BadChecksum { .. })
                ),
                "flipped case at {i} accepted: {flipped}"
            );
        }
    }

    #[test]
    fn flipped_case_in_all_caps_vector_is_rejected() {
        let flipped = "0x52908400098527886e0F7030069857D2E4169EE7";
        assert!(!validate_address(flipped));
    }

    #[test]
    fn validate_without_prefix_and_with_bad_input() {
        assert!(validate_address("5aaeb6053f3e94c9b9a09f33669435e7ef1beaed"));
        assert!(!validate_address("0x5aAeb6053F"));
        assert!(!validate_address("0xGGGGb6053F3E94C9b9A09f33669435E7Ef1BeAed"));
    }

    #[test]
    fn display_is_checksummed_and_to_hex_is_lowercase() {
        let address = Address::from_hex("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed").unwrap();
        assert_eq!(
            address.to_string(),
            "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed"
        );
        assert_eq!(
            address.to_hex(),
            "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed"
        );
    }

    #[test]
    fn zero_address() {
        assert!(Address::ZERO.is_zero());
        assert_eq!(
            Address::ZERO.to_hex(),
            "0x0000000000000000000000000000000000000000"
        );
    }

    #[test]
    fn from_slice_checks_length() {
        assert!(Address::from_slice(&[0u8; 19]).is_err());
        assert!(Address::from_slice(&[0u8; 20]).is_ok());
    }
}
