//! Function signatures such as `transfer(address,uint256)`.

use std::fmt;
use std::str::FromStr;

use eth_primitives::keccak256;

use crate::error::AbiError;
use crate::types::{split_tuple, AbiType};

/// A parsed signature: an optional function name and its argument types.
///
/// An empty name is allowed, so `(uint256,bool)` describes a bare tuple.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FunctionSignature {
    pub name: String,
    pub inputs: Vec<AbiType>,
}

impl FunctionSignature {
    pub fn parse(signature: &str) -> Result<Self, AbiError> {
        let open = validate_signature(signature)?;
        let inputs = split_tuple(&signature[open..])?
            .into_iter()
            .map(AbiType::parse)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            name: signature[..open].to_string(),
            inputs,
        })
    }

    /// The form that gets hashed: default-width aliases expanded, no spaces.
    pub fn canonical(&self) -> String {
        self.to_string()
    }

    /// First four bytes of `keccak256(canonical())`.
    pub fn selector(&self) -> [u8; 4] {
        let hash = keccak256(self.canonical());
        let mut selector = [0u8; 4];
        selector.copy_from_slice(&hash.as_bytes()[..4]);
        selector
    }
}

impl FromStr for FunctionSignature {
    type Err = AbiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for FunctionSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        write!(f, "{}", AbiType::Tuple(self.inputs.clone()))
    }
}

/// Checks the shape of a signature and returns the index of its first `(`.
///
/// Rejected: whitespace, a missing `(`, unbalanced or crossed brackets, and
/// anything after the parenthesis that closes the argument list.
pub fn validate_signature(signature: &str) -> Result<usize, AbiError> {
    let invalid = |reason: &str| AbiError::InvalidSignature(format!("{signature}: {reason}"));

    if signature.chars().any(char::is_whitespace) {
        return Err(invalid("contains whitespace"));
    }
    let open = signature.find('(').ok_or_else(|| invalid("missing '('"))?;

    let name = &signature[..open];
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
    {
        return Err(invalid("bad function name"));
    }

    let mut stack = Vec::new();
    for (i, c) in signature[open..].char_indices() {
        match c {
            '(' | '[' => stack.push(c),
            ')' | ']' => {
                let expected = if c == ')' { '(' } else { '[' };
                if stack.pop() != Some(expected) {
                    return Err(invalid("unbalanced brackets"));
                }
                if stack.is_empty() && open + i + 1 != signature.len() {
                    return Err(invalid("trailing characters after argument list"));
                }
            }
            _ => {}
        }
    }
    if !stack.is_empty() {
        return Err(invalid("unbalanced brackets"));
    }

    Ok(open)
}
