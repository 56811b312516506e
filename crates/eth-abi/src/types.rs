//! The ABI type grammar: one [`AbiType`] per type token.

use std::fmt;
use std::str::FromStr;

use crate::error::AbiError;

/// Size of one ABI word.
pub const WORD: usize = 32;

/// Deepest nesting of tuples and arrays a type token may have.
pub const MAX_DEPTH: usize = 128;

/// A parsed Solidity ABI type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AbiType {
    /// `uintN`, N in 8..=256 and a multiple of 8.
    Uint(usize),
    /// `intN`, N in 8..=256 and a multiple of 8.
    Int(usize),
    Bool,
    Address,
    /// `bytesN`, N in 1..=32.
    FixedBytes(usize),
    /// Dynamic `bytes`.
    Bytes,
    String,
    /// 20-byte address followed by a 4-byte selector.
    Function,
    Tuple(Vec<AbiType>),
    /// `T[N]`, N > 0.
    FixedArray(Box<AbiType>, usize),
    /// `T[]`.
    Array(Box<AbiType>),
}

impl AbiType {
    /// Parses a single type token such as `uint256[3][]` or `(bool,bytes)`.
    ///
    /// Brackets are peeled from the end, so the outermost container is the
    /// last bracket pair: `uint256[3][]` is a dynamic array of `uint256[3]`.
    pub fn parse(token: &str) -> Result<Self, AbiError> {
        Self::parse_nested(token, 0)
    }

    fn parse_nested(token: &str, depth: usize) -> Result<Self, AbiError> {
        if depth > MAX_DEPTH {
            return Err(AbiError::InvalidSignature(format!(
                "type nesting deeper than {MAX_DEPTH}"
            )));
        }

        if let Some(element) = token.strip_suffix("[]") {
            return Ok(AbiType::Array(Box::new(Self::parse_nested(element, depth + 1)?)));
        }

        if token.ends_with(']') {
            let open = token
                .rfind('[')
                .ok_or_else(|| AbiError::InvalidSignature(format!("unbalanced ']' in {token}")))?;
            let length = parse_decimal(&token[open + 1..token.len() - 1])
                .ok_or_else(|| AbiError::InvalidSignature(format!("bad array length in {token}")))?;
            if length == 0 {
                return Err(AbiError::ZeroLengthArray(token.to_string()));
            }
            let element = Self::parse_nested(&token[..open], depth + 1)?;
            return Ok(AbiType::FixedArray(Box::new(element), length));
        }

        if token.starts_with('(') {
            let children = split_tuple(token)?
                .into_iter()
                .map(|child| Self::parse_nested(child, depth + 1))
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(AbiType::Tuple(children));
        }

        parse_leaf(token)
    }

    /// True when the value is encoded out of line (behind an offset word).
    pub fn is_dynamic(&self) -> bool {
        match self {
            AbiType::Bytes | AbiType::String | AbiType::Array(_) => true,
            AbiType::FixedArray(element, _) => element.is_dynamic(),
            AbiType::Tuple(children) => children.iter().any(AbiType::is_dynamic),
            _ => false,
        }
    }

    /// Bytes this type occupies in the head: 32 for an offset slot, otherwise
    /// the full static encoding. Fails when a fixed array is too large for
    /// its size to be represented.
    pub fn head_size(&self) -> Result<usize, AbiError> {
        if self.is_dynamic() {
            return Ok(WORD);
        }
        let overflow = || AbiError::InvalidSignature(format!("static size of {self} overflows"));
        match self {
            AbiType::FixedArray(element, length) => element
                .head_size()?
                .checked_mul(*length)
                .ok_or_else(overflow),
            AbiType::Tuple(children) => children.iter().try_fold(0usize, |total, child| {
                total.checked_add(child.head_size()?).ok_or_else(overflow)
            }),
            _ => Ok(WORD),
        }
    }
}

impl FromStr for AbiType {
    type Err = AbiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Canonical form, as hashed for selectors (`uint` is written `uint256`).
impl fmt::Display for AbiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbiType::Uint(bits) => write!(f, "uint{bits}"),
            AbiType::Int(bits) => write!(f, "int{bits}"),
            AbiType::Bool => f.write_str("bool"),
            AbiType::Address => f.write_str("address"),
            AbiType::FixedBytes(size) => write!(f, "bytes{size}"),
            AbiType::Bytes => f.write_str("bytes"),
            AbiType::String => f.write_str("string"),
            AbiType::Function => f.write_str("function"),
            AbiType::Tuple(children) => {
                f.write_str("(")?;
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{child}")?;
                }
                f.write_str(")")
            }
            AbiType::FixedArray(element, length) => write!(f, "{element}[{length}]"),
            AbiType::Array(element) => write!(f, "{element}[]"),
        }
    }
}

/// Splits `(a,(b,c),d[])` into `["a", "(b,c)", "d[]"]`. Commas nested inside
/// a parenthesised group do not split the outer list.
pub fn split_tuple(token: &str) -> Result<Vec<&str>, AbiError> {
    let inner = token
        .strip_prefix('(')
        .and_then(|t| t.strip_suffix(')'))
        .ok_or_else(|| AbiError::InvalidSignature(format!("not a tuple: {token}")))?;
    if inner.is_empty() {
        return Ok(Vec::new());
    }

    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in inner.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth = depth.checked_sub(1).ok_or_else(|| {
                    AbiError::InvalidSignature(format!("mismatched ')' in {token}"))
                })?;
            }
            ',' if depth == 0 => {
                parts.push(&inner[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(AbiError::InvalidSignature(format!(
            "mismatched '(' in {token}"
        )));
    }
    parts.push(&inner[start..]);
    Ok(parts)
}

fn parse_leaf(token: &str) -> Result<AbiType, AbiError> {
    let unsupported = || AbiError::UnsupportedType(token.to_string());

    match token {
        "uint" => return Ok(AbiType::Uint(256)),
        "int" => return Ok(AbiType::Int(256)),
        "bool" => return Ok(AbiType::Bool),
        "address" => return Ok(AbiType::Address),
        "bytes" => return Ok(AbiType::Bytes),
        "string" => return Ok(AbiType::String),
        "function" => return Ok(AbiType::Function),
        _ => {}
    }

    if let Some(bits) = token.strip_prefix("uint") {
        let bits = parse_decimal(bits).filter(valid_int_width).ok_or_else(unsupported)?;
        return Ok(AbiType::Uint(bits));
    }
    if let Some(bits) = token.strip_prefix("int") {
        let bits = parse_decimal(bits).filter(valid_int_width).ok_or_else(unsupported)?;
        return Ok(AbiType::Int(bits));
    }
    if let Some(size) = token.strip_prefix("bytes") {
        let size = parse_decimal(size)
            .filter(|n| (1..=32).contains(n))
            .ok_or_else(unsupported)?;
        return Ok(AbiType::FixedBytes(size));
    }

    // fixed/ufixed have no agreed encoding and stay unsupported.
    Err(unsupported())
}

fn valid_int_width(bits: &usize) -> bool {
    (8..=256).contains(bits) && bits % 8 == 0
}

/// Parses a canonical decimal (no sign, no leading zero).
fn parse_decimal(digits: &str) -> Option<usize> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if digits.len() > 1 && digits.starts_with('0') {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_width_aliases() {
        assert_eq!(AbiType::parse("uint").unwrap(), AbiType::Uint(256));
        assert_eq!(AbiType::parse("int").unwrap(), AbiType::Int(256));
        assert_eq!(AbiType::parse("uint8").unwrap(), AbiType::Uint(8));
        assert_eq!(AbiType::parse("int24").unwrap(), AbiType::Int(24));
    }

    #[test]
    fn leaf_types() {
        assert_eq!(AbiType::parse("bytes").unwrap(), AbiType::Bytes);
        assert_eq!(AbiType::parse("bytes32").unwrap(), AbiType::FixedBytes(32));
        assert_eq!(AbiType::parse("address").unwrap(), AbiType::Address);
        assert_eq!(AbiType::parse("bool").unwrap(), AbiType::Bool);
        assert_eq!(AbiType::parse("string").unwrap(), AbiType::String);
        assert_eq!(AbiType::parse("function").unwrap(), AbiType::Function);
    }

    #[test]
    fn rejects_unknown_and_bad_widths() {
        for bad in [
            "uint7", "uint264", "uint0", "uint08", "int300", "bytes0", "bytes33", "fixed128x18",
            "ufixed", "address payable", "", "uint256x",
        ] {
            assert!(
                matches!(AbiType::parse(bad), Err(AbiError::UnsupportedType(_))),
                "accepted {bad:?}"
            );
        }
    }

    #[test]
    fn brackets_peel_from_the_right() {
        let ty = AbiType::parse("uint256[3][]").unwrap();
        assert_eq!(
            ty,
            AbiType::Array(Box::new(AbiType::FixedArray(
                Box::new(AbiType::Uint(256)),
                3
            )))
        );

        let ty = AbiType::parse("bool[][2]").unwrap();
        assert_eq!(
            ty,
            AbiType::FixedArray(Box::new(AbiType::Array(Box::new(AbiType::Bool))), 2)
        );
    }

    #[test]
    fn zero_length_fixed_array_is_rejected() {
        assert!(matches!(
            AbiType::parse("uint8[0]"),
            Err(AbiError::ZeroLengthArray(_))
        ));
    }

    #[test]
    fn nested_tuples() {
        let ty = AbiType::parse("(uint8,(bool,bytes)[],uint)").unwrap();
        assert_eq!(
            ty,
            AbiType::Tuple(vec![
                AbiType::Uint(8),
                AbiType::Array(Box::new(AbiType::Tuple(vec![AbiType::Bool, AbiType::Bytes]))),
                AbiType::Uint(256),
            ])
        );
        assert_eq!(ty.to_string(), "(uint8,(bool,bytes)[],uint256)");
    }

    #[test]
    fn split_respects_nesting() {
        assert_eq!(
            split_tuple("(uint256,(uint8,uint16)[],bytes)").unwrap(),
            vec!["uint256", "(uint8,uint16)[]", "bytes"]
        );
        assert!(split_tuple("()").unwrap().is_empty());
        assert!(split_tuple("(a))(").is_err());
    }

    #[test]
    fn dynamic_ness() {
        assert!(!AbiType::parse("uint256[3]").unwrap().is_dynamic());
        assert!(AbiType::parse("uint256[]").unwrap().is_dynamic());
        assert!(AbiType::parse("string[2]").unwrap().is_dynamic());
        assert!(!AbiType::parse("(uint8,bool)").unwrap().is_dynamic());
        assert!(AbiType::parse("(uint8,bytes)").unwrap().is_dynamic());
    }

    #[test]
    fn head_sizes() {
        assert_eq!(AbiType::parse("uint256[3]").unwrap().head_size(), Ok(96));
        assert_eq!(AbiType::parse("(uint8,bool[2])").unwrap().head_size(), Ok(96));
        assert_eq!(AbiType::parse("bytes").unwrap().head_size(), Ok(32));
    }

    #[test]
    fn oversized_static_types_report_overflow() {
        let huge = format!("uint256[{}]", usize::MAX / 2);
        let ty = AbiType::parse(&huge).unwrap();
        assert!(matches!(ty.head_size(), Err(AbiError::InvalidSignature(_))));

        // each member fits on its own, the sum does not
        let length = usize::MAX / 64;
        let ty = AbiType::parse(&format!("(uint256[{length}],uint256[{length}],uint256[{length}])"))
            .unwrap();
        assert!(AbiType::parse(&format!("uint256[{length}]")).unwrap().head_size().is_ok());
        assert!(matches!(ty.head_size(), Err(AbiError::InvalidSignature(_))));
    }

    #[test]
    fn nesting_is_bounded() {
        let shallow = format!("{}uint8{}", "(".repeat(100), ")".repeat(100));
        assert!(AbiType::parse(&shallow).is_ok());

        let deep = format!("{}uint8{}", "(".repeat(MAX_DEPTH + 1), ")".repeat(MAX_DEPTH + 1));
        assert!(matches!(
            AbiType::parse(&deep),
            Err(AbiError::InvalidSignature(_))
        ));

        let deep_arrays = format!("bool{}", "[]".repeat(10_000));
        assert!(matches!(
            AbiType::parse(&deep_arrays),
            Err(AbiError::InvalidSignature(_))
        ));
    }
}
