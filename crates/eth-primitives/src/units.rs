//! Ether denominations and decimal <-> wei conversion.

use std::fmt;
use std::str::FromStr;

use crate::bigint::BigInt;
use crate::error::PrimitiveError;

/// An ether denomination, named by its power-of-ten factor relative to wei.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Unit {
    Wei,
    Kwei,
    Mwei,
    Gwei,
    Szabo,
    Finney,
    Ether,
    Kether,
    Mether,
    Gether,
    Tether,
}

impl Unit {
    /// Number of decimal places between this unit and wei.
    pub fn decimals(self) -> u32 {
        match self {
            Unit::Wei => 0,
            Unit::Kwei => 3,
            Unit::Mwei => 6,
            Unit::Gwei => 9,
            Unit::Szabo => 12,
            Unit::Finney => 15,
            Unit::Ether => 18,
            Unit::Kether => 21,
            Unit::Mether => 24,
            Unit::Gether => 27,
            Unit::Tether => 30,
        }
    }

    pub fn from_decimals(decimals: u32) -> Option<Unit> {
        Some(match decimals {
            0 => Unit::Wei,
            3 => Unit::Kwei,
            6 => Unit::Mwei,
            9 => Unit::Gwei,
            12 => Unit::Szabo,
            15 => Unit::Finney,
            18 => Unit::Ether,
            21 => Unit::Kether,
            24 => Unit::Mether,
            27 => Unit::Gether,
            30 => Unit::Tether,
            _ => return None,
        })
    }

    /// `10^decimals`.
    pub fn factor(self) -> BigInt {
        BigInt::from(10u64).pow(self.decimals())
    }
}

impl FromStr for Unit {
    type Err = PrimitiveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "wei" => Unit::Wei,
            "kwei" | "babbage" | "femtoether" => Unit::Kwei,
            "mwei" | "lovelace" | "picoether" => Unit::Mwei,
            "gwei" | "shannon" | "nanoether" | "nano" => Unit::Gwei,
            "szabo" | "microether" | "micro" => Unit::Szabo,
            "finney" | "milliether" | "milli" => Unit::Finney,
            "ether" | "eth" => Unit::Ether,
            "kether" | "grand" => Unit::Kether,
            "mether" => Unit::Mether,
            "gether" => Unit::Gether,
            "tether" => Unit::Tether,
            other => return Err(PrimitiveError::UnknownUnit(other.to_string())),
        })
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Unit::Wei => "wei",
            Unit::Kwei => "kwei",
            Unit::Mwei => "mwei",
            Unit::Gwei => "gwei",
            Unit::Szabo => "szabo",
            Unit::Finney => "finney",
            Unit::Ether => "ether",
            Unit::Kether => "kether",
            Unit::Mether => "mether",
            Unit::Gether => "gether",
            Unit::Tether => "tether",
        };
        f.write_str(name)
    }
}

/// Converts a decimal amount such as `"1.5"` in `unit` to wei.
///
/// More fractional digits than the unit can represent is an error; nothing
/// is rounded away.
pub fn parse_units(amount: &str, unit: Unit) -> Result<BigInt, PrimitiveError> {
    let decimals = unit.decimals() as usize;
    let (negative, body) = match amount.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, amount),
    };
    let (integral, fraction) = match body.split_once('.') {
        Some((i, f)) => (i, f),
        None => (body, ""),
    };

    if integral.is_empty() && fraction.is_empty() {
        return Err(PrimitiveError::InvalidNumber(format!("'{amount}' is empty")));
    }
    if !integral.chars().all(|c| c.is_ascii_digit())
        || !fraction.chars().all(|c| c.is_ascii_digit())
    {
        return Err(PrimitiveError::InvalidNumber(format!(
            "'{amount}' is not a decimal amount"
        )));
    }
    if fraction.len() > decimals {
        return Err(PrimitiveError::InvalidNumber(format!(
            "'{amount}' has more than {decimals} decimals for {unit}"
        )));
    }

    let mut digits = String::with_capacity(integral.len() + decimals);
    digits.push_str(if integral.is_empty() { "0" } else { integral });
    digits.push_str(fraction);
    digits.extend(std::iter::repeat('0').take(decimals - fraction.len()));

    let wei = BigInt::from_dec_str(&digits)?;
    Ok(if negative { -wei } else { wei })
}

/// Formats a wei amount in `unit`, keeping at most `max_decimals` fractional
/// digits (truncated) and dropping trailing zeros.
pub fn format_units(wei: &BigInt, max_decimals: usize, unit: Unit) -> String {
    let decimals = unit.decimals() as usize;
    let digits = wei.abs().to_string();
    let sign = if wei.is_negative() { "-" } else { "" };

    let (integral, fraction) = if digits.len() <= decimals {
        ("0".to_string(), format!("{digits:0>decimals$}"))
    } else {
        let split = digits.len() - decimals;
        (digits[..split].to_string(), digits[split..].to_string())
    };

    let kept = &fraction[..fraction.len().min(max_decimals)];
    let kept = kept.trim_end_matches('0');
    if kept.is_empty() {
        format!("{sign}{integral}")
    } else {
        format!("{sign}{integral}.{kept}")
    }
}
