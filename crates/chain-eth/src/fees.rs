//! Fee configuration and EIP-1559 base fee prediction.

use eth_primitives::BigInt;
use serde::{Deserialize, Serialize};

use crate::rpc::Block;

pub const ELASTICITY_MULTIPLIER: u64 = 2;
pub const BASE_FEE_CHANGE_DENOMINATOR: u64 = 8;
/// 1 gwei, the base fee of the first London block.
pub const INITIAL_BASE_FEE: u64 = 1_000_000_000;

/// Percentages added on top of node estimates before they are written into
/// a transaction. Both default to zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeeBump {
    /// Applied to the gas limit estimate.
    pub gas_percent: u32,
    /// Applied to gas price, fee cap and tip.
    pub fee_percent: u32,
}

impl FeeBump {
    pub fn new(gas_percent: u32, fee_percent: u32) -> Self {
        Self {
            gas_percent,
            fee_percent,
        }
    }

    pub fn bump_gas(&self, gas: u64) -> u64 {
        let bumped = u128::from(gas) * (100 + u128::from(self.gas_percent)) / 100;
        u64::try_from(bumped).unwrap_or(u64::MAX)
    }

    pub fn bump_fee(&self, fee: &BigInt) -> BigInt {
        bump(fee, self.fee_percent)
    }
}

/// `value * (100 + percent) / 100`, rounded down.
pub fn bump(value: &BigInt, percent: u32) -> BigInt {
    value * &BigInt::from(100 + u64::from(percent)) / BigInt::from(100u64)
}

/// Where the London fork activates on a given chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Eip1559Config {
    pub activation_block: u64,
}

impl Eip1559Config {
    pub fn mainnet() -> Self {
        Self {
            activation_block: 12_965_000,
        }
    }

    pub fn sepolia() -> Self {
        Self {
            activation_block: 0,
        }
    }
}

/// Predicts the base fee of the block after `previous`.
///
/// Blocks at or before activation, or without a base fee, yield
/// [`INITIAL_BASE_FEE`]. Otherwise the fee moves by at most 1/8 toward the
/// gas target (half the gas limit); an increase is at least 1 wei and a
/// decrease never goes below zero.
pub fn next_block_base_fee(previous: &Block, config: &Eip1559Config) -> BigInt {
    let initial = BigInt::from(INITIAL_BASE_FEE);
    if previous.number <= BigInt::from(config.activation_block) {
        return initial;
    }
    let Some(base_fee) = &previous.base_fee_per_gas else {
        return initial;
    };

    let target = &previous.gas_limit / &BigInt::from(ELASTICITY_MULTIPLIER);
    if target.is_zero() {
        return base_fee.clone();
    }
    let denominator = BigInt::from(BASE_FEE_CHANGE_DENOMINATOR);
    let used = &previous.gas_used;

    if *used == target {
        base_fee.clone()
    } else if *used > target {
        let delta = (used - &target) * base_fee.clone() / target / denominator;
        base_fee + &delta.max(BigInt::one())
    } else {
        let delta = (&target - used) * base_fee.clone() / target / denominator;
        (base_fee - &delta).max(BigInt::zero())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(number: u64, gas_limit: u64, gas_used: u64, base_fee: Option<u64>) -> Block {
        Block {
            number: BigInt::from(number),
            gas_limit: BigInt::from(gas_limit),
            gas_used: BigInt::from(gas_used),
            base_fee_per_gas: base_fee.map(BigInt::from),
            ..Default::default()
        }
    }

    #[test]
    fn bump_rounds_down() {
        assert_eq!(bump(&BigInt::from(21_001u64), 10), 23_101u64);
        assert_eq!(bump(&BigInt::from(7u64), 0), 7u64);
        assert_eq!(bump(&BigInt::from(3u64), 50), 4u64);
        assert_eq!(FeeBump::new(10, 0).bump_gas(21_001), 23_101);
        assert_eq!(FeeBump::new(u32::MAX, 0).bump_gas(u64::MAX), u64::MAX);
    }

    #[test]
    fn fee_bump_deserializes_with_defaults() {
        let bump: FeeBump = serde_json::from_str(r#"{"fee_percent": 12}"#).unwrap();
        assert_eq!(bump, FeeBump::new(0, 12));
        assert_eq!(FeeBump::default(), FeeBump::new(0, 0));
    }

    #[test]
    fn before_activation_uses_initial_fee() {
        let b = block(12_965_000, 30_000_000, 30_000_000, Some(50));
        assert_eq!(
            next_block_base_fee(&b, &Eip1559Config::mainnet()),
            INITIAL_BASE_FEE
        );
        let legacy = block(20_000_000, 30_000_000, 0, None);
        assert_eq!(
            next_block_base_fee(&legacy, &Eip1559Config::mainnet()),
            INITIAL_BASE_FEE
        );
    }

    #[test]
    fn on_target_keeps_fee() {
        let b = block(100, 30_000_000, 15_000_000, Some(1_000_000_000));
        assert_eq!(
            next_block_base_fee(&b, &Eip1559Config::sepolia()),
            1_000_000_000u64
        );
    }

    #[test]
    fn full_block_raises_by_an_eighth() {
        let b = block(100, 30_000_000, 30_000_000, Some(1_000_000_000));
        assert_eq!(
            next_block_base_fee(&b, &Eip1559Config::sepolia()),
            1_125_000_000u64
        );
    }

    #[test]
    fn empty_block_lowers_by_an_eighth() {
        let b = block(100, 30_000_000, 0, Some(1_000_000_000));
        assert_eq!(
            next_block_base_fee(&b, &Eip1559Config::sepolia()),
            875_000_000u64
        );
    }

    #[test]
    fn increase_is_at_least_one_wei() {
        let b = block(100, 30_000_000, 15_000_001, Some(7));
        assert_eq!(next_block_base_fee(&b, &Eip1559Config::sepolia()), 8u64);
    }
}
