//! Voting-power preview.
//!
//! Mirrors the program's formula so clients can show an estimate before
//! staking. The authoritative value is the one the program caches in the
//! governance account.

use serde::Serialize;

/// Tokens above this count only add their square root.
pub const LINEAR_CAP_TOKENS: u64 = 100_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VotingPowerPreview {
    pub tokens: u64,
    pub lock_days: u64,
    pub base_power: u64,
    /// Percentage, 100 = 1x.
    pub time_multiplier: u64,
    pub voting_power: u64,
}

/// Multiplier percentage for a lock duration in days.
pub fn time_multiplier(lock_days: u64) -> u64 {
    match lock_days {
        0..=30 => 100,
        31..=90 => 120,
        91..=365 => 150,
        _ => 200,
    }
}

/// Preview voting power for `amount` base units locked for `lock_days`.
pub fn preview(amount: u64, decimals: u8, lock_days: u64) -> VotingPowerPreview {
    let tokens = amount / 10u64.pow(decimals as u32);
    let base_power = if tokens <= LINEAR_CAP_TOKENS {
        tokens
    } else {
        LINEAR_CAP_TOKENS + (tokens - LINEAR_CAP_TOKENS).isqrt()
    };
    let time_multiplier = time_multiplier(lock_days);
    VotingPowerPreview {
        tokens,
        lock_days,
        base_power,
        time_multiplier,
        voting_power: base_power * time_multiplier / 100,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_below_cap() {
        let p = preview(5_000 * 1_000_000, 6, 0);
        assert_eq!(p.base_power, 5_000);
        assert_eq!(p.voting_power, 5_000);
    }

    #[test]
    fn square_root_above_cap() {
        // 100_000 + sqrt(10_000)
        let p = preview(110_000 * 1_000_000, 6, 10);
        assert_eq!(p.base_power, 100_100);
        // sqrt rounds down
        assert_eq!(preview(100_010 * 1_000_000, 6, 0).base_power, 100_003);
    }

    #[test]
    fn multiplier_tiers() {
        assert_eq!(time_multiplier(0), 100);
        assert_eq!(time_multiplier(30), 100);
        assert_eq!(time_multiplier(31), 120);
        assert_eq!(time_multiplier(90), 120);
        assert_eq!(time_multiplier(365), 150);
        assert_eq!(time_multiplier(366), 200);
    }

    #[test]
    fn power_is_floored() {
        // 7 * 120 / 100 = 8.4
        assert_eq!(preview(7_000_000, 6, 60).voting_power, 8);
        // fractional tokens are dropped
        assert_eq!(preview(1_999_999, 6, 400).voting_power, 2);
    }
}
