//! Governance configuration singleton.
//!
//! Holds the tunable bounds the program enforces on proposals and voting.
//! The gateway only reads it. Reserved padding is kept so the layout stays
//! 390 bytes after the discriminator, but it is not exposed in JSON.

use borsh::{BorshDeserialize, BorshSerialize};
use chain_sol::Pubkey;
use serde::Serialize;

use crate::accounts::ProgramAccount;

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GovernanceConfig {
    pub authority: Pubkey,
    pub staking_pool: Pubkey,
    pub staking_contract: Pubkey,
    pub parameter_bounds: ParameterBounds,
    pub time_multipliers: TimeMultipliers,
    pub proposal_settings: ProposalSettings,
    pub execution_settings: ExecutionSettings,
    pub emergency_settings: EmergencySettings,
    pub version: u8,
    pub created_at: i64,
    pub last_updated: i64,
    pub bump: u8,
}

impl ProgramAccount for GovernanceConfig {
    const NAME: &'static str = "GovernanceConfig";
}

/// Percentages are basis points (1000 = 10%).
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterBounds {
    pub min_quorum_percentage: u16,
    pub max_quorum_percentage: u16,
    pub min_proposal_stake_base: u64,
    pub max_proposal_stake_base: u64,
    pub min_voting_period_hours: u32,
    pub max_voting_period_hours: u32,
    pub min_execution_delay_hours: u32,
    pub max_execution_delay_hours: u32,
    pub min_stake_duration_days: u32,
    pub max_treasury_withdrawal_percentage: u16,
    pub spam_prevention_cooldown_hours: u32,
    #[serde(skip)]
    pub reserved: [u8; 74],
}

impl Default for ParameterBounds {
    fn default() -> Self {
        Self {
            min_quorum_percentage: 1000,
            max_quorum_percentage: 7000,
            min_proposal_stake_base: 1_000_000_000,
            max_proposal_stake_base: 100_000_000_000,
            min_voting_period_hours: 24,
            max_voting_period_hours: 168,
            min_execution_delay_hours: 6,
            max_execution_delay_hours: 72,
            min_stake_duration_days: 1,
            max_treasury_withdrawal_percentage: 1000,
            spam_prevention_cooldown_hours: 24,
            reserved: [0; 74],
        }
    }
}

/// Multipliers are percentages (150 = 1.5x).
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeMultipliers {
    pub tier_1_days: u32,
    pub tier_1_multiplier: u16,
    pub tier_2_days: u32,
    pub tier_2_multiplier: u16,
    pub tier_3_multiplier: u16,
    #[serde(skip)]
    pub reserved: u16,
}

impl Default for TimeMultipliers {
    fn default() -> Self {
        Self {
            tier_1_days: 30,
            tier_1_multiplier: 120,
            tier_2_days: 90,
            tier_2_multiplier: 150,
            tier_3_multiplier: 200,
            reserved: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalSettings {
    pub base_proposal_stake: u64,
    pub stake_escalation_factor: u16,
    pub max_escalation_multiplier: u16,
    pub default_quorum_percentage: u16,
    pub default_voting_period_hours: u32,
    pub proposal_fee_percentage: u16,
    pub refund_threshold_percentage: u16,
    pub max_concurrent_proposals: u8,
    #[serde(skip)]
    pub reserved: [u8; 41],
}

impl Default for ProposalSettings {
    fn default() -> Self {
        Self {
            base_proposal_stake: 5_000_000_000,
            stake_escalation_factor: 150,
            max_escalation_multiplier: 500,
            default_quorum_percentage: 2000,
            default_voting_period_hours: 72,
            proposal_fee_percentage: 100,
            refund_threshold_percentage: 3000,
            max_concurrent_proposals: 3,
            reserved: [0; 41],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionSettings {
    pub treasury_threshold_for_multisig: u64,
    pub multisig_required_approvals: u8,
    pub auto_execution_enabled: bool,
    pub execution_grace_period_hours: u32,
    #[serde(skip)]
    pub reserved: [u8; 18],
}

impl Default for ExecutionSettings {
    fn default() -> Self {
        Self {
            treasury_threshold_for_multisig: 100_000_000_000,
            multisig_required_approvals: 3,
            auto_execution_enabled: true,
            execution_grace_period_hours: 48,
            reserved: [0; 18],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmergencySettings {
    pub emergency_multisig: Pubkey,
    pub emergency_override_enabled: bool,
    pub emergency_quorum_reduction: u16,
    pub emergency_voting_period_hours: u32,
    pub emergency_cooldown_hours: u32,
    #[serde(skip)]
    pub reserved: [u8; 1],
}

impl Default for EmergencySettings {
    fn default() -> Self {
        Self {
            emergency_multisig: Pubkey::default(),
            emergency_override_enabled: false,
            emergency_quorum_reduction: 2000,
            emergency_voting_period_hours: 12,
            emergency_cooldown_hours: 168,
            reserved: [0; 1],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> GovernanceConfig {
        GovernanceConfig {
            authority: Pubkey([1u8; 32]),
            staking_pool: Pubkey([2u8; 32]),
            staking_contract: Pubkey([3u8; 32]),
            parameter_bounds: ParameterBounds::default(),
            time_multipliers: TimeMultipliers::default(),
            proposal_settings: ProposalSettings::default(),
            execution_settings: ExecutionSettings::default(),
            emergency_settings: EmergencySettings::default(),
            version: 1,
            created_at: 1_700_000_000,
            last_updated: 1_700_000_000,
            bump: 254,
        }
    }

    #[test]
    fn encoded_size_matches_program_layout() {
        let data = sample().encode().unwrap();
        assert_eq!(data.len(), 8 + 390);
    }

    #[test]
    fn sub_struct_sizes() {
        assert_eq!(borsh::to_vec(&ParameterBounds::default()).unwrap().len(), 120);
        assert_eq!(borsh::to_vec(&TimeMultipliers::default()).unwrap().len(), 16);
        assert_eq!(borsh::to_vec(&ProposalSettings::default()).unwrap().len(), 64);
        assert_eq!(borsh::to_vec(&ExecutionSettings::default()).unwrap().len(), 32);
        assert_eq!(borsh::to_vec(&EmergencySettings::default()).unwrap().len(), 44);
    }

    #[test]
    fn decode_recovers_fields() {
        let config = sample();
        let decoded = GovernanceConfig::decode(&config.encode().unwrap()).unwrap();
        assert_eq!(decoded.time_multipliers.tier_2_days, 90);
        assert_eq!(decoded.bump, 254);
        assert_eq!(decoded, config);
    }

    #[test]
    fn json_omits_reserved_padding() {
        let json = serde_json::to_value(sample()).unwrap();
        assert!(json["parameterBounds"].get("reserved").is_none());
        assert_eq!(json["proposalSettings"]["maxConcurrentProposals"], 3);
    }
}
