//! On-chain account layouts.
//!
//! Every program-owned account is an 8-byte Anchor discriminator followed by
//! the borsh encoding of its struct. Accounts may be allocated larger than
//! their current layout, so trailing bytes are ignored on decode.

use borsh::{BorshDeserialize, BorshSerialize};
use chain_sol::{Pubkey, TokenAccount};
use serde::{Deserialize, Serialize};

use crate::discriminator::account_discriminator;
use crate::error::ProgramError;

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// A program-owned account with an Anchor discriminator.
pub trait ProgramAccount: BorshSerialize + BorshDeserialize + Sized {
    /// Struct name as declared in the program, used for the discriminator.
    const NAME: &'static str;

    fn discriminator() -> [u8; 8] {
        account_discriminator(Self::NAME)
    }

    /// Decode from raw account data.
    fn decode(data: &[u8]) -> Result<Self, ProgramError> {
        if data.len() < 8 {
            return Err(ProgramError::DecodeError(format!(
                "{}: account data is {} bytes",
                Self::NAME,
                data.len()
            )));
        }
        if data[..8] != Self::discriminator() {
            return Err(ProgramError::DecodeError(format!(
                "{}: discriminator mismatch",
                Self::NAME
            )));
        }

        let mut body = &data[8..];
        <Self as BorshDeserialize>::deserialize(&mut body)
            .map_err(|e| ProgramError::DecodeError(format!("{}: {e}", Self::NAME)))
    }

    /// Encode with the discriminator prepended.
    fn encode(&self) -> Result<Vec<u8>, ProgramError> {
        let mut out = Self::discriminator().to_vec();
        borsh::to_writer(&mut out, self)
            .map_err(|e| ProgramError::Internal(format!("{}: {e}", Self::NAME)))?;
        Ok(out)
    }
}

/// Decode a possibly absent account; absence is `AccountNotFound`.
pub fn decode_optional<T: ProgramAccount>(
    data: Option<&[u8]>,
    address: &Pubkey,
) -> Result<T, ProgramError> {
    match data {
        Some(bytes) => T::decode(bytes),
        None => Err(ProgramError::AccountNotFound(format!(
            "{} at {address}",
            T::NAME
        ))),
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProposalType {
    Text,
    TreasuryTransfer,
    ParameterUpdate,
}

impl ProposalType {
    pub const ALL: [ProposalType; 3] = [
        ProposalType::Text,
        ProposalType::TreasuryTransfer,
        ProposalType::ParameterUpdate,
    ];

    /// Map the wire discriminant: 0 Text, 1 TreasuryTransfer, 2 ParameterUpdate.
    pub fn from_discriminant(value: i64) -> Result<Self, ProgramError> {
        match value {
            0 => Ok(ProposalType::Text),
            1 => Ok(ProposalType::TreasuryTransfer),
            2 => Ok(ProposalType::ParameterUpdate),
            other => Err(ProgramError::InvalidProposalType(other)),
        }
    }

    pub fn discriminant(self) -> u8 {
        match self {
            ProposalType::Text => 0,
            ProposalType::TreasuryTransfer => 1,
            ProposalType::ParameterUpdate => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ProposalType::Text => "text",
            ProposalType::TreasuryTransfer => "treasuryTransfer",
            ProposalType::ParameterUpdate => "parameterUpdate",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProposalStatus {
    Active,
    Passed,
    Failed,
    Executed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VoteChoice {
    Yes,
    No,
    Abstain,
}

impl std::str::FromStr for VoteChoice {
    type Err = ProgramError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yes" => Ok(VoteChoice::Yes),
            "no" => Ok(VoteChoice::No),
            "abstain" => Ok(VoteChoice::Abstain),
            other => Err(ProgramError::InvalidInput(format!(
                "vote choice must be yes, no or abstain, got {other:?}"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Staking
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StakingPool {
    pub authority: Pubkey,
    pub authority_bump: u8,
    pub initializer: Pubkey,
    pub total_staked_amount: u64,
    pub mint_address: Pubkey,
    pub escrow_account: Pubkey,
    pub bump: u8,
    pub created_at: i64,
    pub is_active: bool,
    pub token_price_usd_micro: u64,
    pub price_last_updated: i64,
}

impl ProgramAccount for StakingPool {
    const NAME: &'static str = "StakingPool";
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStakingAccount {
    pub staker: Pubkey,
    pub staked_amount: u64,
    /// First stake.
    pub timestamp: i64,
    pub last_updated: i64,
    pub bump: u8,
}

impl ProgramAccount for UserStakingAccount {
    const NAME: &'static str = "UserStakingAccount";
}

// ---------------------------------------------------------------------------
// Governance
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GovernanceAccount {
    pub staker: Pubkey,
    pub participation_count: u32,
    pub last_vote_timestamp: i64,
    pub stake_lock_end: i64,
    pub voting_power_cache: u64,
    pub created_at: i64,
    pub bump: u8,
}

impl GovernanceAccount {
    pub fn is_currently_locked(&self, now: i64) -> bool {
        self.stake_lock_end > now
    }
}

impl ProgramAccount for GovernanceAccount {
    const NAME: &'static str = "GovernanceAccount";
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalAccount {
    pub proposal_id: u64,
    pub proposer: Pubkey,
    pub title: String,
    pub description: String,
    pub proposal_type: ProposalType,
    pub execution_data: Vec<u8>,
    pub status: ProposalStatus,
    pub voting_period_days: u8,
    pub created_at: i64,
    pub voting_ends_at: i64,
    pub finalized_at: i64,
    pub executed_at: i64,
    pub timelock_end: i64,
    pub yes_votes: u64,
    pub no_votes: u64,
    pub abstain_votes: u64,
    pub total_voters: u32,
    pub deposit_amount: u64,
    pub deposit_refunded: bool,
    pub bump: u8,
}

impl ProgramAccount for ProposalAccount {
    const NAME: &'static str = "ProposalAccount";
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRecord {
    pub voter: Pubkey,
    pub proposal_id: u64,
    pub vote_choice: VoteChoice,
    pub voting_power: u64,
    pub voted_at: i64,
    pub bump: u8,
}

impl ProgramAccount for VoteRecord {
    const NAME: &'static str = "VoteRecord";
}

// ---------------------------------------------------------------------------
// Treasury
// ---------------------------------------------------------------------------

/// The treasury PDA is a Token-2022 account owned by the program authority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Treasury {
    pub address: Pubkey,
    pub staking_pool: Pubkey,
    pub authority: Pubkey,
    pub mint: Pubkey,
    pub balance: u64,
}

impl Treasury {
    pub fn decode(
        address: Pubkey,
        staking_pool: Pubkey,
        data: &[u8],
    ) -> Result<Self, ProgramError> {
        let token = TokenAccount::unpack(data)?;
        Ok(Self {
            address,
            staking_pool,
            authority: token.owner,
            mint: token.mint,
            balance: token.amount,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_proposal() -> ProposalAccount {
        ProposalAccount {
            proposal_id: 4,
            proposer: Pubkey([1u8; 32]),
            title: "Raise quorum".into(),
            description: "Move quorum to 20%".into(),
            proposal_type: ProposalType::ParameterUpdate,
            execution_data: vec![0, 20, 0, 0, 0, 0, 0, 0, 0],
            status: ProposalStatus::Active,
            voting_period_days: 7,
            created_at: 1_700_000_000,
            voting_ends_at: 1_700_604_800,
            finalized_at: 0,
            executed_at: 0,
            timelock_end: 0,
            yes_votes: 10,
            no_votes: 2,
            abstain_votes: 1,
            total_voters: 3,
            deposit_amount: 100_000_000,
            deposit_refunded: false,
            bump: 253,
        }
    }

    // -- Decoding ------------------------------------------------------------

    #[test]
    fn staking_pool_layout_offsets() {
        let pool = StakingPool {
            authority: Pubkey([1u8; 32]),
            authority_bump: 254,
            initializer: Pubkey([2u8; 32]),
            total_staked_amount: 5_000_000,
            mint_address: Pubkey([3u8; 32]),
            escrow_account: Pubkey([4u8; 32]),
            bump: 255,
            created_at: 1_700_000_000,
            is_active: true,
            token_price_usd_micro: 12_345,
            price_last_updated: 1_700_000_100,
        };
        let data = pool.encode().unwrap();

        // 8 disc + 32 + 1 + 32 + 8 + 32 + 32 + 1 + 8 + 1 + 8 + 8
        assert_eq!(data.len(), 171);
        assert_eq!(data[40], 254);
        assert_eq!(&data[73..81], &5_000_000u64.to_le_bytes());
        assert_eq!(data[145], 255);
        assert_eq!(data[154], 1);

        assert_eq!(StakingPool::decode(&data).unwrap(), pool);
    }

    #[test]
    fn trailing_bytes_are_ignored() {
        let account = UserStakingAccount {
            staker: Pubkey([9u8; 32]),
            staked_amount: 42,
            timestamp: 1,
            last_updated: 2,
            bump: 250,
        };
        let mut data = account.encode().unwrap();
        data.extend_from_slice(&[0u8; 64]);
        assert_eq!(UserStakingAccount::decode(&data).unwrap(), account);
    }

    #[test]
    fn wrong_discriminator_is_decode_error() {
        let data = sample_proposal().encode().unwrap();
        let err = VoteRecord::decode(&data).unwrap_err();
        assert!(matches!(err, ProgramError::DecodeError(_)));
        assert!(err.to_string().contains("VoteRecord"));
    }

    #[test]
    fn truncated_buffer_is_decode_error() {
        let data = sample_proposal().encode().unwrap();
        let err = ProposalAccount::decode(&data[..50]).unwrap_err();
        assert!(matches!(err, ProgramError::DecodeError(_)));
        assert!(matches!(
            ProposalAccount::decode(&[1, 2, 3]),
            Err(ProgramError::DecodeError(_))
        ));
    }

    #[test]
    fn out_of_range_enum_byte_is_decode_error() {
        let record = VoteRecord {
            voter: Pubkey([1u8; 32]),
            proposal_id: 1,
            vote_choice: VoteChoice::Abstain,
            voting_power: 10,
            voted_at: 5,
            bump: 1,
        };
        let mut data = record.encode().unwrap();
        // disc(8) + voter(32) + proposal_id(8)
        data[48] = 7;
        assert!(matches!(VoteRecord::decode(&data), Err(ProgramError::DecodeError(_))));
    }

    #[test]
    fn proposal_strings_decode() {
        let proposal = sample_proposal();
        let decoded = ProposalAccount::decode(&proposal.encode().unwrap()).unwrap();
        assert_eq!(decoded.title, "Raise quorum");
        assert_eq!(decoded.proposal_type, ProposalType::ParameterUpdate);
        assert_eq!(decoded.status, ProposalStatus::Active);
    }

    #[test]
    fn absent_account_is_not_found() {
        let address = Pubkey([3u8; 32]);
        let err = decode_optional::<GovernanceAccount>(None, &address).unwrap_err();
        assert!(matches!(err, ProgramError::AccountNotFound(_)));
        assert!(err.to_string().contains("GovernanceAccount"));
    }

    // -- Enums -------------------------------------------------------------

    #[test]
    fn proposal_type_discriminants() {
        for kind in ProposalType::ALL {
            assert_eq!(
                ProposalType::from_discriminant(kind.discriminant() as i64).unwrap(),
                kind
            );
        }
    }

    #[test]
    fn proposal_type_out_of_range() {
        for bad in [3, -1, 255, i64::MAX] {
            assert!(matches!(
                ProposalType::from_discriminant(bad),
                Err(ProgramError::InvalidProposalType(v)) if v == bad
            ));
        }
    }

    #[test]
    fn vote_choice_parses_case_insensitively() {
        assert_eq!("YES".parse::<VoteChoice>().unwrap(), VoteChoice::Yes);
        assert_eq!(" abstain ".parse::<VoteChoice>().unwrap(), VoteChoice::Abstain);
        assert!("maybe".parse::<VoteChoice>().is_err());
    }

    #[test]
    fn enums_serialize_camel_case() {
        assert_eq!(
            serde_json::to_string(&ProposalType::TreasuryTransfer).unwrap(),
            "\"treasuryTransfer\""
        );
        assert_eq!(serde_json::to_string(&ProposalStatus::Passed).unwrap(), "\"passed\"");
    }

    // -- Governance ----------------------------------------------------------

    #[test]
    fn lock_state_follows_lock_end() {
        let account = GovernanceAccount {
            staker: Pubkey([1u8; 32]),
            participation_count: 0,
            last_vote_timestamp: 0,
            stake_lock_end: 1_000,
            voting_power_cache: 0,
            created_at: 0,
            bump: 1,
        };
        assert!(account.is_currently_locked(999));
        assert!(!account.is_currently_locked(1_000));
    }

    // -- Treasury ------------------------------------------------------------

    #[test]
    fn treasury_reads_token_layout() {
        let mut data = vec![0u8; 182];
        data[0..32].copy_from_slice(&[7u8; 32]);
        data[32..64].copy_from_slice(&[8u8; 32]);
        data[64..72].copy_from_slice(&9_000_000u64.to_le_bytes());

        let treasury = Treasury::decode(Pubkey([1u8; 32]), Pubkey([2u8; 32]), &data).unwrap();
        assert_eq!(treasury.balance, 9_000_000);
        assert_eq!(treasury.authority, Pubkey([8u8; 32]));
        assert_eq!(treasury.mint, Pubkey([7u8; 32]));
    }

    #[test]
    fn treasury_short_buffer_is_decode_error() {
        let err = Treasury::decode(Pubkey([1u8; 32]), Pubkey([2u8; 32]), &[0u8; 40]).unwrap_err();
        assert!(matches!(err, ProgramError::DecodeError(_)));
    }
}
