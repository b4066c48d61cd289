//! Canonical addresses of the zSnipe program's accounts.
//!
//! Every address is a pure function of the program id, a versioned seed
//! constant and an ordered list of binary components. Builders and readers
//! both go through [`ProgramAddresses`] so they always land on the same
//! account.

use chain_sol::{find_program_address, Pubkey};
use serde::Serialize;

use crate::error::ProgramError;

/// Seed constants. The version suffixes are part of the on-chain layout.
pub mod seeds {
    pub const STAKING_POOL: &[u8] = b"staking_poolV3";
    pub const PROGRAM_AUTHORITY: &[u8] = b"program_authorityV1";
    pub const USER_STAKE: &[u8] = b"user_stakeV1";
    pub const ESCROW: &[u8] = b"escrowV1";
    pub const GOVERNANCE: &[u8] = b"governanceV1";
    pub const GOVERNANCE_CONFIG: &[u8] = b"governance_configV1";
    pub const PROPOSAL: &[u8] = b"proposalV1";
    pub const PROPOSAL_ESCROW: &[u8] = b"proposal_escrowV1";
    pub const TREASURY: &[u8] = b"treasuryV1";
    pub const VOTE: &[u8] = b"voteV1";
}

/// One binary component of a seed list.
#[derive(Debug, Clone, Copy)]
pub enum SeedComponent<'a> {
    Bytes(&'a [u8]),
    Pubkey(&'a Pubkey),
    /// Encoded as 8 little-endian bytes.
    U64(u64),
}

impl SeedComponent<'_> {
    fn encode(&self) -> Vec<u8> {
        match self {
            SeedComponent::Bytes(b) => b.to_vec(),
            SeedComponent::Pubkey(k) => k.as_ref().to_vec(),
            SeedComponent::U64(v) => v.to_le_bytes().to_vec(),
        }
    }
}

/// A derived address together with its bump seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DerivedAddress {
    pub address: Pubkey,
    pub bump: u8,
}

/// Derive `(address, bump)` for `seed` followed by `components`.
pub fn derive(
    program_id: &Pubkey,
    seed: &[u8],
    components: &[SeedComponent<'_>],
) -> Result<DerivedAddress, ProgramError> {
    let encoded: Vec<Vec<u8>> = components.iter().map(SeedComponent::encode).collect();
    let mut seeds: Vec<&[u8]> = Vec::with_capacity(1 + encoded.len());
    seeds.push(seed);
    seeds.extend(encoded.iter().map(Vec::as_slice));

    let (address, bump) = find_program_address(&seeds, program_id)?;
    Ok(DerivedAddress { address, bump })
}

/// Address book for one program deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramAddresses {
    program_id: Pubkey,
}

impl ProgramAddresses {
    pub fn new(program_id: Pubkey) -> Self {
        Self { program_id }
    }

    pub fn program_id(&self) -> &Pubkey {
        &self.program_id
    }

    pub fn staking_pool(&self) -> Result<DerivedAddress, ProgramError> {
        derive(&self.program_id, seeds::STAKING_POOL, &[])
    }

    pub fn program_authority(&self) -> Result<DerivedAddress, ProgramError> {
        derive(&self.program_id, seeds::PROGRAM_AUTHORITY, &[])
    }

    pub fn user_stake(&self, user: &Pubkey) -> Result<DerivedAddress, ProgramError> {
        derive(&self.program_id, seeds::USER_STAKE, &[SeedComponent::Pubkey(user)])
    }

    /// Escrow token account holding staked tokens, scoped to the pool.
    pub fn escrow(&self) -> Result<DerivedAddress, ProgramError> {
        let pool = self.staking_pool()?.address;
        derive(&self.program_id, seeds::ESCROW, &[SeedComponent::Pubkey(&pool)])
    }

    pub fn governance(&self, user: &Pubkey) -> Result<DerivedAddress, ProgramError> {
        derive(&self.program_id, seeds::GOVERNANCE, &[SeedComponent::Pubkey(user)])
    }

    pub fn governance_config(&self) -> Result<DerivedAddress, ProgramError> {
        derive(&self.program_id, seeds::GOVERNANCE_CONFIG, &[])
    }

    pub fn proposal(&self, proposal_id: u64) -> Result<DerivedAddress, ProgramError> {
        derive(&self.program_id, seeds::PROPOSAL, &[SeedComponent::U64(proposal_id)])
    }

    /// Escrow token account holding proposal deposits.
    pub fn proposal_escrow(&self) -> Result<DerivedAddress, ProgramError> {
        derive(&self.program_id, seeds::PROPOSAL_ESCROW, &[])
    }

    pub fn treasury(&self) -> Result<DerivedAddress, ProgramError> {
        let pool = self.staking_pool()?.address;
        derive(&self.program_id, seeds::TREASURY, &[SeedComponent::Pubkey(&pool)])
    }

    /// One vote record per (proposal, voter); a second vote by the same
    /// voter maps to the same address.
    pub fn vote_record(
        &self,
        proposal_id: u64,
        voter: &Pubkey,
    ) -> Result<DerivedAddress, ProgramError> {
        derive(
            &self.program_id,
            seeds::VOTE,
            &[SeedComponent::U64(proposal_id), SeedComponent::Pubkey(voter)],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addresses() -> ProgramAddresses {
        ProgramAddresses::new("758R2jFfces6Ue5B9rLmRrh8NesiU9dCtDa4bUSBpCMt".parse().unwrap())
    }

    // -- Known vectors -------------------------------------------------------

    #[test]
    fn singleton_vectors() {
        let a = addresses();
        assert_eq!(
            a.staking_pool().unwrap().address.to_string(),
            "cqnwBEur7rv5xnVHSipN2sR5eMsEnADxhi4hsWHZU7U"
        );
        assert_eq!(
            a.program_authority().unwrap().address.to_string(),
            "ASLZU5BwSrw531SNWp1ni92r3UsXEdWoyRoj1a1F2Sjg"
        );
        assert_eq!(
            a.governance_config().unwrap().address.to_string(),
            "AHdnZVZbtiPdfJAg8gEQ8eUiF2qr1zoQSiUrji1hDVmV"
        );
        assert_eq!(
            a.treasury().unwrap().address.to_string(),
            "4U4bR5bHjLiLkLXeXNkretSd9sgr2xQp7ZRYJPosr7P9"
        );
    }

    #[test]
    fn proposal_vectors() {
        let a = addresses();
        assert_eq!(
            a.proposal(0).unwrap().address.to_string(),
            "Aywrd78DENPEQrV3TQ9YJsJRyKXeuHzmt6xWxi1kneH9"
        );
        assert_eq!(
            a.proposal(1).unwrap().address.to_string(),
            "GpUigmqhPNGDeGJFcPDUEEMfCm4Awkrk4WURFHmCUkrq"
        );
    }

    #[test]
    fn user_stake_vector() {
        let derived = addresses().user_stake(&Pubkey([0x42; 32])).unwrap();
        assert_eq!(
            derived.address.to_string(),
            "83vUziU4orGTMNPMQQKMc7CzDw7yavYypZP8KwhMvBWt"
        );
        assert_eq!(derived.bump, 254);
    }

    // -- Properties ----------------------------------------------------------

    #[test]
    fn derivation_is_deterministic() {
        let a = addresses();
        let user = Pubkey([7u8; 32]);
        assert_eq!(a.user_stake(&user).unwrap(), a.user_stake(&user).unwrap());
        assert_eq!(a.vote_record(3, &user).unwrap(), a.vote_record(3, &user).unwrap());
    }

    #[test]
    fn distinct_proposal_ids_give_distinct_addresses() {
        let a = addresses();
        let mut seen = std::collections::HashSet::new();
        for id in [0u64, 1, 2, 255, 256, 65_536, u32::MAX as u64, u64::MAX] {
            assert!(seen.insert(a.proposal(id).unwrap().address), "collision at {id}");
        }
    }

    #[test]
    fn vote_records_differ_per_voter_and_proposal() {
        let a = addresses();
        let alice = Pubkey([1u8; 32]);
        let bob = Pubkey([2u8; 32]);
        assert_ne!(a.vote_record(1, &alice).unwrap(), a.vote_record(1, &bob).unwrap());
        assert_ne!(a.vote_record(1, &alice).unwrap(), a.vote_record(2, &alice).unwrap());
    }

    #[test]
    fn user_scoped_namespaces_do_not_collide() {
        let a = addresses();
        let user = Pubkey([9u8; 32]);
        assert_ne!(a.user_stake(&user).unwrap().address, a.governance(&user).unwrap().address);
    }

    #[test]
    fn generic_derive_matches_helpers() {
        let a = addresses();
        let user = Pubkey([5u8; 32]);
        let direct = derive(
            a.program_id(),
            seeds::VOTE,
            &[SeedComponent::U64(9), SeedComponent::Pubkey(&user)],
        )
        .unwrap();
        assert_eq!(direct, a.vote_record(9, &user).unwrap());

        let raw = derive(a.program_id(), b"user_stakeV1", &[SeedComponent::Bytes(&[5u8; 32])]).unwrap();
        assert_eq!(raw, a.user_stake(&user).unwrap());
    }
}
