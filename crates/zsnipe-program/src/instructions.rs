//! Instruction builders for every zSnipe program operation.
//!
//! Each builder derives the canonical addresses itself and emits the
//! instruction with the account order and flags the program declares.
//! Instruction data is the Anchor discriminator followed by borsh args.
//!
//! Optional accounts that are absent for a call are passed as the program id,
//! read-only and unsigned.

use borsh::BorshSerialize;
use chain_sol::{
    build_spl_transfer, derive_associated_token_address, Pubkey, SolAccountMeta,
    SolInstruction, ASSOCIATED_TOKEN_PROGRAM_ID, SYSTEM_PROGRAM_ID, TOKEN_2022_PROGRAM_ID,
};

use crate::accounts::{ProposalAccount, ProposalType, VoteChoice};
use crate::discriminator::instruction_discriminator;
use crate::error::ProgramError;
use crate::execution_data::ExecutionData;
use crate::pda::ProgramAddresses;

/// Longest accepted proposal title, in bytes.
pub const MAX_TITLE_LEN: usize = 200;
/// Longest accepted proposal description, in bytes.
pub const MAX_DESCRIPTION_LEN: usize = 1000;
/// Voting periods the program accepts, in days.
pub const VOTING_PERIODS: [u8; 4] = [3, 7, 14, 30];

/// An instruction plus the accounts it touches, by role, for client display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltInstruction {
    pub instruction: SolInstruction,
    pub accounts: Vec<(&'static str, Pubkey)>,
}

impl BuiltInstruction {
    pub fn account(&self, role: &str) -> Option<&Pubkey> {
        self.accounts
            .iter()
            .find(|(name, _)| *name == role)
            .map(|(_, key)| key)
    }
}

// ---------------------------------------------------------------------------
// Arguments
// ---------------------------------------------------------------------------

#[derive(BorshSerialize)]
struct AmountArgs {
    amount: u64,
}

#[derive(BorshSerialize)]
struct CreateProposalArgs<'a> {
    proposal_id: u64,
    title: &'a str,
    description: &'a str,
    proposal_type: ProposalType,
    execution_data: &'a [u8],
    voting_period: u8,
}

#[derive(BorshSerialize)]
struct CastVoteArgs {
    vote_choice: VoteChoice,
}

#[derive(BorshSerialize)]
struct NoArgs {}

fn instruction_data<A: BorshSerialize>(name: &str, args: &A) -> Result<Vec<u8>, ProgramError> {
    let mut data = instruction_discriminator(name).to_vec();
    borsh::to_writer(&mut data, args)
        .map_err(|e| ProgramError::Internal(format!("{name} args: {e}")))?;
    Ok(data)
}

/// A new proposal, validated before any address is derived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProposal {
    pub proposal_id: u64,
    pub title: String,
    pub description: String,
    pub proposal_type: ProposalType,
    pub execution_data: Vec<u8>,
    pub voting_period_days: u8,
}

impl NewProposal {
    pub fn validate(&self) -> Result<(), ProgramError> {
        if self.title.trim().is_empty() {
            return Err(ProgramError::InvalidInput("title is required".into()));
        }
        if self.title.len() > MAX_TITLE_LEN {
            return Err(ProgramError::InvalidInput(format!(
                "title is {} bytes, max {MAX_TITLE_LEN}",
                self.title.len()
            )));
        }
        if self.description.len() > MAX_DESCRIPTION_LEN {
            return Err(ProgramError::InvalidInput(format!(
                "description is {} bytes, max {MAX_DESCRIPTION_LEN}",
                self.description.len()
            )));
        }
        if !VOTING_PERIODS.contains(&self.voting_period_days) {
            return Err(ProgramError::InvalidInput(format!(
                "voting period must be one of {VOTING_PERIODS:?} days, got {}",
                self.voting_period_days
            )));
        }
        // Structured payloads must decode under their declared type.
        if self.proposal_type != ProposalType::Text {
            ExecutionData::decode(self.proposal_type, &self.execution_data)
                .map_err(|e| ProgramError::InvalidInput(e.to_string()))?;
        }
        Ok(())
    }
}

/// Where a treasury transfer pays out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferTarget {
    /// A wallet; funds go to its Token-2022 associated token account.
    Wallet(Pubkey),
    /// Already a Token-2022 token account.
    TokenAccount(Pubkey),
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builds instructions for one program deployment and staking mint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstructionBuilder {
    addresses: ProgramAddresses,
    mint: Pubkey,
}

impl InstructionBuilder {
    pub fn new(program_id: Pubkey, mint: Pubkey) -> Self {
        Self {
            addresses: ProgramAddresses::new(program_id),
            mint,
        }
    }

    pub fn addresses(&self) -> &ProgramAddresses {
        &self.addresses
    }

    pub fn mint(&self) -> &Pubkey {
        &self.mint
    }

    fn program_id(&self) -> Pubkey {
        *self.addresses.program_id()
    }

    /// The wallet's Token-2022 associated token account for the staking mint.
    pub fn token_account(&self, wallet: &Pubkey) -> Result<Pubkey, ProgramError> {
        Ok(derive_associated_token_address(
            wallet,
            &self.mint,
            &TOKEN_2022_PROGRAM_ID,
        )?)
    }

    fn finish(&self, data: Vec<u8>, metas: Vec<(&'static str, SolAccountMeta)>) -> BuiltInstruction {
        let mut accounts: Vec<_> = metas.iter().map(|(role, m)| (*role, m.pubkey)).collect();
        accounts.push(("program", self.program_id()));
        BuiltInstruction {
            instruction: SolInstruction {
                program_id: self.program_id(),
                accounts: metas.into_iter().map(|(_, m)| m).collect(),
                data,
            },
            accounts,
        }
    }

    fn absent(&self) -> SolAccountMeta {
        SolAccountMeta::readonly(self.program_id(), false)
    }

    // -- Staking -------------------------------------------------------------

    pub fn initialize_staking_pool(&self, admin: &Pubkey) -> Result<BuiltInstruction, ProgramError> {
        let a = &self.addresses;
        let metas = vec![
            ("admin", SolAccountMeta::writable(*admin, true)),
            ("stakingPool", SolAccountMeta::writable(a.staking_pool()?.address, false)),
            ("programAuthority", SolAccountMeta::readonly(a.program_authority()?.address, false)),
            ("escrowAccount", SolAccountMeta::writable(a.escrow()?.address, false)),
            ("tokenMint", SolAccountMeta::readonly(self.mint, false)),
            ("systemProgram", SolAccountMeta::readonly(SYSTEM_PROGRAM_ID, false)),
            ("tokenProgram", SolAccountMeta::readonly(TOKEN_2022_PROGRAM_ID, false)),
            (
                "associatedTokenProgram",
                SolAccountMeta::readonly(ASSOCIATED_TOKEN_PROGRAM_ID, false),
            ),
        ];
        let data = instruction_data("initialize_staking_pool", &NoArgs {})?;
        Ok(self.finish(data, metas))
    }

    pub fn stake(&self, staker: &Pubkey, amount: u64) -> Result<BuiltInstruction, ProgramError> {
        require_positive(amount)?;
        let a = &self.addresses;
        let metas = vec![
            ("staker", SolAccountMeta::writable(*staker, true)),
            ("stakingPool", SolAccountMeta::writable(a.staking_pool()?.address, false)),
            (
                "userStakingAccount",
                SolAccountMeta::writable(a.user_stake(staker)?.address, false),
            ),
            ("programAuthority", SolAccountMeta::readonly(a.program_authority()?.address, false)),
            ("escrowAccount", SolAccountMeta::writable(a.escrow()?.address, false)),
            ("stakerTokenAccount", SolAccountMeta::writable(self.token_account(staker)?, false)),
            ("tokenMint", SolAccountMeta::readonly(self.mint, false)),
            ("systemProgram", SolAccountMeta::readonly(SYSTEM_PROGRAM_ID, false)),
            ("tokenProgram", SolAccountMeta::readonly(TOKEN_2022_PROGRAM_ID, false)),
        ];
        let data = instruction_data("stake", &AmountArgs { amount })?;
        Ok(self.finish(data, metas))
    }

    /// `has_governance_account` decides whether the staker's governance
    /// account is passed or left absent.
    pub fn unstake(
        &self,
        staker: &Pubkey,
        amount: u64,
        has_governance_account: bool,
    ) -> Result<BuiltInstruction, ProgramError> {
        require_positive(amount)?;
        let a = &self.addresses;
        let governance = if has_governance_account {
            SolAccountMeta::readonly(a.governance(staker)?.address, false)
        } else {
            self.absent()
        };
        let metas = vec![
            ("staker", SolAccountMeta::writable(*staker, true)),
            ("stakingPool", SolAccountMeta::writable(a.staking_pool()?.address, false)),
            (
                "userStakingAccount",
                SolAccountMeta::writable(a.user_stake(staker)?.address, false),
            ),
            ("governanceAccount", governance),
            ("programAuthority", SolAccountMeta::readonly(a.program_authority()?.address, false)),
            ("escrowAccount", SolAccountMeta::writable(a.escrow()?.address, false)),
            ("stakerTokenAccount", SolAccountMeta::writable(self.token_account(staker)?, false)),
            ("tokenMint", SolAccountMeta::readonly(self.mint, false)),
            ("tokenProgram", SolAccountMeta::readonly(TOKEN_2022_PROGRAM_ID, false)),
        ];
        let data = instruction_data("unstake", &AmountArgs { amount })?;
        Ok(self.finish(data, metas))
    }

    // -- Governance accounts -------------------------------------------------

    pub fn initialize_governance_account(
        &self,
        staker: &Pubkey,
    ) -> Result<BuiltInstruction, ProgramError> {
        let metas = vec![
            ("staker", SolAccountMeta::writable(*staker, true)),
            (
                "governanceAccount",
                SolAccountMeta::writable(self.addresses.governance(staker)?.address, false),
            ),
            ("systemProgram", SolAccountMeta::readonly(SYSTEM_PROGRAM_ID, false)),
        ];
        let data = instruction_data("initialize_governance_account", &NoArgs {})?;
        Ok(self.finish(data, metas))
    }

    pub fn calculate_voting_power(&self, staker: &Pubkey) -> Result<BuiltInstruction, ProgramError> {
        let a = &self.addresses;
        let metas = vec![
            ("staker", SolAccountMeta::writable(*staker, true)),
            (
                "userStakingAccount",
                SolAccountMeta::readonly(a.user_stake(staker)?.address, false),
            ),
            (
                "governanceAccount",
                SolAccountMeta::writable(a.governance(staker)?.address, false),
            ),
        ];
        let data = instruction_data("calculate_voting_power", &NoArgs {})?;
        Ok(self.finish(data, metas))
    }

    // -- Proposals -----------------------------------------------------------

    pub fn initialize_proposal_escrow(
        &self,
        admin: &Pubkey,
    ) -> Result<BuiltInstruction, ProgramError> {
        let a = &self.addresses;
        let metas = vec![
            ("admin", SolAccountMeta::writable(*admin, true)),
            ("stakingPool", SolAccountMeta::readonly(a.staking_pool()?.address, false)),
            ("programAuthority", SolAccountMeta::readonly(a.program_authority()?.address, false)),
            ("proposalEscrow", SolAccountMeta::writable(a.proposal_escrow()?.address, false)),
            ("tokenMint", SolAccountMeta::readonly(self.mint, false)),
            ("systemProgram", SolAccountMeta::readonly(SYSTEM_PROGRAM_ID, false)),
            ("tokenProgram", SolAccountMeta::readonly(TOKEN_2022_PROGRAM_ID, false)),
        ];
        let data = instruction_data("initialize_proposal_escrow", &NoArgs {})?;
        Ok(self.finish(data, metas))
    }

    pub fn create_proposal(
        &self,
        proposer: &Pubkey,
        proposal: &NewProposal,
    ) -> Result<BuiltInstruction, ProgramError> {
        proposal.validate()?;
        let a = &self.addresses;
        let metas = vec![
            ("proposer", SolAccountMeta::writable(*proposer, true)),
            (
                "proposerStakingAccount",
                SolAccountMeta::readonly(a.user_stake(proposer)?.address, false),
            ),
            (
                "proposerGovernanceAccount",
                SolAccountMeta::writable(a.governance(proposer)?.address, false),
            ),
            (
                "proposalAccount",
                SolAccountMeta::writable(a.proposal(proposal.proposal_id)?.address, false),
            ),
            ("stakingPool", SolAccountMeta::readonly(a.staking_pool()?.address, false)),
            ("programAuthority", SolAccountMeta::readonly(a.program_authority()?.address, false)),
            (
                "proposerTokenAccount",
                SolAccountMeta::writable(self.token_account(proposer)?, false),
            ),
            (
                "depositEscrowAccount",
                SolAccountMeta::writable(a.proposal_escrow()?.address, false),
            ),
            ("depositTokenMint", SolAccountMeta::readonly(self.mint, false)),
            ("systemProgram", SolAccountMeta::readonly(SYSTEM_PROGRAM_ID, false)),
            ("tokenProgram", SolAccountMeta::readonly(TOKEN_2022_PROGRAM_ID, false)),
        ];
        let args = CreateProposalArgs {
            proposal_id: proposal.proposal_id,
            title: &proposal.title,
            description: &proposal.description,
            proposal_type: proposal.proposal_type,
            execution_data: &proposal.execution_data,
            voting_period: proposal.voting_period_days,
        };
        let data = instruction_data("create_proposal", &args)?;
        Ok(self.finish(data, metas))
    }

    pub fn cast_vote(
        &self,
        voter: &Pubkey,
        proposal_id: u64,
        choice: VoteChoice,
    ) -> Result<BuiltInstruction, ProgramError> {
        let a = &self.addresses;
        let metas = vec![
            ("voter", SolAccountMeta::writable(*voter, true)),
            (
                "userStakingAccount",
                SolAccountMeta::readonly(a.user_stake(voter)?.address, false),
            ),
            ("governanceAccount", SolAccountMeta::writable(a.governance(voter)?.address, false)),
            (
                "proposalAccount",
                SolAccountMeta::writable(a.proposal(proposal_id)?.address, false),
            ),
            (
                "voteRecord",
                SolAccountMeta::writable(a.vote_record(proposal_id, voter)?.address, false),
            ),
            ("systemProgram", SolAccountMeta::readonly(SYSTEM_PROGRAM_ID, false)),
        ];
        let data = instruction_data("cast_vote", &CastVoteArgs { vote_choice: choice })?;
        Ok(self.finish(data, metas))
    }

    /// The deposit refund goes to the proposer recorded on chain.
    pub fn finalize_proposal(
        &self,
        finalizer: &Pubkey,
        proposal: &ProposalAccount,
    ) -> Result<BuiltInstruction, ProgramError> {
        let a = &self.addresses;
        let metas = vec![
            ("finalizer", SolAccountMeta::writable(*finalizer, true)),
            (
                "proposalAccount",
                SolAccountMeta::writable(a.proposal(proposal.proposal_id)?.address, false),
            ),
            ("stakingPool", SolAccountMeta::readonly(a.staking_pool()?.address, false)),
            ("programAuthority", SolAccountMeta::readonly(a.program_authority()?.address, false)),
            (
                "depositEscrowAccount",
                SolAccountMeta::writable(a.proposal_escrow()?.address, false),
            ),
            (
                "proposerTokenAccount",
                SolAccountMeta::writable(self.token_account(&proposal.proposer)?, false),
            ),
            ("tokenMint", SolAccountMeta::readonly(self.mint, false)),
            ("tokenProgram", SolAccountMeta::readonly(TOKEN_2022_PROGRAM_ID, false)),
        ];
        let data = instruction_data("finalize_proposal", &NoArgs {})?;
        Ok(self.finish(data, metas))
    }

    /// Execute a passed proposal. The trailing treasury accounts are filled
    /// only for treasury transfers; `target` overrides where the transfer
    /// lands and defaults to the recipient wallet's token account.
    pub fn execute_proposal(
        &self,
        executor: &Pubkey,
        proposal: &ProposalAccount,
        target: Option<TransferTarget>,
    ) -> Result<BuiltInstruction, ProgramError> {
        let a = &self.addresses;
        let mut metas = vec![
            ("executor", SolAccountMeta::writable(*executor, true)),
            (
                "proposalAccount",
                SolAccountMeta::writable(a.proposal(proposal.proposal_id)?.address, false),
            ),
            ("stakingPool", SolAccountMeta::readonly(a.staking_pool()?.address, false)),
            ("programAuthority", SolAccountMeta::readonly(a.program_authority()?.address, false)),
            (
                "depositEscrowAccount",
                SolAccountMeta::writable(a.proposal_escrow()?.address, false),
            ),
            (
                "proposerTokenAccount",
                SolAccountMeta::writable(self.token_account(&proposal.proposer)?, false),
            ),
            ("depositTokenMint", SolAccountMeta::readonly(self.mint, false)),
            (
                "tokenProgramForDeposit",
                SolAccountMeta::readonly(TOKEN_2022_PROGRAM_ID, false),
            ),
            (
                "governanceConfig",
                SolAccountMeta::writable(a.governance_config()?.address, false),
            ),
        ];

        match proposal.proposal_type {
            ProposalType::TreasuryTransfer => {
                let recipient_account = match target {
                    Some(TransferTarget::TokenAccount(account)) => account,
                    Some(TransferTarget::Wallet(wallet)) => self.token_account(&wallet)?,
                    None => match ExecutionData::decode(
                        ProposalType::TreasuryTransfer,
                        &proposal.execution_data,
                    )? {
                        ExecutionData::TreasuryTransfer { recipient, .. } => {
                            self.token_account(&recipient)?
                        }
                        _ => {
                            return Err(ProgramError::Internal(
                                "treasury transfer decoded to another kind".into(),
                            ))
                        }
                    },
                };
                metas.extend([
                    ("treasuryAccount", SolAccountMeta::writable(a.treasury()?.address, false)),
                    ("recipientAccount", SolAccountMeta::writable(recipient_account, false)),
                    ("tokenMint", SolAccountMeta::readonly(self.mint, false)),
                    ("tokenProgram", SolAccountMeta::readonly(TOKEN_2022_PROGRAM_ID, false)),
                ]);
            }
            ProposalType::Text | ProposalType::ParameterUpdate => {
                metas.extend([
                    ("treasuryAccount", self.absent()),
                    ("recipientAccount", self.absent()),
                    ("tokenMint", self.absent()),
                    ("tokenProgram", self.absent()),
                ]);
            }
        }

        let data = instruction_data("execute_proposal", &NoArgs {})?;
        Ok(self.finish(data, metas))
    }

    // -- Treasury and config -------------------------------------------------

    pub fn initialize_treasury(&self, admin: &Pubkey) -> Result<BuiltInstruction, ProgramError> {
        let a = &self.addresses;
        let metas = vec![
            ("admin", SolAccountMeta::writable(*admin, true)),
            ("stakingPool", SolAccountMeta::readonly(a.staking_pool()?.address, false)),
            ("programAuthority", SolAccountMeta::readonly(a.program_authority()?.address, false)),
            ("treasuryAccount", SolAccountMeta::writable(a.treasury()?.address, false)),
            ("tokenMint", SolAccountMeta::readonly(self.mint, false)),
            ("systemProgram", SolAccountMeta::readonly(SYSTEM_PROGRAM_ID, false)),
            ("tokenProgram", SolAccountMeta::readonly(TOKEN_2022_PROGRAM_ID, false)),
        ];
        let data = instruction_data("initialize_treasury", &NoArgs {})?;
        Ok(self.finish(data, metas))
    }

    pub fn initialize_governance_config(
        &self,
        authority: &Pubkey,
    ) -> Result<BuiltInstruction, ProgramError> {
        let metas = vec![
            ("authority", SolAccountMeta::writable(*authority, true)),
            (
                "governanceConfig",
                SolAccountMeta::writable(self.addresses.governance_config()?.address, false),
            ),
            ("systemProgram", SolAccountMeta::readonly(SYSTEM_PROGRAM_ID, false)),
        ];
        let data = instruction_data("initialize_governance_config", &NoArgs {})?;
        Ok(self.finish(data, metas))
    }

    /// Token-2022 transfer from the admin's token account into the treasury.
    pub fn fund_treasury(&self, admin: &Pubkey, amount: u64) -> Result<BuiltInstruction, ProgramError> {
        require_positive(amount)?;
        let source = self.token_account(admin)?;
        let treasury = self.addresses.treasury()?.address;
        let instruction =
            build_spl_transfer(&TOKEN_2022_PROGRAM_ID, &source, &treasury, admin, amount)?;
        Ok(BuiltInstruction {
            instruction,
            accounts: vec![
                ("sourceTokenAccount", source),
                ("treasuryAccount", treasury),
                ("owner", *admin),
                ("tokenMint", self.mint),
                ("tokenProgram", TOKEN_2022_PROGRAM_ID),
            ],
        })
    }
}

fn require_positive(amount: u64) -> Result<(), ProgramError> {
    if amount == 0 {
        return Err(ProgramError::InvalidInput("amount must be > 0".into()));
    }
    Ok(())
}
