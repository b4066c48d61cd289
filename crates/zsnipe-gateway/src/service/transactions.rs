//! Transaction preparation.
//!
//! Each `prepare_*` validates input, checks on-chain preconditions the
//! builder needs, and returns the built instruction. Callers either hand it
//! to [`Gateway::unsigned`] or, in development, sign and submit it.

use chain_sol::{Pubkey, TOKEN_2022_PROGRAM_ID};
use zsnipe_program::{
    BuiltInstruction, ExecutionData, GovernanceAccount, NewProposal, ProposalAccount,
    ProposalType, StakingPool, TransferTarget, VoteChoice,
};

use crate::error::GatewayError;
use crate::rpc::Ledger;
use crate::service::Gateway;

impl<L: Ledger> Gateway<L> {
    async fn require_pool(&self) -> Result<(), GatewayError> {
        let pool = self.builder.addresses().staking_pool()?.address;
        self.fetch_decoded::<StakingPool>(&pool).await.map(|_| ())
    }

    pub(crate) async fn fetch_proposal(&self, proposal_id: u64) -> Result<ProposalAccount, GatewayError> {
        let address = self.builder.addresses().proposal(proposal_id)?.address;
        self.fetch_decoded::<ProposalAccount>(&address).await
    }

    // -- Staking -------------------------------------------------------------

    #[tracing::instrument(skip(self))]
    pub fn prepare_init_staking_pool(&self, admin: &Pubkey) -> Result<BuiltInstruction, GatewayError> {
        Ok(self.builder.initialize_staking_pool(admin)?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn prepare_stake(&self, staker: &Pubkey, amount: u64) -> Result<BuiltInstruction, GatewayError> {
        let built = self.builder.stake(staker, amount)?;
        self.require_pool().await.map_err(|e| e.context("stake"))?;
        Ok(built)
    }

    #[tracing::instrument(skip(self))]
    pub async fn prepare_unstake(
        &self,
        staker: &Pubkey,
        amount: u64,
    ) -> Result<BuiltInstruction, GatewayError> {
        if amount == 0 {
            return Err(GatewayError::InvalidInput("amount must be > 0".into()));
        }
        self.require_pool().await.map_err(|e| e.context("unstake"))?;
        let governance = self.builder.addresses().governance(staker)?.address;
        let has_governance = self.exists(&governance).await?;
        Ok(self.builder.unstake(staker, amount, has_governance)?)
    }

    // -- Governance accounts -------------------------------------------------

    #[tracing::instrument(skip(self))]
    pub fn prepare_init_governance(&self, staker: &Pubkey) -> Result<BuiltInstruction, GatewayError> {
        Ok(self.builder.initialize_governance_account(staker)?)
    }

    #[tracing::instrument(skip(self))]
    pub fn prepare_calculate_voting_power(
        &self,
        staker: &Pubkey,
    ) -> Result<BuiltInstruction, GatewayError> {
        Ok(self.builder.calculate_voting_power(staker)?)
    }

    // -- Proposals -----------------------------------------------------------

    #[tracing::instrument(skip(self))]
    pub fn prepare_init_proposal_escrow(&self, admin: &Pubkey) -> Result<BuiltInstruction, GatewayError> {
        Ok(self.builder.initialize_proposal_escrow(admin)?)
    }

    #[tracing::instrument(skip(self, proposal), fields(proposal_id = proposal.proposal_id))]
    pub async fn prepare_create_proposal(
        &self,
        proposer: &Pubkey,
        proposal: &NewProposal,
    ) -> Result<BuiltInstruction, GatewayError> {
        let built = self.builder.create_proposal(proposer, proposal)?;
        self.require_pool().await.map_err(|e| e.context("create proposal"))?;
        Ok(built)
    }

    /// The voter must hold a governance account and the proposal must exist.
    #[tracing::instrument(skip(self))]
    pub async fn prepare_cast_vote(
        &self,
        voter: &Pubkey,
        proposal_id: u64,
        choice: VoteChoice,
    ) -> Result<BuiltInstruction, GatewayError> {
        let built = self.builder.cast_vote(voter, proposal_id, choice)?;
        self.fetch_proposal(proposal_id)
            .await
            .map_err(|e| e.context("cast vote"))?;
        let governance = self.builder.addresses().governance(voter)?.address;
        self.fetch_decoded::<GovernanceAccount>(&governance)
            .await
            .map_err(|e| e.context("cast vote"))?;
        Ok(built)
    }

    #[tracing::instrument(skip(self))]
    pub async fn prepare_finalize(
        &self,
        finalizer: &Pubkey,
        proposal_id: u64,
    ) -> Result<BuiltInstruction, GatewayError> {
        let proposal = self
            .fetch_proposal(proposal_id)
            .await
            .map_err(|e| e.context("finalize proposal"))?;
        Ok(self.builder.finalize_proposal(finalizer, &proposal)?)
    }

    /// Execute a proposal. `expected` rejects a proposal of another kind.
    #[tracing::instrument(skip(self))]
    pub async fn prepare_execute(
        &self,
        executor: &Pubkey,
        proposal_id: u64,
        expected: Option<ProposalType>,
    ) -> Result<BuiltInstruction, GatewayError> {
        let proposal = self
            .fetch_proposal(proposal_id)
            .await
            .map_err(|e| e.context("execute proposal"))?;
        self.build_execute(executor, &proposal, expected).await
    }

    pub(crate) async fn build_execute(
        &self,
        executor: &Pubkey,
        proposal: &ProposalAccount,
        expected: Option<ProposalType>,
    ) -> Result<BuiltInstruction, GatewayError> {
        if let Some(expected) = expected {
            if expected != proposal.proposal_type {
                return Err(GatewayError::InvalidInput(format!(
                    "proposal {} is a {} proposal, not {}",
                    proposal.proposal_id,
                    proposal.proposal_type.as_str(),
                    expected.as_str()
                )));
            }
        }

        let target = match proposal.proposal_type {
            ProposalType::TreasuryTransfer => {
                match ExecutionData::decode(ProposalType::TreasuryTransfer, &proposal.execution_data)? {
                    ExecutionData::TreasuryTransfer { recipient, .. } => {
                        Some(self.resolve_transfer_target(&recipient).await?)
                    }
                    _ => None,
                }
            }
            ProposalType::Text | ProposalType::ParameterUpdate => None,
        };
        Ok(self.builder.execute_proposal(executor, proposal, target)?)
    }

    /// A recipient that is itself a Token-2022 account receives directly;
    /// any other address receives through its associated token account.
    async fn resolve_transfer_target(&self, recipient: &Pubkey) -> Result<TransferTarget, GatewayError> {
        let owned_by_token_program = self
            .fetch(recipient)
            .await?
            .is_some_and(|account| account.owner == TOKEN_2022_PROGRAM_ID);
        Ok(if owned_by_token_program {
            TransferTarget::TokenAccount(*recipient)
        } else {
            TransferTarget::Wallet(*recipient)
        })
    }

    // -- Treasury and config -------------------------------------------------

    #[tracing::instrument(skip(self))]
    pub async fn prepare_init_treasury(&self, admin: &Pubkey) -> Result<BuiltInstruction, GatewayError> {
        let built = self.builder.initialize_treasury(admin)?;
        self.require_pool().await.map_err(|e| e.context("initialize treasury"))?;
        Ok(built)
    }

    #[tracing::instrument(skip(self))]
    pub fn prepare_fund_treasury(&self, admin: &Pubkey, amount: u64) -> Result<BuiltInstruction, GatewayError> {
        Ok(self.builder.fund_treasury(admin, amount)?)
    }

    #[tracing::instrument(skip(self))]
    pub fn prepare_init_governance_config(
        &self,
        authority: &Pubkey,
    ) -> Result<BuiltInstruction, GatewayError> {
        Ok(self.builder.initialize_governance_config(authority)?)
    }
}
