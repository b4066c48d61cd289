//! Read operations: fetch, decode and summarize on-chain state.

use chain_sol::{Pubkey, TokenAccount};
use chrono::{DateTime, SecondsFormat};
use futures_util::stream::{self, StreamExt};
use serde::Serialize;
use zsnipe_program::lifecycle::is_pending_execution;
use zsnipe_program::voting_power::{self, VotingPowerPreview};
use zsnipe_program::{
    to_display, ExecutionData, ExecutionStatus, FinalizationStatus, GovernanceAccount,
    GovernanceConfig, ProgramAccount, ProposalAccount, ProposalType, StakingPool, Treasury,
    UserStakingAccount, VoteRecord, TOKEN_DECIMALS,
};

use crate::error::GatewayError;
use crate::rpc::Ledger;
use crate::service::Gateway;

/// Default `maxId` for listings.
pub const DEFAULT_SCAN_ID: u64 = 10;

/// A decoded account and the address it was read from.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Located<T> {
    pub address: Pubkey,
    #[serde(flatten)]
    pub account: T,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StakingPoolInfo {
    pub address: Pubkey,
    #[serde(flatten)]
    pub pool: StakingPool,
    pub total_staked_tokens: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStakeInfo {
    pub address: Pubkey,
    #[serde(flatten)]
    pub account: UserStakingAccount,
    pub staked_tokens: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBalance {
    pub owner: Pubkey,
    pub token_account: Pubkey,
    pub mint: Pubkey,
    pub exists: bool,
    pub balance: u64,
    pub ui_balance: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GovernanceInfo {
    pub address: Pubkey,
    #[serde(flatten)]
    pub account: GovernanceAccount,
    pub is_currently_locked: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VotingEligibility {
    pub user: Pubkey,
    pub has_stake: bool,
    pub staked_amount: u64,
    pub has_governance_account: bool,
    pub voting_power: u64,
    pub eligible: bool,
    pub reasons: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalInfo {
    pub address: Pubkey,
    #[serde(flatten)]
    pub account: ProposalAccount,
    /// Decoded execution payload, absent when it does not decode.
    pub execution: Option<ExecutionData>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalTypeInfo {
    pub id: u8,
    pub name: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalRequirements {
    pub min_stake_tokens: u64,
    pub min_stake_duration_days: u64,
    pub deposit_tokens: u64,
    pub voting_periods: Vec<u8>,
    pub max_title_length: usize,
    pub max_description_length: usize,
    pub proposal_types: Vec<ProposalTypeInfo>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionPreview {
    pub proposal_id: u64,
    pub proposal_type: ProposalType,
    pub execution_data: ExecutionData,
    pub summary: String,
    pub raw_hex: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadinessReport {
    #[serde(flatten)]
    pub status: ExecutionStatus,
    pub proposal_type: ProposalType,
    pub preview: Option<ExecutionPreview>,
    pub ready: bool,
    pub blocking_reasons: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntry {
    pub proposal_id: u64,
    pub title: String,
    pub proposal_type: ProposalType,
    pub timelock_end: i64,
    pub executable_at: Option<String>,
    pub can_execute_now: bool,
    pub hours_until_executable: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionSchedule {
    pub generated_at: i64,
    pub pending: usize,
    pub ready_now: usize,
    pub entries: Vec<ScheduleEntry>,
}

/// Proposal rules the program enforces; static for a deployment.
pub fn proposal_requirements() -> ProposalRequirements {
    ProposalRequirements {
        min_stake_tokens: 1_000,
        min_stake_duration_days: 30,
        deposit_tokens: 100,
        voting_periods: zsnipe_program::instructions::VOTING_PERIODS.to_vec(),
        max_title_length: zsnipe_program::instructions::MAX_TITLE_LEN,
        max_description_length: zsnipe_program::instructions::MAX_DESCRIPTION_LEN,
        proposal_types: ProposalType::ALL
            .iter()
            .map(|kind| ProposalTypeInfo {
                id: kind.discriminant(),
                name: kind.as_str(),
            })
            .collect(),
    }
}

pub fn voting_power_preview(amount: u64, lock_days: u64) -> VotingPowerPreview {
    voting_power::preview(amount, TOKEN_DECIMALS, lock_days)
}

fn iso8601(ts: i64) -> Option<String> {
    DateTime::from_timestamp(ts, 0).map(|d| d.to_rfc3339_opts(SecondsFormat::Secs, true))
}

fn execution_preview(proposal: &ProposalAccount) -> Result<ExecutionPreview, GatewayError> {
    let execution_data = ExecutionData::decode(proposal.proposal_type, &proposal.execution_data)?;
    Ok(ExecutionPreview {
        proposal_id: proposal.proposal_id,
        proposal_type: proposal.proposal_type,
        summary: execution_data.summary(TOKEN_DECIMALS),
        execution_data,
        raw_hex: hex::encode(&proposal.execution_data),
    })
}

impl<L: Ledger> Gateway<L> {
    // -- Staking -------------------------------------------------------------

    #[tracing::instrument(skip(self))]
    pub async fn staking_pool(&self) -> Result<StakingPoolInfo, GatewayError> {
        let address = self.builder.addresses().staking_pool()?.address;
        let pool: StakingPool = self.fetch_decoded(&address).await?;
        Ok(StakingPoolInfo {
            address,
            total_staked_tokens: to_display(pool.total_staked_amount, TOKEN_DECIMALS),
            pool,
        })
    }

    #[tracing::instrument(skip(self))]
    pub async fn user_stake(&self, user: &Pubkey) -> Result<UserStakeInfo, GatewayError> {
        let address = self.builder.addresses().user_stake(user)?.address;
        let account: UserStakingAccount = self.fetch_decoded(&address).await?;
        Ok(UserStakeInfo {
            address,
            staked_tokens: to_display(account.staked_amount, TOKEN_DECIMALS),
            account,
        })
    }

    /// Balance of the user's Token-2022 account for the staking mint; zero
    /// when the account does not exist yet.
    #[tracing::instrument(skip(self))]
    pub async fn token_balance(&self, user: &Pubkey) -> Result<TokenBalance, GatewayError> {
        let token_account = self.builder.token_account(user)?;
        let balance = match self.fetch(&token_account).await? {
            Some(info) => Some(TokenAccount::unpack(&info.data)?.amount),
            None => None,
        };
        Ok(TokenBalance {
            owner: *user,
            token_account,
            mint: *self.builder.mint(),
            exists: balance.is_some(),
            balance: balance.unwrap_or(0),
            ui_balance: to_display(balance.unwrap_or(0), TOKEN_DECIMALS),
        })
    }

    // -- Governance ----------------------------------------------------------

    #[tracing::instrument(skip(self))]
    pub async fn governance_account(&self, user: &Pubkey) -> Result<GovernanceInfo, GatewayError> {
        let address = self.builder.addresses().governance(user)?.address;
        let account: GovernanceAccount = self.fetch_decoded(&address).await?;
        Ok(GovernanceInfo {
            address,
            is_currently_locked: account.is_currently_locked(self.now()),
            account,
        })
    }

    #[tracing::instrument(skip(self))]
    pub async fn voting_eligibility(&self, user: &Pubkey) -> Result<VotingEligibility, GatewayError> {
        let stake_address = self.builder.addresses().user_stake(user)?.address;
        let governance_address = self.builder.addresses().governance(user)?.address;
        let (stake, governance) = futures_util::join!(
            self.fetch_decoded::<UserStakingAccount>(&stake_address),
            self.fetch_decoded::<GovernanceAccount>(&governance_address),
        );
        let stake = optional(stake)?;
        let governance = optional(governance)?;

        let staked_amount = stake.as_ref().map_or(0, |s| s.staked_amount);
        let voting_power = governance.as_ref().map_or(0, |g| g.voting_power_cache);

        let mut reasons = Vec::new();
        if staked_amount == 0 {
            reasons.push("no tokens staked".to_string());
        }
        if governance.is_none() {
            reasons.push("governance account not initialized".to_string());
        } else if voting_power == 0 {
            reasons.push("voting power not calculated".to_string());
        }

        Ok(VotingEligibility {
            user: *user,
            has_stake: staked_amount > 0,
            staked_amount,
            has_governance_account: governance.is_some(),
            voting_power,
            eligible: reasons.is_empty(),
            reasons,
        })
    }

    // -- Proposals -----------------------------------------------------------

    #[tracing::instrument(skip(self))]
    pub async fn proposal(&self, proposal_id: u64) -> Result<ProposalInfo, GatewayError> {
        let address = self.builder.addresses().proposal(proposal_id)?.address;
        let account: ProposalAccount = self.fetch_decoded(&address).await?;
        Ok(proposal_info(address, account))
    }

    /// Every proposal account the program owns, ascending by id.
    #[tracing::instrument(skip(self))]
    pub async fn all_proposals(&self) -> Result<Vec<ProposalInfo>, GatewayError> {
        let mut proposals = self.scan_proposals().await?;
        proposals.sort_by_key(|p| p.account.proposal_id);
        Ok(proposals)
    }

    /// Proposals with id in `0..=max_id`, ascending.
    #[tracing::instrument(skip(self))]
    pub async fn list_proposals(&self, max_id: u64) -> Result<Vec<ProposalInfo>, GatewayError> {
        let mut proposals = match self.scan_proposals().await {
            Ok(all) => all
                .into_iter()
                .filter(|p| p.account.proposal_id <= max_id)
                .collect::<Vec<_>>(),
            Err(e) => {
                tracing::warn!(error = %e, "batch proposal scan failed, fetching by id");
                self.proposals_by_id(max_id).await?
            }
        };

        proposals.sort_by_key(|p| p.account.proposal_id);
        Ok(proposals)
    }

    /// One `getProgramAccounts` call filtered on the proposal discriminator.
    async fn scan_proposals(&self) -> Result<Vec<ProposalInfo>, GatewayError> {
        let program_id = *self.builder.addresses().program_id();
        let accounts = self
            .ledger
            .get_program_accounts(&program_id, ProposalAccount::discriminator())
            .await?;
        Ok(accounts
            .into_iter()
            .filter_map(|(address, info)| decoded_proposal(address, ProposalAccount::decode(&info.data)))
            .collect())
    }

    /// Fetch ids `0..=max_id` one by one, at most `fetch_concurrency` in
    /// flight, in ascending order.
    async fn proposals_by_id(&self, max_id: u64) -> Result<Vec<ProposalInfo>, GatewayError> {
        let fetches = (0..=max_id).map(|id| async move {
            let address = self.builder.addresses().proposal(id)?.address;
            let fetched = match self.fetch(&address).await? {
                Some(info) => decoded_proposal(address, ProposalAccount::decode(&info.data)),
                None => None,
            };
            Ok::<_, GatewayError>(fetched)
        });
        let results: Vec<_> = stream::iter(fetches)
            .buffered(self.config.fetch_concurrency)
            .collect()
            .await;
        results.into_iter().filter_map(Result::transpose).collect()
    }

    #[tracing::instrument(skip(self))]
    pub async fn vote_record(
        &self,
        proposal_id: u64,
        voter: &Pubkey,
    ) -> Result<Located<VoteRecord>, GatewayError> {
        let address = self.builder.addresses().vote_record(proposal_id, voter)?.address;
        let account = self.fetch_decoded(&address).await?;
        Ok(Located { address, account })
    }

    #[tracing::instrument(skip(self))]
    pub async fn finalization_status(&self, proposal_id: u64) -> Result<FinalizationStatus, GatewayError> {
        let proposal = self.fetch_proposal(proposal_id).await?;
        Ok(FinalizationStatus::evaluate(&proposal, self.now()))
    }

    // -- Execution -----------------------------------------------------------

    #[tracing::instrument(skip(self))]
    pub async fn execution_status(&self, proposal_id: u64) -> Result<ExecutionStatus, GatewayError> {
        let proposal = self.fetch_proposal(proposal_id).await?;
        Ok(ExecutionStatus::evaluate(&proposal, self.now()))
    }

    #[tracing::instrument(skip(self))]
    pub async fn execution_preview(&self, proposal_id: u64) -> Result<ExecutionPreview, GatewayError> {
        let proposal = self.fetch_proposal(proposal_id).await?;
        execution_preview(&proposal)
    }

    #[tracing::instrument(skip(self))]
    pub async fn readiness(&self, proposal_id: u64) -> Result<ReadinessReport, GatewayError> {
        let proposal = self.fetch_proposal(proposal_id).await?;
        let status = ExecutionStatus::evaluate(&proposal, self.now());
        let mut blocking_reasons = status.blocking_reasons();
        let preview = match execution_preview(&proposal) {
            Ok(preview) => Some(preview),
            Err(e) => {
                blocking_reasons.push(format!("execution data does not decode: {e}"));
                None
            }
        };
        Ok(ReadinessReport {
            proposal_type: proposal.proposal_type,
            ready: blocking_reasons.is_empty(),
            status,
            preview,
            blocking_reasons,
        })
    }

    /// Passed, unexecuted proposals in `0..=max_id`, earliest timelock first.
    #[tracing::instrument(skip(self))]
    pub async fn execution_schedule(&self, max_id: u64) -> Result<ExecutionSchedule, GatewayError> {
        let now = self.now();
        let mut entries: Vec<ScheduleEntry> = self
            .list_proposals(max_id)
            .await?
            .into_iter()
            .map(|p| p.account)
            .filter(is_pending_execution)
            .map(|p| {
                let remaining = (p.timelock_end - now).max(0);
                ScheduleEntry {
                    proposal_id: p.proposal_id,
                    title: p.title,
                    proposal_type: p.proposal_type,
                    timelock_end: p.timelock_end,
                    executable_at: iso8601(p.timelock_end),
                    can_execute_now: remaining == 0,
                    hours_until_executable: (remaining + 3599) / 3600,
                }
            })
            .collect();
        entries.sort_by_key(|e| (e.timelock_end, e.proposal_id));

        Ok(ExecutionSchedule {
            generated_at: now,
            pending: entries.len(),
            ready_now: entries.iter().filter(|e| e.can_execute_now).count(),
            entries,
        })
    }

    // -- Treasury and config -------------------------------------------------

    #[tracing::instrument(skip(self))]
    pub async fn treasury(&self) -> Result<Treasury, GatewayError> {
        let addresses = self.builder.addresses();
        let address = addresses.treasury()?.address;
        let pool = addresses.staking_pool()?.address;
        match self.fetch(&address).await? {
            Some(info) => Ok(Treasury::decode(address, pool, &info.data)?),
            None => Err(GatewayError::AccountNotFound(format!("Treasury at {address}"))),
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn governance_config(&self) -> Result<Located<GovernanceConfig>, GatewayError> {
        let address = self.builder.addresses().governance_config()?.address;
        let account = self.fetch_decoded(&address).await?;
        Ok(Located { address, account })
    }
}

fn proposal_info(address: Pubkey, account: ProposalAccount) -> ProposalInfo {
    let execution = ExecutionData::decode(account.proposal_type, &account.execution_data).ok();
    ProposalInfo {
        address,
        account,
        execution,
    }
}

/// Listings skip accounts that do not decode rather than failing.
fn decoded_proposal<E: std::fmt::Display>(
    address: Pubkey,
    decoded: Result<ProposalAccount, E>,
) -> Option<ProposalInfo> {
    match decoded {
        Ok(account) => Some(proposal_info(address, account)),
        Err(e) => {
            tracing::warn!(%address, error = %e, "skipping undecodable proposal");
            None
        }
    }
}

/// Turn `AccountNotFound` into `None`.
fn optional<T>(result: Result<T, GatewayError>) -> Result<Option<T>, GatewayError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(GatewayError::AccountNotFound(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requirements_are_static() {
        let req = proposal_requirements();
        assert_eq!(req.voting_periods, vec![3, 7, 14, 30]);
        assert_eq!(req.deposit_tokens, 100);
        assert_eq!(req.proposal_types.len(), 3);
        assert_eq!(req.proposal_types[1].name, "treasuryTransfer");
    }

    #[test]
    fn iso_timestamps() {
        assert_eq!(iso8601(0).unwrap(), "1970-01-01T00:00:00Z");
        assert_eq!(iso8601(1_700_000_000).unwrap(), "2023-11-14T22:13:20Z");
    }

    #[test]
    fn optional_only_swallows_not_found() {
        assert_eq!(optional::<u8>(Err(GatewayError::AccountNotFound("x".into()))).unwrap(), None);
        assert!(optional::<u8>(Err(GatewayError::DecodeError("x".into()))).is_err());
    }

    #[test]
    fn preview_uses_token_decimals() {
        let p = voting_power_preview(2_000 * 1_000_000, 45);
        assert_eq!(p.tokens, 2_000);
        assert_eq!(p.voting_power, 2_400);
    }
}
