//! Proposal lifecycle checks.
//!
//! Derived from a decoded proposal and the caller's clock. These only tell a
//! client whether sending finalize or execute makes sense now; the program
//! re-checks everything on chain.

use serde::Serialize;

use crate::accounts::{ProposalAccount, ProposalStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteTally {
    pub yes: u64,
    pub no: u64,
    pub abstain: u64,
    pub total_voters: u32,
}

impl From<&ProposalAccount> for VoteTally {
    fn from(p: &ProposalAccount) -> Self {
        Self {
            yes: p.yes_votes,
            no: p.no_votes,
            abstain: p.abstain_votes,
            total_voters: p.total_voters,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalizationStatus {
    pub proposal_id: u64,
    pub current_status: ProposalStatus,
    pub can_finalize: bool,
    pub voting_ended: bool,
    pub already_finalized: bool,
    pub voting_ends_at: i64,
    pub finalized_at: Option<i64>,
    /// Seconds, 0 once voting has ended.
    pub time_until_voting_ends: i64,
    pub votes: VoteTally,
}

impl FinalizationStatus {
    pub fn evaluate(proposal: &ProposalAccount, now: i64) -> Self {
        let voting_ended = now >= proposal.voting_ends_at;
        let already_finalized = proposal.finalized_at != 0;
        Self {
            proposal_id: proposal.proposal_id,
            current_status: proposal.status,
            can_finalize: proposal.status == ProposalStatus::Active
                && voting_ended
                && !already_finalized,
            voting_ended,
            already_finalized,
            voting_ends_at: proposal.voting_ends_at,
            finalized_at: nonzero(proposal.finalized_at),
            time_until_voting_ends: (proposal.voting_ends_at - now).max(0),
            votes: VoteTally::from(proposal),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionStatus {
    pub proposal_id: u64,
    pub current_status: ProposalStatus,
    pub can_execute: bool,
    pub timelock_expired: bool,
    pub already_executed: bool,
    pub timelock_end: i64,
    pub executed_at: Option<i64>,
    /// Seconds, 0 once the timelock has passed.
    pub time_until_timelock_ends: i64,
}

impl ExecutionStatus {
    pub fn evaluate(proposal: &ProposalAccount, now: i64) -> Self {
        let timelock_expired = now >= proposal.timelock_end;
        let already_executed = proposal.executed_at != 0;
        Self {
            proposal_id: proposal.proposal_id,
            current_status: proposal.status,
            can_execute: proposal.status == ProposalStatus::Passed
                && timelock_expired
                && !already_executed,
            timelock_expired,
            already_executed,
            timelock_end: proposal.timelock_end,
            executed_at: nonzero(proposal.executed_at),
            time_until_timelock_ends: (proposal.timelock_end - now).max(0),
        }
    }

    /// Human-readable reasons execution is blocked, empty when ready.
    pub fn blocking_reasons(&self) -> Vec<String> {
        let mut reasons = Vec::new();
        if self.current_status != ProposalStatus::Passed {
            reasons.push(format!(
                "proposal status is {:?}, must be Passed",
                self.current_status
            ));
        }
        if self.already_executed {
            reasons.push("proposal has already been executed".to_string());
        }
        if !self.timelock_expired {
            reasons.push(format!(
                "timelock ends in {} seconds",
                self.time_until_timelock_ends
            ));
        }
        reasons
    }
}

/// True for proposals that passed and still wait for execution.
pub fn is_pending_execution(proposal: &ProposalAccount) -> bool {
    proposal.status == ProposalStatus::Passed && proposal.executed_at == 0
}

fn nonzero(ts: i64) -> Option<i64> {
    (ts != 0).then_some(ts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::ProposalType;
    use chain_sol::Pubkey;

    fn proposal(status: ProposalStatus) -> ProposalAccount {
        ProposalAccount {
            proposal_id: 2,
            proposer: Pubkey([1u8; 32]),
            title: "t".into(),
            description: "d".into(),
            proposal_type: ProposalType::Text,
            execution_data: Vec::new(),
            status,
            voting_period_days: 3,
            created_at: 1_000,
            voting_ends_at: 2_000,
            finalized_at: 0,
            executed_at: 0,
            timelock_end: 3_000,
            yes_votes: 5,
            no_votes: 1,
            abstain_votes: 0,
            total_voters: 2,
            deposit_amount: 100_000_000,
            deposit_refunded: false,
            bump: 255,
        }
    }

    // -- Finalization --------------------------------------------------------

    #[test]
    fn active_before_deadline_cannot_finalize() {
        let status = FinalizationStatus::evaluate(&proposal(ProposalStatus::Active), 1_500);
        assert!(!status.can_finalize);
        assert!(!status.voting_ended);
        assert_eq!(status.time_until_voting_ends, 500);
        assert_eq!(status.finalized_at, None);
        assert_eq!(status.votes.yes, 5);
    }

    #[test]
    fn active_at_deadline_can_finalize() {
        let status = FinalizationStatus::evaluate(&proposal(ProposalStatus::Active), 2_000);
        assert!(status.can_finalize);
        assert_eq!(status.time_until_voting_ends, 0);
    }

    #[test]
    fn finalized_proposal_cannot_finalize_again() {
        let mut p = proposal(ProposalStatus::Active);
        p.finalized_at = 2_100;
        let status = FinalizationStatus::evaluate(&p, 5_000);
        assert!(!status.can_finalize);
        assert!(status.already_finalized);
        assert_eq!(status.finalized_at, Some(2_100));

        let passed = FinalizationStatus::evaluate(&proposal(ProposalStatus::Passed), 5_000);
        assert!(!passed.can_finalize);
    }

    // -- Execution -----------------------------------------------------------

    #[test]
    fn passed_after_timelock_can_execute() {
        let status = ExecutionStatus::evaluate(&proposal(ProposalStatus::Passed), 3_000);
        assert!(status.can_execute);
        assert!(status.blocking_reasons().is_empty());
    }

    #[test]
    fn timelock_blocks_execution() {
        let status = ExecutionStatus::evaluate(&proposal(ProposalStatus::Passed), 2_400);
        assert!(!status.can_execute);
        assert_eq!(status.time_until_timelock_ends, 600);
        let reasons = status.blocking_reasons();
        assert_eq!(reasons.len(), 1);
        assert!(reasons[0].contains("600"));
    }

    #[test]
    fn failed_or_executed_cannot_execute() {
        let failed = ExecutionStatus::evaluate(&proposal(ProposalStatus::Failed), 9_000);
        assert!(!failed.can_execute);
        assert!(failed.blocking_reasons()[0].contains("Failed"));

        let mut p = proposal(ProposalStatus::Passed);
        p.executed_at = 3_500;
        let done = ExecutionStatus::evaluate(&p, 9_000);
        assert!(!done.can_execute);
        assert_eq!(done.executed_at, Some(3_500));
        assert!(!is_pending_execution(&p));
    }

    #[test]
    fn status_json_uses_null_for_unset_timestamps() {
        let status = ExecutionStatus::evaluate(&proposal(ProposalStatus::Passed), 0);
        let json = serde_json::to_value(status).unwrap();
        assert!(json["executedAt"].is_null());
        assert_eq!(json["currentStatus"], "passed");
    }
}
