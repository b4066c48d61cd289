//! Dev-only batch operations over local identities.
//!
//! Every item is built with the normal `prepare_*` path, signed with its own
//! identity and submitted. Items run concurrently; items that share an
//! identity serialize on its submission lock. A failed item is reported and
//! the rest of the batch carries on.

use std::future::Future;

use chain_sol::Pubkey;
use futures_util::future::join_all;
use serde::Serialize;
use zsnipe_program::{BuiltInstruction, ExecutionStatus, VoteChoice};

use crate::error::GatewayError;
use crate::identity::Identity;
use crate::rpc::Ledger;
use crate::service::Gateway;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletSummary {
    pub wallet_number: usize,
    pub public_key: Pubkey,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletList {
    pub count: usize,
    pub wallets: Vec<WalletSummary>,
    pub admin: Option<Pubkey>,
}

/// Outcome of one batch item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wallet_number: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proposal_id: Option<u64>,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BulkItem {
    fn from_result(
        wallet_number: Option<usize>,
        proposal_id: Option<u64>,
        result: Result<String, GatewayError>,
    ) -> Self {
        match result {
            Ok(signature) => Self {
                wallet_number,
                proposal_id,
                success: true,
                signature: Some(signature),
                error: None,
            },
            Err(e) => {
                tracing::warn!(?wallet_number, ?proposal_id, error = %e, "bulk item failed");
                Self {
                    wallet_number,
                    proposal_id,
                    success: false,
                    signature: None,
                    error: Some(e.public_message()),
                }
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkReport {
    pub success: bool,
    pub operation: &'static str,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub results: Vec<BulkItem>,
}

impl BulkReport {
    fn new(operation: &'static str, results: Vec<BulkItem>) -> Self {
        let succeeded = results.iter().filter(|r| r.success).count();
        tracing::info!(operation, total = results.len(), succeeded, "bulk operation finished");
        Self {
            success: true,
            operation,
            total: results.len(),
            succeeded,
            failed: results.len() - succeeded,
            results,
        }
    }
}

impl<L: Ledger> Gateway<L> {
    pub fn list_wallets(&self) -> WalletList {
        let wallets: Vec<_> = self
            .identities
            .numbers()
            .into_iter()
            .filter_map(|n| self.identities.by_index(n))
            .map(|identity| WalletSummary {
                wallet_number: identity.number(),
                public_key: *identity.public_key(),
            })
            .collect();
        WalletList {
            count: wallets.len(),
            wallets,
            admin: self.identities.admin().map(|a| *a.public_key()),
        }
    }

    /// Run `prepare` for each selected wallet, then sign and submit.
    /// `None` selects every loaded wallet.
    async fn for_each_wallet<'a, F, Fut>(
        &'a self,
        operation: &'static str,
        selection: Option<&[usize]>,
        prepare: F,
    ) -> BulkReport
    where
        F: Fn(&'a Identity) -> Fut,
        Fut: Future<Output = Result<BuiltInstruction, GatewayError>>,
    {
        let numbers = match selection {
            Some(numbers) => numbers.to_vec(),
            None => self.identities.numbers(),
        };
        let prepare = &prepare;

        let items = numbers.into_iter().map(|number| async move {
            let result = match self.identities.by_index(number) {
                Some(identity) => match prepare(identity).await {
                    Ok(built) => self.sign_and_submit(identity, &built).await,
                    Err(e) => Err(e),
                },
                None => Err(GatewayError::InvalidInput(format!(
                    "wallet {number} is not loaded"
                ))),
            };
            BulkItem::from_result(Some(number), None, result)
        });

        BulkReport::new(operation, join_all(items).await)
    }

    #[tracing::instrument(skip(self))]
    pub async fn bulk_stake(&self, amount: u64, selection: Option<&[usize]>) -> BulkReport {
        self.for_each_wallet("bulk_stake", selection, |identity| {
            self.prepare_stake(identity.public_key(), amount)
        })
        .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn bulk_init_governance(&self, selection: Option<&[usize]>) -> BulkReport {
        self.for_each_wallet("bulk_init_governance", selection, |identity| async move {
            self.prepare_init_governance(identity.public_key())
        })
        .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn bulk_calculate_voting_power(&self, selection: Option<&[usize]>) -> BulkReport {
        self.for_each_wallet("bulk_calculate_voting_power", selection, |identity| async move {
            self.prepare_calculate_voting_power(identity.public_key())
        })
        .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn bulk_vote(
        &self,
        proposal_id: u64,
        choice: VoteChoice,
        selection: Option<&[usize]>,
    ) -> BulkReport {
        self.for_each_wallet("bulk_vote", selection, |identity| {
            self.prepare_cast_vote(identity.public_key(), proposal_id, choice)
        })
        .await
    }

    /// Execute every proposal in `0..=max_id` that can execute now, signed
    /// by the admin identity.
    #[tracing::instrument(skip(self))]
    pub async fn bulk_execute(&self, max_id: u64) -> Result<BulkReport, GatewayError> {
        let admin = self
            .identities
            .admin()
            .ok_or_else(|| GatewayError::InvalidInput("no admin identity is loaded".into()))?;

        let now = self.now();
        let ready: Vec<_> = self
            .list_proposals(max_id)
            .await?
            .into_iter()
            .map(|p| p.account)
            .filter(|p| ExecutionStatus::evaluate(p, now).can_execute)
            .collect();
        tracing::info!(count = ready.len(), "proposals ready to execute");

        let items = ready.iter().map(|proposal| async move {
            let result = match self.build_execute(admin.public_key(), proposal, None).await {
                Ok(built) => self.sign_and_submit(admin, &built).await,
                Err(e) => Err(e),
            };
            BulkItem::from_result(None, Some(proposal.proposal_id), result)
        });

        Ok(BulkReport::new("bulk_execute", join_all(items).await))
    }
}
