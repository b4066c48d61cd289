//! Development routes that sign with local identities.
//!
//! Mounted only when the gateway was started with a wallets directory.

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use super::dto::{parse_choice, DisplayAmount};
use super::{data, ApiJson, AppState};
use crate::error::GatewayError;
use crate::rpc::Ledger;
use crate::service::bulk::BulkReport;
use crate::service::read::DEFAULT_SCAN_ID;

pub(super) fn routes<L: Ledger>() -> Router<AppState<L>> {
    Router::new()
        .route("/dev/wallets", get(wallets::<L>))
        .route("/dev/bulk/stake", post(bulk_stake::<L>))
        .route("/dev/bulk/init-governance", post(bulk_init_governance::<L>))
        .route(
            "/dev/bulk/calculate-voting-power",
            post(bulk_calculate_voting_power::<L>),
        )
        .route("/dev/bulk/vote", post(bulk_vote::<L>))
        .route("/dev/bulk/execute", post(bulk_execute::<L>))
}

/// Wallet numbers to act for; all loaded wallets when absent.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Selection {
    wallets: Option<Vec<usize>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BulkStakeRequest {
    amount: DisplayAmount,
    #[serde(flatten)]
    selection: Selection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BulkVoteRequest {
    proposal_id: u64,
    #[serde(alias = "voteChoice")]
    choice: String,
    #[serde(flatten)]
    selection: Selection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BulkExecuteRequest {
    max_id: Option<u64>,
}

async fn wallets<L: Ledger>(State(gw): State<AppState<L>>) -> Json<serde_json::Value> {
    data(gw.list_wallets())
}

async fn bulk_stake<L: Ledger>(
    State(gw): State<AppState<L>>,
    ApiJson(req): ApiJson<BulkStakeRequest>,
) -> Result<Json<BulkReport>, GatewayError> {
    let amount = req.amount.base_units()?;
    Ok(Json(gw.bulk_stake(amount, req.selection.wallets.as_deref()).await))
}

async fn bulk_init_governance<L: Ledger>(
    State(gw): State<AppState<L>>,
    ApiJson(req): ApiJson<Selection>,
) -> Json<BulkReport> {
    Json(gw.bulk_init_governance(req.wallets.as_deref()).await)
}

async fn bulk_calculate_voting_power<L: Ledger>(
    State(gw): State<AppState<L>>,
    ApiJson(req): ApiJson<Selection>,
) -> Json<BulkReport> {
    Json(gw.bulk_calculate_voting_power(req.wallets.as_deref()).await)
}

async fn bulk_vote<L: Ledger>(
    State(gw): State<AppState<L>>,
    ApiJson(req): ApiJson<BulkVoteRequest>,
) -> Result<Json<BulkReport>, GatewayError> {
    let choice = parse_choice(&req.choice)?;
    Ok(Json(
        gw.bulk_vote(req.proposal_id, choice, req.selection.wallets.as_deref())
            .await,
    ))
}

async fn bulk_execute<L: Ledger>(
    State(gw): State<AppState<L>>,
    ApiJson(req): ApiJson<BulkExecuteRequest>,
) -> Result<Json<BulkReport>, GatewayError> {
    let max_id = req.max_id.unwrap_or(DEFAULT_SCAN_ID);
    Ok(Json(gw.bulk_execute(max_id).await?))
}
